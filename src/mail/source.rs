use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Anything that can hand out raw messages by 1-based index.
pub trait MailSource {
    /// Opens the inbox and returns how many messages it holds.
    fn open_inbox(&mut self) -> Result<u32>;

    /// Raw RFC 822 bytes of message `index`.
    fn fetch_raw(&mut self, index: u32) -> Result<Vec<u8>>;

    fn close_inbox(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FetchOrder {
    /// Newest first.
    #[default]
    Desc,
    /// Oldest first.
    Asc,
}

/// Message indices to fetch, in fetch order. `count = None` means all of them.
pub fn fetch_plan(total: u32, count: Option<u32>, order: FetchOrder) -> Result<Vec<u32>> {
    let count = count.unwrap_or(total);
    if count > total {
        return Err(Error::TooManyRequested {
            requested: count,
            available: total,
        });
    }

    Ok(match order {
        FetchOrder::Desc => (total - count + 1..=total).rev().collect(),
        FetchOrder::Asc => (1..=count).collect(),
    })
}
