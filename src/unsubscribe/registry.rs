use crate::domain::unsubscribe::{LinkSet, RegistryEntry};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Which entries to act on, by 1-based display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    Single(usize),
    /// Inclusive on both ends.
    Range { start: usize, end: usize },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("there was a problem processing your input: '{0}'")]
    Malformed(String),
    #[error("{position} is not a valid number, choose between 1 and {len}")]
    OutOfRange { position: usize, len: usize },
    #[error("range start {start} is greater than range end {end}")]
    InvertedRange { start: usize, end: usize },
}

impl FromStr for Selection {
    type Err = SelectionError;

    /// Accepts `all`, `N` or `N-M`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let malformed = || SelectionError::Malformed(input.to_string());

        if input.eq_ignore_ascii_case("all") {
            return Ok(Selection::All);
        }

        let number = |part: &str| -> Result<usize, SelectionError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };

        match input.split_once('-') {
            Some((start, end)) => Ok(Selection::Range {
                start: number(start)?,
                end: number(end)?,
            }),
            None => Ok(Selection::Single(number(input)?)),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Single(p) => write!(f, "{p}"),
            Selection::Range { start, end } => write!(f, "{start}-{end}"),
        }
    }
}

/// Ordered inventory of messages that carried at least one unsubscribe link.
///
/// One entry per message; the same sender may appear several times. Display
/// positions are recomputed from whatever is left after each removal.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry; messages without links are dropped.
    pub fn ingest(&mut self, sender: impl Into<String>, subject: impl Into<String>, links: LinkSet) {
        if links.is_empty() {
            return;
        }
        self.entries.push(RegistryEntry {
            sender: sender.into(),
            subject: subject.into(),
            links,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Entries paired with their 1-based display position.
    pub fn positioned(&self) -> impl Iterator<Item = (usize, &RegistryEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    /// Validates a selection against the current entries and turns it into
    /// zero-based indices. Nothing is mutated.
    pub fn resolve(&self, selection: Selection) -> Result<Range<usize>, SelectionError> {
        let len = self.entries.len();
        let in_bounds = |position: usize| {
            if position == 0 || position > len {
                Err(SelectionError::OutOfRange { position, len })
            } else {
                Ok(())
            }
        };

        match selection {
            Selection::All => Ok(0..len),
            Selection::Single(position) => {
                in_bounds(position)?;
                Ok(position - 1..position)
            }
            Selection::Range { start, end } => {
                if start > end {
                    return Err(SelectionError::InvertedRange { start, end });
                }
                in_bounds(start)?;
                in_bounds(end)?;
                Ok(start - 1..end)
            }
        }
    }

    pub(crate) fn get(&self, index: usize) -> Option<&RegistryEntry> {
        self.entries.get(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> RegistryEntry {
        self.entries.remove(index)
    }
}
