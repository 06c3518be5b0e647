use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::mail::imap_client::{DEFAULT_IMAP_PORT, server_for_provider};
use crate::mail::source::FetchOrder;
use crate::store::fs::DEFAULT_RESPONSE_DIR;
use crate::unsubscribe::runner::DEFAULT_HTTP_TIMEOUT_SECS;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    pub provider: Option<String>,
    pub imap_server: Option<String>,
    pub imap_port: Option<u16>,
    pub user_email: Option<String>,
    pub response_dir: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub scan_count: Option<u32>,
    pub order: Option<FetchOrder>,
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| Error::Config("no config dir available".into()))?
        .join("inbox_unsubscriber"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

/// Loads the default config file, writing a template first if it is missing.
pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        // create a template config for users to edit
        let sample = Config {
            provider: Some("yahoo".to_string()),
            imap_server: None,
            imap_port: Some(DEFAULT_IMAP_PORT),
            user_email: Some("you@example.com".to_string()),
            response_dir: Some(DEFAULT_RESPONSE_DIR.to_string()),
            http_timeout_secs: Some(DEFAULT_HTTP_TIMEOUT_SECS),
            scan_count: Some(50),
            order: Some(FetchOrder::Desc),
        };
        let tom = toml::to_string_pretty(&sample).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, tom)?;
        return Err(Error::Config(format!(
            "created template config at {}, edit it and run again",
            path.display()
        )));
    }
    let s = fs::read_to_string(path)?;
    toml::from_str(&s).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}

impl Config {
    /// Explicit server wins over the provider table.
    pub fn resolve_server(&self) -> Result<String> {
        if let Some(server) = self.imap_server.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok(server.trim().to_string());
        }
        let provider = self
            .provider
            .as_deref()
            .ok_or_else(|| Error::Config("neither provider nor imap_server is set".into()))?;
        Ok(server_for_provider(provider)?.to_string())
    }

    pub fn port(&self) -> u16 {
        self.imap_port.unwrap_or(DEFAULT_IMAP_PORT)
    }

    pub fn user_email(&self) -> Result<&str> {
        self.user_email
            .as_deref()
            .ok_or_else(|| Error::Config("user_email not set in config".into()))
    }

    pub fn response_dir(&self) -> PathBuf {
        PathBuf::from(
            self.response_dir
                .clone()
                .unwrap_or_else(|| DEFAULT_RESPONSE_DIR.to_string()),
        )
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS))
    }

    pub fn order(&self) -> FetchOrder {
        self.order.unwrap_or_default()
    }
}
