use keyring::{Entry, Error as KeyringError};

use crate::error::Result;

const SERVICE: &str = "inbox_unsubscriber";

/// Environment fallback when nothing is stored in the keyring.
pub const PASSWORD_ENV: &str = "INBOX_UNSUBSCRIBER_PASSWORD";

/// Save an app password into the OS keyring for the given login address.
pub fn save_app_password(username: &str, password: &str) -> Result<()> {
    Entry::new(SERVICE, username)?.set_password(password)?;
    Ok(())
}

/// Load the app password for the given login address, if one was stored.
pub fn load_app_password(username: &str) -> Result<Option<String>> {
    match Entry::new(SERVICE, username)?.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(KeyringError::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Keyring first, then the environment.
pub fn stored_password(username: &str) -> Result<Option<String>> {
    if let Some(p) = load_app_password(username)? {
        return Ok(Some(p));
    }
    Ok(std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty()))
}
