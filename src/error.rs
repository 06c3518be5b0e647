//! Error types for the unsubscriber core.

use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for mailbox, scanning and unsubscribe operations.
pub enum Error {
    /// No IMAP server is known for the requested provider.
    #[error("{0} is not a supported email provider yet")]
    UnsupportedProvider(String),
    /// Login address does not look like `x@example.com`.
    #[error("email '{0}' not in correct format")]
    InvalidEmail(String),
    /// Server rejected the credentials.
    #[error("login failed: {0}")]
    LoginFailed(String),
    /// INBOX could not be selected.
    #[error("could not select INBOX: {0}")]
    MailboxSelect(String),
    /// Fetching a single message failed.
    #[error("unable to fetch email {index}: {reason}")]
    Fetch { index: u32, reason: String },
    /// More messages were requested than the mailbox holds.
    #[error("requested {requested} emails but the inbox only has {available}")]
    TooManyRequested { requested: u32, available: u32 },
    /// The user interrupted a long running pass.
    #[error("interrupted")]
    Interrupted,
    /// Underlying IMAP protocol error.
    #[error("imap error: {0}")]
    Imap(#[from] imap::error::Error),
    /// TLS setup error.
    #[error("tls error: {0}")]
    Tls(#[from] native_tls::Error),
    /// Underlying HTTP client error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// IO error when reading or writing data.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// OS keyring failure.
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    /// Configuration could not be read or is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for unsubscriber operations.
pub type Result<T> = std::result::Result<T, Error>;
