use crate::error::{Error, Result};
use crate::mail::source::MailSource;
use log::{debug, info};
use native_tls::TlsConnector;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_IMAP_PORT: u16 = 993;

/// Provider name to IMAP host.
pub const SUPPORTED_IMAP_SERVERS: &[(&str, &str)] = &[
    ("yahoo", "imap.mail.yahoo.com"),
    ("gmail", "imap.gmail.com"),
    ("google", "imap.gmail.com"),
    ("outlook", "outlook.office365.com"),
    ("icloud", "imap.mail.me.com"),
    ("aol", "imap.aol.com"),
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").expect("email pattern compiles")
});

pub fn server_for_provider(provider: &str) -> Result<&'static str> {
    let wanted = provider.trim().to_ascii_lowercase();
    SUPPORTED_IMAP_SERVERS
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, host)| *host)
        .ok_or_else(|| Error::UnsupportedProvider(provider.to_string()))
}

pub fn validate_email(user: &str) -> Result<()> {
    if EMAIL_RE.is_match(user) {
        Ok(())
    } else {
        Err(Error::InvalidEmail(user.to_string()))
    }
}

type TlsSession = imap::Session<native_tls::TlsStream<std::net::TcpStream>>;

pub struct ImapClient {
    pub server: String,
    pub port: u16,
    pub user: String,
}

impl ImapClient {
    pub fn new(server: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_IMAP_PORT,
            user: user.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connects over TLS and logs in with an app password.
    pub fn login(&self, password: &str) -> Result<MailboxSession> {
        validate_email(&self.user)?;

        info!("connecting to {}:{}", self.server, self.port);
        let tls = TlsConnector::builder().build()?;
        let client = imap::connect((self.server.as_str(), self.port), self.server.as_str(), &tls)?;

        let session = client
            .login(&self.user, password)
            .map_err(|(e, _client)| Error::LoginFailed(e.to_string()))?;
        info!("logged in as {}", self.user);

        Ok(MailboxSession {
            session,
            selected: false,
            logged_out: false,
        })
    }
}

/// Logged-in IMAP session. Logs out exactly once: through [`logout`] or,
/// failing that, when dropped.
///
/// [`logout`]: MailboxSession::logout
pub struct MailboxSession {
    session: TlsSession,
    selected: bool,
    logged_out: bool,
}

impl MailboxSession {
    pub fn logout(mut self) -> Result<()> {
        self.logged_out = true;
        self.session.logout()?;
        Ok(())
    }
}

impl Drop for MailboxSession {
    fn drop(&mut self) {
        if self.logged_out {
            return;
        }
        self.logged_out = true;
        if let Err(e) = self.session.logout() {
            debug!("logout on drop failed: {e}");
        }
    }
}

impl MailSource for MailboxSession {
    fn open_inbox(&mut self) -> Result<u32> {
        let mailbox = self
            .session
            .select("INBOX")
            .map_err(|e| Error::MailboxSelect(e.to_string()))?;
        self.selected = true;
        info!("INBOX has {} messages", mailbox.exists);
        Ok(mailbox.exists)
    }

    fn fetch_raw(&mut self, index: u32) -> Result<Vec<u8>> {
        // PEEK keeps the \Seen flag untouched
        let fetches = self
            .session
            .fetch(index.to_string(), "BODY.PEEK[]")
            .map_err(|e| Error::Fetch {
                index,
                reason: e.to_string(),
            })?;

        fetches
            .iter()
            .next()
            .and_then(|f| f.body())
            .map(|b| b.to_vec())
            .ok_or_else(|| Error::Fetch {
                index,
                reason: "server returned no body".to_string(),
            })
    }

    fn close_inbox(&mut self) -> Result<()> {
        if self.selected {
            self.session.close()?;
            self.selected = false;
        }
        Ok(())
    }
}
