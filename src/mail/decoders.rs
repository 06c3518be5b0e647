use crate::domain::unsubscribe::{DecodedBodyPart, MediaType};
use log::debug;
use mailparse::{MailHeaderMap, ParsedMail};
use std::fmt;

pub const UNKNOWN_SENDER: &str = "(unknown)";
pub const NO_SUBJECT: &str = "(no subject)";

// Forwards of forwards of ... are not worth following past this.
const MAX_ATTACHED_DEPTH: usize = 8;

/// A message reduced to what the link extractor needs.
#[derive(Debug, Clone, Default)]
pub struct DecodedMessage {
    pub sender: String,
    pub subject: String,
    pub parts: Vec<DecodedBodyPart>,
    pub warnings: Vec<DecodeWarning>,
}

/// A part (or whole message) that was skipped because it could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    pub subject: String,
    pub reason: String,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Was unable to decode body for email: {}\nError: {}",
            self.subject, self.reason
        )
    }
}

/// Decodes one raw RFC 822 message into sender, subject and its text/plain
/// and text/html leaf parts in document order. Never fails: undecodable
/// parts are dropped and reported in `warnings`.
pub fn decode_message(raw: &[u8]) -> DecodedMessage {
    let parsed = match mailparse::parse_mail(raw) {
        Ok(p) => p,
        Err(e) => {
            let warning = DecodeWarning {
                subject: NO_SUBJECT.to_string(),
                reason: e.to_string(),
            };
            debug!("{warning}");
            return DecodedMessage {
                sender: UNKNOWN_SENDER.to_string(),
                subject: NO_SUBJECT.to_string(),
                parts: vec![],
                warnings: vec![warning],
            };
        }
    };

    let sender = header_or(&parsed, "From", UNKNOWN_SENDER);
    let subject = header_or(&parsed, "Subject", NO_SUBJECT);

    let mut msg = DecodedMessage {
        sender,
        subject,
        ..Default::default()
    };

    if is_multipart(&parsed) || is_attached_message(&parsed) {
        collect_parts(&parsed, &mut msg, 0);
    } else {
        match parsed.get_body_raw() {
            Ok(bytes) => {
                if let Some(media_type) = MediaType::from_mimetype(&parsed.ctype.mimetype) {
                    msg.parts.push(DecodedBodyPart {
                        media_type,
                        text: String::from_utf8_lossy(&bytes).into_owned(),
                    });
                }
            }
            Err(e) => msg.warn(e.to_string()),
        }
    }

    msg
}

impl DecodedMessage {
    fn warn(&mut self, reason: String) {
        let warning = DecodeWarning {
            subject: self.subject.clone(),
            reason,
        };
        debug!("{warning}");
        self.warnings.push(warning);
    }
}

fn header_or(parsed: &ParsedMail, name: &str, fallback: &str) -> String {
    // get_first_value decodes RFC 2047 encoded-words
    parsed
        .headers
        .get_first_value(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn is_multipart(p: &ParsedMail) -> bool {
    p.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/") || !p.subparts.is_empty()
}

fn is_attached_message(p: &ParsedMail) -> bool {
    p.ctype.mimetype.eq_ignore_ascii_case("message/rfc822")
}

/// Walks `p` depth first and pushes its text leaves onto `msg.parts`.
/// Attached messages are parsed from their decoded body and walked too.
fn collect_parts(p: &ParsedMail, msg: &mut DecodedMessage, depth: usize) {
    if !p.subparts.is_empty() {
        for sp in &p.subparts {
            collect_parts(sp, msg, depth);
        }
        return;
    }

    if is_attached_message(p) {
        if depth >= MAX_ATTACHED_DEPTH {
            debug!("not descending into attached email nested {depth} deep");
            return;
        }
        let bytes = match p.get_body_raw() {
            Ok(b) => b,
            Err(e) => return msg.warn(e.to_string()),
        };
        match mailparse::parse_mail(&bytes) {
            Ok(inner) => collect_parts(&inner, msg, depth + 1),
            Err(e) => msg.warn(format!("attached email: {e}")),
        }
        return;
    }

    let Some(media_type) = MediaType::from_mimetype(&p.ctype.mimetype) else {
        debug!("skipping {} part in '{}'", p.ctype.mimetype, msg.subject);
        return;
    };
    match p.get_body_raw() {
        Ok(bytes) => msg.parts.push(DecodedBodyPart {
            media_type,
            text: utf8_ignore_invalid(&bytes),
        }),
        Err(e) => msg.warn(e.to_string()),
    }
}

/// UTF-8 decode that drops invalid byte sequences instead of replacing them.
fn utf8_ignore_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
