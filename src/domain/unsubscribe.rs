use serde::Serialize;
use std::fmt;

/// Media type of a decoded leaf part. Anything else is ignored by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MediaType {
    PlainText,
    Markup,
}

impl MediaType {
    pub fn from_mimetype(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "text/plain" => Some(MediaType::PlainText),
            "text/html" => Some(MediaType::Markup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedBodyPart {
    pub media_type: MediaType,
    pub text: String,
}

/// A probable unsubscribe URL. Always an absolute http/https URL, stored
/// exactly as it appeared in the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UnsubscribeLink(String);

impl UnsubscribeLink {
    pub fn parse(raw: &str) -> Option<Self> {
        let parsed = url::Url::parse(raw).ok()?;
        match parsed.scheme() {
            "http" | "https" => Some(Self(raw.to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnsubscribeLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of links, compared by exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkSet {
    links: Vec<UnsubscribeLink>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `link` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, link: UnsubscribeLink) -> bool {
        if self.links.contains(&link) {
            return false;
        }
        self.links.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnsubscribeLink> {
        self.links.iter()
    }

    pub fn as_strs(&self) -> Vec<&str> {
        self.links.iter().map(UnsubscribeLink::as_str).collect()
    }
}

impl<'a> IntoIterator for &'a LinkSet {
    type Item = &'a UnsubscribeLink;
    type IntoIter = std::slice::Iter<'a, UnsubscribeLink>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}

/// One message worth of unsubscribe candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub sender: String,
    pub subject: String,
    pub links: LinkSet,
}

/// Logical key a captured response is stored under: `{sender}/{subject}{index}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    pub sender: String,
    pub name: String,
}

impl ArtifactKey {
    pub fn for_link(entry: &RegistryEntry, index: usize) -> Self {
        Self {
            sender: entry.sender.clone(),
            name: format!("{}{}", entry.subject, index),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.sender, self.name)
    }
}
