//! Keyword heuristics that pull unsubscribe candidates out of decoded bodies.
//!
//! Both strategies take the links found so far and return them extended, so
//! a message's parts can be folded into a single ordered set.

use crate::domain::unsubscribe::{DecodedBodyPart, LinkSet, MediaType, UnsubscribeLink};
use regex::{Regex, RegexBuilder};
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;

/// Phrases that usually sit next to an unsubscribe link.
pub const UNSUBSCRIBE_KEYWORDS: &[&str] = &[
    "unsubscribe",
    "[unsubscribe]",
    "exclude",
    "opt-out",
    "opt out",
    "if you no longer wish to receive this email",
];

// Stops at the first dot-joined run after the scheme; good enough for the
// links mailers put after a keyword.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?)://[A-Za-z0-9_/\-?=%~.]+\.[A-Za-z0-9_/\-&?=%~]+")
        .expect("url pattern compiles")
});

static KEYWORD_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    UNSUBSCRIBE_KEYWORDS
        .iter()
        .map(|kw| {
            RegexBuilder::new(&regex::escape(kw))
                .case_insensitive(true)
                // ASCII folding only, so 'ſ' or 'K' never stand in for 's' or 'k'
                .unicode(false)
                .build()
                .expect("keyword pattern compiles")
        })
        .collect()
});

/// Runs the strategy matching the part's media type.
pub fn extract_links(part: &DecodedBodyPart, links: LinkSet) -> LinkSet {
    match part.media_type {
        MediaType::PlainText => extract_from_plain_text(&part.text, links),
        MediaType::Markup => extract_from_markup(&part.text, links),
    }
}

/// Folds every part of a message into one ordered, duplicate-free set.
pub fn extract_from_parts(parts: &[DecodedBodyPart]) -> LinkSet {
    parts
        .iter()
        .fold(LinkSet::new(), |links, part| extract_links(part, links))
}

/// For each keyword, takes the first URL after its first case-insensitive
/// occurrence in the body.
pub fn extract_from_plain_text(body: &str, mut links: LinkSet) -> LinkSet {
    for re in KEYWORD_RES.iter() {
        let Some(found) = re.find(body) else {
            continue;
        };

        let trimmed: String = body[found.start()..]
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();

        if let Some(m) = URL_RE.find(&trimmed)
            && let Some(link) = UnsubscribeLink::parse(m.as_str())
        {
            links.insert(link);
        }
    }
    links
}

/// Collects the href of every anchor whose leading text contains a keyword.
/// A keyword is tried as written first and only in title case when that
/// finds no anchor at all.
pub fn extract_from_markup(body: &str, mut links: LinkSet) -> LinkSet {
    let html: String = body.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let doc = Html::parse_document(&html);
    let Ok(anchor) = Selector::parse("a") else {
        return links;
    };

    for kw in UNSUBSCRIBE_KEYWORDS {
        let mut hrefs = anchors_containing(&doc, &anchor, kw);
        if hrefs.is_empty() {
            hrefs = anchors_containing(&doc, &anchor, &title_case(kw));
        }

        for href in hrefs.into_iter().flatten() {
            if let Some(link) = UnsubscribeLink::parse(href) {
                links.insert(link);
            }
        }
    }
    links
}

/// Matching anchors in document order, with their href if they carry one.
fn anchors_containing<'a>(doc: &'a Html, anchor: &Selector, needle: &str) -> Vec<Option<&'a str>> {
    doc.select(anchor)
        .filter(|a| {
            // only the first direct text child counts
            a.children()
                .find_map(|child| match child.value() {
                    Node::Text(t) => Some(&**t),
                    _ => None,
                })
                .is_some_and(|text: &str| text.contains(needle))
        })
        .map(|a| a.value().attr("href"))
        .collect()
}

/// Upper-cases the first letter of every word and lower-cases the rest,
/// where a word is any run of letters.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}
