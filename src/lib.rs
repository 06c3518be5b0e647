//! Finds unsubscribe links in a mailbox and follows the ones you pick.
//!
//! Raw messages go through [`mail::decoders`], the text and markup bodies
//! through [`unsubscribe::extract`], and every message with at least one
//! link becomes an entry in the [`unsubscribe::Registry`]. The
//! [`unsubscribe::ActionRunner`] then issues the GET requests and stores
//! successful responses through an [`store::ArtifactStore`].

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mail;
pub mod store;
pub mod terminal;
pub mod unsubscribe;

pub use error::{Error, Result};
