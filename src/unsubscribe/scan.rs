use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};
use crate::mail::decoders::{DecodeWarning, decode_message};
use crate::mail::source::{FetchOrder, MailSource, fetch_plan};
use crate::unsubscribe::extract::extract_from_parts;
use crate::unsubscribe::registry::Registry;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanRequest {
    /// `None` scans the whole inbox.
    pub count: Option<u32>,
    pub order: FetchOrder,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub registry: Registry,
    pub scanned: usize,
    pub warnings: Vec<DecodeWarning>,
}

/// Fetches the requested messages one at a time and keeps those with
/// unsubscribe links. Fetch problems abort the pass; decode problems only
/// produce warnings.
pub fn scan_mailbox(
    source: &mut dyn MailSource,
    request: ScanRequest,
    cancel: Option<&Arc<AtomicBool>>,
    mut on_warning: impl FnMut(&DecodeWarning),
) -> Result<ScanReport> {
    let total = source.open_inbox()?;
    let plan = fetch_plan(total, request.count, request.order)?;

    let mut report = ScanReport::default();
    info!("fetching {} of {} emails", plan.len(), total);

    for index in plan {
        if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(Error::Interrupted);
        }

        let raw = source.fetch_raw(index)?;
        let msg = decode_message(&raw);
        for w in &msg.warnings {
            on_warning(w);
        }

        let links = extract_from_parts(&msg.parts);
        info!(
            "email {index} from {}: {} unsubscribe link(s)",
            msg.sender,
            links.len()
        );
        report.registry.ingest(msg.sender, msg.subject, links);
        report.warnings.extend(msg.warnings);
        report.scanned += 1;
    }

    source.close_inbox()?;
    info!("done fetching emails");
    Ok(report)
}
