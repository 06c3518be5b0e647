use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::domain::unsubscribe::{ArtifactKey, RegistryEntry, UnsubscribeLink};
use crate::error::Result;
use crate::store::repo::ArtifactStore;
use crate::unsubscribe::registry::{Registry, Selection, SelectionError};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Plain GET, no retries.
pub trait HttpFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        // only successful bodies are kept, so don't wait on the rest
        let body = if status == 200 {
            resp.bytes()?.to_vec()
        } else {
            Vec::new()
        };
        Ok(HttpResponse { status, body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// 200 OK; body stored under the key.
    Saved(ArtifactKey),
    /// Any other status.
    Status(u16),
    Transport(String),
    /// 200 OK but the body could not be stored.
    StoreFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttempt {
    pub link: UnsubscribeLink,
    pub outcome: LinkOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub sender: String,
    pub subject: String,
    pub attempts: Vec<LinkAttempt>,
}

impl RunReport {
    pub fn saved(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| matches!(a.outcome, LinkOutcome::Saved(_)))
            .count()
    }
}

/// Follows unsubscribe links and drains the registry as it goes.
pub struct ActionRunner<'a> {
    http: &'a dyn HttpFetcher,
    store: &'a dyn ArtifactStore,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> ActionRunner<'a> {
    pub fn new(http: &'a dyn HttpFetcher, store: &'a dyn ArtifactStore) -> Self {
        Self {
            http,
            store,
            cancel: None,
        }
    }

    /// Stop before the next entry once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Tries every link of `entry` in order. A failing link never stops the rest.
    pub fn run(&self, entry: &RegistryEntry) -> RunReport {
        info!(
            "attempting to unsubscribe from {} (links found in email: {})",
            entry.sender, entry.subject
        );

        let mut attempts = Vec::with_capacity(entry.links.len());
        for (idx, link) in entry.links.iter().enumerate() {
            info!("trying link: {link}");
            let outcome = match self.http.get(link.as_str()) {
                Ok(resp) if resp.status == 200 => {
                    let key = ArtifactKey::for_link(entry, idx);
                    match self.store.put(&key, &resp.body) {
                        Ok(()) => LinkOutcome::Saved(key),
                        Err(e) => {
                            debug!("could not store response for {key}: {e}");
                            LinkOutcome::StoreFailed(e.to_string())
                        }
                    }
                }
                Ok(resp) => {
                    debug!("{link} answered with status {}", resp.status);
                    LinkOutcome::Status(resp.status)
                }
                Err(e) => {
                    debug!("request to {link} failed: {e}");
                    LinkOutcome::Transport(e.to_string())
                }
            };
            attempts.push(LinkAttempt {
                link: link.clone(),
                outcome,
            });
        }

        RunReport {
            sender: entry.sender.clone(),
            subject: entry.subject.clone(),
            attempts,
        }
    }

    /// Runs the selected entries in display order, removing each one from
    /// the registry right after its links were attempted. An invalid
    /// selection leaves the registry untouched.
    pub fn run_selection(
        &self,
        registry: &mut Registry,
        selection: Selection,
        mut on_entry: impl FnMut(&RunReport),
    ) -> std::result::Result<Vec<RunReport>, SelectionError> {
        let range = registry.resolve(selection)?;
        let mut reports = Vec::with_capacity(range.len());

        // removal shifts the next selected entry into `range.start`
        for _ in range.clone() {
            if self.cancelled() {
                warn!(
                    "interrupted; {} selected entries left untouched",
                    range.len() - reports.len()
                );
                break;
            }
            let Some(entry) = registry.get(range.start) else {
                break;
            };
            let report = self.run(entry);
            registry.remove(range.start);
            on_entry(&report);
            reports.push(report);
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unsubscribe::LinkSet;
    use crate::error::Error;
    use crate::store::memory::MemoryArtifactStore;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Answers from a fixed table and records every request.
    #[derive(Default)]
    struct FakeHttp {
        statuses: HashMap<String, u16>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeHttp {
        fn with(pairs: &[(&str, u16)]) -> Self {
            Self {
                statuses: pairs.iter().map(|(u, s)| (u.to_string(), *s)).collect(),
                seen: RefCell::new(vec![]),
            }
        }
    }

    impl HttpFetcher for FakeHttp {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            self.seen.borrow_mut().push(url.to_string());
            match self.statuses.get(url) {
                Some(&status) => Ok(HttpResponse {
                    status,
                    body: format!("response from {url}").into_bytes(),
                }),
                None => Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
            }
        }
    }

    fn links(urls: &[&str]) -> LinkSet {
        let mut set = LinkSet::new();
        for u in urls {
            set.insert(UnsubscribeLink::parse(u).unwrap());
        }
        set
    }

    #[test]
    fn failing_link_does_not_stop_the_entry() {
        let http = FakeHttp::with(&[("https://a.example/1", 404), ("https://a.example/2", 200)]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest(
            "a@example.com",
            "Deals",
            links(&["https://a.example/1", "https://a.example/2"]),
        );

        let runner = ActionRunner::new(&http, &store);
        let reports = runner.run_selection(&mut reg, Selection::Single(1), |_| {}).unwrap();

        assert_eq!(*http.seen.borrow(), vec!["https://a.example/1", "https://a.example/2"]);
        assert_eq!(reports[0].attempts[0].outcome, LinkOutcome::Status(404));
        assert_eq!(reports[0].saved(), 1);
        assert_eq!(store.keys(), vec!["a@example.com/Deals1"]);
        assert!(reg.is_empty());
    }

    #[test]
    fn entry_removed_even_when_nothing_succeeds() {
        let http = FakeHttp::with(&[("https://a.example/1", 500)]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest("a@example.com", "s", links(&["https://a.example/1", "https://a.example/down"]));
        reg.ingest("b@example.com", "t", links(&["https://b.example/1"]));

        let runner = ActionRunner::new(&http, &store);
        let reports = runner.run_selection(&mut reg, Selection::Single(1), |_| {}).unwrap();

        assert_eq!(reports[0].saved(), 0);
        assert!(matches!(reports[0].attempts[1].outcome, LinkOutcome::Transport(_)));
        assert!(store.is_empty());
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.entries()[0].sender, "b@example.com");
    }

    #[test]
    fn select_all_empties_registry() {
        let http = FakeHttp::with(&[("https://a.example/1", 200), ("https://b.example/1", 200)]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest("a@example.com", "s", links(&["https://a.example/1"]));
        reg.ingest("b@example.com", "t", links(&["https://b.example/1"]));

        let mut seen = vec![];
        let runner = ActionRunner::new(&http, &store);
        runner
            .run_selection(&mut reg, Selection::All, |r| seen.push(r.sender.clone()))
            .unwrap();

        assert!(reg.is_empty());
        assert_eq!(seen, vec!["a@example.com", "b@example.com"]);
        assert_eq!(store.get("b@example.com/t0").unwrap(), b"response from https://b.example/1");
    }

    #[test]
    fn range_removes_only_selected_entries() {
        let http = FakeHttp::with(&[]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        for i in 1..=4 {
            reg.ingest(format!("s{i}"), "x", links(&[format!("https://s{i}.example/u").as_str()]));
        }

        let runner = ActionRunner::new(&http, &store);
        let reports = runner
            .run_selection(&mut reg, Selection::Range { start: 2, end: 3 }, |_| {})
            .unwrap();

        let done: Vec<_> = reports.iter().map(|r| r.sender.as_str()).collect();
        assert_eq!(done, vec!["s2", "s3"]);
        let left: Vec<_> = reg.entries().iter().map(|e| e.sender.as_str()).collect();
        assert_eq!(left, vec!["s1", "s4"]);
    }

    #[test]
    fn invalid_selection_touches_nothing() {
        let http = FakeHttp::with(&[]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest("a", "s", links(&["https://a.example/1"]));

        let runner = ActionRunner::new(&http, &store);
        assert!(runner.run_selection(&mut reg, Selection::Single(2), |_| {}).is_err());
        assert!(
            runner
                .run_selection(&mut reg, Selection::Range { start: 1, end: 0 }, |_| {})
                .is_err()
        );
        assert_eq!(reg.len(), 1);
        assert!(http.seen.borrow().is_empty());
    }

    #[test]
    fn cancel_flag_leaves_remaining_entries() {
        let http = FakeHttp::with(&[("https://a.example/1", 200)]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest("a", "s", links(&["https://a.example/1"]));
        reg.ingest("b", "t", links(&["https://b.example/1"]));

        let flag = Arc::new(AtomicBool::new(false));
        let runner = ActionRunner::new(&http, &store).with_cancel_flag(flag.clone());
        let reports = runner
            .run_selection(&mut reg, Selection::All, |_| flag.store(true, Ordering::SeqCst))
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.entries()[0].sender, "b");
    }

    struct CapturingLogger;

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> = std::sync::Mutex::new(Vec::new());
    static LOGGER: CapturingLogger = CapturingLogger;

    impl log::Log for CapturingLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            RECORDS
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    #[test]
    fn link_failures_stay_below_warn_level() {
        // the presenter already reports these outcomes to the user
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Trace);

        let http = FakeHttp::with(&[("https://quiet.example/404", 404)]);
        let store = MemoryArtifactStore::new();
        let mut reg = Registry::new();
        reg.ingest(
            "q@quiet.example",
            "Quiet",
            links(&["https://quiet.example/404", "https://quiet.example/down"]),
        );

        let report = ActionRunner::new(&http, &store).run(&reg.entries()[0]);
        assert_eq!(report.attempts[0].outcome, LinkOutcome::Status(404));
        assert!(matches!(report.attempts[1].outcome, LinkOutcome::Transport(_)));

        let records = RECORDS.lock().unwrap();
        let about_links: Vec<_> = records
            .iter()
            .filter(|(_, msg)| msg.contains("quiet.example/"))
            .collect();
        assert!(about_links.iter().any(|(level, _)| *level == log::Level::Debug));
        assert!(about_links.iter().all(|(level, _)| *level > log::Level::Warn));
    }
}
