use inbox_unsubscriber::Result;
use inbox_unsubscriber::mail::MailSource;
use inbox_unsubscriber::mail::source::FetchOrder;
use inbox_unsubscriber::store::memory::MemoryArtifactStore;
use inbox_unsubscriber::unsubscribe::runner::{HttpFetcher, HttpResponse, LinkOutcome};
use inbox_unsubscriber::unsubscribe::{ActionRunner, ScanRequest, Selection, scan_mailbox};

struct InMemoryInbox {
    messages: Vec<Vec<u8>>,
}

impl MailSource for InMemoryInbox {
    fn open_inbox(&mut self) -> Result<u32> {
        Ok(self.messages.len() as u32)
    }

    fn fetch_raw(&mut self, index: u32) -> Result<Vec<u8>> {
        Ok(self.messages[index as usize - 1].clone())
    }
}

struct StatusByPath;

impl HttpFetcher for StatusByPath {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let status = if url.ends_with("/u1") { 404 } else { 200 };
        Ok(HttpResponse {
            status,
            body: format!("<html>{url}</html>").into_bytes(),
        })
    }
}

const MSG1: &str = "From: Alpha News <news@a.example>\r\n\
Subject: Alpha weekly\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/alternative; boundary=\"sep\"\r\n\
\r\n\
--sep\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
click here to unsubscribe https://a.example/u1\r\n\
--sep\r\n\
Content-Type: text/html; charset=utf-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
<html><body><p>Hello</p><a href=3D\"https://a.example/u2\">Unsubscribe</a></body></html>\r\n\
--sep--\r\n";

const MSG2: &str = "From: Friend <friend@c.example>\r\n\
Subject: Dinner\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<html><body><p>See you at <a href=\"https://c.example/map\">the place</a></p></body></html>\r\n";

const MSG3: &str = "From: Beta Deals <deals@b.example>\r\n\
Subject: Last chance\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
opt-out: https://b.example/o1\r\n";

fn inbox() -> InMemoryInbox {
    InMemoryInbox {
        messages: vec![MSG1.into(), MSG2.into(), MSG3.into()],
    }
}

fn scan_oldest_first() -> inbox_unsubscriber::unsubscribe::ScanReport {
    let request = ScanRequest {
        count: None,
        order: FetchOrder::Asc,
    };
    scan_mailbox(&mut inbox(), request, None, |_| {}).unwrap()
}

#[test]
fn three_message_inbox_yields_two_entries() {
    let report = scan_oldest_first();
    let entries = report.registry.entries();

    assert_eq!(report.scanned, 3);
    assert!(report.warnings.is_empty());
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].sender, "Alpha News <news@a.example>");
    assert_eq!(entries[0].subject, "Alpha weekly");
    assert_eq!(
        entries[0].links.as_strs(),
        vec!["https://a.example/u1", "https://a.example/u2"]
    );

    assert_eq!(entries[1].sender, "Beta Deals <deals@b.example>");
    assert_eq!(entries[1].links.as_strs(), vec!["https://b.example/o1"]);
}

#[test]
fn newest_first_reverses_entry_order() {
    let report = scan_mailbox(&mut inbox(), ScanRequest::default(), None, |_| {}).unwrap();
    let senders: Vec<_> = report
        .registry
        .entries()
        .iter()
        .map(|e| e.sender.as_str())
        .collect();
    assert_eq!(
        senders,
        vec!["Beta Deals <deals@b.example>", "Alpha News <news@a.example>"]
    );
}

#[test]
fn unsubscribing_everything_drains_registry_and_stores_successes() {
    let mut report = scan_oldest_first();
    let store = MemoryArtifactStore::new();
    let runner = ActionRunner::new(&StatusByPath, &store);

    let reports = runner
        .run_selection(&mut report.registry, Selection::All, |_| {})
        .unwrap();

    assert!(report.registry.is_empty());
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].attempts[0].outcome, LinkOutcome::Status(404));
    assert_eq!(
        store.keys(),
        vec![
            "Alpha News <news@a.example>/Alpha weekly1",
            "Beta Deals <deals@b.example>/Last chance0"
        ]
    );
    assert_eq!(
        store.get("Beta Deals <deals@b.example>/Last chance0").unwrap(),
        b"<html>https://b.example/o1</html>"
    );
}

#[test]
fn second_entry_can_be_picked_alone() {
    let mut report = scan_oldest_first();
    let store = MemoryArtifactStore::new();
    let runner = ActionRunner::new(&StatusByPath, &store);

    runner
        .run_selection(&mut report.registry, Selection::Single(2), |_| {})
        .unwrap();

    assert_eq!(report.registry.len(), 1);
    assert_eq!(report.registry.entries()[0].subject, "Alpha weekly");
    assert!(
        runner
            .run_selection(&mut report.registry, Selection::Single(2), |_| {})
            .is_err()
    );
    assert_eq!(report.registry.len(), 1);
}
