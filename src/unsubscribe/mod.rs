pub mod extract;
pub mod registry;
pub mod runner;
pub mod scan;

pub use registry::{Registry, Selection, SelectionError};
pub use runner::{ActionRunner, HttpFetcher, ReqwestFetcher, RunReport};
pub use scan::{ScanReport, ScanRequest, scan_mailbox};
