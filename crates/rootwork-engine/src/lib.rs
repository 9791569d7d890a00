//! Rootwork Engine — bundle access, caller discovery and graph generation

pub mod storage;
pub mod search;
pub mod run;
pub mod imports;
pub mod callers;
pub mod global;
pub mod request;
pub mod generator;


#[cfg(test)]
pub mod test_utils;

pub use storage::{BundleStorage, BundleStore, FsBundle, FsBundleStore, RepoRef, bundle_uri};
pub use search::{ScanSearch, SearchBackend, SearchHit, SearchQuery, SearchScope};
pub use run::{GraphRun, RunPhase};
pub use callers::{CALL_CONFIDENCE, CallSitePattern, MAX_SEARCH_HITS, definition_range, hit_limit};
pub use imports::{RESOLVED_CONFIDENCE_CAP, RepoIndex, resolved_confidence};
pub use global::{global_graph, scan_bundle};
pub use request::GraphRequest;
pub use generator::GraphGenerator;
