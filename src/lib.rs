// src/lib.rs
// =============================================================================
// indexnow-notifier: tell IndexNow search engines which URLs changed.
//
// Modules, leaf to root:
// - store: single-slot persistence (file or memory)
// - activity: the append-only activity log
// - key: the site-verification key, its storage and its publication
// - engine: search engine identifiers and their hosts
// - guard: the spam / rate-limit cool-down
// - submit: URL collection, HTTP transport and the submitter
// - config: defaults, JSON file and environment overrides
// =============================================================================

pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod key;
pub mod store;
pub mod submit;

pub use activity::ActivityLog;
pub use config::Config;
pub use error::{ErrorKind, IndexNowError, Result};
pub use guard::SpamGuard;
pub use key::{ApiKey, KeyStore};
pub use store::{FileSlot, MemorySlot, SlotStore};
pub use submit::{
    ReqwestTransport, SubmissionOutcome, SubmissionReport, SubmitterOptions, Transport,
    UrlInput, UrlSubmitter,
};
