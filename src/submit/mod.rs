// src/submit/mod.rs
// =============================================================================
// URL submission to IndexNow endpoints.
//
// Submodules:
// - urls: the URL set (input shape, dedup, absolute-URL normalization)
// - transport: the outbound HTTP seam and its reqwest implementation
// - submitter: the orchestrator tying key, guard, engine and transport together
// =============================================================================

mod submitter;
mod transport;
mod urls;

pub use submitter::{
    SubmissionOutcome, SubmissionReport, SubmitterOptions, UrlSubmitter, BLOCKED_MESSAGE,
    DISABLED_MESSAGE, NO_URLS_MESSAGE,
};
pub use transport::{BatchPayload, ReqwestTransport, Transport, TransportError, TransportResponse};
pub use urls::{UrlInput, UrlSet, MAX_URLS_PER_SUBMISSION};
