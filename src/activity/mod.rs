// src/activity/mod.rs
// =============================================================================
// The activity log: an append-only trail of what the notifier did.
//
// Every submission result, every block event and every error raised by the
// core is written here, so an operator can reconstruct what happened with
// `indexnow logs`. Entries are mirrored to `tracing` as well.
// =============================================================================

mod log_file;

pub use log_file::{ActivityLog, MAX_LOG_FILE_SIZE};
