// src/guard/mod.rs
// =============================================================================
// Spam / rate-limit protection for outbound submissions.
//
// When a search engine answers with an abuse signal (429, 403, 418) the
// notifier stops submitting for a configured number of hours. The cool-down
// is persisted, so it survives restarts, and it is global: one window for
// every engine and every caller in the process.
// =============================================================================

mod block_state;
mod spam;

pub use block_state::BlockState;
pub use spam::{format_remaining, SpamGuard, DEFAULT_BLOCKING_HOURS, SPAM_STATUS_CODES};
