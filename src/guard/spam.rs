// src/guard/spam.rs
// =============================================================================
// The spam guard: a two-state machine, Allowed / Blocked.
//
//   Allowed --(inspect sees 429/403/418)--> Blocked
//   Blocked --(now >= expires_at, or reset_blocking)--> Allowed
//
// The state is whatever the block slot says. Any failure to read or parse it
// counts as Allowed: the notifier keeps working even if the guard's file is
// damaged. Failures are logged, never returned.
//
// Every public check has an `_at(now)` twin so tests can pin the clock.
// =============================================================================

use super::block_state::BlockState;
use crate::activity::ActivityLog;
use crate::store::SlotStore;
use crate::submit::TransportResponse;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Status codes that arm the cool-down.
pub const SPAM_STATUS_CODES: [u16; 3] = [
    429, // Too Many Requests
    403, // Forbidden, often used for rate limiting
    418, // I'm a teapot, used by some services for bot detection
];

pub const DEFAULT_BLOCKING_HOURS: u32 = 24;

pub struct SpamGuard {
    slot: Box<dyn SlotStore>,
    log: ActivityLog,
    enabled: bool,
    blocking_hours: u32,
}

impl SpamGuard {
    pub fn new(slot: Box<dyn SlotStore>, log: ActivityLog) -> Self {
        Self {
            slot,
            log,
            enabled: true,
            blocking_hours: DEFAULT_BLOCKING_HOURS,
        }
    }

    /// `enable_spam_detection`; when false every check passes.
    pub fn with_detection(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// `spam_blocking_hours`; length of a new cool-down.
    pub fn with_blocking_hours(mut self, hours: u32) -> Self {
        self.blocking_hours = hours;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn blocking_hours(&self) -> u32 {
        self.blocking_hours
    }

    pub fn is_allowed(&self) -> bool {
        self.is_allowed_at(Utc::now())
    }

    pub fn is_allowed_at(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return true;
        }

        let state = match self.load() {
            Ok(state) => state,
            Err(e) => {
                self.log
                    .record(&format!("Error checking spam blocking status: {}", e));
                None
            }
        };

        match state {
            Some(state) if state.is_active_at(now) => {
                let remaining = format_remaining(state.remaining_at(now));
                debug!(%remaining, "Submission blocked by spam guard");
                self.log.record(&format!(
                    "Request blocked: Temporary submission limit reached. Will resume in {}",
                    remaining
                ));
                false
            }
            _ => {
                // Expired, unreadable or absent: drop whatever is left behind
                self.delete_block("Spam protection: Blocking file cleared - submissions resumed");
                true
            }
        }
    }

    /// Looks at a finished submission; arms the cool-down on an abuse signal.
    /// Returns whether a block was armed.
    pub fn inspect(&self, response: &TransportResponse, url: Option<&str>) -> bool {
        self.inspect_at(response, url, Utc::now())
    }

    pub fn inspect_at(
        &self,
        response: &TransportResponse,
        url: Option<&str>,
        now: DateTime<Utc>,
    ) -> bool {
        if !SPAM_STATUS_CODES.contains(&response.status) {
            return false;
        }

        let state = BlockState::new(now, self.blocking_hours);

        warn!(
            status = response.status,
            expires_at = %state.expires_at,
            "Abuse signal from search engine, pausing submissions"
        );
        self.log.record(&json!({
            "type": "spam_protection",
            "status": "blocked",
            "reason": format!("Received status code {}", response.status),
            "url": url,
            "blocked_until": state.expires_at,
            "retry_after": response.retry_after,
        }));

        let saved = serde_json::to_string_pretty(&state)
            .map_err(|e| e.to_string())
            .and_then(|body| self.slot.write(&body).map_err(|e| e.to_string()));
        if let Err(e) = saved {
            self.log
                .record(&format!("Error saving spam blocking data: {}", e));
        }

        true
    }

    pub fn remaining_block_time(&self) -> Duration {
        self.remaining_block_time_at(Utc::now())
    }

    pub fn remaining_block_time_at(&self, now: DateTime<Utc>) -> Duration {
        match self.load() {
            Ok(Some(state)) => state.remaining_at(now),
            Ok(None) => Duration::ZERO,
            Err(e) => {
                self.log
                    .record(&format!("Error reading spam blocking data: {}", e));
                Duration::ZERO
            }
        }
    }

    /// The persisted block, if one is present and readable.
    pub fn block_state(&self) -> Option<BlockState> {
        self.load().ok().flatten()
    }

    /// Lifts any block. Idempotent; false only if the slot could not be cleared.
    pub fn reset_blocking(&self) -> bool {
        self.delete_block("Spam protection block manually reset")
    }

    fn load(&self) -> Result<Option<BlockState>, String> {
        let Some(raw) = self.slot.read().map_err(|e| e.to_string())? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| format!("{} ({})", e, self.slot.describe()))
    }

    fn delete_block(&self, message: &str) -> bool {
        match self.slot.delete() {
            Ok(removed) => {
                if removed {
                    info!("{}", message);
                    self.log.record(message);
                }
                true
            }
            Err(e) => {
                self.log
                    .record(&format!("Error clearing spam blocking data: {}", e));
                false
            }
        }
    }
}

/// Seconds below a minute, whole minutes below an hour, else hours to one decimal.
pub fn format_remaining(remaining: Duration) -> String {
    let seconds = remaining.as_secs();

    if seconds < 60 {
        return format!("{} seconds", seconds);
    }

    if seconds < 3600 {
        return format!("{} minutes", (seconds as f64 / 60.0).round() as u64);
    }

    let hours = (seconds as f64 / 3600.0 * 10.0).round() / 10.0;
    if hours.fract() == 0.0 {
        format!("{} hours", hours as u64)
    } else {
        format!("{:.1} hours", hours)
    }
}
