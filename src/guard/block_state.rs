// src/guard/block_state.rs
// The persisted record of an active cool-down.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BLOCK_REASON: &str = "Rate limit exceeded or potential spam detected";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockState {
    pub blocked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reason: String,
    pub duration_hours: u32,
}

impl BlockState {
    /// A block starting at `now`. Expiry is capped at the end of year 9999 so
    /// the record stays writable as ISO8601.
    pub fn new(now: DateTime<Utc>, duration_hours: u32) -> Self {
        let latest = latest_expiry();
        let expires_at = chrono::Duration::try_hours(i64::from(duration_hours))
            .and_then(|d| now.checked_add_signed(d))
            .map_or(latest, |t| t.min(latest));

        Self {
            blocked_at: now,
            expires_at,
            reason: BLOCK_REASON.to_string(),
            duration_hours,
        }
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left until expiry, zero once expired.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).to_std().unwrap_or(Duration::ZERO)
    }
}

fn latest_expiry() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(DateTime::<Utc>::MAX_UTC, |t| t.and_utc())
}
