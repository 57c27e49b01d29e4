// src/key/store.rs
// =============================================================================
// Key generation, persistence and retrieval.
//
// Two ways to get the key, kept deliberately separate:
// - get_or_create: read the persisted key; if it is missing or malformed,
//   generate a new one and persist it. Never fails on format problems.
// - get_from_config: validate the key supplied through configuration and
//   report the problem instead of papering over it.
//
// current() picks the strict path that applies and never writes; status
// reporting uses it.
// =============================================================================

use super::api_key::{validate, ApiKey};
use crate::activity::ActivityLog;
use crate::error::{IndexNowError, Result};
use crate::store::SlotStore;
use tracing::info;

pub struct KeyStore {
    slot: Box<dyn SlotStore>,
    configured: Option<String>,
    log: ActivityLog,
}

impl KeyStore {
    pub fn new(slot: Box<dyn SlotStore>, log: ActivityLog) -> Self {
        Self {
            slot,
            configured: None,
            log,
        }
    }

    /// Key supplied through configuration (`api_key` / `INDEXNOW_API_KEY`).
    pub fn with_configured_key(mut self, key: Option<String>) -> Self {
        self.configured = key.filter(|k| !k.is_empty());
        self
    }

    pub fn has_configured_key(&self) -> bool {
        self.configured.is_some()
    }

    /// Checks a key from any source, logging the rejection.
    pub fn validate(&self, key: &str) -> Result<()> {
        validate(key).map_err(|e| self.log.record_error(e))
    }

    /// Generates a new key and persists it, replacing the previous one.
    pub fn generate(&self) -> Result<ApiKey> {
        let key = ApiKey::generate();

        self.slot.write(key.as_str()).map_err(|e| {
            self.log
                .record_error(IndexNowError::storage("Failed to persist IndexNow key", e))
        })?;

        info!(location = %self.slot.describe(), "Generated new IndexNow key");
        self.log.record("New IndexNow key generated");
        Ok(key)
    }

    /// Strict read of the persisted key.
    pub fn read(&self) -> Result<ApiKey> {
        let stored = self
            .slot
            .read()
            .map_err(|e| IndexNowError::storage("Failed to read IndexNow key", e))?
            .ok_or(IndexNowError::KeyFileMissing)?;

        // Editors like to add a final newline; it is not part of the key.
        let key = stored.trim_end_matches(['\r', '\n']).to_string();
        ApiKey::try_from(key)
    }

    /// Persisted key, regenerated if it is missing or malformed.
    pub fn get_or_create(&self) -> Result<ApiKey> {
        match self.read() {
            Ok(key) => Ok(key),
            Err(e) => {
                self.log.record(&format!(
                    "{}. A new IndexNow key will be generated",
                    e
                ));
                self.generate()
            }
        }
    }

    /// Configured key if there is one, else the persisted key. Never writes.
    pub fn current(&self) -> Result<ApiKey> {
        if self.has_configured_key() {
            self.get_from_config()
        } else {
            self.read()
        }
    }

    /// Configured key, validated. Does not fall back to generation.
    pub fn get_from_config(&self) -> Result<ApiKey> {
        let Some(key) = &self.configured else {
            return Err(self.log.record_error(IndexNowError::KeyFileMissing));
        };

        self.validate(key)?;
        ApiKey::try_from(key.clone())
    }
}
