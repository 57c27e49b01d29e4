// src/config.rs
// =============================================================================
// Runtime configuration.
//
// Sources, later ones win:
// 1. Built-in defaults
// 2. An optional JSON file (`--config path.json`)
// 3. Environment variables (INDEXNOW_*, APP_URL)
// 4. CLI flags, applied by the binary
//
// An environment value that does not parse is ignored with a warning.
// =============================================================================

use crate::engine::DEFAULT_SEARCH_ENGINE;
use crate::error::{IndexNowError, Result};
use crate::guard::DEFAULT_BLOCKING_HOURS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const KEY_FILE_NAME: &str = "indexnow_api_key.txt";
pub const BLOCK_FILE_NAME: &str = "spam_blocking.json";
pub const LOG_FILE_NAME: &str = "indexnow.log";

/// All recognized options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Search engine identifier (default: microsoft_bing)
    #[serde(default = "default_search_engine")]
    pub search_engine: String,

    /// Send requests at all (default: true)
    #[serde(default = "default_true")]
    pub enable_submissions: bool,

    /// Write the activity log (default: true)
    #[serde(default = "default_true")]
    pub enable_logging: bool,

    /// Arm a cool-down on 429/403/418 (default: true)
    #[serde(default = "default_true")]
    pub enable_spam_detection: bool,

    /// Length of a cool-down in hours (default: 24)
    #[serde(default = "default_blocking_hours")]
    pub spam_blocking_hours: u32,

    /// Key to use instead of the persisted one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Application base URL
    #[serde(default)]
    pub app_url: Option<String>,

    /// Directory holding the key, block and log files (default: storage/indexnow)
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Outbound request timeout in seconds (default: 15)
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_search_engine() -> String {
    DEFAULT_SEARCH_ENGINE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_blocking_hours() -> u32 {
    DEFAULT_BLOCKING_HOURS
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage/indexnow")
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_engine: default_search_engine(),
            enable_submissions: true,
            enable_logging: true,
            enable_spam_detection: true,
            spam_blocking_hours: default_blocking_hours(),
            api_key: None,
            app_url: None,
            storage_dir: default_storage_dir(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            IndexNowError::storage(format!("Failed to read config {}", path.display()), e)
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            IndexNowError::storage(
                format!("Failed to parse config {}", path.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Applies overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("INDEXNOW_SEARCH_ENGINE") {
            self.search_engine = v;
        }
        if let Some(v) = parse_var(&lookup, "INDEXNOW_ENABLE_SUBMISSIONS", parse_bool) {
            self.enable_submissions = v;
        }
        if let Some(v) = parse_var(&lookup, "INDEXNOW_ENABLE_LOGGING", parse_bool) {
            self.enable_logging = v;
        }
        if let Some(v) = parse_var(&lookup, "INDEXNOW_ENABLE_SPAM_DETECTION", parse_bool) {
            self.enable_spam_detection = v;
        }
        if let Some(v) = parse_var(&lookup, "INDEXNOW_SPAM_BLOCKING_HOURS", parse_number) {
            self.spam_blocking_hours = v;
        }
        if let Some(v) = lookup("INDEXNOW_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("APP_URL").filter(|v| !v.is_empty()) {
            self.app_url = Some(v);
        }
        if let Some(v) = lookup("INDEXNOW_STORAGE_DIR").filter(|v| !v.is_empty()) {
            self.storage_dir = PathBuf::from(v);
        }
        if let Some(v) = parse_var(&lookup, "INDEXNOW_TIMEOUT_SECS", parse_number) {
            self.request_timeout_secs = v;
        }
        self
    }

    pub fn key_path(&self) -> PathBuf {
        self.storage_dir.join(KEY_FILE_NAME)
    }

    pub fn block_path(&self) -> PathBuf {
        self.storage_dir.join(BLOCK_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.storage_dir.join(LOG_FILE_NAME)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(name)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(variable = name, value = %raw, "Ignoring unparseable environment value");
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_number<T: FromStr>(value: &str) -> Option<T> {
    value.parse().ok()
}
