// src/key/verification.rs
// =============================================================================
// Exposing the key so a search engine can verify ownership of the site.
//
// A search engine that receives a submission fetches `https://<site>/<key>.txt`
// and expects the response body to be exactly the key. This module provides
// the pieces a host application needs to serve that file: the route path, the
// content type, a helper to drop a static file into a web root, and a check
// that the published URL actually answers with the key.
// =============================================================================

use super::ApiKey;
use crate::error::{IndexNowError, Result};
use crate::submit::Transport;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Content type the key file should be served with.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Route at which the key is served, relative to the site root.
pub fn route_path(key: &ApiKey) -> String {
    format!("/{}.txt", key.as_str())
}

/// Public URL of the key file under `app_url`.
pub fn key_url(app_url: &str, key: &ApiKey) -> String {
    format!("{}{}", app_url.trim_end_matches('/'), route_path(key))
}

/// Writes `<dir>/<key>.txt` containing the key and returns its path.
pub fn write_key_file(dir: &Path, key: &ApiKey) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| {
        IndexNowError::storage(format!("Failed to create {}", dir.display()), e)
    })?;

    let path = dir.join(format!("{}.txt", key.as_str()));
    fs::write(&path, key.as_str()).map_err(|e| {
        IndexNowError::storage(format!("Failed to write {}", path.display()), e)
    })?;

    debug!(path = %path.display(), "Wrote IndexNow key file");
    Ok(path)
}

/// Result of fetching a published key URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyUrlCheck {
    /// The URL answered with the key
    Reachable,
    /// The URL answered, but with something else
    Mismatch,
    /// No usable answer; carries the reason
    Unreachable(String),
}

impl KeyUrlCheck {
    pub fn is_reachable(&self) -> bool {
        matches!(self, KeyUrlCheck::Reachable)
    }
}

/// Fetches `url` and compares the body with `key`.
pub async fn check_key_url(transport: &dyn Transport, url: &str, key: &ApiKey) -> KeyUrlCheck {
    match transport.fetch_text(url).await {
        Ok(body) if body.trim() == key.as_str() => KeyUrlCheck::Reachable,
        Ok(_) => KeyUrlCheck::Mismatch,
        Err(e) => KeyUrlCheck::Unreachable(e.message),
    }
}
