// src/submit/urls.rs
// =============================================================================
// The set of URLs waiting to be submitted.
//
// Storage keeps every URL that was added, duplicates included; reads
// deduplicate while keeping first-seen order. The 10,000 ceiling applies to
// the raw count, so padding a batch with duplicates does not get around it.
//
// Relative URLs are made absolute against the application's base URL:
//   base = "https://example.com/", url = "/page" -> "https://example.com/page"
// =============================================================================

use crate::error::{IndexNowError, Result};
use std::collections::HashSet;
use url::Url;

/// Largest number of URLs accepted in one submission.
pub const MAX_URLS_PER_SUBMISSION: usize = 10_000;

/// One URL or many, as a caller hands them over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInput {
    Single(String),
    Many(Vec<String>),
}

impl UrlInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            UrlInput::Single(url) => vec![url],
            UrlInput::Many(urls) => urls,
        }
    }
}

impl From<String> for UrlInput {
    fn from(url: String) -> Self {
        UrlInput::Single(url)
    }
}

impl From<&str> for UrlInput {
    fn from(url: &str) -> Self {
        UrlInput::Single(url.to_string())
    }
}

impl From<Vec<String>> for UrlInput {
    fn from(urls: Vec<String>) -> Self {
        UrlInput::Many(urls)
    }
}

impl From<Vec<&str>> for UrlInput {
    fn from(urls: Vec<&str>) -> Self {
        UrlInput::Many(urls.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UrlSet {
    urls: Vec<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, url: impl Into<String>) {
        self.urls.push(url.into());
    }

    pub fn extend(&mut self, input: impl Into<UrlInput>) {
        self.urls.extend(input.into().into_vec());
    }

    /// Count including duplicates.
    pub fn raw_len(&self) -> usize {
        self.urls.len()
    }

    /// Unique URLs in first-seen order.
    pub fn unique(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.urls
            .iter()
            .filter(|url| seen.insert(*url))
            .cloned()
            .collect()
    }

    pub fn check_limit(&self) -> Result<()> {
        if self.urls.len() > MAX_URLS_PER_SUBMISSION {
            return Err(IndexNowError::ExcessUrls {
                count: self.urls.len(),
                max: MAX_URLS_PER_SUBMISSION,
            });
        }
        Ok(())
    }

    /// Rewrites every entry to its absolute form. On the first URL that cannot
    /// be made absolute the whole set is left untouched and an error returned.
    pub fn normalize(&mut self, base_url: Option<&str>) -> Result<()> {
        let normalized = self
            .urls
            .iter()
            .map(|url| make_absolute(url, base_url))
            .collect::<Result<Vec<_>>>()?;

        self.urls = normalized;
        Ok(())
    }
}

/// `url` unchanged if it already has a scheme and host, otherwise joined to
/// `base_url`.
pub(crate) fn make_absolute(url: &str, base_url: Option<&str>) -> Result<String> {
    let url = url.trim();

    if has_host(url) {
        return Ok(url.to_string());
    }

    let base = base_url
        .map(|b| b.trim().trim_end_matches('/'))
        .filter(|b| !b.is_empty());

    if let Some(base) = base {
        let joined = format!("{}/{}", base, url.trim_start_matches('/'));
        if has_host(&joined) {
            return Ok(joined);
        }
    }

    Err(IndexNowError::NonAbsoluteUrl(url.to_string()))
}

/// Host component of an absolute URL.
pub(crate) fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .filter(|h| !h.is_empty())
}

fn has_host(url: &str) -> bool {
    host_of(url).is_some()
}
