// src/error.rs
// =============================================================================
// Error types for the notifier core.
//
// Every failure the library can report lives in one enum. Callers that need
// to react differently per failure (the CLI prints remediation hints) match
// on `kind()` instead of parsing messages.
// =============================================================================

use std::io;
use thiserror::Error;

/// Errors raised by the key store, the submitter and the stores.
#[derive(Debug, Error)]
pub enum IndexNowError {
    /// Key is too short, too long or contains non-alphanumeric characters
    #[error("Your IndexNow key is invalid: {reason}")]
    InvalidKey { reason: String },

    /// No persisted or configured key and no generation path was taken
    #[error("The IndexNow key does not exist. Generate one with `indexnow generate-key`")]
    KeyFileMissing,

    /// Identifier not present in the search engine table
    #[error("Unknown search engine for IndexNow: {0}")]
    SearchEngineUnknown(String),

    /// More URLs than a single submission accepts
    #[error("You have exceeded the maximum allowed number of URLs to send to IndexNow ({count} > {max})")]
    ExcessUrls { count: usize, max: usize },

    /// URL could not be resolved to an absolute form
    #[error("Relative URL detected: {0}. URLs submitted to IndexNow must be absolute")]
    NonAbsoluteUrl(String),

    /// Transport or remote failure during dispatch
    #[error("IndexNow request failed: {message}")]
    Mixed { message: String, code: Option<u16> },

    /// Reading or writing a persisted slot failed
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Discriminant of `IndexNowError`, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidKey,
    KeyFileMissing,
    SearchEngineUnknown,
    ExcessUrls,
    NonAbsoluteUrl,
    Mixed,
    Storage,
    HttpClient,
}

impl IndexNowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey { .. } => ErrorKind::InvalidKey,
            Self::KeyFileMissing => ErrorKind::KeyFileMissing,
            Self::SearchEngineUnknown(_) => ErrorKind::SearchEngineUnknown,
            Self::ExcessUrls { .. } => ErrorKind::ExcessUrls,
            Self::NonAbsoluteUrl(_) => ErrorKind::NonAbsoluteUrl,
            Self::Mixed { .. } => ErrorKind::Mixed,
            Self::Storage { .. } => ErrorKind::Storage,
            Self::HttpClient(_) => ErrorKind::HttpClient,
        }
    }

    pub(crate) fn storage(context: impl Into<String>, source: io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, IndexNowError>;
