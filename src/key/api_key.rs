// src/key/api_key.rs
// =============================================================================
// Key format rules.
//
// A key is 8 to 128 characters, ASCII letters and digits only. `ApiKey` can
// only be built through `validate`, so holding one means the format is right.
// =============================================================================

use crate::error::{IndexNowError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use std::str::FromStr;

pub const MIN_KEY_LENGTH: usize = 8;
pub const MAX_KEY_LENGTH: usize = 128;

/// Number of random bytes in a generated key (hex-encoded to 32 chars).
const GENERATED_KEY_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiKey(String);

impl ApiKey {
    /// Fresh key from the OS random source, lowercase hex.
    pub fn generate() -> Self {
        let mut bytes = [0u8; GENERATED_KEY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First and last four characters, for display in status output.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let head: String = chars.iter().take(4).collect();
        let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ApiKey {
    type Err = IndexNowError;

    fn from_str(s: &str) -> Result<Self> {
        validate(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ApiKey {
    type Error = IndexNowError;

    fn try_from(value: String) -> Result<Self> {
        validate(&value)?;
        Ok(Self(value))
    }
}

/// Checks the length bounds and the alphanumeric rule.
pub fn validate(key: &str) -> Result<()> {
    let length = key.chars().count();

    if length < MIN_KEY_LENGTH || length > MAX_KEY_LENGTH {
        return Err(IndexNowError::InvalidKey {
            reason: format!(
                "length {} is outside {}..={}",
                length, MIN_KEY_LENGTH, MAX_KEY_LENGTH
            ),
        });
    }

    if let Some(bad) = key.chars().find(|c| !c.is_ascii_alphanumeric()) {
        return Err(IndexNowError::InvalidKey {
            reason: format!("character {:?} is not alphanumeric", bad),
        });
    }

    Ok(())
}
