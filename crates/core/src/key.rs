//! Validated asset keys.
//!
//! Keys are globally unique strings, conventionally `<TYPE>_<identifier>`
//! (e.g. `ITEM001`, `QUALITY_BATCH1_a3f29c`). The leading tag before the
//! first underscore drives prefix/type queries.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted key length in bytes
pub const MAX_KEY_LEN: usize = 256;

/// A validated world-state key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    /// Creates a key, rejecting empty, oversized, or control-character input.
    ///
    /// Control characters (including NUL) are rejected because the storage
    /// layer composes keys with a NUL separator.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(LedgerError::Validation("asset key must not be empty".into()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(LedgerError::Validation(format!(
                "asset key exceeds {} bytes: {}",
                MAX_KEY_LEN,
                key.len()
            )));
        }
        if key.chars().any(|c| c.is_control()) {
            return Err(LedgerError::Validation(format!(
                "asset key contains control characters: {:?}",
                key
            )));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Gets the leading type tag, if the key carries one (`QUALITY_X` → `QUALITY`)
    pub fn type_tag(&self) -> Option<&str> {
        self.0.split_once('_').map(|(tag, _)| tag).filter(|t| !t.is_empty())
    }

    /// Whether this key belongs to the given type prefix (`^tag_.*`)
    pub fn has_type(&self, tag: &str) -> bool {
        self.0.len() > tag.len() + 1
            && self.0.as_bytes()[tag.len()] == b'_'
            && self.0.starts_with(tag)
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AssetKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<AssetKey> for String {
    fn from(key: AssetKey) -> Self {
        key.0
    }
}
