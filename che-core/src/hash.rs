//! Content digests used for change detection.
//!
//! Digests are taken over raw file bytes before any format parsing, so the
//! declared encoding of a file never influences its digest. They detect
//! edits, they do not authenticate content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hex-encoded fingerprint of a byte string
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Digest of raw bytes
    pub fn of(bytes: &[u8]) -> Self {
        Digest(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash raw bytes into a [`Digest`]
pub fn hash(bytes: &[u8]) -> Digest {
    Digest::of(bytes)
}
