//! One persisted record per content basename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Digest;

/// Last logged build state of one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Basename, unique across the log
    pub file: String,

    /// Assigned once on creation, never reused
    pub uid: Uuid,

    /// Starts at 1, incremented on every detected change
    pub version: u32,

    /// Time of the last version bump
    pub last_modified: DateTime<Utc>,

    pub hash_meta: Digest,

    pub hash_page: Digest,
}

impl Entry {
    /// A first-version entry with a fresh uid
    pub fn new(file: impl Into<String>, hash_meta: Digest, hash_page: Digest) -> Self {
        Self {
            file: file.into(),
            uid: Uuid::new_v4(),
            version: 1,
            last_modified: Utc::now(),
            hash_meta,
            hash_page,
        }
    }

    /// Whether the stored digests equal the given ones
    pub fn matches(&self, hash_meta: &Digest, hash_page: &Digest) -> bool {
        &self.hash_meta == hash_meta && &self.hash_page == hash_page
    }

    /// Record a new version with the given digests
    pub(crate) fn bump(&mut self, hash_meta: Digest, hash_page: Digest) {
        self.version += 1;
        self.last_modified = Utc::now();
        self.hash_meta = hash_meta;
        self.hash_page = hash_page;
    }
}
