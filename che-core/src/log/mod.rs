//! The incremental build log.
//!
//! [`ChangeLog`] keeps one [`Entry`] per known basename. Each run diffs the
//! fresh [`ScanResults`] against those entries, bumping or creating entries
//! and deciding whether the changed pages can be rebuilt alone or whether
//! the whole site has to be rebuilt. Nothing reaches disk until
//! [`ChangeLog::persist`], so an interrupted run leaves the previous log
//! intact and the next run computes the same diff again.

mod entry;
mod store;

pub use entry::Entry;
pub use store::LogStore;

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::hash::Digest;
use crate::scan::ScanResults;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Entry '{0}' is already in the log")]
    DuplicateEntry(String),

    #[error("Entry has no file name and cannot be logged")]
    NonLoggable,

    #[error("Entry '{0}' is not in the log")]
    EntryNotFound(String),

    #[error("Log {path:?} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Log {0:?} is locked by another build")]
    StoreBusy(PathBuf),

    #[error("Log {path:?} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which kinds of change invalidate every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildPolicy {
    /// A new page appears in shared views (navigation) on every page
    pub rebuild_on_new_entry: bool,

    /// Meta carries navigation, status and template fields used site-wide
    pub rebuild_on_meta_change: bool,
}

impl Default for RebuildPolicy {
    fn default() -> Self {
        Self {
            rebuild_on_new_entry: true,
            rebuild_on_meta_change: true,
        }
    }
}

/// Result of diffing one scan against the log
#[derive(Debug, Default)]
pub struct Diff {
    /// Pages that can be rebuilt on their own
    pub changed: ScanResults,

    /// Some change invalidated every page
    pub full_rebuild: bool,

    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,

    /// Incomplete pairs with nothing to compare
    pub skipped: Vec<String>,
}

impl Diff {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && !self.full_rebuild
    }
}

/// Persistent set of entries backed by a locked [`LogStore`]
#[derive(Debug)]
pub struct ChangeLog {
    store: LogStore,
    entries: Vec<Entry>,
    policy: RebuildPolicy,
}

impl ChangeLog {
    /// Lock and load the log at `path`
    pub fn open(path: impl Into<PathBuf>, policy: RebuildPolicy) -> Result<Self, LogError> {
        let store = LogStore::open(path)?;
        let entries = store.load()?;
        tracing::debug!("Loaded {} log entries from {:?}", entries.len(), store.path());
        Ok(Self {
            store,
            entries,
            policy,
        })
    }

    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the exact basename
    pub fn find(&self, basename: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.file == basename)
    }

    pub fn find_by_uid(&self, uid: Uuid) -> Option<&Entry> {
        self.entries.iter().find(|e| e.uid == uid)
    }

    /// Add a new entry
    pub fn insert(&mut self, entry: Entry) -> Result<&Entry, LogError> {
        if entry.file.is_empty() {
            return Err(LogError::NonLoggable);
        }
        if self.find(&entry.file).is_some() {
            return Err(LogError::DuplicateEntry(entry.file));
        }
        if self.find_by_uid(entry.uid).is_some() {
            return Err(LogError::DuplicateEntry(entry.file));
        }

        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Record a new version of an existing entry
    pub fn update(
        &mut self,
        basename: &str,
        hash_meta: Digest,
        hash_page: Digest,
    ) -> Result<&Entry, LogError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.file == basename)
            .ok_or_else(|| LogError::EntryNotFound(basename.to_string()))?;
        entry.bump(hash_meta, hash_page);
        Ok(entry)
    }

    /// Classify every scanned basename as new, unchanged or changed
    ///
    /// Entries are created or bumped in memory only. Incomplete pairs are
    /// skipped; log invariant violations are returned as errors.
    pub fn diff(&mut self, scan: &ScanResults) -> Result<Diff, LogError> {
        let mut diff = Diff::default();

        for (basename, result) in scan {
            let Some((hash_meta, hash_page)) = result.digests() else {
                tracing::warn!("Nothing to compare for incomplete pair '{}'", basename);
                diff.skipped.push(basename.clone());
                continue;
            };

            let Some(existing) = self.find(basename) else {
                tracing::info!("Added new file [meta] {}", basename);
                self.insert(Entry::new(basename.as_str(), hash_meta.clone(), hash_page.clone()))?;
                diff.added.push(basename.clone());

                if self.policy.rebuild_on_new_entry {
                    tracing::info!("Need to rebuild every page: new page '{}'", basename);
                    diff.full_rebuild = true;
                } else {
                    diff.changed.insert(basename.clone(), result.clone());
                }
                continue;
            };

            if existing.matches(hash_meta, hash_page) {
                tracing::info!("Skipping file due to no changes: {}", basename);
                diff.unchanged.push(basename.clone());
                continue;
            }

            let meta_changed = &existing.hash_meta != hash_meta;
            let entry = self.update(basename, hash_meta.clone(), hash_page.clone())?;
            tracing::info!("File needs to be rebuilt: {} (v{})", basename, entry.version);

            if meta_changed && self.policy.rebuild_on_meta_change {
                tracing::info!("Need to rebuild every page: meta of '{}' changed", basename);
                diff.full_rebuild = true;
            }
            diff.updated.push(basename.clone());
            diff.changed.insert(basename.clone(), result.clone());
        }

        Ok(diff)
    }

    /// Write the whole in-memory log to disk
    pub fn persist(&self) -> Result<(), LogError> {
        self.store.write(&self.entries)?;
        tracing::info!("Build log written: {} entries", self.entries.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{ScanFile, ScanResult};
    use tempfile::{tempdir, TempDir};

    fn pair(meta: &str, page: &str) -> ScanResult {
        ScanResult {
            meta: Some(ScanFile::new("json", meta.as_bytes().to_vec())),
            page: Some(ScanFile::new("md", page.as_bytes().to_vec())),
        }
    }

    fn scan(pairs: &[(&str, &str, &str)]) -> ScanResults {
        pairs
            .iter()
            .map(|(name, meta, page)| (name.to_string(), pair(meta, page)))
            .collect()
    }

    fn open(dir: &TempDir, policy: RebuildPolicy) -> ChangeLog {
        ChangeLog::open(dir.path().join("log.json"), policy).unwrap()
    }

    /// Seed a persisted log where `home` is at version 1
    fn seeded(dir: &TempDir) -> ChangeLog {
        let mut log = open(dir, RebuildPolicy::default());
        log.diff(&scan(&[("home", "{}", "# Hi")])).unwrap();
        log.persist().unwrap();
        log
    }

    #[test]
    fn test_new_entry_forces_rebuild_under_nav_policy() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());

        let diff = log
            .diff(&scan(&[("home", r#"{"title":"Home"}"#, "# Hi")]))
            .unwrap();

        assert!(diff.full_rebuild);
        assert!(diff.changed.is_empty());
        assert_eq!(diff.added, vec!["home".to_string()]);

        let entry = log.find("home").unwrap();
        assert_eq!(entry.version, 1);
        assert!(!entry.uid.is_nil());
        assert_eq!(entry.hash_meta, Digest::of(br#"{"title":"Home"}"#));
        assert_eq!(entry.hash_page, Digest::of(b"# Hi"));
    }

    #[test]
    fn test_new_entry_tracked_individually_without_nav() {
        let dir = tempdir().unwrap();
        let policy = RebuildPolicy {
            rebuild_on_new_entry: false,
            ..RebuildPolicy::default()
        };
        let mut log = open(&dir, policy);

        let diff = log.diff(&scan(&[("home", "{}", "# Hi")])).unwrap();
        assert!(!diff.full_rebuild);
        assert!(diff.changed.contains_key("home"));
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        let results = scan(&[("home", "{}", "# Hi"), ("about", "{}", "# About")]);

        log.diff(&results).unwrap();
        let second = log.diff(&results).unwrap();

        assert!(second.is_empty());
        assert_eq!(second.unchanged.len(), 2);
        assert_eq!(log.find("home").unwrap().version, 1);
        assert_eq!(log.find("about").unwrap().version, 1);
    }

    #[test]
    fn test_page_change_is_incremental() {
        let dir = tempdir().unwrap();
        let mut log = seeded(&dir);
        let before = log.find("home").unwrap().clone();

        let diff = log.diff(&scan(&[("home", "{}", "# Hello")])).unwrap();

        assert!(!diff.full_rebuild);
        assert_eq!(diff.changed.keys().collect::<Vec<_>>(), vec!["home"]);

        let after = log.find("home").unwrap();
        assert_eq!(after.version, 2);
        assert_eq!(after.uid, before.uid);
        assert_eq!(after.hash_meta, before.hash_meta);
        assert_eq!(after.hash_page, Digest::of(b"# Hello"));
    }

    #[test]
    fn test_meta_change_escalates() {
        for page in ["# Hi", "# Changed too"] {
            let dir = tempdir().unwrap();
            let mut log = seeded(&dir);

            let diff = log
                .diff(&scan(&[("home", r#"{"nav":false}"#, page)]))
                .unwrap();

            assert!(diff.full_rebuild);
            assert!(diff.changed.contains_key("home"));
            let entry = log.find("home").unwrap();
            assert_eq!(entry.version, 2);
            assert_eq!(entry.hash_meta, Digest::of(br#"{"nav":false}"#));
            assert_eq!(entry.hash_page, Digest::of(page.as_bytes()));
        }
    }

    #[test]
    fn test_meta_change_incremental_when_disabled() {
        let dir = tempdir().unwrap();
        drop(seeded(&dir));
        let policy = RebuildPolicy {
            rebuild_on_meta_change: false,
            ..RebuildPolicy::default()
        };
        let mut log = open(&dir, policy);

        let diff = log.diff(&scan(&[("home", r#"{"a":1}"#, "# Hi")])).unwrap();
        assert!(!diff.full_rebuild);
        assert!(diff.changed.contains_key("home"));
    }

    #[test]
    fn test_unchanged_pages_never_listed() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        log.diff(&scan(&[("a", "{}", "a"), ("b", "{}", "b")])).unwrap();

        let diff = log.diff(&scan(&[("a", "{}", "a2"), ("b", "{}", "b")])).unwrap();

        assert!(!diff.changed.contains_key("b"));
        assert_eq!(diff.unchanged, vec!["b".to_string()]);
        assert_eq!(log.find("b").unwrap().version, 1);
        assert_eq!(log.find("a").unwrap().version, 2);
    }

    #[test]
    fn test_rebuild_flag_is_or_of_all_pages() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        log.diff(&scan(&[("a", "{}", "a"), ("b", "{}", "b"), ("c", "{}", "c")]))
            .unwrap();

        // Only `b` touches meta; the others are page edits
        let diff = log
            .diff(&scan(&[("a", "{}", "a2"), ("b", "{\"x\":1}", "b"), ("c", "{}", "c2")]))
            .unwrap();

        assert!(diff.full_rebuild);
        assert_eq!(diff.changed.len(), 3);
    }

    #[test]
    fn test_diff_is_independent_per_basename() {
        let seed = [("a", "{}", "a"), ("b", "{}", "b"), ("c", "{}", "c")];
        let mut next = scan(&[
            ("a", "{}", "a"),
            ("b", "{}", "b2"),
            ("c", r#"{"x":1}"#, "c"),
            ("d", "{}", "d"),
        ]);
        next.insert(
            "e".into(),
            ScanResult {
                meta: Some(ScanFile::new("json", b"{}".to_vec())),
                page: None,
            },
        );
        let state = |log: &ChangeLog| {
            let mut t: Vec<_> = log
                .entries()
                .iter()
                .map(|e| (e.file.clone(), e.version, e.hash_meta.clone(), e.hash_page.clone()))
                .collect();
            t.sort();
            t
        };

        let whole_dir = tempdir().unwrap();
        let mut whole = open(&whole_dir, RebuildPolicy::default());
        whole.diff(&scan(&seed)).unwrap();
        let together = whole.diff(&next).unwrap();

        let single_dir = tempdir().unwrap();
        let mut single = open(&single_dir, RebuildPolicy::default());
        single.diff(&scan(&seed)).unwrap();
        let mut changed = Vec::new();
        let mut full_rebuild = false;
        for (name, result) in &next {
            let one: ScanResults = [(name.clone(), result.clone())].into_iter().collect();
            let diff = single.diff(&one).unwrap();
            changed.extend(diff.changed.into_keys());
            full_rebuild |= diff.full_rebuild;
        }

        assert_eq!(state(&whole), state(&single));
        assert_eq!(together.changed.into_keys().collect::<Vec<_>>(), changed);
        assert_eq!(together.full_rebuild, full_rebuild);
        assert!(full_rebuild);
    }

    #[test]
    fn test_incomplete_pairs_are_skipped() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());

        let mut results = scan(&[("home", "{}", "# Hi")]);
        results.insert(
            "orphan".into(),
            ScanResult {
                meta: None,
                page: Some(ScanFile::new("md", b"# Orphan".to_vec())),
            },
        );

        let diff = log.diff(&results).unwrap();
        assert_eq!(diff.skipped, vec!["orphan".to_string()]);
        assert!(log.find("orphan").is_none());
        assert!(log.find("home").is_some());
    }

    #[test]
    fn test_insert_rejects_duplicates_and_empty_names() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        let digest = Digest::of(b"");

        log.insert(Entry::new("home", digest.clone(), digest.clone())).unwrap();
        assert!(matches!(
            log.insert(Entry::new("home", digest.clone(), digest.clone())),
            Err(LogError::DuplicateEntry(name)) if name == "home"
        ));
        assert!(matches!(
            log.insert(Entry::new("", digest.clone(), digest)),
            Err(LogError::NonLoggable)
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_update_unknown_entry() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        assert!(matches!(
            log.update("ghost", Digest::of(b""), Digest::of(b"")),
            Err(LogError::EntryNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_find_is_exact() {
        let dir = tempdir().unwrap();
        let log = seeded(&dir);
        let uid = log.find("home").unwrap().uid;

        assert!(log.find("Home").is_none());
        assert!(log.find("hom").is_none());
        assert_eq!(log.find_by_uid(uid).unwrap().file, "home");
        assert!(log.find_by_uid(Uuid::nil()).is_none());
    }

    #[test]
    fn test_persist_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let mut log = open(&dir, RebuildPolicy::default());
        log.diff(&scan(&[("a", "{}", "a"), ("b", "{}", "b")])).unwrap();
        log.diff(&scan(&[("a", "{}", "a2")])).unwrap();
        log.persist().unwrap();

        let tuples = |log: &ChangeLog| {
            let mut t: Vec<_> = log
                .entries()
                .iter()
                .map(|e| {
                    (
                        e.file.clone(),
                        e.uid,
                        e.version,
                        e.hash_meta.clone(),
                        e.hash_page.clone(),
                        e.last_modified.timestamp(),
                    )
                })
                .collect();
            t.sort();
            t
        };
        let expected = tuples(&log);
        drop(log);

        let reloaded = open(&dir, RebuildPolicy::default());
        assert_eq!(tuples(&reloaded), expected);
    }

    #[test]
    fn test_unpersisted_diff_leaves_store_untouched() {
        let dir = tempdir().unwrap();
        let original = seeded(&dir).find("home").unwrap().clone();

        {
            let mut log = open(&dir, RebuildPolicy::default());
            let diff = log.diff(&scan(&[("home", "{}", "# Edited")])).unwrap();
            assert!(diff.changed.contains_key("home"));
            assert_eq!(log.find("home").unwrap().version, 2);
            // Dropped without persist, as if the run were interrupted
        }

        let log = open(&dir, RebuildPolicy::default());
        let entry = log.find("home").unwrap();
        assert_eq!(entry.version, 1);
        assert_eq!(entry.hash_page, original.hash_page);
        assert_eq!(entry.uid, original.uid);

        // The next run sees the same change again
        let mut log = log;
        let diff = log.diff(&scan(&[("home", "{}", "# Edited")])).unwrap();
        assert!(diff.changed.contains_key("home"));
    }

    #[test]
    fn test_open_while_locked() {
        let dir = tempdir().unwrap();
        let _held = open(&dir, RebuildPolicy::default());
        assert!(matches!(
            ChangeLog::open(dir.path().join("log.json"), RebuildPolicy::default()),
            Err(LogError::StoreBusy(_))
        ));
    }
}
