//! On-disk storage for the build log.
//!
//! The store is a single JSON array of [`Entry`] records. It is read whole
//! and written whole: writes go to a temporary file in the same directory
//! which then replaces the store, so a reader never sees a partial file.
//! A sibling `.lock` file is held exclusively for the store's lifetime.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::{Entry, LogError};

/// Exclusive handle on a log store file
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    // Released when dropped
    _lock: File,
}

impl LogStore {
    /// Lock the store at `path`, creating its directory if needed
    ///
    /// Fails with [`LogError::StoreBusy`] if another handle holds the lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let lock_path = lock_path(&path);
        let lock = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        match lock.try_lock_exclusive() {
            Ok(()) => {}
            Err(err)
                if err.kind() == ErrorKind::WouldBlock
                    || err.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
            {
                return Err(LogError::StoreBusy(path));
            }
            Err(err) => return Err(LogError::Io(err)),
        }

        tracing::debug!("Locked build log {:?}", path);
        Ok(Self { path, _lock: lock })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry; a missing or blank store holds no entries
    pub fn load(&self) -> Result<Vec<Entry>, LogError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(LogError::Io(err)),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&data).map_err(|source| LogError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the store with exactly `entries`
    pub fn write(&self, entries: &[Entry]) -> Result<(), LogError> {
        let not_writable = |source: std::io::Error| LogError::NotWritable {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(not_writable)?;

        // The replacement keeps the mode of the store it replaces
        match fs::metadata(&self.path) {
            Ok(existing) => tmp
                .as_file()
                .set_permissions(existing.permissions())
                .map_err(not_writable)?,
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(not_writable(err)),
        }

        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, entries)
                .map_err(|e| not_writable(e.into()))?;
            writer.flush().map_err(not_writable)?;
        }
        tmp.as_file().sync_all().map_err(not_writable)?;

        tmp.persist(&self.path).map_err(|e| not_writable(e.error))?;

        tracing::debug!("Wrote {} entries to {:?}", entries.len(), self.path);
        Ok(())
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}
