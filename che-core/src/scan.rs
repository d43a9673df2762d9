//! Content directory scanning.
//!
//! Walks a flat directory, pairs `<basename>.<meta-ext>` with
//! `<basename>.<page-ext>`, digests the raw bytes of each side and parses
//! them through the [`FormatRegistry`]. Problems with one basename never
//! abort the scan; they are collected and reflected in the integrity flag.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::FilesConfig;
use crate::format::{FormatRegistry, Loaded};
use crate::hash::Digest;
use crate::hooks::{HookChain, HookPoint};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which half of a content pair a file provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Meta,
    Page,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Meta => "meta",
            Side::Page => "page",
        }
    }
}

/// One file of a content pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFile {
    pub ext: String,
    #[serde(skip)]
    pub raw: Vec<u8>,
    pub hash: Digest,
    pub parsed: Option<Loaded>,
}

impl ScanFile {
    pub fn new(ext: impl Into<String>, raw: Vec<u8>) -> Self {
        let hash = Digest::of(&raw);
        Self {
            ext: ext.into(),
            raw,
            hash,
            parsed: None,
        }
    }
}

/// Everything found for one basename on this run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanResult {
    pub meta: Option<ScanFile>,
    pub page: Option<ScanFile>,
}

impl ScanResult {
    /// Both the meta and the page side were found
    pub fn is_complete(&self) -> bool {
        self.meta.is_some() && self.page.is_some()
    }

    pub fn side(&self, side: Side) -> Option<&ScanFile> {
        match side {
            Side::Meta => self.meta.as_ref(),
            Side::Page => self.page.as_ref(),
        }
    }

    fn slot(&mut self, side: Side) -> &mut Option<ScanFile> {
        match side {
            Side::Meta => &mut self.meta,
            Side::Page => &mut self.page,
        }
    }

    /// Parsed meta value, if the meta side was found and parsed
    pub fn meta_value(&self) -> Option<&serde_json::Value> {
        self.meta.as_ref()?.parsed.as_ref()?.as_meta()
    }

    /// Digests of both sides, only for complete pairs
    pub fn digests(&self) -> Option<(&Digest, &Digest)> {
        Some((&self.meta.as_ref()?.hash, &self.page.as_ref()?.hash))
    }
}

pub type ScanResults = BTreeMap<String, ScanResult>;

/// A basename that had to be dropped from this run
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub basename: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of scanning one directory
#[derive(Debug, Default)]
pub struct ScanReport {
    pub results: ScanResults,
    /// Basenames where only one side exists
    pub incomplete: Vec<String>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// True only if every basename had both sides and none failed
    pub fn integrity_ok(&self) -> bool {
        self.incomplete.is_empty() && self.failures.is_empty()
    }
}

/// Directory scanner with injected extension sets, formats and hooks
pub struct Scanner<'a> {
    files: &'a FilesConfig,
    registry: &'a FormatRegistry,
    hooks: &'a HookChain,
}

impl<'a> Scanner<'a> {
    pub fn new(files: &'a FilesConfig, registry: &'a FormatRegistry, hooks: &'a HookChain) -> Self {
        Self {
            files,
            registry,
            hooks,
        }
    }

    fn classify(&self, ext: &str) -> Option<Side> {
        let matches = |types: &[String]| types.iter().any(|t| t.eq_ignore_ascii_case(ext));
        if matches(&self.files.meta_types) {
            Some(Side::Meta)
        } else if matches(&self.files.page_types) {
            Some(Side::Page)
        } else {
            None
        }
    }

    /// Scan a directory (non-recursive)
    pub fn scan(&self, dir: &Path) -> Result<ScanReport, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        tracing::info!("Finding meta and page files in {:?}", dir);

        let mut report = ScanReport::default();
        let mut paths: BTreeMap<(String, &'static str), PathBuf> = BTreeMap::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"))
            })?;
            let path = entry.path();
            // Symlinks are followed when read; dangling ones fail the basename
            let file_type = entry.file_type();
            if !(file_type.is_file() || (file_type.is_symlink() && !path.is_dir())) {
                continue;
            }

            let Some((basename, ext)) = split_name(path) else {
                tracing::debug!("Skipping file without extension: {:?}", path);
                continue;
            };

            // Unrelated files (assets etc.) are ignored
            let Some(side) = self.classify(&ext) else {
                tracing::debug!("Skipping unrelated file: {:?}", path);
                continue;
            };

            let raw = match fs::read(path) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!("Failed to read {:?}: {}", path, err);
                    report.failures.push(ScanFailure {
                        basename,
                        path: path.to_path_buf(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let result = report.results.entry(basename.clone()).or_default();
            let slot = result.slot(side);
            if let Some(existing) = slot.as_ref() {
                // e.g. both home.json and home.yml present
                let reason = format!(
                    "duplicate {} file: both .{} and .{} exist",
                    side.as_str(),
                    existing.ext,
                    ext
                );
                tracing::warn!("Ambiguous pair '{}': {}", basename, reason);
                report.failures.push(ScanFailure {
                    basename,
                    path: path.to_path_buf(),
                    reason,
                });
                continue;
            }
            *slot = Some(ScanFile::new(ext, raw));
            paths.insert((basename, side.as_str()), path.to_path_buf());
        }

        // Read failures and ambiguous sides drop the whole basename
        for failure in &report.failures {
            report.results.remove(&failure.basename);
        }

        let basenames: Vec<String> = report.results.keys().cloned().collect();
        for basename in basenames {
            let Some(result) = report.results.remove(&basename) else {
                continue;
            };

            match self.load(&basename, result) {
                Ok(result) => {
                    if !result.is_complete() {
                        tracing::warn!(
                            "Incomplete pair '{}': missing {} file",
                            basename,
                            if result.meta.is_none() { "meta" } else { "page" }
                        );
                        report.incomplete.push(basename.clone());
                    }
                    report.results.insert(basename, result);
                }
                Err((side, reason)) => {
                    tracing::warn!("Failed to load '{}' ({}): {}", basename, side.as_str(), reason);
                    let path = paths
                        .get(&(basename.clone(), side.as_str()))
                        .cloned()
                        .unwrap_or_else(|| dir.join(&basename));
                    report.failures.push(ScanFailure {
                        basename,
                        path,
                        reason,
                    });
                }
            }
        }

        tracing::info!(
            "Scanned {} pages ({} incomplete, {} failed)",
            report.results.len(),
            report.incomplete.len(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Parse each present side, firing the load hooks around it for complete pairs
    fn load(&self, basename: &str, mut result: ScanResult) -> Result<ScanResult, (Side, String)> {
        if result.is_complete() {
            result = self.hooks.emit(HookPoint::BeforeLoad, basename, result);
        }

        for side in [Side::Meta, Side::Page] {
            let Some(file) = result.slot(side).as_mut() else {
                continue;
            };
            if file.parsed.is_some() {
                // A before-load hook already supplied the parsed value
                continue;
            }
            let loader = self
                .registry
                .lookup(&file.ext)
                .map_err(|e| (side, e.to_string()))?;
            file.parsed = Some(loader.read(&file.raw).map_err(|e| (side, e.to_string()))?);
        }

        if result.is_complete() {
            result = self.hooks.emit(HookPoint::AfterLoad, basename, result);
        }

        Ok(result)
    }
}

/// Split `name.ext` into (`name`, `ext`); the extension is the last dotted segment
fn split_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some((stem.to_string(), ext.to_ascii_lowercase()))
}
