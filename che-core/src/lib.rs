//! # che-core
//!
//! Core library for the che static site builder.
//!
//! This crate scans a content directory for paired meta and page files,
//! keeps the incremental build log that records what was last built, and
//! decides which pages a run has to render.

pub mod authoring;
pub mod builder;
pub mod config;
pub mod format;
pub mod hash;
pub mod hooks;
pub mod log;
pub mod scan;
pub mod slug;

pub use authoring::{create_page, set_status, AuthoringError, PageStatus};
pub use builder::{BuildError, BuildOptions, BuildPlan, BuildReport, Renderer, SiteBuilder};
pub use config::Config;
pub use format::{FormatRegistry, Loaded, PageBody};
pub use hash::{hash, Digest};
pub use hooks::{HookChain, LoadHook, MetaDefaults};
pub use log::{ChangeLog, Diff, Entry, LogError, RebuildPolicy};
pub use scan::{ScanReport, ScanResult, ScanResults, Scanner};
pub use slug::slugify;
