//! Creating pages and switching their publish status.

use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::Config;
use crate::format::{FormatError, FormatRegistry, Loaded, PageBody};
use crate::slug::slugify;

#[derive(Error, Debug)]
pub enum AuthoringError {
    #[error("Page '{0}' already exists")]
    AlreadyExists(String),

    #[error("Page '{0}' not found")]
    PageNotFound(String),

    #[error("Cannot derive a file name from '{0}'")]
    InvalidName(String),

    #[error("Meta of '{0}' is not an object")]
    MetaNotAnObject(String),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Publish status stored in a page's meta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
        }
    }
}

/// Files written for a new page
#[derive(Debug)]
pub struct NewPage {
    pub basename: String,
    pub meta_path: PathBuf,
    pub page_path: PathBuf,
}

/// Write a draft meta/page pair for `name` using the default file types
pub fn create_page(
    config: &Config,
    registry: &FormatRegistry,
    name: &str,
) -> Result<NewPage, AuthoringError> {
    let basename = slugify(name);
    if basename.is_empty() {
        return Err(AuthoringError::InvalidName(name.to_string()));
    }

    let dir = config.input_dir();
    let meta_path = dir.join(format!("{}.{}", basename, config.files.default_meta_type));
    let page_path = dir.join(format!("{}.{}", basename, config.files.default_page_type));
    let taken = meta_path.exists()
        || page_path.exists()
        || find_side(&dir, &basename, &config.files.meta_types).is_some();
    if taken {
        return Err(AuthoringError::AlreadyExists(basename));
    }

    let meta = Loaded::Meta(json!({
        "title": name,
        "slug": basename,
        "template": config.templates.default_template,
        "visibility": "hidden",
        "status": PageStatus::Draft.as_str(),
    }));
    let source = format!("# {}\n\nAdd your content here\n", name);
    let page = Loaded::Page(PageBody {
        html: String::new(),
        source,
    });

    let meta_bytes = registry
        .lookup_writer(&config.files.default_meta_type)?
        .write(&meta)?;
    let page_bytes = registry
        .lookup_writer(&config.files.default_page_type)?
        .write(&page)?;

    fs::create_dir_all(&dir)?;
    fs::write(&meta_path, meta_bytes)?;
    fs::write(&page_path, page_bytes)?;

    tracing::info!("Creating page {}", basename);
    Ok(NewPage {
        basename,
        meta_path,
        page_path,
    })
}

/// Set the `status` field in a page's meta file, rewriting it in place
pub fn set_status(
    config: &Config,
    registry: &FormatRegistry,
    basename: &str,
    status: PageStatus,
) -> Result<PathBuf, AuthoringError> {
    let dir = config.input_dir();
    let (path, ext) = find_side(&dir, basename, &config.files.meta_types)
        .ok_or_else(|| AuthoringError::PageNotFound(basename.to_string()))?;

    let raw = fs::read(&path)?;
    let mut loaded = registry.lookup(&ext)?.read(&raw)?;
    let meta = loaded
        .as_meta_mut()
        .and_then(|value| value.as_object_mut())
        .ok_or_else(|| AuthoringError::MetaNotAnObject(basename.to_string()))?;
    meta.insert("status".into(), status.as_str().into());

    let bytes = registry.lookup_writer(&ext)?.write(&loaded)?;
    fs::write(&path, bytes)?;

    tracing::info!("Page status of '{}' set to {}", basename, status.as_str());
    Ok(path)
}

/// First existing `<dir>/<basename>.<ext>` among `exts`
fn find_side(dir: &Path, basename: &str, exts: &[String]) -> Option<(PathBuf, String)> {
    exts.iter()
        .map(|ext| (dir.join(format!("{}.{}", basename, ext)), ext.clone()))
        .find(|(path, _)| path.is_file())
}
