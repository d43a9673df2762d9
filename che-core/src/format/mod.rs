//! Loader/writer registry keyed by file extension.
//!
//! A [`Loader`] turns raw bytes into a [`Loaded`] value and a [`Writer`] does
//! the reverse. The registry stores factories so every lookup hands out a
//! fresh instance, resolved at scan time.

mod json;
mod markdown;
mod yaml;

pub use json::JsonMeta;
pub use markdown::MarkdownPage;
pub use yaml::YamlMeta;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("No suitable loader found for '.{0}' files")]
    NoSuitableLoader(String),

    #[error("No suitable writer found for '.{0}' files")]
    NoSuitableWriter(String),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Content is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Cannot write {found} content with a {expected} writer")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },
}

/// A parsed markdown page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBody {
    /// Markdown source as read from disk
    pub source: String,

    /// Rendered HTML
    pub html: String,
}

/// Parsed value of one side of a content pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Loaded {
    Meta(serde_json::Value),
    Page(PageBody),
}

impl Loaded {
    pub fn as_meta(&self) -> Option<&serde_json::Value> {
        match self {
            Loaded::Meta(value) => Some(value),
            Loaded::Page(_) => None,
        }
    }

    pub fn as_meta_mut(&mut self) -> Option<&mut serde_json::Value> {
        match self {
            Loaded::Meta(value) => Some(value),
            Loaded::Page(_) => None,
        }
    }

    pub fn as_page(&self) -> Option<&PageBody> {
        match self {
            Loaded::Page(page) => Some(page),
            Loaded::Meta(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Loaded::Meta(_) => "meta",
            Loaded::Page(_) => "page",
        }
    }
}

/// Parses raw file bytes
pub trait Loader {
    fn read(&self, raw: &[u8]) -> Result<Loaded, FormatError>;
}

/// Serializes a parsed value back to file bytes
pub trait Writer {
    fn write(&self, value: &Loaded) -> Result<Vec<u8>, FormatError>;
}

pub type LoaderFactory = fn() -> Box<dyn Loader>;
pub type WriterFactory = fn() -> Box<dyn Writer>;

/// Extension-keyed loader and writer factories
#[derive(Default)]
pub struct FormatRegistry {
    loaders: HashMap<String, LoaderFactory>,
    writers: HashMap<String, WriterFactory>,
}

impl FormatRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in JSON, YAML and Markdown formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for ext in ["json", "js"] {
            registry.register(ext, || Box::new(JsonMeta), || Box::new(JsonMeta));
        }
        for ext in ["yml", "yaml"] {
            registry.register(ext, || Box::new(YamlMeta), || Box::new(YamlMeta));
        }
        for ext in ["md", "markdown"] {
            registry.register(
                ext,
                || Box::new(MarkdownPage::new()),
                || Box::new(MarkdownPage::new()),
            );
        }
        registry
    }

    /// Register (or replace) the loader and writer for an extension
    pub fn register(&mut self, ext: &str, loader: LoaderFactory, writer: WriterFactory) {
        let key = normalize_ext(ext);
        self.loaders.insert(key.clone(), loader);
        self.writers.insert(key, writer);
    }

    /// Fresh loader for an extension
    pub fn lookup(&self, ext: &str) -> Result<Box<dyn Loader>, FormatError> {
        self.loaders
            .get(&normalize_ext(ext))
            .map(|factory| factory())
            .ok_or_else(|| FormatError::NoSuitableLoader(ext.to_string()))
    }

    /// Fresh writer for an extension
    pub fn lookup_writer(&self, ext: &str) -> Result<Box<dyn Writer>, FormatError> {
        self.writers
            .get(&normalize_ext(ext))
            .map(|factory| factory())
            .ok_or_else(|| FormatError::NoSuitableWriter(ext.to_string()))
    }

    /// Extensions with both a loader and a writer, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self
            .loaders
            .keys()
            .filter(|ext| self.writers.contains_key(*ext))
            .map(String::as_str)
            .collect();
        exts.sort_unstable();
        exts
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_builtin_formats() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(
            registry.extensions(),
            vec!["js", "json", "markdown", "md", "yaml", "yml"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FormatRegistry::with_defaults();
        let loaded = registry.lookup(".JSON").unwrap().read(br#"{"a":1}"#).unwrap();
        assert_eq!(loaded.as_meta().unwrap()["a"], 1);
    }

    #[test]
    fn test_unknown_extension() {
        let registry = FormatRegistry::with_defaults();
        assert!(matches!(
            registry.lookup("toml"),
            Err(FormatError::NoSuitableLoader(ext)) if ext == "toml"
        ));
        assert!(matches!(
            registry.lookup_writer("toml"),
            Err(FormatError::NoSuitableWriter(_))
        ));
    }

    struct Plain;

    impl Loader for Plain {
        fn read(&self, raw: &[u8]) -> Result<Loaded, FormatError> {
            let source = std::str::from_utf8(raw)?.to_string();
            Ok(Loaded::Page(PageBody {
                html: format!("<pre>{}</pre>", source),
                source,
            }))
        }
    }

    impl Writer for Plain {
        fn write(&self, value: &Loaded) -> Result<Vec<u8>, FormatError> {
            match value {
                Loaded::Page(page) => Ok(page.source.clone().into_bytes()),
                other => Err(FormatError::WrongKind {
                    expected: "page",
                    found: other.kind(),
                }),
            }
        }
    }

    #[test]
    fn test_custom_format_registration() {
        let mut registry = FormatRegistry::new();
        registry.register("txt", || Box::new(Plain), || Box::new(Plain));

        let loaded = registry.lookup("txt").unwrap().read(b"hello").unwrap();
        assert_eq!(loaded.as_page().unwrap().html, "<pre>hello</pre>");
        assert_eq!(
            registry.lookup_writer("txt").unwrap().write(&loaded).unwrap(),
            b"hello"
        );
    }
}
