//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::log::RebuildPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Main configuration struct matching the che.yml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(default)]
    pub output: OutputConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,
}

fn default_site_title() -> String {
    String::from("My Site")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,

    /// Create the input directory on build instead of failing when it is missing
    #[serde(default = "default_true")]
    pub create_missing: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("content")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            create_missing: true,
        }
    }
}

/// Recognized extensions for the two sides of a content pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_meta_types")]
    pub meta_types: Vec<String>,

    #[serde(default = "default_page_types")]
    pub page_types: Vec<String>,

    #[serde(default = "default_meta_type")]
    pub default_meta_type: String,

    #[serde(default = "default_page_type")]
    pub default_page_type: String,
}

fn default_meta_types() -> Vec<String> {
    vec![default_meta_type()]
}

fn default_page_types() -> Vec<String> {
    vec![default_page_type()]
}

fn default_meta_type() -> String {
    String::from("json")
}

fn default_page_type() -> String {
    String::from("md")
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            meta_types: default_meta_types(),
            page_types: default_page_types(),
            default_meta_type: default_meta_type(),
            default_page_type: default_page_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_log_file_name")]
    pub file_name: String,

    /// Any change to a meta file invalidates every rendered page
    #[serde(default = "default_true")]
    pub meta_change_forces_rebuild: bool,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(".che")
}

fn default_log_file_name() -> String {
    String::from("log.json")
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file_name: default_log_file_name(),
            meta_change_forces_rebuild: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_template")]
    pub default_template: String,

    /// Include navigation on every page. New pages then require a full rebuild.
    #[serde(default = "default_true")]
    pub build_nav: bool,
}

fn default_template() -> String {
    String::from("page.html")
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
            build_nav: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    #[serde(default)]
    pub minify_html: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            minify_html: false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text without a backing file
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration with all defaults, rooted at `root`
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_path: Some(root.join("che.yml")),
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log.file_name".into(),
                message: "must not be empty".into(),
            });
        }

        if let Some(ext) = self
            .files
            .meta_types
            .iter()
            .find(|ext| self.files.page_types.contains(ext))
        {
            return Err(ConfigError::InvalidValue {
                field: "files".into(),
                message: format!("extension '{}' is listed as both meta and page", ext),
            });
        }

        Ok(())
    }

    /// Get the content directory, resolved relative to config file
    pub fn input_dir(&self) -> PathBuf {
        self.resolve_path(&self.input.dir)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.output.dir)
    }

    /// Full path of the build log store
    pub fn log_path(&self) -> PathBuf {
        self.resolve_path(&self.log.dir).join(&self.log.file_name)
    }

    /// Rebuild escalation rules derived from the log and template settings
    pub fn rebuild_policy(&self) -> RebuildPolicy {
        RebuildPolicy {
            rebuild_on_new_entry: self.templates.build_nav,
            rebuild_on_meta_change: self.log.meta_change_forces_rebuild,
        }
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::from_yaml("{}").unwrap();

        assert_eq!(config.files.meta_types, vec!["json".to_string()]);
        assert_eq!(config.files.page_types, vec!["md".to_string()]);
        assert_eq!(config.log.file_name, "log.json");
        assert!(config.templates.build_nav);
        assert!(config.log.meta_change_forces_rebuild);
        assert!(config.input.create_missing);
        assert!(!config.output.minify_html);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_yaml(
            r#"
site:
  title: Blog
files:
  meta_types: [json, yml]
templates:
  build_nav: false
"#,
        )
        .unwrap();

        assert_eq!(config.site.title, "Blog");
        assert_eq!(config.files.meta_types.len(), 2);
        assert_eq!(config.files.page_types, vec!["md".to_string()]);

        let policy = config.rebuild_policy();
        assert!(!policy.rebuild_on_new_entry);
        assert!(policy.rebuild_on_meta_change);
    }

    #[test]
    fn test_overlapping_extensions_rejected() {
        let err = Config::from_yaml("files:\n  meta_types: [md]\n  page_types: [md]\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_paths_resolve_against_config_dir() {
        let config = Config::rooted_at(Path::new("/srv/site"));

        assert_eq!(config.input_dir(), PathBuf::from("/srv/site/content"));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/site/public"));
        assert_eq!(config.log_path(), PathBuf::from("/srv/site/.che/log.json"));
    }
}
