//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# che configuration
site:
  title: "My Site"

input:
  dir: content
  create_missing: true

files:
  meta_types: [json, yml, yaml]
  page_types: [md, markdown]
  default_meta_type: json
  default_page_type: md

log:
  dir: .che
  file_name: log.json
  meta_change_forces_rebuild: true

templates:
  default_template: page.html
  build_nav: true

output:
  dir: public
  minify_html: false
"#;

/// Initialize a new che project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;

    let content = root.join("content");
    fs::create_dir_all(&content).with_context(|| format!("Failed to create {:?}", content))?;

    println!("che initialized in {:?}", root);
    println!("  - Edit che.yml to customize the site");
    println!("  - Run `che new <name>` to add a page");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("che.yml");
    if config_path.exists() {
        println!("che.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use che_core::Config;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_yaml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.site.title, "My Site");
        assert_eq!(config.files.meta_types, vec!["json", "yml", "yaml"]);
        assert!(config.templates.build_nav);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("che.yml"), "site:\n  title: Mine\n").unwrap();

        init_project(Some(dir.path())).unwrap();

        let kept = fs::read_to_string(dir.path().join("che.yml")).unwrap();
        assert_eq!(kept, "site:\n  title: Mine\n");
        assert!(dir.path().join("content").is_dir());
    }
}
