//! Page authoring commands.

use anyhow::{Context, Result};
use che_core::{create_page, set_status, FormatRegistry, PageStatus};
use std::path::Path;

use super::load_config;

/// Scaffold a draft meta/page pair
pub fn new_page(config_path: &Path, name: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = FormatRegistry::with_defaults();

    let page = create_page(&config, &registry, name)
        .with_context(|| format!("Failed to create page '{}'", name))?;

    println!("Creating page {}", page.basename);
    println!("  {}", page.meta_path.display());
    println!("  {}", page.page_path.display());
    Ok(())
}

/// Publish or unpublish an existing page
pub fn change_status(config_path: &Path, basename: &str, status: PageStatus) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = FormatRegistry::with_defaults();

    let action = match status {
        PageStatus::Published => "activate",
        PageStatus::Draft => "deactivate",
    };
    set_status(&config, &registry, basename, status)
        .with_context(|| format!("Could not {} / find page '{}'", action, basename))?;

    println!(
        "Page status of \"{}\" has changed to {}.",
        basename,
        status.as_str()
    );
    Ok(())
}
