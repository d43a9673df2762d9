//! CLI command implementations.

pub mod build;
pub mod init;
pub mod page;
pub mod status;

pub use build::build_site;
pub use init::init_project;
pub use page::{change_status, new_page};
pub use status::show_status;

use anyhow::{Context, Result};
use che_core::{Config, FormatRegistry, HookChain, MetaDefaults, SiteBuilder};
use std::path::Path;

pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    tracing::debug!("Loading config from {:?}", config_path);
    Config::from_file(config_path).context("Failed to load configuration")
}

/// Builder with the default formats and the meta defaults hook
pub(crate) fn site_builder(config: Config) -> SiteBuilder {
    let mut hooks = HookChain::new();
    hooks.register(MetaDefaults);
    SiteBuilder::new(config, FormatRegistry::with_defaults(), hooks)
}
