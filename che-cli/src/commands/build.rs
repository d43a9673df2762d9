//! Build command implementation.

use anyhow::{Context, Result};
use che_core::{BuildOptions, BuildReport};
use che_render::HtmlRenderer;
use std::path::Path;
use std::time::Instant;

use super::{load_config, site_builder};

/// Run one incremental build and persist the log
pub fn build_site(config_path: &Path, force_rebuild: bool) -> Result<()> {
    let started = Instant::now();
    let config = load_config(config_path)?;
    tracing::info!("Building site: {}", config.site.title);

    let mut renderer = HtmlRenderer::new(&config);
    let builder = site_builder(config);
    let report = builder
        .build(&mut renderer, BuildOptions { force_rebuild })
        .context("Failed to build site")?;

    print_integrity(&report);
    tracing::info!(
        "Rendered {} pages into {:?}",
        report.rendered,
        renderer.output_dir()
    );
    println!(
        "BUILD SUCCESSFUL -> Build time: {:.3}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

pub(crate) fn print_integrity(report: &BuildReport) {
    if report.integrity_ok {
        println!("File integrity: OK");
        return;
    }

    println!("File integrity: Error!");
    for basename in &report.incomplete {
        println!("  incomplete pair: {}", basename);
    }
    for failure in &report.failures {
        println!("  {:?}: {}", failure.path, failure.reason);
    }
}
