//! Status command implementation.

use anyhow::{Context, Result};
use che_core::BuildOptions;
use serde::Serialize;
use std::path::Path;

use super::build::print_integrity;
use super::{load_config, site_builder};

#[derive(Serialize)]
struct StatusOutput<'a> {
    #[serde(flatten)]
    report: &'a che_core::BuildReport,
    planned: Vec<&'a str>,
}

/// Report what the next build would render without touching the log
pub fn show_status(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let builder = site_builder(config);
    let (report, plan) = builder
        .preview(BuildOptions::default())
        .context("Failed to compute status")?;
    let planned: Vec<&str> = plan.pages.keys().map(String::as_str).collect();

    if json {
        let output = StatusOutput {
            report: &report,
            planned,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_integrity(&report);
    println!(
        "Full rebuild: {}",
        if report.full_rebuild { "yes" } else { "no" }
    );
    for (label, names) in [
        ("added", &report.added),
        ("updated", &report.updated),
        ("unchanged", &report.unchanged),
    ] {
        if !names.is_empty() {
            println!("{} ({}): {}", label, names.len(), names.join(", "));
        }
    }
    if planned.is_empty() {
        println!("Nothing to render");
    } else {
        println!("Would render: {}", planned.join(", "));
    }
    Ok(())
}
