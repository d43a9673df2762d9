//! Site building logic - orchestrates scanning, diffing, rendering and
//! persisting the build log.

use serde::Serialize;
use std::fs;
use thiserror::Error;

use crate::{
    config::Config,
    format::FormatRegistry,
    hooks::HookChain,
    log::{ChangeLog, Diff, LogError},
    scan::{ScanError, ScanFailure, ScanResults, Scanner},
};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("Build log error: {0}")]
    Log(#[from] LogError),

    #[error("Render failed: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The pages handed to rendering for one run
#[derive(Debug, Default)]
pub struct BuildPlan {
    pub pages: ScanResults,
    pub full_rebuild: bool,
}

impl BuildPlan {
    /// Select pages to render: every complete pair on a full rebuild,
    /// otherwise only the changed subset
    pub fn new(site: &ScanResults, diff: &Diff, force_rebuild: bool) -> Self {
        let full_rebuild = force_rebuild || diff.full_rebuild;
        let pages = if full_rebuild {
            site.iter()
                .filter(|(_, result)| result.is_complete())
                .map(|(name, result)| (name.clone(), result.clone()))
                .collect()
        } else {
            diff.changed.clone()
        };

        Self {
            pages,
            full_rebuild,
        }
    }
}

/// Rendering stage fed by the build
pub trait Renderer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Render the planned pages. `site` is the full current scan so shared
    /// views (navigation) can be built on incremental runs too. Returns the
    /// number of pages written.
    fn render(&mut self, plan: &BuildPlan, site: &ScanResults) -> Result<usize, Self::Error>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Re-render every page regardless of detected changes
    pub force_rebuild: bool,
}

/// Summary of one build run
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    pub integrity_ok: bool,
    pub incomplete: Vec<String>,
    pub failures: Vec<ScanFailure>,
    pub full_rebuild: bool,
    pub rendered: usize,
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
}

impl BuildReport {
    fn new(
        integrity_ok: bool,
        incomplete: Vec<String>,
        failures: Vec<ScanFailure>,
        diff: Diff,
        full_rebuild: bool,
    ) -> Self {
        Self {
            integrity_ok,
            incomplete,
            failures,
            full_rebuild,
            rendered: 0,
            added: diff.added,
            updated: diff.updated,
            unchanged: diff.unchanged,
        }
    }
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    registry: FormatRegistry,
    hooks: HookChain,
}

impl SiteBuilder {
    pub fn new(config: Config, registry: FormatRegistry, hooks: HookChain) -> Self {
        Self {
            config,
            registry,
            hooks,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one build: scan, diff, render, then persist the log
    ///
    /// The log is only written after rendering succeeded.
    pub fn build<R: Renderer>(
        &self,
        renderer: &mut R,
        options: BuildOptions,
    ) -> Result<BuildReport, BuildError> {
        let mut log = ChangeLog::open(self.config.log_path(), self.config.rebuild_policy())?;
        let (site, mut report, plan) = self.scan_and_diff(&mut log, options)?;

        tracing::info!(
            "Rendering {} pages{}",
            plan.pages.len(),
            if plan.full_rebuild { " (full rebuild)" } else { "" }
        );
        report.rendered = renderer
            .render(&plan, &site)
            .map_err(|e| BuildError::Render(Box::new(e)))?;

        log.persist()?;
        Ok(report)
    }

    /// Diff against the log without rendering or persisting anything
    pub fn preview(&self, options: BuildOptions) -> Result<(BuildReport, BuildPlan), BuildError> {
        let mut log = ChangeLog::open(self.config.log_path(), self.config.rebuild_policy())?;
        let (_, report, plan) = self.scan_and_diff(&mut log, options)?;
        Ok((report, plan))
    }

    fn scan_and_diff(
        &self,
        log: &mut ChangeLog,
        options: BuildOptions,
    ) -> Result<(ScanResults, BuildReport, BuildPlan), BuildError> {
        let input_dir = self.config.input_dir();
        if !input_dir.exists() && self.config.input.create_missing {
            tracing::info!("Creating missing input directory {:?}", input_dir);
            fs::create_dir_all(&input_dir)?;
        }

        let scanner = Scanner::new(&self.config.files, &self.registry, &self.hooks);
        let scan = scanner.scan(&input_dir)?;
        let integrity_ok = scan.integrity_ok();

        let diff = log.diff(&scan.results)?;
        let plan = BuildPlan::new(&scan.results, &diff, options.force_rebuild);
        if options.force_rebuild {
            tracing::info!("Forced rebuild of every page");
        }

        let report = BuildReport::new(
            integrity_ok,
            scan.incomplete,
            scan.failures,
            diff,
            plan.full_rebuild,
        );
        Ok((scan.results, report, plan))
    }
}
