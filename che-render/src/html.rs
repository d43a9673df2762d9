//! HTML output for planned pages.

use askama::Template;
use che_core::{slugify, BuildPlan, Config, Renderer, ScanResult, ScanResults};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::minify::minify_html;
use crate::templates::{NavItem, PageTemplate};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Page '{0}' was not parsed")]
    Unparsed(String),
}

/// Fields the renderer reads from a page's meta
struct PageInfo {
    title: String,
    slug: String,
    template: String,
    draft: bool,
}

impl PageInfo {
    fn new(basename: &str, result: &ScanResult) -> Self {
        let meta = result.meta_value();
        let field = |name: &str| {
            meta.and_then(|m| m.get(name))
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
        };

        let slug = field("slug").map(slugify).unwrap_or_default();
        let template = field("template").unwrap_or("page.html");
        Self {
            title: field("title").unwrap_or(basename).to_string(),
            slug: if slug.is_empty() { basename.to_string() } else { slug },
            template: template.trim_end_matches(".html").to_string(),
            draft: field("status") == Some("draft"),
        }
    }

    fn file_name(&self) -> String {
        format!("{}.html", self.slug)
    }
}

/// Writes one HTML file per published page
pub struct HtmlRenderer {
    output_dir: PathBuf,
    site_title: String,
    build_nav: bool,
    minify: bool,
}

impl HtmlRenderer {
    pub fn new(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir(),
            site_title: config.site.title.clone(),
            build_nav: config.templates.build_nav,
            minify: config.output.minify_html,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn navigation(&self, site: &ScanResults) -> Vec<NavItem> {
        if !self.build_nav {
            return Vec::new();
        }

        let mut nav: Vec<NavItem> = site
            .iter()
            .filter(|(_, result)| result.is_complete())
            .map(|(basename, result)| PageInfo::new(basename, result))
            .filter(|info| !info.draft)
            .map(|info| NavItem {
                url: info.file_name(),
                title: info.title,
                current: false,
            })
            .collect();
        nav.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.url.cmp(&b.url)));
        nav
    }

    /// HTML files in the output directory no published page maps to,
    /// e.g. left behind by a slug change
    pub fn stale_outputs(&self, site: &ScanResults) -> Vec<PathBuf> {
        let expected: BTreeSet<String> = site
            .iter()
            .filter(|(_, result)| result.is_complete())
            .map(|(basename, result)| PageInfo::new(basename, result))
            .filter(|info| !info.draft)
            .map(|info| info.file_name())
            .collect();

        WalkDir::new(&self.output_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                let name = entry.file_name().to_string_lossy();
                name.ends_with(".html") && !expected.contains(&*name)
            })
            .map(|entry| entry.into_path())
            .collect()
    }

    fn render_page(
        &self,
        basename: &str,
        result: &ScanResult,
        info: &PageInfo,
        nav: &[NavItem],
    ) -> Result<String, RenderError> {
        let page = result
            .page
            .as_ref()
            .and_then(|file| file.parsed.as_ref())
            .and_then(|parsed| parsed.as_page())
            .ok_or_else(|| RenderError::Unparsed(basename.to_string()))?;

        let current = info.file_name();
        let template = PageTemplate {
            title: info.title.clone(),
            site_title: self.site_title.clone(),
            template_class: info.template.clone(),
            content: page.html.clone(),
            nav: nav
                .iter()
                .map(|item| NavItem {
                    current: item.url == current,
                    ..item.clone()
                })
                .collect(),
        };

        let html = template.render()?;
        Ok(if self.minify { minify_html(&html) } else { html })
    }

    fn write(&self, path: &Path, html: &str) -> Result<(), RenderError> {
        fs::write(path, html).map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Renderer for HtmlRenderer {
    type Error = RenderError;

    fn render(&mut self, plan: &BuildPlan, site: &ScanResults) -> Result<usize, RenderError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| RenderError::Write {
            path: self.output_dir.clone(),
            source,
        })?;

        let nav = self.navigation(site);
        let mut written = 0;

        for (basename, result) in &plan.pages {
            if !result.is_complete() {
                continue;
            }

            let info = PageInfo::new(basename, result);
            let path = self.output_dir.join(info.file_name());

            if info.draft {
                // Unpublished pages must not linger from an earlier build
                if path.exists() {
                    tracing::info!("Removing unpublished page {:?}", path);
                    fs::remove_file(&path)
                        .map_err(|source| RenderError::Write { path, source })?;
                } else {
                    tracing::debug!("Skipping draft: {}", basename);
                }
                continue;
            }

            let html = self.render_page(basename, result, &info, &nav)?;
            self.write(&path, &html)?;
            tracing::debug!("Rendered: {}", basename);
            written += 1;
        }

        for path in self.stale_outputs(site) {
            tracing::warn!("Stale output {:?} no longer matches any published page", path);
        }

        Ok(written)
    }
}
