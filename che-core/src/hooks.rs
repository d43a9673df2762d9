//! Load hooks fired by the scanner around parsing a content pair.
//!
//! Hooks run synchronously in registration order. Each receives the result
//! returned by the previous one and may enrich or replace it.

use std::sync::Arc;

use crate::scan::ScanResult;
use crate::slug::slugify;

/// The two points in a pair's load where hooks are called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Both sides found, nothing parsed yet
    BeforeLoad,
    /// Both sides parsed
    AfterLoad,
}

/// Observer of the scanner's load steps
pub trait LoadHook: Send + Sync {
    fn name(&self) -> &str;

    fn before_load(&self, _basename: &str, scan: ScanResult) -> ScanResult {
        scan
    }

    fn after_load(&self, _basename: &str, scan: ScanResult) -> ScanResult {
        scan
    }
}

/// Ordered list of hooks
#[derive(Default, Clone)]
pub struct HookChain {
    hooks: Vec<Arc<dyn LoadHook>>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hook: impl LoadHook + 'static) {
        self.register_shared(Arc::new(hook));
    }

    pub fn register_shared(&mut self, hook: Arc<dyn LoadHook>) {
        tracing::debug!("Registered load hook: {}", hook.name());
        self.hooks.push(hook);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Fold the payload through every hook for `point`
    pub fn emit(&self, point: HookPoint, basename: &str, scan: ScanResult) -> ScanResult {
        self.hooks.iter().fold(scan, |scan, hook| match point {
            HookPoint::BeforeLoad => hook.before_load(basename, scan),
            HookPoint::AfterLoad => hook.after_load(basename, scan),
        })
    }
}

/// Fills in `title` (from the basename) and `slug` (from the title) when a
/// meta object lacks them.
pub struct MetaDefaults;

impl LoadHook for MetaDefaults {
    fn name(&self) -> &str {
        "meta-defaults"
    }

    fn after_load(&self, basename: &str, mut scan: ScanResult) -> ScanResult {
        let Some(meta) = scan
            .meta
            .as_mut()
            .and_then(|file| file.parsed.as_mut())
            .and_then(|parsed| parsed.as_meta_mut())
            .and_then(|value| value.as_object_mut())
        else {
            return scan;
        };

        let title = match meta.get("title").and_then(|t| t.as_str()) {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => {
                meta.insert("title".into(), basename.into());
                basename.to_string()
            }
        };

        let has_slug = meta
            .get("slug")
            .and_then(|s| s.as_str())
            .is_some_and(|s| !s.is_empty());
        if !has_slug {
            let slug = slugify(&title);
            let slug = if slug.is_empty() { slugify(basename) } else { slug };
            meta.insert("slug".into(), slug.into());
        }

        scan
    }
}
