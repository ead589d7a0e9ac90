//! Template and content discovery.
//!
//! Both trees are walked in parallel and joined before anything else runs,
//! so every later phase sees a fully populated manifest and site map. Walk
//! errors are fatal.

use super::{HTML, SiteFiles, Templates, templates::TemplateKind};
use crate::{config::SiteConfig, log, utils::fs::is_ignored};
use anyhow::{Context, Result, bail};
use std::path::Path;
use walkdir::WalkDir;

/// Walks the template and content roots of a site.
pub struct Loader<'a> {
    config: &'a SiteConfig,
}

impl<'a> Loader<'a> {
    pub const fn new(config: &'a SiteConfig) -> Self {
        Self { config }
    }

    /// Discover templates and content concurrently.
    pub fn load(&self) -> Result<(Templates, SiteFiles)> {
        let (templates, site) = rayon::join(|| self.load_templates(), || self.load_content());
        let (templates, site) = (templates?, site?);

        log!(
            "load";
            "{} templates, {} files in {} directories",
            templates.partials().len() + templates.pages().len() + 1,
            site.file_count(),
            site.len()
        );
        if site.is_empty() {
            log!("warn"; "no content under {}", self.config.content.display());
        }
        Ok((templates, site))
    }

    /// Classify every `.html` file under the template root.
    pub fn load_templates(&self) -> Result<Templates> {
        let root = &self.config.template.path;
        let layout_name = &self.config.template.layout;
        let partials_dir = self.config.partials_dir();
        let mut templates = Templates::new(root);

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk templates in {}", root.display()))?;
            if !entry.file_type().is_file() || !has_html_extension(entry.path()) {
                continue;
            }

            let path = entry.path();
            let (kind, replaced) = templates.classify(path, layout_name, &partials_dir);
            if let Some(previous) = replaced {
                log!("warn"; "layout `{}` found twice, using {} over {}",
                     layout_name, path.display(), previous.display());
            }
            if kind == TemplateKind::Layout {
                log!("load"; "layout {}", path.display());
            } else {
                log!("load"; "template {}", path.display());
            }
        }

        if templates.layout().is_none() {
            bail!(
                "Layout `{}` not found under {}",
                layout_name,
                root.display()
            );
        }
        Ok(templates)
    }

    /// Group every content file by its parent directory.
    pub fn load_content(&self) -> Result<SiteFiles> {
        let content = &self.config.content;
        let output = &self.config.output;
        let mut site = SiteFiles::new();

        for entry in WalkDir::new(content).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Failed to walk content in {}", content.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if is_ignored(&name) {
                continue;
            }
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            site.add_file(content, output, dir, &name);
        }

        Ok(site)
    }
}

fn has_html_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| format!(".{}", ext.to_string_lossy()) == HTML)
}
