//! Plain HTML page plugin.
//!
//! Every `.html` file in the content tree is parsed as a template together
//! with the layout, the partials and the page templates at its depth, and
//! rendered in place under the output root. A failure aborts the rest of
//! that page's directory only.

use super::{FunctionProvider, Plugin, RenderPlugin, article::helpers::{arg, to_tera}};
use crate::{
    config::SiteConfig,
    engine::{FunctionMap, SharedFunction, TemplateEngine},
    log,
    pool::TaskPool,
    site::{FileContainer, HTML, SiteFiles, Templates},
    utils::fs::write_file,
};
use anyhow::{Context, Result};
use std::{collections::HashMap, sync::Arc};
use tera::Value;

pub struct HtmlPlugin {
    config: Arc<SiteConfig>,
}

impl HtmlPlugin {
    pub const NAME: &'static str = "html";

    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self { config }
    }

    fn render_dir(
        engine: &TemplateEngine,
        templates: &Templates,
        container: &FileContainer,
    ) -> Result<usize> {
        let context = tera::Context::new();
        let pages = container.filter_ext(&[HTML]);

        for file in &pages {
            let source = container.full_path(file);
            let composition = templates.for_page(&source, container.depth());
            let html = engine
                .render(&composition, &context)
                .with_context(|| format!("Failed to render {}", source.display()))?;

            let output = container.output_path(file);
            write_file(&output, html)?;
            log!("html"; "{}", output.display());
        }
        Ok(pages.len())
    }
}

/// First `size` characters of `html` followed by `...`, or `html` itself
/// when it is not longer than that. Counts characters, not bytes.
pub fn truncate(size: usize, html: &str) -> String {
    match html.char_indices().nth(size) {
        Some((end, _)) => format!("{}...", &html[..end]),
        None => html.to_owned(),
    }
}

/// Comma-joined search filter list.
pub fn generate_search(filters: &[String]) -> String {
    filters.join(",")
}

impl Plugin for HtmlPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_render(self: Arc<Self>) -> Option<Arc<dyn RenderPlugin>> {
        Some(self)
    }

    fn as_function_provider(self: Arc<Self>) -> Option<Arc<dyn FunctionProvider>> {
        Some(self)
    }
}

impl RenderPlugin for HtmlPlugin {
    fn render(
        &self,
        engine: &TemplateEngine,
        site: &SiteFiles,
        templates: &Templates,
    ) -> Result<()> {
        let pool = TaskPool::new(self.config.build.workers)?;
        let containers = site.containers();

        let rendered = pool.run_isolated(
            &containers,
            |container| container.entry().display().to_string(),
            |container| Self::render_dir(engine, templates, container),
        );

        log!("html"; "rendered {} pages", rendered.iter().sum::<usize>());
        Ok(())
    }
}

impl FunctionProvider for HtmlPlugin {
    fn functions(&self) -> FunctionMap {
        let mut map = FunctionMap::new();

        map.insert(
            "truncate".into(),
            SharedFunction::new(|args: &HashMap<String, Value>| {
                let size: usize = arg(args, "truncate", "size")?;
                let html: String = arg(args, "truncate", "html")?;
                to_tera(&truncate(size, &html))
            }),
        );

        map.insert(
            "generate_search".into(),
            SharedFunction::new(|args: &HashMap<String, Value>| {
                let filters: Vec<String> = arg(args, "generate_search", "filters")?;
                to_tera(&generate_search(&filters))
            }),
        );

        map
    }
}
