//! Markdown article plugin.
//!
//! Renders every `.md` file to `<slug>.html` in the mirrored output
//! directory and keeps the parsed articles, keyed by content directory, for
//! the collection helpers in [`helpers`].
//!
//! Rendering runs in two passes over one pool. The first parses every
//! directory and fills the index, so that an article template calling
//! `article_collection` sees the whole site. The second renders.

pub mod helpers;
mod model;

pub use model::Article;

use super::{FunctionProvider, Plugin, RenderPlugin};
use crate::{
    config::SiteConfig,
    engine::{FunctionMap, TemplateEngine},
    log,
    pool::TaskPool,
    site::{FileContainer, MD, SiteFiles, Templates},
    utils::fs::write_file,
};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

// ============================================================================
// Article Index
// ============================================================================

/// Parsed articles by content directory (relative, forward-slash form).
///
/// Shared between the plugin and the template functions it hands out.
#[derive(Debug, Clone, Default)]
pub struct ArticleIndex(Arc<RwLock<FxHashMap<String, Vec<Article>>>>);

impl ArticleIndex {
    /// Articles of `dir`, in discovery order.
    pub fn get(&self, dir: &str) -> Vec<Article> {
        self.0.read().get(dir).cloned().unwrap_or_default()
    }

    #[cfg(test)]
    pub fn insert(&self, dir: String, articles: Vec<Article>) {
        self.0.write().insert(dir, articles);
    }

    /// Swap in a complete index.
    pub fn replace(&self, index: FxHashMap<String, Vec<Article>>) {
        *self.0.write() = index;
    }

    pub fn len(&self) -> usize {
        self.0.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Plugin
// ============================================================================

pub struct ArticlePlugin {
    config: Arc<SiteConfig>,
    index: ArticleIndex,
}

impl ArticlePlugin {
    pub const NAME: &'static str = "article";

    pub fn new(config: Arc<SiteConfig>) -> Self {
        Self {
            config,
            index: ArticleIndex::default(),
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> &ArticleIndex {
        &self.index
    }

    /// Parse every markdown file of `container`. Unreadable or malformed
    /// files are logged and skipped.
    fn parse_dir(&self, container: &FileContainer) -> Vec<Article> {
        let relative = container.relative_key();
        container
            .filter_ext(&[MD])
            .into_iter()
            .filter_map(|file| {
                let path = container.full_path(file);
                match Self::parse_file(&path, &relative) {
                    Ok(article) => Some(article),
                    Err(err) => {
                        log!("error"; "{}: {:#}", path.display(), err);
                        None
                    }
                }
            })
            .collect()
    }

    fn parse_file(path: &Path, relative: &str) -> Result<Article> {
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Article::parse(&source, relative)?)
    }

    /// Render one article through its template into the output directory.
    fn render_article(
        engine: &TemplateEngine,
        templates: &Templates,
        container: &FileContainer,
        article: &Article,
    ) -> Result<PathBuf> {
        let composition = templates.for_article(&article.template);
        let context = tera::Context::from_serialize(article)
            .context("Failed to build article context")?;
        let html = engine.render(&composition, &context)?;

        let output = container.output_dir().join(article.file_name());
        write_file(&output, html)?;
        Ok(output)
    }
}

impl Plugin for ArticlePlugin {
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

impl RenderPlugin for ArticlePlugin {
    fn render(
        &self,
        engine: &TemplateEngine,
        site: &SiteFiles,
        templates: &Templates,
    ) -> Result<()> {
        let pool = TaskPool::new(self.config.build.workers)?;
        let containers = site.containers();

        let parsed = pool.run(&containers, |container| self.parse_dir(container));

        // merge after the pool drains; no task touches the index
        let jobs: Vec<_> = containers.into_iter().zip(parsed).collect();
        let index = jobs
            .iter()
            .filter(|(_, articles)| !articles.is_empty())
            .map(|(container, articles)| (container.relative_key(), articles.clone()))
            .collect();
        self.index.replace(index);
        if self.index.is_empty() {
            log!("article"; "no articles");
            return Ok(());
        }

        let rendered = pool.run(&jobs, |(container, articles)| {
            let mut count = 0;
            for article in articles {
                match Self::render_article(engine, templates, container, article) {
                    Ok(output) => {
                        log!("article"; "{}", output.display());
                        count += 1;
                    }
                    Err(err) => {
                        let output = container.output_dir().join(article.file_name());
                        log!("error"; "{}: {:#}", output.display(), err);
                    }
                }
            }
            count
        });

        log!("article"; "rendered {} of {} articles", rendered.iter().sum::<usize>(), self.index.len());
        Ok(())
    }
}

impl FunctionProvider for ArticlePlugin {
    fn functions(&self) -> FunctionMap {
        helpers::functions(&self.index)
    }
}
