//! Site generation orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── create output root
//!     │
//!     ├── Loader::load() ──► templates ║ content   (two parallel walks)
//!     │
//!     ├── post-load      ──► StaticFilesPlugin
//!     │
//!     ├── render         ──► ArticlePlugin, HtmlPlugin
//!     │
//!     ├── walk output    ──► every generated path
//!     │
//!     └── post-generate  ──► MinifyPlugin
//! ```
//!
//! Each phase, pool drain included, finishes before the next one starts.

use crate::{
    config::SiteConfig,
    generator::Generator,
    log,
    plugin::{
        ArticlePlugin, HtmlPlugin, MinifyPlugin, Plugin, PluginDispatcher, PluginRegistry,
        StaticFilesPlugin,
    },
    site::Loader,
    utils::fs::collect_all_files,
};
use anyhow::{Context, Result};
use std::{fs, path::PathBuf, sync::Arc, time::Instant};

/// Plugins of a standard run, in dispatch order.
pub fn default_plugins(config: &Arc<SiteConfig>) -> Vec<Arc<dyn Plugin>> {
    let mut plugins: Vec<Arc<dyn Plugin>> = vec![
        Arc::new(ArticlePlugin::new(Arc::clone(config))),
        Arc::new(HtmlPlugin::new(Arc::clone(config))),
        Arc::new(StaticFilesPlugin::new(Arc::clone(config))),
    ];
    if config.build.minify {
        plugins.push(Arc::new(MinifyPlugin::new(Arc::clone(config))));
    }
    plugins
}

/// Generate the site with the standard plugins.
pub fn generate_site(config: &Arc<SiteConfig>) -> Result<Vec<PathBuf>> {
    build_site(config, default_plugins(config))
}

/// Run every phase with `plugins` and return the generated output paths.
pub fn build_site(config: &SiteConfig, plugins: Vec<Arc<dyn Plugin>>) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    let registry = PluginRegistry::new(plugins);
    let dispatcher = PluginDispatcher::new(&registry);

    fs::create_dir_all(&config.output)
        .with_context(|| format!("Failed to create output {}", config.output.display()))?;

    log!("load"; "{}", config.site_root.display());
    let (templates, site) = Loader::new(config).load()?;

    dispatcher.dispatch_post_load(&site)?;

    Generator::new(&registry).generate(&site, &templates)?;

    let generated = collect_all_files(&config.output)?;
    log!("post-generate"; "{} files in {}", generated.len(), config.output.display());
    dispatcher.dispatch_post_generate(&generated)?;

    log!("build"; "done in {:.2?}", start.elapsed());
    Ok(generated)
}
