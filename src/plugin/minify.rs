//! Post-generate minification plugin.
//!
//! Generated files are matched by extension against the media type table
//! and rewritten in place. The write is not atomic: a crash mid-write leaves
//! a partial file. `plugins.minify.media_types` narrows the table; older
//! configs name the block `minify_plugin`.

use super::{Plugin, PostGeneratePlugin};
use crate::{
    config::{SiteConfig, defaults},
    log,
    pool::TaskPool,
    utils::minify::{MinifyType, minify},
};
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

pub struct MinifyPlugin {
    config: Arc<SiteConfig>,
    /// Dotted extension to minifier.
    media_types: Vec<(String, MinifyType)>,
}

impl MinifyPlugin {
    pub const NAME: &'static str = "minify";
    /// Options block name used by older configs.
    pub const LEGACY_NAME: &'static str = "minify_plugin";

    pub fn new(config: Arc<SiteConfig>) -> Self {
        let enabled = config
            .plugin_list(Self::NAME, "media_types")
            .or_else(|| config.plugin_list(Self::LEGACY_NAME, "media_types"));
        let media_types = defaults::plugins::MINIFY_MEDIA_TYPES
            .iter()
            .filter(|(_, media)| {
                enabled
                    .as_ref()
                    .is_none_or(|list| list.iter().any(|m| m == media))
            })
            .filter_map(|&(ext, media)| {
                MinifyType::from_media_type(media).map(|kind| (ext.to_owned(), kind))
            })
            .collect();
        Self {
            config,
            media_types,
        }
    }

    /// Minifier for `path`, if its extension is enabled.
    pub fn media_type(&self, path: &Path) -> Option<MinifyType> {
        let ext = format!(".{}", path.extension()?.to_str()?);
        self.media_types
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|&(_, kind)| kind)
    }

    fn minify_file(path: &Path, kind: MinifyType) -> Result<()> {
        let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let minified = minify(kind, &content);
        fs::write(path, &*minified).with_context(|| format!("Failed to write {}", path.display()))
    }
}

impl Plugin for MinifyPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_post_generate(self: Arc<Self>) -> Option<Arc<dyn PostGeneratePlugin>> {
        Some(self)
    }
}

impl PostGeneratePlugin for MinifyPlugin {
    fn after_generate(&self, files: &[PathBuf]) -> Result<()> {
        let targets: Vec<(&PathBuf, MinifyType)> = files
            .iter()
            .filter_map(|path| self.media_type(path).map(|kind| (path, kind)))
            .collect();

        let pool = TaskPool::new(self.config.build.workers)?;
        let minified = pool.run_isolated(
            &targets,
            |(path, _)| path.display().to_string(),
            |&(path, kind)| {
                Self::minify_file(path, kind)?;
                log!("minify"; "{}", path.display());
                Ok(())
            },
        );

        log!("minify"; "minified {} of {} files", minified.len(), files.len());
        Ok(())
    }
}
