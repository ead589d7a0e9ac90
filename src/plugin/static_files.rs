//! Static asset copy plugin.
//!
//! After discovery, every content file whose extension is in the allow-list
//! is copied byte for byte to its mirrored output path. The allow-list comes
//! from `plugins.static_files.extensions`.

use super::{Plugin, PostLoadPlugin};
use crate::{
    config::{SiteConfig, defaults},
    log,
    pool::TaskPool,
    site::{FileContainer, SiteFiles},
    utils::fs::copy_file,
};
use anyhow::Result;
use std::sync::Arc;

pub struct StaticFilesPlugin {
    config: Arc<SiteConfig>,
    extensions: Vec<String>,
}

impl StaticFilesPlugin {
    pub const NAME: &'static str = "static_files";

    pub fn new(config: Arc<SiteConfig>) -> Self {
        let extensions = config
            .plugin_list(Self::NAME, "extensions")
            .unwrap_or_else(|| {
                defaults::plugins::STATIC_EXTENSIONS
                    .iter()
                    .map(|&ext| ext.to_owned())
                    .collect()
            });
        Self { config, extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Copy the allow-listed files of one directory; failures are per file.
    fn copy_dir(&self, container: &FileContainer) -> usize {
        let mut copied = 0;
        for file in container.filter_ext(&self.extensions) {
            let source = container.full_path(file);
            let target = container.output_path(file);
            match copy_file(&source, &target) {
                Ok(()) => {
                    log!("static"; "{}", target.display());
                    copied += 1;
                }
                Err(err) => log!("error"; "{}: {:#}", source.display(), err),
            }
        }
        copied
    }
}

impl Plugin for StaticFilesPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn as_post_load(self: Arc<Self>) -> Option<Arc<dyn PostLoadPlugin>> {
        Some(self)
    }
}

impl PostLoadPlugin for StaticFilesPlugin {
    fn after_load(&self, site: &SiteFiles) -> Result<()> {
        let pool = TaskPool::new(self.config.build.workers)?;
        let copied = pool.run(&site.containers(), |container| self.copy_dir(container));

        log!("static"; "copied {} files", copied.iter().sum::<usize>());
        Ok(())
    }
}
