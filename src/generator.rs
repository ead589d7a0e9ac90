//! Render phase.
//!
//! Builds the template engine from the merged function namespace, then
//! hands the loaded site to every render plugin in registration order.

use crate::{
    engine::TemplateEngine,
    log,
    plugin::{PluginDispatcher, PluginRegistry},
    site::{SiteFiles, Templates},
};
use anyhow::Result;
use std::time::Instant;

pub struct Generator<'a> {
    registry: &'a PluginRegistry,
    engine: TemplateEngine,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a PluginRegistry) -> Self {
        let engine = TemplateEngine::new(registry.merge_functions());
        Self { registry, engine }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Run every render plugin. The first plugin error stops the phase.
    pub fn generate(&self, site: &SiteFiles, templates: &Templates) -> Result<()> {
        let start = Instant::now();
        log!(
            "render";
            "{} plugins, {} template functions",
            self.registry.render_plugins().len(),
            self.engine.functions().len()
        );

        PluginDispatcher::new(self.registry).dispatch_render(&self.engine, site, templates)?;

        log!("render"; "done in {:.2?}", start.elapsed());
        Ok(())
    }
}
