//! Plugin capabilities, registry and dispatch.
//!
//! A plugin declares which lifecycle events it takes part in by returning
//! itself from the matching `as_*` method. The registry asks every plugin
//! once at startup and keeps one ordered list per capability:
//!
//! | Capability           | Event                | Trait                  |
//! |----------------------|----------------------|------------------------|
//! | render               | generation           | [`RenderPlugin`]       |
//! | post-load            | files discovered     | [`PostLoadPlugin`]     |
//! | post-generate        | output walked        | [`PostGeneratePlugin`] |
//! | template functions   | engine construction  | [`FunctionProvider`]   |
//!
//! Dispatch runs plugins in registration order and stops at the first
//! failure. Function namespaces are merged in the same order, and a later
//! provider replaces an earlier provider's function of the same name.

pub mod article;
pub mod html;
pub mod minify;
pub mod static_files;

pub use article::ArticlePlugin;
pub use html::HtmlPlugin;
pub use minify::MinifyPlugin;
pub use static_files::StaticFilesPlugin;

use crate::{
    engine::{FunctionMap, TemplateEngine},
    log,
    site::{SiteFiles, Templates},
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

// ============================================================================
// Capabilities
// ============================================================================

/// A configured pipeline unit.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn as_render(self: Arc<Self>) -> Option<Arc<dyn RenderPlugin>> {
        None
    }

    fn as_post_load(self: Arc<Self>) -> Option<Arc<dyn PostLoadPlugin>> {
        None
    }

    fn as_post_generate(self: Arc<Self>) -> Option<Arc<dyn PostGeneratePlugin>> {
        None
    }

    fn as_function_provider(self: Arc<Self>) -> Option<Arc<dyn FunctionProvider>> {
        None
    }
}

/// Turns discovered files into output files.
pub trait RenderPlugin: Plugin {
    fn render(
        &self,
        engine: &TemplateEngine,
        site: &SiteFiles,
        templates: &Templates,
    ) -> Result<()>;
}

/// Runs once after discovery, before rendering.
pub trait PostLoadPlugin: Plugin {
    fn after_load(&self, site: &SiteFiles) -> Result<()>;
}

/// Runs once over every generated output path.
pub trait PostGeneratePlugin: Plugin {
    fn after_generate(&self, files: &[PathBuf]) -> Result<()>;
}

/// Contributes functions to the template namespace.
pub trait FunctionProvider: Plugin {
    fn functions(&self) -> FunctionMap;
}

// ============================================================================
// Registry
// ============================================================================

/// Plugins sorted into capability buckets, each in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    render: Vec<Arc<dyn RenderPlugin>>,
    post_load: Vec<Arc<dyn PostLoadPlugin>>,
    post_generate: Vec<Arc<dyn PostGeneratePlugin>>,
    providers: Vec<Arc<dyn FunctionProvider>>,
}

impl PluginRegistry {
    pub fn new(plugins: Vec<Arc<dyn Plugin>>) -> Self {
        let mut registry = Self::default();
        for plugin in plugins {
            if let Some(p) = Arc::clone(&plugin).as_render() {
                registry.render.push(p);
            }
            if let Some(p) = Arc::clone(&plugin).as_post_load() {
                registry.post_load.push(p);
            }
            if let Some(p) = Arc::clone(&plugin).as_post_generate() {
                registry.post_generate.push(p);
            }
            if let Some(p) = plugin.as_function_provider() {
                registry.providers.push(p);
            }
        }
        registry
    }

    pub fn render_plugins(&self) -> &[Arc<dyn RenderPlugin>] {
        &self.render
    }

    pub fn post_load_plugins(&self) -> &[Arc<dyn PostLoadPlugin>] {
        &self.post_load
    }

    pub fn post_generate_plugins(&self) -> &[Arc<dyn PostGeneratePlugin>] {
        &self.post_generate
    }

    #[cfg(test)]
    pub fn function_providers(&self) -> &[Arc<dyn FunctionProvider>] {
        &self.providers
    }

    /// Fold every provider's functions into one namespace.
    ///
    /// Providers are applied in registration order; on a name collision the
    /// later provider wins.
    pub fn merge_functions(&self) -> FunctionMap {
        let mut merged = FunctionMap::new();
        for provider in &self.providers {
            for (name, function) in provider.functions() {
                if merged.insert(name.clone(), function).is_some() {
                    log!("warn"; "template function `{}` replaced by {}", name, provider.name());
                }
            }
        }
        merged
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Runs one lifecycle event over its bucket, in order, failing fast.
pub struct PluginDispatcher<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> PluginDispatcher<'a> {
    pub const fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    pub fn dispatch_render(
        &self,
        engine: &TemplateEngine,
        site: &SiteFiles,
        templates: &Templates,
    ) -> Result<()> {
        for plugin in self.registry.render_plugins() {
            log!("render"; "{}", plugin.name());
            plugin
                .render(engine, site, templates)
                .with_context(|| format!("Plugin `{}` failed to render", plugin.name()))?;
        }
        Ok(())
    }

    pub fn dispatch_post_load(&self, site: &SiteFiles) -> Result<()> {
        for plugin in self.registry.post_load_plugins() {
            log!("post-load"; "{}", plugin.name());
            plugin
                .after_load(site)
                .with_context(|| format!("Plugin `{}` failed after load", plugin.name()))?;
        }
        Ok(())
    }

    pub fn dispatch_post_generate(&self, files: &[PathBuf]) -> Result<()> {
        for plugin in self.registry.post_generate_plugins() {
            log!("post-generate"; "{}", plugin.name());
            plugin
                .after_generate(files)
                .with_context(|| format!("Plugin `{}` failed after generate", plugin.name()))?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
