//! Template engine.
//!
//! Function providers are folded into one immutable namespace before the
//! engine is built. Every composition then gets a fresh [`Tera`] instance
//! with that namespace registered, so no parsed template outlives the
//! render call that needed it.

use crate::site::Composition;
use anyhow::{Context as _, Result};
use std::{collections::BTreeMap, collections::HashMap, sync::Arc};
use tera::{Context, Function, Tera, Value};

/// A template function that can be registered on many [`Tera`] instances.
#[derive(Clone)]
pub struct SharedFunction(Arc<dyn Function>);

impl SharedFunction {
    pub fn new(function: impl Function + 'static) -> Self {
        Self(Arc::new(function))
    }
}

impl Function for SharedFunction {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

/// Function name to callable.
pub type FunctionMap = BTreeMap<String, SharedFunction>;

/// Renders compositions against a fixed function namespace.
#[derive(Clone, Default)]
pub struct TemplateEngine {
    functions: FunctionMap,
}

impl TemplateEngine {
    pub fn new(functions: FunctionMap) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &FunctionMap {
        &self.functions
    }

    /// Empty Tera instance with every namespace function registered.
    fn instance(&self) -> Tera {
        let mut tera = Tera::default();
        // registered names carry no extension, escape all of them
        tera.autoescape_on(vec![""]);
        for (name, function) in &self.functions {
            tera.register_function(name, function.clone());
        }
        tera
    }

    /// Parse every source of `composition` and execute its entry.
    pub fn render(&self, composition: &Composition, context: &Context) -> Result<String> {
        let mut tera = self.instance();
        let files = composition
            .sources
            .iter()
            .map(|source| (source.path.as_path(), Some(source.name.as_str())))
            .collect::<Vec<_>>();

        tera.add_template_files(files)
            .context("Failed to parse templates")?;
        tera.render(&composition.entry, context)
            .with_context(|| format!("Failed to execute template `{}`", composition.entry))
    }
}
