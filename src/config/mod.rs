//! Site configuration management.
//!
//! The config file is JSON (`folio.json`) or TOML (any `.toml` file); the
//! extension decides the parser. Every directory is relative to `site_root`,
//! which itself is relative to the directory holding the config file.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | root        | `site_root`, `content`, `output` directories    |
//! | `template`  | template root, partials sub-path, layout name   |
//! | `server`    | development server (interface, port)            |
//! | `build`     | worker count, minification switch               |
//! | `plugins`   | free-form per-plugin options                    |
//!
//! # Example
//!
//! ```json
//! {
//!   "site_root": "_site",
//!   "content": "content",
//!   "output": "output",
//!   "template": { "path": "template", "partials": "partials", "layout": "base.html" },
//!   "plugins": {
//!     "static_files": { "extensions": ".svg,.js,.png,.css" },
//!     "minify": { "media_types": "text/css,text/html" }
//!   },
//!   "server": { "port": 8080 }
//! }
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod template;

pub use error::ConfigError;

use build::BuildConfig;
use serve::ServeConfig;
use template::TemplateConfig;

use anyhow::{Context, Result};
use educe::Educe;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Options of one plugin, keyed by option name.
pub type PluginOptions = serde_json::Map<String, Value>;

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site directory; the other directories are resolved against it.
    #[serde(default = "defaults::site::site_root")]
    #[educe(Default = defaults::site::site_root())]
    pub site_root: PathBuf,

    /// Content root.
    #[serde(default = "defaults::site::content")]
    #[educe(Default = defaults::site::content())]
    pub content: PathBuf,

    /// Output root, mirrors the content tree.
    #[serde(default = "defaults::site::output")]
    #[educe(Default = defaults::site::output())]
    pub output: PathBuf,

    #[serde(default)]
    pub template: TemplateConfig,

    #[serde(default)]
    pub server: ServeConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub plugins: HashMap<String, PluginOptions>,
}

impl SiteConfig {
    /// Parse configuration from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a config file, choosing the format by extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Load, resolve and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        let mut config = Self::from_path(&expanded)
            .with_context(|| format!("Failed to load config {}", expanded.display()))?;

        config.config_path = Self::normalize_path(&expanded);
        let base = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.resolve(&base);
        config.validate()?;

        Ok(config)
    }

    /// Make every directory absolute, `site_root` against `base` and the
    /// rest against `site_root`.
    pub fn resolve(&mut self, base: &Path) {
        let site_root = shellexpand::tilde(&self.site_root.to_string_lossy()).into_owned();
        self.site_root = Self::normalize_path(&base.join(site_root));

        self.content = Self::normalize_path(&self.site_root.join(&self.content));
        self.output = Self::normalize_path(&self.site_root.join(&self.output));

        // `template/partials` names the partials from the site root
        if self.template.partials.starts_with(&self.template.path) {
            self.template.partials =
                Self::normalize_path(&self.site_root.join(&self.template.partials));
        }
        self.template.path = Self::normalize_path(&self.site_root.join(&self.template.path));
    }

    /// Absolute partials directory. After [`Self::resolve`] `partials` is
    /// either relative to the template path or already absolute.
    pub fn partials_dir(&self) -> PathBuf {
        self.template.path.join(&self.template.partials)
    }

    /// Options block of a plugin, if configured.
    pub fn plugin_options(&self, plugin: &str) -> Option<&PluginOptions> {
        self.plugins.get(plugin)
    }

    /// Read a list option, given either as a comma-separated string or as
    /// an array of strings. Entries are trimmed and empty ones dropped.
    pub fn plugin_list(&self, plugin: &str, key: &str) -> Option<Vec<String>> {
        let value = self.plugin_options(plugin)?.get(key)?;
        let items: Vec<String> = match value {
            Value::String(s) => s.split(',').map(|s| s.trim().to_owned()).collect(),
            Value::Array(values) => values
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_owned())
                .collect(),
            _ => return None,
        };
        Some(items.into_iter().filter(|s| !s.is_empty()).collect())
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_dir("content", &self.content)?;
        Self::check_dir("template.path", &self.template.path)?;

        if self.output.is_file() {
            return Err(ConfigError::Validation(format!(
                "[output] `{}` is a file, expected a directory",
                self.output.display()
            )));
        }
        if self.template.layout.trim().is_empty() {
            return Err(ConfigError::Validation(
                "[template.layout] must not be empty".into(),
            ));
        }
        if self.template.partials.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "[template.partials] must not be empty".into(),
            ));
        }
        if self.build.workers == 0 {
            return Err(ConfigError::Validation(
                "[build.workers] must be at least 1".into(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "[server.port] must not be 0".into(),
            ));
        }

        Ok(())
    }

    fn check_dir(field: &str, path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Validation(format!(
                "[{field}] `{}` not found",
                path.display()
            )));
        }
        if !path.is_dir() {
            return Err(ConfigError::Validation(format!(
                "[{field}] `{}` is not a directory",
                path.display()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn site_fixture(root: &Path) {
        fs::create_dir_all(root.join("_site/content")).unwrap();
        fs::create_dir_all(root.join("_site/template/partials")).unwrap();
    }

    #[test]
    fn test_full_json_config() {
        let config = SiteConfig::from_json_str(
            r#"{
              "output": "out",
              "content": "content",
              "template": { "path": "template", "partials": "partials", "layout": "base.html" },
              "plugins": {
                "static_files": { "extensions": ".svg,.js,.png,.jpg,.jpeg,.gif,.css" },
                "minify": { "media_types": "text/css,text/html,application/javascript" }
              },
              "server": { "port": 8080 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.content, PathBuf::from("content"));
        assert_eq!(
            config.plugin_list("static_files", "extensions").unwrap(),
            vec![".svg", ".js", ".png", ".jpg", ".jpeg", ".gif", ".css"]
        );
        assert_eq!(
            config.plugin_list("minify", "media_types").unwrap(),
            vec!["text/css", "text/html", "application/javascript"]
        );
    }

    #[test]
    fn test_plugin_list_array_form() {
        let config = SiteConfig::from_json_str(
            r#"{ "plugins": { "static_files": { "extensions": [" .css", ".js", ""] } } }"#,
        )
        .unwrap();

        assert_eq!(
            config.plugin_list("static_files", "extensions").unwrap(),
            vec![".css", ".js"]
        );
        assert!(config.plugin_list("static_files", "missing").is_none());
        assert!(config.plugin_list("unknown", "extensions").is_none());
    }

    #[test]
    fn test_toml_config() {
        let config = SiteConfig::from_toml_str(
            r#"
            output = "public"

            [template]
            layout = "base.html"

            [plugins.static_files]
            extensions = [".png"]
            "#,
        )
        .unwrap();

        assert_eq!(config.output, PathBuf::from("public"));
        assert_eq!(config.template.layout, "base.html");
        assert_eq!(
            config.plugin_list("static_files", "extensions").unwrap(),
            vec![".png"]
        );
    }

    #[test]
    fn test_unknown_root_field_rejected() {
        assert!(SiteConfig::from_json_str(r#"{ "unknown": 1 }"#).is_err());
    }

    #[test]
    fn test_load_resolves_relative_to_config_dir() {
        let dir = tempdir().unwrap();
        site_fixture(dir.path());
        let path = dir.path().join("folio.json");
        fs::write(&path, r#"{ "site_root": "_site" }"#).unwrap();

        let config = SiteConfig::load(&path).unwrap();
        let site = dir.path().canonicalize().unwrap().join("_site");

        assert_eq!(config.site_root, site);
        assert_eq!(config.content, site.join("content"));
        assert_eq!(config.output, site.join("output"));
        assert_eq!(config.template.path, site.join("template"));
        assert_eq!(config.partials_dir(), site.join("template").join("partials"));
    }

    const LEGACY_CONFIG: &str = r#"{
      "output": "out",
      "content": "content",
      "template": {
        "path": "template",
        "base_template": "template/base.html",
        "partials": "template/partials"
      },
      "plugins": {
        "static_files": { "extensions": ".svg,.js,.png,.jpg,.jpeg,.gif,.css" },
        "minify_plugin": { "media_types": "text/css,text/html,application/javascript" }
      },
      "server": { "port": "8080" }
    }"#;

    #[test]
    fn test_legacy_config_parses() {
        let config = SiteConfig::from_json_str(LEGACY_CONFIG).unwrap();

        assert_eq!(config.output, PathBuf::from("out"));
        assert_eq!(config.content, PathBuf::from("content"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.plugin_list("minify_plugin", "media_types").unwrap(),
            vec!["text/css", "text/html", "application/javascript"]
        );
    }

    #[test]
    fn test_load_legacy_partials_from_site_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("content")).unwrap();
        fs::create_dir_all(dir.path().join("template/partials")).unwrap();
        let path = dir.path().join("folio.json");
        fs::write(&path, LEGACY_CONFIG).unwrap();

        let config = SiteConfig::load(&path).unwrap();
        let site = dir.path().canonicalize().unwrap();

        assert_eq!(config.template.path, site.join("template"));
        assert_eq!(config.partials_dir(), site.join("template").join("partials"));
        assert_eq!(config.output, site.join("out"));
    }

    #[test]
    fn test_load_missing_content_fails_validation() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("template")).unwrap();
        let path = dir.path().join("folio.json");
        fs::write(&path, "{}").unwrap();

        let err = SiteConfig::load(&path).unwrap_err();
        let err = err.downcast_ref::<ConfigError>().unwrap();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("[content]")));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        assert!(SiteConfig::load(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let dir = tempdir().unwrap();
        site_fixture(dir.path());
        let mut config = SiteConfig::from_json_str(
            r#"{ "site_root": "_site", "build": { "workers": 0 } }"#,
        )
        .unwrap();
        config.resolve(dir.path());

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(msg)) if msg.contains("workers")
        ));
    }

    #[test]
    fn test_validate_rejects_empty_layout() {
        let dir = tempdir().unwrap();
        site_fixture(dir.path());
        let mut config = SiteConfig::from_json_str(
            r#"{ "site_root": "_site", "template": { "layout": " " } }"#,
        )
        .unwrap();
        config.resolve(dir.path());

        assert!(config.validate().is_err());
    }
}
