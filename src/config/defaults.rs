//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// Root Defaults
// ============================================================================

pub mod site {
    use std::path::PathBuf;

    pub fn site_root() -> PathBuf {
        ".".into()
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "output".into()
    }
}

// ============================================================================
// `template` Section Defaults
// ============================================================================

pub mod template {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "template".into()
    }

    pub fn partials() -> PathBuf {
        "partials".into()
    }

    pub fn layout() -> String {
        "index.html".into()
    }
}

// ============================================================================
// `server` Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        6780
    }
}

// ============================================================================
// `build` Section Defaults
// ============================================================================

pub mod build {
    /// Workers per pool; bounds open descriptors, not correctness.
    pub fn workers() -> usize {
        2
    }
}

// ============================================================================
// Plugin Option Defaults
// ============================================================================

pub mod plugins {
    pub const STATIC_EXTENSIONS: &[&str] =
        &[".svg", ".js", ".png", ".jpg", ".jpeg", ".gif", ".css"];

    /// Extension to media type table for the minifier.
    pub const MINIFY_MEDIA_TYPES: &[(&str, &str)] = &[
        (".html", "text/html"),
        (".css", "text/css"),
        (".js", "application/javascript"),
    ];
}
