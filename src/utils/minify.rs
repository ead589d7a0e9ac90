//! Minification utilities for HTML, CSS and JavaScript.
//!
//! Everything goes through `minify_html`. Stylesheets and scripts are
//! wrapped in a `<style>`/`<script>` element, minified as HTML with CSS/JS
//! minification enabled, and unwrapped again.

use std::borrow::Cow;

// ============================================================================
// Types
// ============================================================================

/// Content type for minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinifyType {
    Html,
    Css,
    Js,
}

impl MinifyType {
    /// Map a media type identifier to a minifier.
    ///
    /// JavaScript accepts the `application/` and `text/` families, with or
    /// without the `x-` prefix, for both `javascript` and `ecmascript`.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type.trim() {
            "text/html" => Some(Self::Html),
            "text/css" => Some(Self::Css),
            other => {
                let (family, subtype) = other.split_once('/')?;
                let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
                let is_family = matches!(family, "application" | "text");
                let is_script = matches!(subtype, "javascript" | "ecmascript");
                (is_family && is_script).then_some(Self::Js)
            }
        }
    }

    /// Element used to carry non-HTML content through the HTML minifier.
    const fn wrapper(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Html => None,
            Self::Css => Some(("<style>", "</style>")),
            Self::Js => Some(("<script>", "</script>")),
        }
    }
}

// ============================================================================
// Unified Minify Function
// ============================================================================

/// Minify `content` as `kind`.
///
/// Returns `Cow::Borrowed` when a wrapped stylesheet or script cannot be
/// unwrapped after minification, `Cow::Owned` otherwise.
pub fn minify(kind: MinifyType, content: &[u8]) -> Cow<'_, [u8]> {
    let Some((open, close)) = kind.wrapper() else {
        return Cow::Owned(minify_html_inner(content));
    };

    let mut wrapped = Vec::with_capacity(content.len() + open.len() + close.len());
    wrapped.extend_from_slice(open.as_bytes());
    wrapped.extend_from_slice(content);
    wrapped.extend_from_slice(close.as_bytes());

    let minified = minify_html_inner(&wrapped);
    minified
        .strip_prefix(open.as_bytes())
        .and_then(|rest| rest.strip_suffix(close.as_bytes()))
        .map_or(Cow::Borrowed(content), |inner| Cow::Owned(inner.to_vec()))
}

// ============================================================================
// Internal Implementation
// ============================================================================

/// Minify HTML content using `minify_html` crate.
fn minify_html_inner(html: &[u8]) -> Vec<u8> {
    let mut cfg = minify_html::Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    minify_html::minify(html, &cfg)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_types() {
        assert_eq!(MinifyType::from_media_type("text/html"), Some(MinifyType::Html));
        assert_eq!(MinifyType::from_media_type("text/css"), Some(MinifyType::Css));
        assert_eq!(
            MinifyType::from_media_type("application/javascript"),
            Some(MinifyType::Js)
        );
        assert_eq!(MinifyType::from_media_type("text/x-ecmascript"), Some(MinifyType::Js));
        assert_eq!(MinifyType::from_media_type("image/javascript"), None);
        assert_eq!(MinifyType::from_media_type("application/json"), None);
        assert_eq!(MinifyType::from_media_type("text/plain"), None);
    }

    #[test]
    fn test_minify_html_basic() {
        let html = b"<html>\n  <head>\n  </head>\n  <body>\n    <p>Hello</p>\n  </body>\n</html>";
        let result = minify(MinifyType::Html, html);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("\n  "));
        assert!(result_str.contains("<p>Hello</p>"));
        assert!(result.len() < html.len());
    }

    #[test]
    fn test_minify_html_drops_comments() {
        let result = minify(MinifyType::Html, b"<p>a</p><!-- note --><p>b</p>");
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("note"));
        assert!(result_str.contains("<p>b</p>"));
    }

    #[test]
    fn test_minify_css_unwrapped() {
        let css = b"body {\n    color: red;\n}\n";
        let result = minify(MinifyType::Css, css);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("<style>"));
        assert!(!result_str.contains('\n'));
        assert!(result_str.contains("red"));
        assert!(result.len() < css.len());
    }

    #[test]
    fn test_minify_js_unwrapped() {
        let js = b"var total = 0;\nfor (var i = 0; i < count; i++) {\n    total += i;\n}\nconsole.log(total);\n";
        let result = minify(MinifyType::Js, js);
        let result_str = String::from_utf8_lossy(&result);

        assert!(!result_str.contains("<script>"));
        assert!(result_str.contains("console.log"));
        assert!(result.len() < js.len());
    }
}
