//! Template manifest and composition order.
//!
//! Templates are classified once at load time:
//!
//! - **layout**: the file whose name equals the configured layout name
//! - **partials**: every template under the partials directory
//! - **pages**: everything else
//!
//! Every composition starts with the ordered base `[layout, partials..]`.
//! HTML pages then add the page templates sitting at the same directory
//! depth as the page, and finally the page itself:
//!
//! ```text
//! content/blog/2024/index.html   (depth 2)
//!
//!   layout            template/base.html
//!   partials          template/partials/head.html, template/partials/nav.html
//!   depth-2 pages     template/blog/list/item.html
//!   page              content/blog/2024/index.html
//! ```
//!
//! The page is the template executed, so a content page must start with
//! `{% extends "layout" %}` to be wrapped in the base layout. Without it the
//! page renders on its own.

use super::depth_of;
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Registered name of the base layout.
pub const LAYOUT: &str = "layout";
/// Registered name of the content page being rendered.
pub const PAGE: &str = "page";

/// One template file and the name it is registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub name: String,
    pub path: PathBuf,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// An ordered template set and the name to execute.
///
/// Tera resolves inheritance from child to parent, so the entry is the most
/// specific template of the set: the page for HTML, the article template for
/// articles, or the layout when nothing more specific exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub sources: Vec<TemplateSource>,
    pub entry: String,
}

/// Which bucket a template landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Layout,
    Partial,
    Page,
}

/// Classified template files.
#[derive(Debug, Clone, Default)]
pub struct Templates {
    root: PathBuf,
    layout: Option<PathBuf>,
    partials: Vec<PathBuf>,
    pages: Vec<PathBuf>,
}

impl Templates {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Sort a template into its bucket.
    ///
    /// A second file matching the layout name replaces the first (last
    /// writer wins); the replaced path is returned so the caller can warn.
    pub fn classify(
        &mut self,
        path: &Path,
        layout_name: &str,
        partials_dir: &Path,
    ) -> (TemplateKind, Option<PathBuf>) {
        let is_layout = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy() == layout_name);

        if is_layout {
            let replaced = self.layout.replace(path.to_path_buf());
            (TemplateKind::Layout, replaced)
        } else if path.starts_with(partials_dir) {
            self.partials.push(path.to_path_buf());
            (TemplateKind::Partial, None)
        } else {
            self.pages.push(path.to_path_buf());
            (TemplateKind::Page, None)
        }
    }

    pub fn layout(&self) -> Option<&Path> {
        self.layout.as_deref()
    }

    pub fn partials(&self) -> &[PathBuf] {
        &self.partials
    }

    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    /// Name a template is registered under: its path relative to the root.
    pub fn source(&self, path: &Path) -> TemplateSource {
        let name = path
            .strip_prefix(&self.root)
            .map(super::path_key)
            .unwrap_or_else(|_| path.to_string_lossy().into_owned());
        TemplateSource::new(name, path)
    }

    /// `[layout, partials..]`, prepended to every composition.
    pub fn base_ordered(&self) -> Vec<TemplateSource> {
        self.layout
            .iter()
            .map(|layout| TemplateSource::new(LAYOUT, layout))
            .chain(self.partials.iter().map(|p| self.source(p)))
            .collect()
    }

    /// Base set plus every page template whose directory depth below the
    /// template root equals `depth`.
    pub fn for_depth(&self, depth: usize) -> Vec<TemplateSource> {
        let mut seen: FxHashSet<PathBuf> = FxHashSet::default();
        let mut sources = Vec::new();

        let depth_pages = self
            .pages
            .iter()
            .filter(|page| self.page_depth(page) == depth)
            .map(|page| self.source(page));

        for source in self.base_ordered().into_iter().chain(depth_pages) {
            if seen.insert(source.path.clone()) {
                sources.push(source);
            }
        }
        sources
    }

    /// Full composition for a content page at `depth`, the page last.
    pub fn for_page(&self, page: &Path, depth: usize) -> Composition {
        let mut sources = self.for_depth(depth);
        sources.retain(|s| s.path != page);
        sources.push(TemplateSource::new(PAGE, page));
        Composition {
            sources,
            entry: PAGE.to_owned(),
        }
    }

    /// Composition for an article rendered with the template file `name`
    /// (relative to the root). An empty name executes the layout.
    pub fn for_article(&self, name: &str) -> Composition {
        let mut sources = self.base_ordered();
        let name = name.trim();
        if name.is_empty() {
            return Composition {
                sources,
                entry: LAYOUT.to_owned(),
            };
        }

        let path = self.root.join(name);
        sources.retain(|s| s.path != path);
        let source = self.source(&path);
        let entry = source.name.clone();
        sources.push(source);
        Composition { sources, entry }
    }

    fn page_depth(&self, page: &Path) -> usize {
        page.parent()
            .and_then(|dir| dir.strip_prefix(&self.root).ok())
            .map(depth_of)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT: &str = "/t";

    fn manifest() -> Templates {
        let mut t = Templates::new(ROOT);
        let partials = Path::new("/t/partials");
        for path in [
            "/t/base.html",
            "/t/partials/head.html",
            "/t/partials/nav.html",
            "/t/home.html",
            "/t/blog/list.html",
            "/t/blog/2024/item.html",
            "/t/docs/api/ref.html",
        ] {
            t.classify(Path::new(path), "base.html", partials);
        }
        t
    }

    fn paths(sources: &[TemplateSource]) -> Vec<&str> {
        sources.iter().map(|s| s.path.to_str().unwrap()).collect()
    }

    #[test]
    fn test_classify_buckets() {
        let t = manifest();

        assert_eq!(t.layout(), Some(Path::new("/t/base.html")));
        assert_eq!(t.partials().len(), 2);
        assert_eq!(t.pages().len(), 4);
    }

    #[test]
    fn test_layout_collision_last_writer_wins() {
        let mut t = Templates::new(ROOT);
        let partials = Path::new("/t/partials");

        let (kind, replaced) = t.classify(Path::new("/t/a/base.html"), "base.html", partials);
        assert_eq!(kind, TemplateKind::Layout);
        assert!(replaced.is_none());

        let (_, replaced) = t.classify(Path::new("/t/b/base.html"), "base.html", partials);
        assert_eq!(replaced, Some(PathBuf::from("/t/a/base.html")));
        assert_eq!(t.layout(), Some(Path::new("/t/b/base.html")));
    }

    #[test]
    fn test_base_ordered_layout_first() {
        let t = manifest();
        let base = t.base_ordered();

        assert_eq!(base[0].name, LAYOUT);
        assert_eq!(
            paths(&base),
            vec!["/t/base.html", "/t/partials/head.html", "/t/partials/nav.html"]
        );
        assert_eq!(base[1].name, "partials/head.html");
    }

    #[test]
    fn test_for_page_depth_two() {
        let t = manifest();
        let composition = t.for_page(Path::new("/c/blog/2024/index.html"), 2);
        let sources = composition.sources;

        assert_eq!(
            paths(&sources),
            vec![
                "/t/base.html",
                "/t/partials/head.html",
                "/t/partials/nav.html",
                "/t/blog/2024/item.html",
                "/t/docs/api/ref.html",
                "/c/blog/2024/index.html",
            ]
        );
        assert_eq!(sources.last().unwrap().name, PAGE);
        assert_eq!(composition.entry, PAGE);
    }

    #[test]
    fn test_for_page_depth_zero() {
        let t = manifest();
        let sources = t.for_page(Path::new("/c/index.html"), 0).sources;

        assert_eq!(
            paths(&sources),
            vec![
                "/t/base.html",
                "/t/partials/head.html",
                "/t/partials/nav.html",
                "/t/home.html",
                "/c/index.html",
            ]
        );
    }

    #[test]
    fn test_partial_at_same_depth_not_duplicated() {
        // partials/ is at depth 1, like blog/
        let t = manifest();
        let sources = t.for_depth(1);

        let head = sources
            .iter()
            .filter(|s| s.path == Path::new("/t/partials/head.html"))
            .count();
        assert_eq!(head, 1);
        assert_eq!(
            paths(&sources),
            vec![
                "/t/base.html",
                "/t/partials/head.html",
                "/t/partials/nav.html",
                "/t/blog/list.html",
            ]
        );
    }

    #[test]
    fn test_for_article() {
        let t = manifest();

        let plain = t.for_article("");
        assert_eq!(plain.entry, LAYOUT);
        assert_eq!(plain.sources.len(), 3);

        let with = t.for_article("blog/list.html");
        assert_eq!(with.entry, "blog/list.html");
        assert_eq!(with.sources.len(), 4);
        assert_eq!(with.sources.last().unwrap().path, PathBuf::from("/t/blog/list.html"));
    }

    #[test]
    fn test_missing_layout_base_has_only_partials() {
        let mut t = Templates::new(ROOT);
        t.classify(Path::new("/t/partials/a.html"), "base.html", Path::new("/t/partials"));

        assert_eq!(paths(&t.base_ordered()), vec!["/t/partials/a.html"]);
    }
}
