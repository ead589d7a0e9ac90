//! Discovered site files.
//!
//! The loader groups every content file by the directory it sits in. A
//! [`FileContainer`] is one such directory, and [`SiteFiles`] maps each
//! directory to its container. Both are frozen once discovery completes.
//!
//! ```text
//! content/                    SiteFiles
//! ├── index.html              ├── content/       → [index.html, logo.png]
//! ├── logo.png                └── content/blog/  → [first.md, second.md]
//! └── blog/
//!     ├── first.md
//!     └── second.md
//! ```

pub mod loader;
pub mod templates;

pub use loader::Loader;
pub use templates::{Composition, TemplateSource, Templates};

use rustc_hash::FxHashMap;
use std::path::{Component, Path, PathBuf};

/// Extension of plain HTML pages and templates.
pub const HTML: &str = ".html";
/// Extension of markdown articles.
pub const MD: &str = ".md";

// ============================================================================
// File
// ============================================================================

/// Name of a single entry inside one directory (no path component).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(String);

impl File {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Extension including the leading dot (`"a.html"` → `".html"`).
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.0)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
    }

    /// Whether the extension is one of `extensions` (dotted form).
    pub fn has_extension<S: AsRef<str>>(&self, extensions: &[S]) -> bool {
        self.extension()
            .is_some_and(|ext| extensions.iter().any(|e| e.as_ref() == ext))
    }
}

// ============================================================================
// FileContainer
// ============================================================================

/// The files found directly inside one content directory.
#[derive(Debug, Clone)]
pub struct FileContainer {
    entry: PathBuf,
    files: Vec<File>,
    content_root: PathBuf,
    output_root: PathBuf,
}

impl FileContainer {
    pub fn new(content_root: &Path, output_root: &Path, entry: &Path) -> Self {
        Self {
            entry: entry.to_path_buf(),
            files: Vec::new(),
            content_root: content_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
        }
    }

    /// Record a file observed directly under `entry`.
    pub fn add(&mut self, name: impl Into<String>) {
        self.files.push(File::new(name));
    }

    /// Absolute source directory.
    pub fn entry(&self) -> &Path {
        &self.entry
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Directory relative to the content root (empty for the root itself).
    pub fn relative_dir(&self) -> &Path {
        self.entry
            .strip_prefix(&self.content_root)
            .unwrap_or(Path::new(""))
    }

    /// Relative directory as a forward-slash string, used in permalinks and
    /// collection keys.
    pub fn relative_key(&self) -> String {
        path_key(self.relative_dir())
    }

    /// Number of path segments below the content root.
    pub fn depth(&self) -> usize {
        depth_of(self.relative_dir())
    }

    /// Output directory mirroring `entry` under the output root.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(self.relative_dir())
    }

    /// Full source path of `file`.
    pub fn full_path(&self, file: &File) -> PathBuf {
        self.entry.join(file.name())
    }

    /// Output path of `file`: the content root prefix swapped for the
    /// output root.
    pub fn output_path(&self, file: &File) -> PathBuf {
        self.output_dir().join(file.name())
    }

    /// Members whose extension is in `extensions`.
    pub fn filter_ext<S: AsRef<str>>(&self, extensions: &[S]) -> Vec<&File> {
        self.files
            .iter()
            .filter(|f| f.has_extension(extensions))
            .collect()
    }
}

// ============================================================================
// SiteFiles
// ============================================================================

/// Mapping from directory to its container.
#[derive(Debug, Default)]
pub struct SiteFiles {
    containers: FxHashMap<PathBuf, FileContainer>,
}

impl SiteFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` to the container of `dir`, creating it on first sight.
    pub fn add_file(&mut self, content_root: &Path, output_root: &Path, dir: &Path, name: &str) {
        self.containers
            .entry(dir.to_path_buf())
            .or_insert_with(|| FileContainer::new(content_root, output_root, dir))
            .add(name);
    }

    #[cfg(test)]
    pub fn get(&self, dir: &Path) -> Option<&FileContainer> {
        self.containers.get(dir)
    }

    /// All containers, in no particular order.
    pub fn containers(&self) -> Vec<&FileContainer> {
        self.containers.values().collect()
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Total number of files across containers.
    pub fn file_count(&self) -> usize {
        self.containers.values().map(|c| c.files.len()).sum()
    }
}

// ============================================================================
// Path helpers
// ============================================================================

/// Count of normal segments in a relative path.
pub fn depth_of(path: &Path) -> usize {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
}

/// Forward-slash form of a relative path.
pub fn path_key(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
