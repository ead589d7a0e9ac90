//! Output file helpers.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
pub const IGNORED_FILES: &[&str] = &[".DS_Store"];

pub fn is_ignored(name: &str) -> bool {
    IGNORED_FILES.contains(&name)
}

/// Create the parent directories of `path`.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: impl AsRef<[u8]>) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Copy `src` to `dst` byte for byte, creating parent directories as needed.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    ensure_parent(dst)?;
    fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Collect every file under `dir` recursively. Walk errors are returned.
pub fn collect_all_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() && !is_ignored(&entry.file_name().to_string_lossy()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a/b/c.html");

        write_file(&path, "hi").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hi");
    }

    #[test]
    fn test_copy_file_byte_identical() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("logo.png");
        let dst = dir.path().join("out/img/logo.png");
        let bytes: Vec<u8> = (0..=255).collect();
        fs::write(&src, &bytes).unwrap();

        copy_file(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), bytes);
    }

    #[test]
    fn test_collect_all_files() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("index.html"), "").unwrap();
        write_file(&dir.path().join("blog/post.html"), "").unwrap();
        write_file(&dir.path().join(".DS_Store"), "").unwrap();

        let files = collect_all_files(dir.path()).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("blog/post.html"), dir.path().join("index.html")]
        );
    }

    #[test]
    fn test_collect_missing_dir_fails() {
        let dir = tempdir().unwrap();
        assert!(collect_all_files(&dir.path().join("missing")).is_err());
    }
}
