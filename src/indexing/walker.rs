//! Candidate-file enumeration for index builds.
//!
//! Walks a directory tree respecting gitignore rules, prunes denylisted
//! directory names at any depth, and keeps only files matching the target
//! language's extensions. Output order is deterministic (sorted).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;

use crate::config::Settings;
use crate::parsing::Language;

pub struct FileWalker {
    settings: Arc<Settings>,
}

impl FileWalker {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Enumerate the files to index for `language` under `root`.
    pub fn walk(&self, root: &Path, language: Language) -> Vec<PathBuf> {
        let denylist = self.settings.indexing.ignore_dirs.clone();

        let mut builder = WalkBuilder::new(root);
        builder
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map_or(false, |ft| ft.is_dir());
                if !is_dir {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !denylist.iter().any(|d| d == name))
            });

        let mut files: Vec<PathBuf> = builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map_or(false, |ft| ft.is_file()))
            .map(|entry| entry.into_path())
            .filter(|path| Language::from_path(path) == Some(language))
            .collect();

        files.sort();
        files
    }

    /// Count files that would be indexed (useful for dry runs).
    pub fn count_files(&self, root: &Path, language: Language) -> usize {
        self.walk(root, language).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walker() -> FileWalker {
        FileWalker::new(Arc::new(Settings::default()))
    }

    #[test]
    fn finds_only_the_requested_language() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("main.py"), "def main(): pass\n").unwrap();
        fs::write(root.join("util.py"), "def util(): pass\n").unwrap();
        fs::write(root.join("lib.rs"), "fn lib() {}\n").unwrap();
        fs::write(root.join("README.md"), "# Test\n").unwrap();

        let files = walker().walk(root, Language::Python);
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "py"));
    }

    #[test]
    fn denylisted_directories_are_pruned_at_any_depth() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/node_modules/dep")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join("src/app.js"), "function f() {}\n").unwrap();
        fs::write(
            root.join("src/node_modules/dep/index.js"),
            "function g() {}\n",
        )
        .unwrap();
        fs::write(root.join("__pycache__/cached.js"), "function h() {}\n").unwrap();

        let files = walker().walk(root, Language::JavaScript);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/app.js"));
    }

    #[test]
    fn output_is_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("b.go"), "package b\n").unwrap();
        fs::write(root.join("a.go"), "package a\n").unwrap();

        let files = walker().walk(root, Language::Go);
        assert!(files[0].ends_with("a.go"));
        assert!(files[1].ends_with("b.go"));
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let dir = TempDir::new().unwrap();
        assert_eq!(walker().count_files(dir.path(), Language::Java), 0);
    }
}
