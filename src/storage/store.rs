//! Collection root: opens, creates, and enumerates named collections.
//!
//! Layout on disk: `<root>/collections/<name>.json`, one document per
//! collection. The root is a stable location reused across runs and is
//! passed in explicitly; there is no ambient default path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::collection::Collection;
use crate::storage::error::{StorageError, StorageResult};

pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    /// Open (creating if necessary) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("collections"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Open an existing collection; errors if it was never created.
    pub fn collection(&self, name: &str) -> StorageResult<Collection> {
        let path = self.collection_path(name)?;
        if !path.exists() {
            return Err(StorageError::CollectionNotFound(name.to_string()));
        }
        Collection::load(name, path)
    }

    /// Open a collection, creating an empty one on first use.
    pub fn get_or_create(&self, name: &str) -> StorageResult<Collection> {
        Collection::load(name, self.collection_path(name)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.collection_path(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Names of all persisted collections, sorted.
    pub fn list_collections(&self) -> StorageResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.root.join("collections"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn collection_path(&self, name: &str) -> StorageResult<PathBuf> {
        // Collection names come from the fixed `functions_<lang>`
        // convention; anything path-like is rejected outright.
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join("collections").join(format!("{name}.json")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_collection_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path()).unwrap();
        let err = store.collection("functions_py").unwrap_err();
        assert!(matches!(err, StorageError::CollectionNotFound(_)));
    }

    #[test]
    fn get_or_create_then_reopen() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path()).unwrap();

        let mut coll = store.get_or_create("functions_py").unwrap();
        coll.upsert(&[], &[], &[], &[]).unwrap();

        // An existing (if empty) collection is not an error.
        let coll = store.collection("functions_py").unwrap();
        assert!(coll.is_empty());
    }

    #[test]
    fn list_collections_is_sorted() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path()).unwrap();
        store
            .get_or_create("functions_rs")
            .unwrap()
            .upsert(&[], &[], &[], &[])
            .unwrap();
        store
            .get_or_create("functions_py")
            .unwrap()
            .upsert(&[], &[], &[], &[])
            .unwrap();

        assert_eq!(
            store.list_collections().unwrap(),
            vec!["functions_py", "functions_rs"]
        );
    }

    #[test]
    fn path_like_names_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path()).unwrap();
        assert!(store.collection("../escape").is_err());
        assert!(!store.contains("a/b"));
    }
}
