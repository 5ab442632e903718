//! A named, persistent set of index entries with brute-force
//! nearest-neighbor search.
//!
//! Each collection is one JSON document on disk. Entries are keyed by id
//! in a `BTreeMap`, so enumeration order is deterministic. Mutations are
//! written back eagerly; the write goes to a sibling temp file first and
//! is renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::error::{StorageError, StorageResult};
use crate::types::FunctionMetadata;

/// The persisted, embedding-augmented projection of a function record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document: String,
    pub embedding: Vec<f32>,
    pub metadata: FunctionMetadata,
}

/// One search result: an entry plus its distance from the query vector,
/// smaller is nearer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    pub id: String,
    pub document: String,
    pub metadata: FunctionMetadata,
    pub distance: f32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionData {
    entries: BTreeMap<String, IndexEntry>,
}

#[derive(Debug)]
pub struct Collection {
    name: String,
    path: PathBuf,
    data: CollectionData,
}

impl Collection {
    pub(crate) fn load(name: &str, path: PathBuf) -> StorageResult<Self> {
        let data = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            CollectionData::default()
        };
        Ok(Self {
            name: name.to_string(),
            path,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }

    /// All stored ids, in deterministic (sorted) order.
    pub fn ids(&self) -> Vec<String> {
        self.data.entries.keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&IndexEntry> {
        self.data.entries.get(id)
    }

    /// Insert or replace a batch of entries. All slices must have the
    /// same length.
    pub fn upsert(
        &mut self,
        ids: &[String],
        documents: &[String],
        embeddings: &[Vec<f32>],
        metadatas: &[FunctionMetadata],
    ) -> StorageResult<()> {
        if ids.len() != documents.len()
            || ids.len() != embeddings.len()
            || ids.len() != metadatas.len()
        {
            return Err(StorageError::LengthMismatch(format!(
                "{} ids, {} documents, {} embeddings, {} metadatas",
                ids.len(),
                documents.len(),
                embeddings.len(),
                metadatas.len()
            )));
        }
        for i in 0..ids.len() {
            self.data.entries.insert(
                ids[i].clone(),
                IndexEntry {
                    document: documents[i].clone(),
                    embedding: embeddings[i].clone(),
                    metadata: metadatas[i].clone(),
                },
            );
        }
        self.save()
    }

    /// Insert or replace a single entry.
    pub fn upsert_one(&mut self, id: &str, entry: IndexEntry) -> StorageResult<()> {
        self.data.entries.insert(id.to_string(), entry);
        self.save()
    }

    /// Delete the given ids; returns how many were present.
    pub fn delete(&mut self, ids: &[String]) -> StorageResult<usize> {
        let mut removed = 0;
        for id in ids {
            if self.data.entries.remove(id).is_some() {
                removed += 1;
            }
        }
        self.save()?;
        Ok(removed)
    }

    /// Nearest-neighbor query: the `top_k` entries closest to `vector`
    /// by cosine distance, nearest first.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Vec<ScoredEntry> {
        let mut scored: Vec<ScoredEntry> = self
            .data
            .entries
            .iter()
            .map(|(id, entry)| ScoredEntry {
                id: id.clone(),
                document: entry.document.clone(),
                metadata: entry.metadata.clone(),
                distance: cosine_distance(vector, &entry.embedding),
            })
            .collect();
        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        scored
    }

    fn save(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string(&self.data)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(name: &str) -> FunctionMetadata {
        FunctionMetadata {
            name: name.to_string(),
            doc_comment: String::new(),
            arguments: String::new(),
            return_type: String::new(),
            file_path: "f.py".to_string(),
            start_line: 1,
            end_line: 1,
        }
    }

    fn collection(dir: &TempDir) -> Collection {
        Collection::load("functions_py", dir.path().join("functions_py.json")).unwrap()
    }

    #[test]
    fn upsert_and_enumerate() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        coll.upsert(
            &["b".to_string(), "a".to_string()],
            &["doc b".to_string(), "doc a".to_string()],
            &[vec![0.0, 1.0], vec![1.0, 0.0]],
            &[meta("b"), meta("a")],
        )
        .unwrap();

        assert_eq!(coll.len(), 2);
        assert_eq!(coll.ids(), vec!["a", "b"]);
    }

    #[test]
    fn upsert_length_mismatch_is_rejected() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        let err = coll
            .upsert(&["a".to_string()], &[], &[], &[])
            .unwrap_err();
        assert!(matches!(err, StorageError::LengthMismatch(_)));
    }

    #[test]
    fn entries_survive_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("functions_py.json");
        {
            let mut coll = Collection::load("functions_py", path.clone()).unwrap();
            coll.upsert(
                &["a".to_string()],
                &["doc".to_string()],
                &[vec![1.0, 0.0]],
                &[meta("a")],
            )
            .unwrap();
        }
        let reloaded = Collection::load("functions_py", path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("a").unwrap().document, "doc");
    }

    #[test]
    fn delete_reports_how_many_existed() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        coll.upsert(
            &["a".to_string()],
            &["doc".to_string()],
            &[vec![1.0]],
            &[meta("a")],
        )
        .unwrap();

        let removed = coll
            .delete(&["a".to_string(), "missing".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert!(coll.is_empty());
    }

    #[test]
    fn query_orders_by_increasing_distance() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        // x is nearest to the query, then y, then z.
        coll.upsert(
            &["x".to_string(), "y".to_string(), "z".to_string()],
            &["x".to_string(), "y".to_string(), "z".to_string()],
            &[
                vec![1.0, 0.0, 0.0],
                vec![0.7, 0.7, 0.0],
                vec![0.0, 0.0, 1.0],
            ],
            &[meta("x"), meta("y"), meta("z")],
        )
        .unwrap();

        let hits = coll.query(&[1.0, 0.1, 0.0], 3);
        let order: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
        assert!(hits[0].distance <= hits[1].distance);
        assert!(hits[1].distance <= hits[2].distance);
    }

    #[test]
    fn query_truncates_to_top_k() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        coll.upsert(
            &["x".to_string(), "y".to_string()],
            &["x".to_string(), "y".to_string()],
            &[vec![1.0, 0.0], vec![0.0, 1.0]],
            &[meta("x"), meta("y")],
        )
        .unwrap();

        assert_eq!(coll.query(&[1.0, 0.0], 1).len(), 1);
    }

    #[test]
    fn zero_vector_entries_rank_last() {
        let dir = TempDir::new().unwrap();
        let mut coll = collection(&dir);
        coll.upsert(
            &["near".to_string(), "zero".to_string()],
            &["near".to_string(), "zero".to_string()],
            &[vec![1.0, 0.0], vec![0.0, 0.0]],
            &[meta("near"), meta("zero")],
        )
        .unwrap();

        let hits = coll.query(&[1.0, 0.0], 2);
        assert_eq!(hits[0].id, "near");
        assert_eq!(hits[1].id, "zero");
        assert_eq!(hits[1].distance, 1.0);
    }
}
