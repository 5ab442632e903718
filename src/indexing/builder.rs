//! The index build pipeline.
//!
//! A build is a full replace: existing entries for the language are
//! cleared, then every candidate file is extracted, embedded, and
//! upserted in batches. Per-item failures (one file, one embedding, one
//! record) are recovered and reported; only a missing directory or an
//! empty candidate set aborts the build.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{IndexError, IndexResult};
use crate::parsing::{ExtractorFactory, Language};
use crate::semantic::EmbeddingProvider;
use crate::storage::{IndexEntry, VectorStore};
use crate::types::{FunctionMetadata, FunctionRecord};

/// Cooperative cancellation for long builds. Cancelling stops the
/// scheduling of new files and batches; in-flight work completes or
/// fails cleanly.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub cause: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordError {
    pub id: String,
    pub cause: String,
}

/// Outcome of one build, including every recovered error.
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub language: String,
    pub files_scanned: usize,
    pub functions_found: usize,
    pub functions_indexed: usize,
    pub duplicate_ids: usize,
    pub file_errors: Vec<FileError>,
    pub record_errors: Vec<RecordError>,
}

impl BuildReport {
    fn new(language: Language) -> Self {
        Self {
            language: language.tag().to_string(),
            files_scanned: 0,
            functions_found: 0,
            functions_indexed: 0,
            duplicate_ids: 0,
            file_errors: Vec::new(),
            record_errors: Vec::new(),
        }
    }
}

pub struct IndexBuilder {
    settings: Arc<Settings>,
    embedder: Arc<dyn EmbeddingProvider>,
    store: VectorStore,
}

impl IndexBuilder {
    pub fn new(
        settings: Arc<Settings>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: VectorStore,
    ) -> Self {
        Self {
            settings,
            embedder,
            store,
        }
    }

    /// Build (full rebuild) the index for `language` under `root`.
    pub fn build(&self, root: &Path, language: Language) -> IndexResult<BuildReport> {
        self.build_with_cancel(root, language, &CancelToken::new())
    }

    pub fn build_with_cancel(
        &self,
        root: &Path,
        language: Language,
        cancel: &CancelToken,
    ) -> IndexResult<BuildReport> {
        if !root.is_dir() {
            return Err(IndexError::DirectoryNotFound(root.to_path_buf()));
        }

        let files = super::FileWalker::new(self.settings.clone()).walk(root, language);
        if files.is_empty() {
            return Err(IndexError::NoFilesFound {
                language: language.tag().to_string(),
                root: root.to_path_buf(),
            });
        }

        let mut report = BuildReport::new(language);
        report.files_scanned = files.len();
        info!(
            "indexing {} {} files under {}",
            files.len(),
            language.tag(),
            root.display()
        );

        // Full-rebuild semantics: drop everything already persisted for
        // this language before adding.
        let mut collection = self.store.get_or_create(&language.collection_name())?;
        let existing = collection.ids();
        debug!("clearing {} existing entries", existing.len());
        // Deleting also persists the (possibly empty) collection, which is
        // what distinguishes "built but empty" from "never built".
        collection.delete(&existing)?;

        let records = self.extract_all(&files, language, cancel, &mut report);
        report.functions_found = records.len();

        let records = dedup_records(records, &mut report);
        let embeddings = self.embed_all(&records, cancel, &mut report);
        self.upsert_all(&mut collection, records, embeddings, cancel, &mut report)?;

        info!(
            "indexed {}/{} functions ({} duplicates, {} file errors, {} record errors)",
            report.functions_indexed,
            report.functions_found,
            report.duplicate_ids,
            report.file_errors.len(),
            report.record_errors.len()
        );
        Ok(report)
    }

    /// Extract every file on a bounded worker pool. Results come back in
    /// file order; per-file failures land in the report.
    fn extract_all(
        &self,
        files: &[PathBuf],
        language: Language,
        cancel: &CancelToken,
        report: &mut BuildReport,
    ) -> Vec<FunctionRecord> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.indexing.parallel_threads.max(1))
            .build();
        let pool = match pool {
            Ok(pool) => pool,
            Err(e) => {
                // Degrade to the global pool rather than failing the build.
                warn!("worker pool setup failed ({e}), using default pool");
                return self.extract_all_inner(files, language, cancel, report, None);
            }
        };
        self.extract_all_inner(files, language, cancel, report, Some(&pool))
    }

    fn extract_all_inner(
        &self,
        files: &[PathBuf],
        language: Language,
        cancel: &CancelToken,
        report: &mut BuildReport,
        pool: Option<&rayon::ThreadPool>,
    ) -> Vec<FunctionRecord> {
        let progress = self.progress_bar(files.len() as u64);
        let run = || {
            files
                .par_iter()
                .map(|path| {
                    if cancel.is_cancelled() {
                        return (path.clone(), Ok(Vec::new()));
                    }
                    let result = ExtractorFactory::new().extract_file(language, path);
                    progress.inc(1);
                    (path.clone(), result)
                })
                .collect::<Vec<_>>()
        };
        let results = match pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        progress.finish_and_clear();

        let mut records = Vec::new();
        for (path, result) in results {
            match result {
                Ok(file_records) => {
                    debug!("parsed {} -> {} functions", path.display(), file_records.len());
                    records.extend(file_records);
                }
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    report.file_errors.push(FileError {
                        path,
                        cause: e.to_string(),
                    });
                }
            }
        }
        records
    }

    /// Embed all document texts in batches. A failed batch is retried
    /// record by record; a record that still fails gets a zero vector of
    /// the expected dimensionality.
    fn embed_all(
        &self,
        records: &[FunctionRecord],
        cancel: &CancelToken,
        report: &mut BuildReport,
    ) -> Vec<Vec<f32>> {
        let documents: Vec<String> = records.iter().map(FunctionRecord::document_text).collect();
        let batch_size = self.settings.indexing.batch_size.max(1);
        let dimensions = self.embedder.dimensions();

        let mut embeddings = Vec::with_capacity(documents.len());
        for (batch_index, batch) in documents.chunks(batch_size).enumerate() {
            if cancel.is_cancelled() {
                break;
            }
            match self.embedder.embed_batch(batch) {
                Ok(vectors) => embeddings.extend(vectors),
                Err(batch_error) => {
                    warn!("batch embedding failed ({batch_error}), retrying individually");
                    for (offset, document) in batch.iter().enumerate() {
                        match self.embedder.embed(document) {
                            Ok(vector) => embeddings.push(vector),
                            Err(e) => {
                                let id = &records[batch_index * batch_size + offset].id;
                                warn!("embedding failed for {id}: {e}");
                                report.record_errors.push(RecordError {
                                    id: id.clone(),
                                    cause: format!("embedding failed: {e}"),
                                });
                                embeddings.push(vec![0.0; dimensions]);
                            }
                        }
                    }
                }
            }
        }
        embeddings
    }

    /// Upsert records in batches; a failed batch is retried one record at
    /// a time so a single bad record cannot sink its neighbors.
    fn upsert_all(
        &self,
        collection: &mut crate::storage::Collection,
        records: Vec<FunctionRecord>,
        embeddings: Vec<Vec<f32>>,
        cancel: &CancelToken,
        report: &mut BuildReport,
    ) -> IndexResult<()> {
        let batch_size = self.settings.indexing.batch_size.max(1);
        // Cancellation mid-embedding leaves a shorter vector list; only
        // fully embedded records are upserted.
        let ready = records.len().min(embeddings.len());
        let records = &records[..ready];
        let embeddings = &embeddings[..ready];

        let progress = self.progress_bar(ready as u64);
        for (batch_records, batch_embeddings) in records
            .chunks(batch_size)
            .zip(embeddings.chunks(batch_size))
        {
            if cancel.is_cancelled() {
                break;
            }
            let ids: Vec<String> = batch_records.iter().map(|r| r.id.clone()).collect();
            let documents: Vec<String> = batch_records
                .iter()
                .map(FunctionRecord::document_text)
                .collect();
            let metadatas: Vec<FunctionMetadata> =
                batch_records.iter().map(FunctionMetadata::from).collect();

            match collection.upsert(&ids, &documents, batch_embeddings, &metadatas) {
                Ok(()) => report.functions_indexed += batch_records.len(),
                Err(batch_error) => {
                    warn!("batch upsert failed ({batch_error}), retrying individually");
                    for (i, record) in batch_records.iter().enumerate() {
                        let entry = IndexEntry {
                            document: documents[i].clone(),
                            embedding: batch_embeddings[i].clone(),
                            metadata: metadatas[i].clone(),
                        };
                        match collection.upsert_one(&record.id, entry) {
                            Ok(()) => report.functions_indexed += 1,
                            Err(e) => {
                                warn!("upsert failed for {}: {e}", record.id);
                                report.record_errors.push(RecordError {
                                    id: record.id.clone(),
                                    cause: format!("upsert failed: {e}"),
                                });
                            }
                        }
                    }
                }
            }
            progress.inc(batch_records.len() as u64);
        }
        progress.finish_and_clear();
        Ok(())
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if self.settings.indexing.progress {
            ProgressBar::new(len)
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Defend against identity collisions: a duplicate id gets a
/// high-resolution timestamp suffix and is counted. Should not happen
/// with a deterministic identity scheme over distinct spans.
fn dedup_records(mut records: Vec<FunctionRecord>, report: &mut BuildReport) -> Vec<FunctionRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    for record in &mut records {
        if !seen.insert(record.id.clone()) {
            let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
            let disambiguated = format!("{}_{suffix}", record.id);
            warn!("duplicate id {} disambiguated as {disambiguated}", record.id);
            report.duplicate_ids += 1;
            record.id = disambiguated;
            seen.insert(record.id.clone());
        }
    }
    records
}
