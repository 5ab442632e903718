//! End-to-end pipeline tests: walk -> extract -> embed -> upsert ->
//! search, using the deterministic offline embedder and temp stores.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use funcdex::{
    ExtractorFactory, HashEmbedder, IndexBuilder, IndexError, Language, QueryEngine, Settings,
    VectorStore,
};

fn test_settings() -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.indexing.parallel_threads = 2;
    settings.indexing.progress = false;
    Arc::new(settings)
}

fn builder(store_dir: &Path) -> IndexBuilder {
    IndexBuilder::new(
        test_settings(),
        Arc::new(HashEmbedder::new()),
        VectorStore::open(store_dir).unwrap(),
    )
}

fn engine(store_dir: &Path) -> QueryEngine {
    QueryEngine::new(
        Arc::new(HashEmbedder::new()),
        VectorStore::open(store_dir).unwrap(),
    )
}

fn write_python_project(dir: &Path) {
    fs::write(
        dir.join("math_utils.py"),
        "def factorial(n):\n    \"\"\"Compute n! recursively.\"\"\"\n    return 1 if n < 2 else n * factorial(n - 1)\n\n\ndef add(a: float, b: float) -> float:\n    return a + b\n",
    )
    .unwrap();
    fs::write(
        dir.join("io_utils.py"),
        "def read_lines(path):\n    \"\"\"Read a file into a list of lines.\"\"\"\n    with open(path) as f:\n        return f.readlines()\n",
    )
    .unwrap();
}

#[test]
fn build_then_search_end_to_end() {
    let source = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_python_project(source.path());

    let report = builder(store.path())
        .build(source.path(), Language::Python)
        .unwrap();
    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.functions_found, 3);
    assert_eq!(report.functions_indexed, 3);
    assert_eq!(report.duplicate_ids, 0);

    // The hashed embedder maps equal texts to equal vectors, so querying
    // with an indexed document text must return that entry first.
    let hits = engine(store.path())
        .search("factorial Compute n! recursively.", "py", 3)
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].metadata.name, "factorial");
    assert!(hits[0].distance < hits[1].distance);
    assert!(hits[0].id.starts_with("py_"));
    assert!(hits[0].metadata.file_path.ends_with("math_utils.py"));
}

#[test]
fn rebuild_yields_identical_ids_and_counts() {
    let source = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_python_project(source.path());

    let b = builder(store.path());
    let first = b.build(source.path(), Language::Python).unwrap();
    let ids_first = VectorStore::open(store.path())
        .unwrap()
        .collection("functions_py")
        .unwrap()
        .ids();

    let second = b.build(source.path(), Language::Python).unwrap();
    let ids_second = VectorStore::open(store.path())
        .unwrap()
        .collection("functions_py")
        .unwrap()
        .ids();

    assert_eq!(first.functions_indexed, second.functions_indexed);
    assert_eq!(ids_first, ids_second);
    assert_eq!(second.duplicate_ids, 0);
}

#[test]
fn extraction_is_byte_identical_across_runs() {
    let source = TempDir::new().unwrap();
    write_python_project(source.path());
    let file = source.path().join("math_utils.py");

    let factory = ExtractorFactory::new();
    let first = factory.route_and_extract(&file).unwrap();
    let second = factory.route_and_extract(&file).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_vec(&first).unwrap(),
        serde_json::to_vec(&second).unwrap()
    );
}

#[test]
fn no_matching_files_aborts_without_touching_the_store() {
    let source = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    fs::write(source.path().join("main.rs"), "fn main() {}\n").unwrap();

    let err = builder(store.path())
        .build(source.path(), Language::Python)
        .unwrap_err();
    assert!(matches!(err, IndexError::NoFilesFound { .. }));
    assert!(
        VectorStore::open(store.path())
            .unwrap()
            .list_collections()
            .unwrap()
            .is_empty()
    );
}

#[test]
fn search_before_any_build_is_an_error() {
    let store = TempDir::new().unwrap();
    let err = engine(store.path())
        .search("factorial", "py", 3)
        .unwrap_err();
    assert!(matches!(err, IndexError::CollectionNotFound { .. }));
}

#[test]
fn language_collections_are_isolated() {
    let source = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_python_project(source.path());
    fs::write(
        source.path().join("lib.rs"),
        "/// Doubles a value.\npub fn double(x: u32) -> u32 { x * 2 }\n",
    )
    .unwrap();

    builder(store.path())
        .build(source.path(), Language::Python)
        .unwrap();
    builder(store.path())
        .build(source.path(), Language::Rust)
        .unwrap();

    let store = VectorStore::open(store.path()).unwrap();
    assert_eq!(
        store.list_collections().unwrap(),
        vec!["functions_py", "functions_rs"]
    );
    assert_eq!(store.collection("functions_rs").unwrap().len(), 1);
    assert_eq!(store.collection("functions_py").unwrap().len(), 3);
}

#[test]
fn per_file_failures_are_reported_not_fatal() {
    let source = TempDir::new().unwrap();
    let store = TempDir::new().unwrap();
    write_python_project(source.path());
    // Invalid UTF-8 makes the file unreadable as text; the build must
    // skip it and report the failure.
    fs::write(source.path().join("binary.py"), [0xff, 0xfe, 0x00, 0x41]).unwrap();

    let report = builder(store.path())
        .build(source.path(), Language::Python)
        .unwrap();

    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.functions_indexed, 3);
    assert_eq!(report.file_errors.len(), 1);
    assert!(report.file_errors[0].path.ends_with("binary.py"));
}
