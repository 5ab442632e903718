//! Extractor construction and file routing.
//!
//! Dispatch is a closed match over the [`Language`] enum: every supported
//! language has exactly one extractor, selected here.

use std::fs;
use std::path::Path;

use crate::error::{IndexError, IndexResult};
use crate::parsing::cpp::CppExtractor;
use crate::parsing::go::GoExtractor;
use crate::parsing::java::JavaExtractor;
use crate::parsing::javascript::JavaScriptExtractor;
use crate::parsing::python::PythonExtractor;
use crate::parsing::rust::RustExtractor;
use crate::parsing::{Language, LanguageExtractor};
use crate::types::FunctionRecord;

/// Number of bytes inspected by content sniffing.
const SNIFF_WINDOW: usize = 2048;

#[derive(Debug, Default)]
pub struct ExtractorFactory;

impl ExtractorFactory {
    pub fn new() -> Self {
        Self
    }

    /// Create the extractor for one language.
    pub fn create(&self, language: Language) -> IndexResult<Box<dyn LanguageExtractor>> {
        Ok(match language {
            Language::Python => Box::new(PythonExtractor::new()?),
            Language::Rust => Box::new(RustExtractor::new()?),
            Language::Go => Box::new(GoExtractor::new()?),
            Language::JavaScript => Box::new(JavaScriptExtractor::new()?),
            Language::Java => Box::new(JavaExtractor::new()?),
            Language::Cpp => Box::new(CppExtractor::new()?),
        })
    }

    /// Detect the language of a file: extension first, then content
    /// sniffing over the head of `source`.
    pub fn detect(&self, path: &Path, source: &str) -> IndexResult<Language> {
        if let Some(language) = Language::from_path(path) {
            return Ok(language);
        }
        let mut end = source.len().min(SNIFF_WINDOW);
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        Language::sniff(&source[..end]).ok_or_else(|| IndexError::Detection {
            path: path.to_path_buf(),
            reason: "extension and content both unrecognized".to_string(),
        })
    }

    /// Extract one file whose language is already known.
    pub fn extract_file(
        &self,
        language: Language,
        path: &Path,
    ) -> IndexResult<Vec<FunctionRecord>> {
        let source = fs::read_to_string(path)?;
        let mut extractor = self.create(language)?;
        extractor.extract(&source, &path.to_string_lossy())
    }

    /// Detect the language of `path` and extract it.
    pub fn route_and_extract(&self, path: &Path) -> IndexResult<Vec<FunctionRecord>> {
        let source = fs::read_to_string(path)?;
        let language = self.detect(path, &source)?;
        let mut extractor = self.create(language)?;
        extractor.extract(&source, &path.to_string_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn every_language_has_an_extractor() {
        let factory = ExtractorFactory::new();
        for language in Language::ALL {
            let extractor = factory.create(language).unwrap();
            assert_eq!(extractor.language(), language);
        }
    }

    #[test]
    fn routes_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("math.py");
        fs::write(&path, "def add(a, b):\n    return a + b\n").unwrap();

        let records = ExtractorFactory::new().route_and_extract(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "add");
        assert!(records[0].id.starts_with("py_"));
    }

    #[test]
    fn falls_back_to_content_sniffing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build_script");
        fs::write(&path, "import os\n\ndef run():\n    pass\n").unwrap();

        let records = ExtractorFactory::new().route_and_extract(&path).unwrap();
        assert_eq!(records[0].name, "run");
    }

    #[test]
    fn undetectable_file_is_a_detection_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, "1234 5678\n").unwrap();

        let err = ExtractorFactory::new().route_and_extract(&path).unwrap_err();
        assert!(matches!(err, IndexError::Detection { .. }));
    }
}
