//! Generative documentation.
//!
//! Out of the indexing core: this module only supplies function records
//! to the opaque generation services and consumes replacement docstring
//! text. A per-function generation failure keeps the extracted doc
//! comment; only the file summary is load-bearing for the command.

pub mod provider;

use std::path::Path;

use serde::Serialize;
use tracing::warn;

use crate::config::Settings;
use crate::error::IndexResult;
use crate::parsing::ExtractorFactory;
use crate::types::FunctionRecord;

pub use provider::{GeminiProvider, GenerationError, GroqProvider, TextGenerator};

const DOCSTRING_PROMPT: &str = "You are a senior engineer. Given a function's extracted metadata \
and body, return ONLY a Google-style docstring (no extra prose). Include: a one-line summary, \
Args (with types where known), Returns, and Raises (if any).";

#[derive(Debug, Serialize)]
pub struct GeneratedDocs {
    pub summary: String,
    pub functions: Vec<FunctionRecord>,
}

/// Rewrites doc comments and summarizes a file through the configured
/// generation providers.
pub struct DocGenerator {
    doc_provider: Box<dyn TextGenerator>,
    summary_provider: Box<dyn TextGenerator>,
}

impl DocGenerator {
    pub fn new(
        doc_provider: Box<dyn TextGenerator>,
        summary_provider: Box<dyn TextGenerator>,
    ) -> Self {
        Self {
            doc_provider,
            summary_provider,
        }
    }

    /// Wire up Gemini (per-function docs) and Groq (file summary) from
    /// settings, falling back to the conventional environment variables
    /// for the API keys.
    pub fn from_settings(settings: &Settings) -> Result<Self, GenerationError> {
        let gemini_key = settings
            .providers
            .gemini_api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| GenerationError::MissingApiKey("GEMINI_API_KEY".to_string()))?;
        let groq_key = settings
            .providers
            .groq_api_key
            .clone()
            .or_else(|| std::env::var("GROQ_API_KEY").ok())
            .ok_or_else(|| GenerationError::MissingApiKey("GROQ_API_KEY".to_string()))?;

        Ok(Self::new(
            Box::new(GeminiProvider::new(
                gemini_key,
                settings.providers.gemini_model.clone(),
            )),
            Box::new(GroqProvider::new(
                groq_key,
                settings.providers.groq_model.clone(),
            )),
        ))
    }

    /// Extract `path`, rewrite each function's doc comment, and produce a
    /// short file summary.
    pub async fn document_file(&self, path: &Path) -> IndexResult<GeneratedDocs> {
        let mut functions = ExtractorFactory::new().route_and_extract(path)?;

        for function in &mut functions {
            let prompt = format!(
                "{DOCSTRING_PROMPT}\n\nFunction:\n{}",
                serde_json::to_string_pretty(function)?
            );
            match self.doc_provider.generate(&prompt).await {
                Ok(doc) => function.doc_comment = Some(doc),
                Err(e) => {
                    warn!("doc generation failed for {}: {e}", function.name);
                }
            }
        }

        let summary = if functions.is_empty() {
            "This file contains no functions.".to_string()
        } else {
            let signatures: Vec<String> = functions
                .iter()
                .map(|f| {
                    format!(
                        "{}({}) -> {}",
                        f.name,
                        f.arguments.join(", "),
                        f.return_type.as_deref().unwrap_or("None")
                    )
                })
                .collect();
            let prompt = format!(
                "Summarize in 3-4 lines what this file does:\n{}",
                signatures.join("\n")
            );
            self.summary_provider
                .generate(&prompt)
                .await
                .map_err(crate::error::IndexError::from)?
        };

        Ok(GeneratedDocs { summary, functions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Canned provider that counts its calls.
    struct StubGenerator {
        reply: String,
        calls: Arc<Mutex<usize>>,
        fail: bool,
    }

    impl StubGenerator {
        fn new(reply: &str) -> (Self, Arc<Mutex<usize>>) {
            let calls = Arc::new(Mutex::new(0));
            (
                Self {
                    reply: reply.to_string(),
                    calls: calls.clone(),
                    fail: false,
                },
                calls,
            )
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                calls: Arc::new(Mutex::new(0)),
                fail: true,
            }
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(GenerationError::EmptyResponse);
            }
            Ok(self.reply.clone())
        }
    }

    fn write_sample(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("sample.py");
        fs::write(
            &path,
            "def add(a, b):\n    \"\"\"Old doc.\"\"\"\n    return a + b\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn rewrites_doc_comments_and_summarizes() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let (doc_stub, doc_calls) = StubGenerator::new("Generated doc.");
        let (summary_stub, summary_calls) = StubGenerator::new("A tiny math module.");
        let generator = DocGenerator::new(Box::new(doc_stub), Box::new(summary_stub));
        let docs = generator.document_file(&path).await.unwrap();

        assert_eq!(docs.summary, "A tiny math module.");
        assert_eq!(docs.functions.len(), 1);
        assert_eq!(
            docs.functions[0].doc_comment.as_deref(),
            Some("Generated doc.")
        );
        assert_eq!(*doc_calls.lock().unwrap(), 1);
        assert_eq!(*summary_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_doc_generation_keeps_the_extracted_doc() {
        let dir = TempDir::new().unwrap();
        let path = write_sample(&dir);

        let (summary_stub, _) = StubGenerator::new("Summary.");
        let generator = DocGenerator::new(
            Box::new(StubGenerator::failing()),
            Box::new(summary_stub),
        );
        let docs = generator.document_file(&path).await.unwrap();

        assert_eq!(docs.functions[0].doc_comment.as_deref(), Some("Old doc."));
        assert_eq!(docs.summary, "Summary.");
    }

    #[tokio::test]
    async fn empty_file_gets_the_fixed_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.py");
        fs::write(&path, "x = 1\n").unwrap();

        let (doc_stub, doc_calls) = StubGenerator::new("unused");
        let (summary_stub, summary_calls) = StubGenerator::new("unused");
        let generator = DocGenerator::new(Box::new(doc_stub), Box::new(summary_stub));
        let docs = generator.document_file(&path).await.unwrap();

        assert_eq!(docs.summary, "This file contains no functions.");
        assert!(docs.functions.is_empty());
        assert_eq!(*doc_calls.lock().unwrap(), 0);
        assert_eq!(*summary_calls.lock().unwrap(), 0);
    }
}
