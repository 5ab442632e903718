//! Core value types shared across extraction, indexing, and retrieval.

use serde::{Deserialize, Serialize};

/// Name reported for function literals with no resolvable name.
pub const ANONYMOUS_NAME: &str = "<anonymous>";

/// Placeholder for parameters that have no binding name.
pub const PLACEHOLDER_PARAM: &str = "_";

/// The extracted, language-neutral description of one function or method.
///
/// Produced by a language extractor for the duration of one file's
/// processing and immutable once produced. Lines and columns are 1-based;
/// `start_line..=end_line` is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionRecord {
    /// Deterministic unique key, see [`crate::identity::assign_id`].
    pub id: String,
    pub name: String,
    /// Exact source slice of the definition, common indentation stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
    pub file_path: String,
    /// Parameter names in positional order. Unnamed parameters appear as
    /// [`PLACEHOLDER_PARAM`]; destructuring and rest parameters keep their
    /// literal surface text.
    pub arguments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: u32,
}

impl FunctionRecord {
    /// Text submitted to the embedding service: name plus doc comment.
    pub fn document_text(&self) -> String {
        match &self.doc_comment {
            Some(doc) => format!("{} {doc}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Searchable metadata persisted alongside each embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    pub name: String,
    pub doc_comment: String,
    pub arguments: String,
    pub return_type: String,
    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
}

impl From<&FunctionRecord> for FunctionMetadata {
    fn from(record: &FunctionRecord) -> Self {
        Self {
            name: record.name.clone(),
            doc_comment: record.doc_comment.clone().unwrap_or_default(),
            arguments: record.arguments.join(", "),
            return_type: record.return_type.clone().unwrap_or_default(),
            file_path: record.file_path.clone(),
            start_line: record.start_line,
            end_line: record.end_line,
        }
    }
}
