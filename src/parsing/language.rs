//! The closed set of supported languages.
//!
//! Everything that varies per language hangs off this enum: file
//! extensions, the alias table used by the query surface, content-sniffing
//! fingerprints, and the persisted collection name.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Rust,
    Go,
    JavaScript,
    Java,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::Rust,
        Language::Go,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
    ];

    /// Short tag used in ids and collection names.
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "py",
            Language::Rust => "rs",
            Language::Go => "go",
            Language::JavaScript => "js",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Rust => "Rust",
            Language::Go => "Go",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::Rust => &["rs"],
            Language::Go => &["go"],
            Language::JavaScript => &["js", "mjs", "cjs"],
            Language::Java => &["java"],
            Language::Cpp => &["cpp", "cc", "cxx", "hpp", "h"],
        }
    }

    /// Name of the persisted vector collection for this language.
    pub fn collection_name(&self) -> String {
        format!("functions_{}", self.tag())
    }

    /// Exact extension match against the supported set.
    pub fn from_extension(ext: &str) -> Option<Language> {
        let ext = ext.to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.extensions().contains(&ext.as_str()))
    }

    pub fn from_path(path: &Path) -> Option<Language> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
    }

    /// Normalize a user-facing language alias (`"python"`, `"ts"`, ...).
    pub fn from_alias(alias: &str) -> Option<Language> {
        match alias.to_ascii_lowercase().as_str() {
            "py" | "python" => Some(Language::Python),
            "rs" | "rust" => Some(Language::Rust),
            "go" | "golang" => Some(Language::Go),
            "js" | "javascript" | "mjs" | "cjs" | "ts" | "typescript" => {
                Some(Language::JavaScript)
            }
            "java" => Some(Language::Java),
            "cpp" | "cc" | "cxx" | "hpp" | "h" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }

    /// Best-effort content sniffing over the head of a file.
    ///
    /// The fingerprints and their priority order are heuristic; polyglot
    /// or templated files may misclassify. Tried only after extension
    /// matching fails.
    pub fn sniff(head: &str) -> Option<Language> {
        if head.contains("def ") || head.contains("import ") {
            Some(Language::Python)
        } else if head.contains("public class") || head.contains("package ") {
            Some(Language::Java)
        } else if head.contains("function") || head.contains("const") {
            Some(Language::JavaScript)
        } else if head.contains("func ") {
            Some(Language::Go)
        } else if head.contains("fn ") {
            Some(Language::Rust)
        } else if head.contains("#include") || head.contains("std::") {
            Some(Language::Cpp)
        } else {
            None
        }
    }

    /// Comma-separated tag list for error messages.
    pub fn supported_tags() -> String {
        Language::ALL
            .iter()
            .map(|lang| lang.tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
