//! The extraction contract every language implements, plus the tree
//! helpers shared by the extractors.

use tree_sitter::Node;

use crate::error::IndexResult;
use crate::parsing::Language;
use crate::types::FunctionRecord;

/// Common capability of all language extractors.
///
/// `extract` returns records in source order. A failure on one function
/// node is logged and that record alone is skipped; only a whole-file
/// parse failure surfaces as an error.
pub trait LanguageExtractor: Send {
    /// Get the language this extractor handles.
    fn language(&self) -> Language;

    /// Parse source text and extract every function definition.
    fn extract(&mut self, source: &str, file_path: &str) -> IndexResult<Vec<FunctionRecord>>;
}

/// Slice the source text covered by a node.
pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

/// Depth-first pre-order walk with an explicit stack.
///
/// The syntax tree is library-owned and can nest arbitrarily deep, so the
/// walk must not lean on host-runtime recursion limits.
pub(crate) fn walk_tree(root: Node<'_>, mut visit: impl FnMut(Node<'_>)) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node);
        for i in (0..node.child_count()).rev() {
            if let Some(child) = node.child(i as u32) {
                stack.push(child);
            }
        }
    }
}

/// Scan the preceding siblings of `node`, nearest first, accumulating the
/// contiguous run of doc comments.
///
/// `clean` decides whether a comment belongs to the run: it returns the
/// cleaned text for doc-style comments and `None` for unrelated ones. The
/// run ends at the first sibling that is not a doc comment: an
/// intervening statement or unrelated comment breaks it, blank lines do
/// not (they are not tree nodes). Accumulated lines come back in original
/// top-to-bottom order.
pub(crate) fn preceding_doc_comment(
    node: Node<'_>,
    source: &str,
    is_comment: impl Fn(&str) -> bool,
    clean: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        if !is_comment(sibling.kind()) {
            break;
        }
        match clean(node_text(sibling, source)) {
            Some(text) => lines.push(text),
            None => break,
        }
        current = sibling.prev_sibling();
    }
    if lines.is_empty() {
        None
    } else {
        lines.reverse();
        Some(lines.join("\n"))
    }
}

/// Strip the markers from a `/** ... */` style block comment.
pub(crate) fn clean_block_comment(text: &str) -> String {
    let inner = text
        .trim()
        .trim_start_matches("/**")
        .trim_start_matches("/*")
        .trim_end_matches("*/");
    inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble a [`FunctionRecord`] from the pieces an extractor collected.
///
/// Span fields come straight from the node (converted to 1-based), the id
/// from the identity assigner, and the retained source is the exact byte
/// slice of the definition, dedented.
pub(crate) fn build_record(
    language: Language,
    name: String,
    node: Node<'_>,
    source: &str,
    file_path: &str,
    arguments: Vec<String>,
    doc_comment: Option<String>,
    return_type: Option<String>,
) -> FunctionRecord {
    let start = node.start_position();
    let start_line = start.row as u32 + 1;
    let start_column = start.column as u32 + 1;
    let end_line = node.end_position().row as u32 + 1;
    FunctionRecord {
        id: crate::identity::assign_id(language, &name, file_path, start_line, start_column),
        name,
        source_text: Some(dedent(node_text(node, source), start.column)),
        file_path: file_path.to_string(),
        arguments,
        doc_comment,
        return_type,
        start_line,
        end_line,
        start_column,
    }
}

/// Strip the definition's nesting indentation from a source slice.
///
/// The slice starts at the definition itself, so its first line carries
/// no indentation of its own; every following line still carries the
/// enclosing `indent` columns, which is what gets removed (never more
/// than a line actually has).
pub(crate) fn dedent(text: &str, indent: usize) -> String {
    if indent == 0 || !text.contains('\n') {
        return text.to_string();
    }
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default();
    let mut out = vec![first.to_string()];
    for line in lines {
        let leading = line.len() - line.trim_start().len();
        out.push(line[leading.min(indent)..].to_string());
    }
    out.join("\n")
}
