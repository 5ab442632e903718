//! JavaScript function extraction.
//!
//! Anonymous function literals (arrows, function expressions) are reported
//! under the placeholder name rather than dropped, so position-based
//! lookup still works for them.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{build_record, clean_block_comment, node_text, walk_tree};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord};

const FUNCTION_KINDS: [&str; 5] = [
    "function_declaration",
    "generator_function_declaration",
    "function_expression",
    "arrow_function",
    "method_definition",
];

pub struct JavaScriptExtractor {
    parser: Parser,
}

impl JavaScriptExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "JavaScript".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn process_node(node: Node<'_>, source: &str, file_path: &str) -> FunctionRecord {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        let arguments = extract_arguments(node, source);
        let doc_comment = extract_jsdoc(node, source).or_else(|| leading_string(node, source));

        // No static return annotations in the grammar.
        build_record(
            Language::JavaScript,
            name,
            node,
            source,
            file_path,
            arguments,
            doc_comment,
            None,
        )
    }
}

fn extract_arguments(node: Node<'_>, source: &str) -> Vec<String> {
    // Arrows may carry a single bare parameter instead of a list.
    if let Some(single) = node.child_by_field_name("parameter") {
        return vec![node_text(single, source).to_string()];
    }
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    let mut arguments = Vec::new();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" => arguments.push(node_text(param, source).to_string()),
            "assignment_pattern" => {
                if let Some(left) = param.child_by_field_name("left") {
                    arguments.push(node_text(left, source).to_string());
                }
            }
            // Destructuring and rest parameters keep their surface text.
            "rest_parameter" | "object_pattern" | "array_pattern" => {
                arguments.push(node_text(param, source).to_string());
            }
            _ => {}
        }
    }
    arguments
}

/// JSDoc: the nearest preceding `/** ... */` block, and only that one.
fn extract_jsdoc(node: Node<'_>, source: &str) -> Option<String> {
    let sibling = doc_anchor(node).prev_sibling()?;
    if sibling.kind() != "comment" {
        return None;
    }
    let text = node_text(sibling, source).trim().to_string();
    if text.starts_with("/**") && text.ends_with("*/") {
        let cleaned = clean_block_comment(&text);
        if cleaned.is_empty() { None } else { Some(cleaned) }
    } else {
        None
    }
}

/// Function expressions and arrows sit inside declarators or call
/// arguments; the JSDoc block precedes the enclosing statement, so climb
/// to the nearest direct child of a block before looking left.
fn doc_anchor(node: Node<'_>) -> Node<'_> {
    let mut target = node;
    while let Some(parent) = target.parent() {
        if matches!(parent.kind(), "program" | "statement_block" | "class_body") {
            break;
        }
        target = parent;
    }
    target
}

/// Fallback: a string literal as the leading body statement.
fn leading_string(node: Node<'_>, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    if body.kind() != "statement_block" {
        return None;
    }
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" {
        return None;
    }
    let text = node_text(expr, source)
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

impl LanguageExtractor for JavaScriptExtractor {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&mut self, source: &str, file_path: &str) -> IndexResult<Vec<FunctionRecord>> {
        let tree =
            self.parser
                .parse(source, None)
                .ok_or_else(|| IndexError::Extraction {
                    path: file_path.into(),
                    cause: "parser produced no tree".to_string(),
                })?;

        let mut records = Vec::new();
        walk_tree(tree.root_node(), |node| {
            if FUNCTION_KINDS.contains(&node.kind()) {
                records.push(Self::process_node(node, source, file_path));
            }
        });
        Ok(records)
    }
}
