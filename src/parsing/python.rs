//! Python function extraction.
//!
//! Documentation follows the docstring convention: the doc comment of a
//! function is the leading string expression of its body, not a preceding
//! comment.

use tracing::warn;
use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{build_record, node_text, walk_tree};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord, PLACEHOLDER_PARAM};

pub struct PythonExtractor {
    parser: Parser,
}

impl PythonExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "Python".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn process_node(node: Node<'_>, source: &str, file_path: &str) -> FunctionRecord {
        let name = node
            .child_by_field_name("name")
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        let arguments = node
            .child_by_field_name("parameters")
            .map(|params| extract_arguments(params, source))
            .unwrap_or_default();

        let return_type = node
            .child_by_field_name("return_type")
            .map(|n| node_text(n, source).to_string());

        let doc_comment = extract_docstring(node, source);

        build_record(
            Language::Python,
            name,
            node,
            source,
            file_path,
            arguments,
            doc_comment,
            return_type,
        )
    }
}

fn extract_arguments(params: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = params.walk();
    let mut arguments = Vec::new();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" => arguments.push(node_text(param, source).to_string()),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                let name = param
                    .child_by_field_name("name")
                    .or_else(|| first_identifier(param))
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| PLACEHOLDER_PARAM.to_string());
                arguments.push(name);
            }
            // *args / **kwargs / tuple patterns keep their surface text.
            "list_splat_pattern" | "dictionary_splat_pattern" | "tuple_pattern" => {
                arguments.push(node_text(param, source).to_string());
            }
            // Bare `/` and `*` separators are not parameters.
            "positional_separator" | "keyword_separator" => {}
            other => {
                warn!("skipping unrecognized python parameter node: {other}");
            }
        }
    }
    arguments
}

fn first_identifier<'t>(param: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = param.walk();
    param
        .named_children(&mut cursor)
        .find(|child| child.kind() == "identifier")
}

/// Docstring: the body's leading expression statement holding a string.
fn extract_docstring(node: Node<'_>, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let first = body.named_child(0)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let expr = first.named_child(0)?;
    if expr.kind() != "string" && expr.kind() != "string_literal" {
        return None;
    }
    let text = node_text(expr, source)
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

impl LanguageExtractor for PythonExtractor {
    fn language(&self) -> Language {
        Language::Python
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
            if node.kind() == "function_definition" {
                records.push(Self::process_node(node, source, file_path));
            }
        });
        Ok(records)
    }
}
