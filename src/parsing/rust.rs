//! Rust function extraction.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{
    build_record, clean_block_comment, node_text, preceding_doc_comment, walk_tree,
};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord, PLACEHOLDER_PARAM};

pub struct RustExtractor {
    parser: Parser,
}

impl RustExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "Rust".to_string(),
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

        let doc_comment = extract_doc(node, source);

        build_record(
            Language::Rust,
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
            "parameter" => {
                let name = param
                    .child_by_field_name("pattern")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| PLACEHOLDER_PARAM.to_string());
                arguments.push(name);
            }
            // Receivers are not positional arguments.
            "self_parameter" => {}
            "variadic_parameter" => arguments.push(node_text(param, source).to_string()),
            _ => {}
        }
    }
    arguments
}

/// Doc comments: the contiguous run of `///`, `//!`, or `/** */` comments
/// immediately above the item.
fn extract_doc(node: Node<'_>, source: &str) -> Option<String> {
    preceding_doc_comment(
        node,
        source,
        |kind| kind == "line_comment" || kind == "block_comment",
        |text| {
            let text = text.trim();
            if let Some(rest) = text.strip_prefix("///") {
                Some(rest.trim().to_string())
            } else if let Some(rest) = text.strip_prefix("//!") {
                Some(rest.trim().to_string())
            } else if text.starts_with("/**") {
                Some(clean_block_comment(text))
            } else {
                None
            }
        },
    )
}

impl LanguageExtractor for RustExtractor {
    fn language(&self) -> Language {
        Language::Rust
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
            if node.kind() == "function_item" {
                records.push(Self::process_node(node, source, file_path));
            }
        });
        Ok(records)
    }
}
