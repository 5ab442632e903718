//! C++ function extraction.
//!
//! Only definitions are reported; pure declarations (prototypes) are not.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{
    build_record, clean_block_comment, node_text, preceding_doc_comment, walk_tree,
};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord, PLACEHOLDER_PARAM};

pub struct CppExtractor {
    parser: Parser,
}

impl CppExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "C++".to_string(),
                cause: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    fn process_node(node: Node<'_>, source: &str, file_path: &str) -> FunctionRecord {
        let declarator = function_declarator(node);

        let name = declarator
            .and_then(|d| d.child_by_field_name("declarator"))
            .map(|n| node_text(n, source).to_string())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string());

        let arguments = declarator
            .and_then(|d| d.child_by_field_name("parameters"))
            .map(|params| extract_arguments(params, source))
            .unwrap_or_default();

        let return_type = node
            .child_by_field_name("type")
            .map(|n| node_text(n, source).to_string());

        let doc_comment = extract_doc(node, source);

        build_record(
            Language::Cpp,
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

/// Descend through pointer/reference declarators to the function
/// declarator carrying the name and parameter list.
fn function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node.child_by_field_name("declarator")?;
    loop {
        if current.kind() == "function_declarator" {
            return Some(current);
        }
        current = current.child_by_field_name("declarator")?;
    }
}

fn extract_arguments(params: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = params.walk();
    let mut arguments = Vec::new();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "parameter_declaration" | "optional_parameter_declaration" => {
                let name = param
                    .child_by_field_name("declarator")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| PLACEHOLDER_PARAM.to_string());
                arguments.push(name);
            }
            "variadic_parameter_declaration" => {
                arguments.push(node_text(param, source).to_string());
            }
            _ => {}
        }
    }
    arguments
}

/// Doxygen-style comments above the definition: `///` or `/** */`.
fn extract_doc(node: Node<'_>, source: &str) -> Option<String> {
    preceding_doc_comment(
        node,
        source,
        |kind| kind == "comment",
        |text| {
            let text = text.trim();
            if let Some(rest) = text.strip_prefix("///") {
                Some(rest.trim().to_string())
            } else if text.starts_with("/**") {
                Some(clean_block_comment(text))
            } else {
                None
            }
        },
    )
}

impl LanguageExtractor for CppExtractor {
    fn language(&self) -> Language {
        Language::Cpp
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

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Vec<FunctionRecord> {
        CppExtractor::new()
            .unwrap()
            .extract(source, "test.cpp")
            .unwrap()
    }

    #[test]
    fn free_function() {
        let records = extract("int add(int a, int b) {\n    return a + b;\n}\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "add");
        assert_eq!(records[0].arguments, vec!["a", "b"]);
        assert_eq!(records[0].return_type.as_deref(), Some("int"));
    }

    #[test]
    fn pointer_return_descends_to_the_name() {
        let records = extract("char* dup(const char* s) { return nullptr; }\n");
        assert_eq!(records[0].name, "dup");
        assert_eq!(records[0].arguments, vec!["* s"]);
    }

    #[test]
    fn doxygen_line_comments_concatenate() {
        let source = "/// Scales a value.\n/// Saturates on overflow.\nint scale(int v) { return v; }\n";
        let records = extract(source);
        assert_eq!(
            records[0].doc_comment.as_deref(),
            Some("Scales a value.\nSaturates on overflow.")
        );
    }

    #[test]
    fn block_doc_comment() {
        let source = "/** Entry point. */\nint main() { return 0; }\n";
        let records = extract(source);
        assert_eq!(records[0].doc_comment.as_deref(), Some("Entry point."));
    }

    #[test]
    fn prototypes_are_not_reported() {
        let records = extract("int add(int a, int b);\n");
        assert!(records.is_empty());
    }

    #[test]
    fn qualified_method_name() {
        let records = extract("double Circle::area() const { return 3.14; }\n");
        assert_eq!(records[0].name, "Circle::area");
    }
}
