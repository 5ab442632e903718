//! Go function and method extraction.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{
    build_record, clean_block_comment, node_text, preceding_doc_comment, walk_tree,
};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord, PLACEHOLDER_PARAM};

pub struct GoExtractor {
    parser: Parser,
}

impl GoExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "Go".to_string(),
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
            .child_by_field_name("result")
            .map(|n| node_text(n, source).to_string());

        let doc_comment = extract_doc(node, source);

        build_record(
            Language::Go,
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

/// Grouped declarations like `x, y int` contribute one argument per name.
fn extract_arguments(params: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = params.walk();
    let mut arguments = Vec::new();
    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "parameter_declaration" | "variadic_parameter_declaration" => {
                let mut names = param.walk();
                let before = arguments.len();
                for name in param.children_by_field_name("name", &mut names) {
                    arguments.push(node_text(name, source).to_string());
                }
                if arguments.len() == before {
                    arguments.push(PLACEHOLDER_PARAM.to_string());
                }
            }
            _ => {}
        }
    }
    arguments
}

/// Go doc convention: the contiguous `//` run (or one `/* */` block)
/// directly above the declaration.
fn extract_doc(node: Node<'_>, source: &str) -> Option<String> {
    preceding_doc_comment(
        node,
        source,
        |kind| kind == "comment",
        |text| {
            let text = text.trim();
            if let Some(rest) = text.strip_prefix("//") {
                Some(rest.trim().to_string())
            } else if text.starts_with("/*") {
                Some(clean_block_comment(text))
            } else {
                None
            }
        },
    )
}

impl LanguageExtractor for GoExtractor {
    fn language(&self) -> Language {
        Language::Go
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
            if matches!(node.kind(), "function_declaration" | "method_declaration") {
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
        GoExtractor::new()
            .unwrap()
            .extract(source, "test.go")
            .unwrap()
    }

    #[test]
    fn function_with_result_type() {
        let source = "package m\n\nfunc Add(a int, b int) int {\n\treturn a + b\n}\n";
        let records = extract(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Add");
        assert_eq!(records[0].arguments, vec!["a", "b"]);
        assert_eq!(records[0].return_type.as_deref(), Some("int"));
    }

    #[test]
    fn grouped_parameters_report_every_name() {
        let source = "package m\n\nfunc Sum(a, b int, scale float64) int {\n\treturn 0\n}\n";
        let records = extract(source);
        assert_eq!(records[0].arguments, vec!["a", "b", "scale"]);
    }

    #[test]
    fn unnamed_parameter_maps_to_placeholder() {
        let source = "package m\n\nfunc Handle(int) {}\n";
        let records = extract(source);
        assert_eq!(records[0].arguments, vec!["_"]);
    }

    #[test]
    fn methods_are_reported() {
        let source = "package m\n\nfunc (p *Point) Scale(f float64) {}\n";
        let records = extract(source);
        assert_eq!(records[0].name, "Scale");
        assert_eq!(records[0].arguments, vec!["f"]);
    }

    #[test]
    fn comment_run_above_function_is_the_doc() {
        let source =
            "package m\n\n// Add returns the sum.\n// It never overflows.\nfunc Add(a, b int) int { return a + b }\n";
        let records = extract(source);
        assert_eq!(
            records[0].doc_comment.as_deref(),
            Some("Add returns the sum.\nIt never overflows.")
        );
    }

    #[test]
    fn package_clause_does_not_leak_into_doc() {
        let source = "package m\n\nfunc A() {}\n";
        let records = extract(source);
        assert_eq!(records[0].doc_comment, None);
    }
}
