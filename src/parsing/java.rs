//! Java method extraction.

use tree_sitter::{Node, Parser};

use crate::error::{IndexError, IndexResult};
use crate::parsing::parser::{
    build_record, clean_block_comment, node_text, preceding_doc_comment, walk_tree,
};
use crate::parsing::{Language, LanguageExtractor};
use crate::types::{ANONYMOUS_NAME, FunctionRecord, PLACEHOLDER_PARAM};

pub struct JavaExtractor {
    parser: Parser,
}

impl JavaExtractor {
    pub fn new() -> IndexResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| IndexError::ParserInit {
                language: "Java".to_string(),
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
            .child_by_field_name("type")
            .map(|n| node_text(n, source).to_string());

        let doc_comment = extract_doc(node, source);

        build_record(
            Language::Java,
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
            "formal_parameter" => {
                let name = param
                    .child_by_field_name("name")
                    .map(|n| node_text(n, source).to_string())
                    .unwrap_or_else(|| PLACEHOLDER_PARAM.to_string());
                arguments.push(name);
            }
            "spread_parameter" => arguments.push(node_text(param, source).to_string()),
            // `this` receiver parameters are not positional arguments.
            _ => {}
        }
    }
    arguments
}

/// Javadoc: an attached documentation child if the grammar provides one,
/// otherwise the preceding `/** */` block or contiguous `//` run.
fn extract_doc(node: Node<'_>, source: &str) -> Option<String> {
    if let Some(doc) = node.child_by_field_name("documentation") {
        let text = node_text(doc, source).trim().to_string();
        if !text.is_empty() {
            return Some(clean_block_comment(&text));
        }
    }
    preceding_doc_comment(
        node,
        source,
        |kind| kind == "block_comment" || kind == "line_comment",
        |text| {
            let text = text.trim();
            if text.starts_with("/**") {
                Some(clean_block_comment(text))
            } else if let Some(rest) = text.strip_prefix("//") {
                Some(rest.trim().to_string())
            } else {
                None
            }
        },
    )
}

impl LanguageExtractor for JavaExtractor {
    fn language(&self) -> Language {
        Language::Java
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
            if node.kind() == "method_declaration" {
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
        JavaExtractor::new()
            .unwrap()
            .extract(source, "Test.java")
            .unwrap()
    }

    #[test]
    fn method_with_return_type_and_parameters() {
        let source = "class Calc {\n    int add(int a, int b) {\n        return a + b;\n    }\n}\n";
        let records = extract(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "add");
        assert_eq!(records[0].arguments, vec!["a", "b"]);
        assert_eq!(records[0].return_type.as_deref(), Some("int"));
    }

    #[test]
    fn javadoc_block_is_extracted() {
        let source = "class C {\n    /**\n     * Computes the area.\n     * @param r radius\n     */\n    double area(double r) { return r * r; }\n}\n";
        let records = extract(source);
        assert_eq!(
            records[0].doc_comment.as_deref(),
            Some("Computes the area.\n@param r radius")
        );
    }

    #[test]
    fn spread_parameter_keeps_surface_text() {
        let source = "class C {\n    void log(String... parts) {}\n}\n";
        let records = extract(source);
        assert_eq!(records[0].arguments, vec!["String... parts"]);
    }

    #[test]
    fn constructors_are_not_reported() {
        let source = "class C {\n    C() {}\n    void run() {}\n}\n";
        let records = extract(source);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "run");
    }

    #[test]
    fn field_between_doc_and_method_breaks_the_run() {
        let source =
            "class C {\n    /** Old doc. */\n    int x = 1;\n    void run() {}\n}\n";
        let records = extract(source);
        assert_eq!(records[0].doc_comment, None);
    }
}
