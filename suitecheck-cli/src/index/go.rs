//! Go test function extraction using tree-sitter

use tree_sitter::{Node, Parser};

use super::FunctionSpan;

/// Top-level functions whose name starts with `prefix`, in source order.
///
/// Each span starts at the function's doc comment when one is attached.
/// Returns `None` when the source does not parse cleanly.
pub fn test_functions(source: &str, prefix: &str) -> Option<Vec<FunctionSpan>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();
    if root.has_error() {
        return None;
    }

    let bytes = source.as_bytes();
    let mut cursor = root.walk();
    let spans = root
        .named_children(&mut cursor)
        .filter(|node| node.kind() == "function_declaration")
        .filter_map(|node| {
            let name = node.child_by_field_name("name")?.utf8_text(bytes).ok()?;
            if !name.starts_with(prefix) {
                return None;
            }
            Some(FunctionSpan {
                name: name.to_string(),
                start: doc_comment_start(&node),
                end: node.end_byte(),
            })
        })
        .collect();

    Some(spans)
}

/// Start byte of the comment block directly above `node`, or the node itself.
///
/// A blank line between the comment and the declaration detaches it.
fn doc_comment_start(node: &Node) -> usize {
    let mut start = node.start_byte();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(sibling) = current {
        if sibling.kind() != "comment" || sibling.end_position().row + 1 != expected_row {
            break;
        }
        start = sibling.start_byte();
        expected_row = sibling.start_position().row;
        current = sibling.prev_sibling();
    }

    start
}
