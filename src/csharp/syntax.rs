//! Small tree-sitter node helpers shared by the declaration and body passes.

use tree_sitter::Node;

pub(crate) fn node_text<'a>(node: Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

pub(crate) fn line_of(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

pub(crate) fn find_child_by_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .find(|child| child.kind() == kind)
}

pub(crate) fn find_child_by_field<'a>(node: Node<'a>, field: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field)
}

/// Named children, comments excluded.
pub(crate) fn named_children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .filter(|child| child.kind() != "comment")
        .collect()
}

pub(crate) fn children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    (0..node.child_count()).filter_map(|i| node.child(i)).collect()
}

/// The `name` of a declaration, falling back to its first identifier child.
pub(crate) fn name_node<'a>(node: Node<'a>) -> Option<Node<'a>> {
    find_child_by_field(node, "name").or_else(|| find_child_by_kind(node, "identifier"))
}

/// Collapses runs of whitespace so multi-line type text prints on one line.
pub(crate) fn squash_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Type parameter names of a generic declaration, in order.
pub(crate) fn type_parameter_names(node: Node, source: &[u8]) -> Vec<String> {
    let list = find_child_by_field(node, "type_parameters")
        .or_else(|| find_child_by_kind(node, "type_parameter_list"));
    let Some(list) = list else {
        return Vec::new();
    };
    named_children(list)
        .into_iter()
        .filter(|p| p.kind() == "type_parameter")
        .map(|p| {
            let name = find_child_by_field(p, "name")
                .or_else(|| {
                    named_children(p).into_iter().rev().find(|c| c.kind() == "identifier")
                })
                .unwrap_or(p);
            node_text(name, source).trim().to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// The value of `name = value` inside a declarator or parameter.
pub(crate) fn initializer_of<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if let Some(clause) = find_child_by_kind(node, "equals_value_clause") {
        return named_children(clause).into_iter().next();
    }
    let mut after_equals = false;
    for child in children(node) {
        if after_equals && child.is_named() && child.kind() != "comment" {
            return Some(child);
        }
        if child.kind() == "=" {
            after_equals = true;
        }
    }
    None
}
