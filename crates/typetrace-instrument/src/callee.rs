//! Callee-path resolution for callback attribution.

use tree_sitter::Node;

use crate::params::node_text;

/// Resolve a call's callee expression to a textual path.
///
/// A bare identifier yields itself, a member chain of identifiers yields
/// the dotted path (`a.b.c`), anything else falls back to the source text
/// of the callee.
pub fn callee_path(callee: Node<'_>, source: &str) -> String {
    resolve_chain(callee, source).unwrap_or_else(|| node_text(callee, source).to_string())
}

fn resolve_chain(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(node_text(node, source).to_string()),
        "member_expression" => {
            let object = node.child_by_field_name("object")?;
            let property = node.child_by_field_name("property")?;
            if property.kind() != "property_identifier" {
                return None;
            }
            let head = resolve_chain(object, source)?;
            Some(format!("{head}.{}", node_text(property, source)))
        }
        _ => None,
    }
}

/// Zero-based index of `child` among the named arguments of an
/// `arguments` node.
pub fn argument_index(arguments: Node<'_>, child: Node<'_>) -> Option<u32> {
    let mut cursor = arguments.walk();
    let mut index = 0u32;
    for argument in arguments.named_children(&mut cursor) {
        if argument.kind() == "comment" {
            continue;
        }
        if argument.id() == child.id() {
            return Some(index);
        }
        index += 1;
    }
    None
}
