//! Parameter descriptor extraction.
//!
//! Both grammars reach this module: plain JavaScript puts raw patterns
//! directly under `formal_parameters`, while the TypeScript grammar wraps
//! each one in `required_parameter` / `optional_parameter` carrying the
//! type annotation, default value, and accessibility modifier.

use tree_sitter::Node;
use typetrace_core::model::Accessibility;

/// A uniform descriptor for one formal parameter.
#[derive(Debug, Clone)]
pub struct ParamInfo {
    /// Declared name, or `destructured_object` / `destructured_array`.
    pub name: String,
    /// Zero-based position in the parameter list.
    pub index: u32,
    /// Expression observing the parameter's runtime value.
    pub value_expr: String,
    pub has_default: bool,
    pub is_rest: bool,
    pub is_destructured: bool,
    /// Whether the dialect annotates a type on this parameter.
    pub annotated: bool,
    /// Visibility of a typed constructor parameter-property.
    pub accessibility: Option<Accessibility>,
    /// Original byte offset of the parameter node.
    pub offset: usize,
    /// 1-based line of the parameter node.
    pub line: u32,
    /// 0-based column of the parameter node.
    pub column: u32,
}

/// Extract descriptors for every formal parameter under `params_node`.
/// A parameter that cannot be described (unsupported shape) is skipped;
/// the remaining ones keep their declared indices.
pub fn extract_params(params_node: Node<'_>, source: &str) -> Vec<ParamInfo> {
    let mut params = Vec::new();
    let mut cursor = params_node.walk();
    let mut index = 0u32;
    for child in params_node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        // A TypeScript `this` pseudo-parameter has no runtime value and
        // does not occupy an argument position.
        if is_this_param(child) {
            continue;
        }
        if let Some(info) = describe(child, source, index) {
            params.push(info);
        }
        index += 1;
    }
    params
}

/// The declared parameter count: named children of the parameter list,
/// minus comments and `this` pseudo-parameters.
pub fn declared_count(params_node: Node<'_>) -> u32 {
    let mut cursor = params_node.walk();
    params_node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != "comment" && !is_this_param(*child))
        .count() as u32
}

/// Extract the descriptor for an unparenthesised single arrow parameter
/// (`x => ...`).
pub fn bare_arrow_param(param_node: Node<'_>, source: &str) -> Option<ParamInfo> {
    describe(param_node, source, 0)
}

fn describe(node: Node<'_>, source: &str, index: u32) -> Option<ParamInfo> {
    let mut annotated = false;
    let mut has_default = false;
    let mut accessibility = None;
    let mut inner = node;

    // Unwrap the TypeScript parameter wrapper.
    if matches!(node.kind(), "required_parameter" | "optional_parameter") {
        annotated = node.child_by_field_name("type").is_some();
        has_default = node.child_by_field_name("value").is_some();
        accessibility = find_accessibility(node, source);
        inner = node.child_by_field_name("pattern")?;
    }

    let mut is_rest = false;
    if inner.kind() == "rest_pattern" {
        is_rest = true;
        inner = inner.named_child(0)?;
    }
    if inner.kind() == "assignment_pattern" {
        has_default = true;
        inner = inner.child_by_field_name("left")?;
    }
    // Rest may also sit inside the assignment unwrap order for JS grammars.
    if inner.kind() == "rest_pattern" {
        is_rest = true;
        inner = inner.named_child(0)?;
    }

    let position = node.start_position();
    let base = ParamInfo {
        name: String::new(),
        index,
        value_expr: String::new(),
        has_default,
        is_rest,
        is_destructured: false,
        annotated,
        accessibility,
        offset: node.start_byte(),
        line: position.row as u32 + 1,
        column: position.column as u32,
    };

    match inner.kind() {
        "identifier" => {
            let name = node_text(inner, source).to_string();
            Some(ParamInfo { value_expr: name.clone(), name, ..base })
        }
        "object_pattern" => {
            let bound = bound_identifiers(inner, source);
            Some(ParamInfo {
                name: "destructured_object".to_string(),
                value_expr: if bound.is_empty() {
                    "undefined".to_string()
                } else {
                    format!("{{ {} }}", bound.join(", "))
                },
                is_destructured: true,
                ..base
            })
        }
        "array_pattern" => {
            let bound = bound_identifiers(inner, source);
            Some(ParamInfo {
                name: "destructured_array".to_string(),
                value_expr: if bound.is_empty() {
                    "undefined".to_string()
                } else {
                    format!("[{}]", bound.join(", "))
                },
                is_destructured: true,
                ..base
            })
        }
        _ => None,
    }
}

fn is_this_param(node: Node<'_>) -> bool {
    if node.kind() == "this" {
        return true;
    }
    matches!(node.kind(), "required_parameter" | "optional_parameter")
        && node
            .child_by_field_name("pattern")
            .is_some_and(|pattern| pattern.kind() == "this")
}

fn find_accessibility(node: Node<'_>, source: &str) -> Option<Accessibility> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "accessibility_modifier" {
            return match node_text(child, source) {
                "public" => Some(Accessibility::Public),
                "private" => Some(Accessibility::Private),
                "protected" => Some(Accessibility::Protected),
                _ => None,
            };
        }
    }
    None
}

/// Collect the identifiers a pattern binds, in declaration order, skipping
/// non-binding positions (property keys, default-value expressions).
fn bound_identifiers(pattern: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    collect_bound(pattern, source, &mut names);
    names
}

fn collect_bound(node: Node<'_>, source: &str, out: &mut Vec<String>) {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            out.push(node_text(node, source).to_string());
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_bound(value, source, out);
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_bound(left, source, out);
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_bound(child, source, out);
            }
        }
        _ => {}
    }
}

pub(crate) fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}
