//! Naming heuristics for derived views: suggested enum names, synthetic
//! interface declarations, annotation classification.

use typetrace_storage::queries::observations::AnnotationRollup;

/// How the query engine recommends annotating an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    Enum,
    Interface,
    Union,
    LiteralType,
    Simple,
}

impl AnnotationKind {
    /// Ranking position: enum, interface, union, literal-type, simple.
    pub fn rank(&self) -> u8 {
        match self {
            AnnotationKind::Enum => 0,
            AnnotationKind::Interface => 1,
            AnnotationKind::Union => 2,
            AnnotationKind::LiteralType => 3,
            AnnotationKind::Simple => 4,
        }
    }
}

/// Classify one entity from its observation rollup.
pub fn classify(rollup: &AnnotationRollup) -> AnnotationKind {
    if rollup.value_types.len() > 1 {
        return AnnotationKind::Union;
    }
    match rollup.value_types.first().map(String::as_str) {
        Some("string") if (2..=10).contains(&rollup.distinct_strings) => AnnotationKind::Enum,
        Some("object") => AnnotationKind::Interface,
        Some("number") if rollup.distinct_numbers < 10 => AnnotationKind::LiteralType,
        _ => AnnotationKind::Simple,
    }
}

/// Suggest an enum name from the filename and the observed strings:
/// success/error values read as a `Status`, read/write as a `Mode`, short
/// values as a `Code`, everything else as a `Type`, prefixed with the
/// PascalCased filename stem.
pub fn suggest_enum_name(filename: &str, values: &[String]) -> String {
    let prefix = pascal_case(file_stem(filename));
    let lowered: Vec<String> = values.iter().map(|v| v.to_lowercase()).collect();
    let has = |needle: &str| lowered.iter().any(|v| v == needle);

    let suffix = if has("success") || has("error") {
        "Status"
    } else if has("read") || has("write") {
        "Mode"
    } else if average_len(values) <= 4.0 {
        "Code"
    } else {
        "Type"
    };
    format!("{prefix}{suffix}")
}

/// Synthesise a composite-type declaration from a shape signature.
pub fn synthesize_interface(entity_name: Option<&str>, signature: &str) -> String {
    let name = interface_name(entity_name);
    let fields = signature
        .split(',')
        .filter(|field| !field.is_empty())
        .map(|field| match field.split_once(':') {
            Some((key, ty)) => format!("  {key}: {ty};"),
            None => format!("  {field};"),
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!("interface {name} {{\n{fields}\n}}")
}

fn interface_name(entity_name: Option<&str>) -> String {
    let base = entity_name
        .and_then(|name| name.rsplit("_param_").next().filter(|s| !s.is_empty()))
        .unwrap_or("Shape");
    pascal_case(base)
}

fn file_stem(filename: &str) -> &str {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    base.split('.').next().unwrap_or(base)
}

fn pascal_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut upper_next = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                out.extend(c.to_uppercase());
                upper_next = false;
            } else {
                out.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    if out.is_empty() {
        out.push_str("Values");
    }
    out
}

fn average_len(values: &[String]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let total: usize = values.iter().map(|v| v.chars().count()).sum();
    total as f64 / values.len() as f64
}
