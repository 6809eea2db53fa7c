//! Dialect detection from file extension.

use tree_sitter::Language;

/// Source dialects the instrumenter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    JavaScript,
    TypeScript,
    Tsx,
}

impl Dialect {
    /// Detect the dialect from a logical filename.
    pub fn from_filename(filename: &str) -> Option<Dialect> {
        let ext = filename.rsplit('.').next()?;
        match ext {
            "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::JavaScript),
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }

    /// The tree-sitter grammar for this dialect.
    pub fn language(&self) -> Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Whether the dialect can annotate types on parameters.
    pub fn is_typed(&self) -> bool {
        matches!(self, Dialect::TypeScript | Dialect::Tsx)
    }

    /// All recognised extensions, for the bundler adapter's filter.
    pub fn extensions() -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
    }
}
