//! Entity contexts: where in the source an instrumented point sits.

use serde::{Deserialize, Serialize};

/// The context an entity was observed in. Parameter contexts correspond to
/// the instrumented construct; `FunctionEntry` marks the per-function record
/// that carries the declared parameter count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityContext {
    FunctionDeclarationParameter,
    ArrowFunctionParameter,
    ClassMethodParameter,
    ConstructorParameter,
    ObjectMethodParameter,
    CallbackArgumentParameter,
    FunctionEntry,
}

impl EntityContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FunctionDeclarationParameter => "function_declaration_parameter",
            Self::ArrowFunctionParameter => "arrow_function_parameter",
            Self::ClassMethodParameter => "class_method_parameter",
            Self::ConstructorParameter => "constructor_parameter",
            Self::ObjectMethodParameter => "object_method_parameter",
            Self::CallbackArgumentParameter => "callback_argument_parameter",
            Self::FunctionEntry => "function_entry",
        }
    }
}

impl std::fmt::Display for EntityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_as_snake_case_tag() {
        let json = serde_json::to_string(&EntityContext::CallbackArgumentParameter).unwrap();
        assert_eq!(json, "\"callback_argument_parameter\"");
    }

    #[test]
    fn display_matches_serde() {
        assert_eq!(
            EntityContext::ConstructorParameter.to_string(),
            "constructor_parameter"
        );
    }
}
