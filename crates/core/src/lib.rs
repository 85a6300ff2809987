//! Variable resolution and stage-gated template rendering for deployable units.
//!
//! A unit declares its inputs as [`vars::Variable`]s and its rendered files
//! as [`templates::Template`]s. Callers resolve variables against an override
//! context and an evaluation [`scripting::Environment`], then render the
//! templates for a given stage.

pub mod config;
pub mod manifest;
pub mod scopes;
pub mod scripting;
pub mod templates;
pub mod types;
pub mod vars;

pub use manifest::{Manifest, ManifestError};
pub use scopes::{ScopeError, Scopes, Stage};
pub use scripting::{Environment, EvalError, Evaluator, LuaEvaluator, PathEvaluator};
pub use templates::{PlaceholderRenderer, RenderOptions, Renderer, Template, TemplateError};
pub use types::VariableType;
pub use vars::{DefaultValue, Entry, Items, Overrides, ResolveOptions, VarError, Variable};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Human-readable name for the kind of a JSON value, used in error messages.
pub fn value_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind() {
        assert_eq!(value_kind(&json!(null)), "null");
        assert_eq!(value_kind(&json!(true)), "bool");
        assert_eq!(value_kind(&json!(12)), "integer");
        assert_eq!(value_kind(&json!(1.5)), "float");
        assert_eq!(value_kind(&json!("x")), "string");
        assert_eq!(value_kind(&json!([1])), "list");
        assert_eq!(value_kind(&json!({"a": 1})), "map");
    }
}
