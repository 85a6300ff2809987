//! Variable resolution.
//!
//! Resolution order for user-managed types:
//! 1. the override supplied by the caller, else the declared default
//!    (expressions evaluated against the environment);
//! 2. coercion through the type's validator;
//! 3. the enumeration constraint, if any.
//!
//! Reserved types ignore overrides and evaluate their fixed expression.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::errors::VarError;
use super::types::{DefaultValue, Entry, Items};
use super::variable::Variable;
use crate::scripting::{Environment, Evaluator};
use crate::value_kind;

/// Caller-supplied values, keyed by variable id.
pub type Overrides = HashMap<String, Value>;

/// Default bound on nested `items` evaluation.
pub const DEFAULT_MAX_ITEMS_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// How many times an `items` expression may evaluate into another
    /// constraint before giving up.
    pub max_items_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { max_items_depth: DEFAULT_MAX_ITEMS_DEPTH }
    }
}

impl Variable {
    /// Resolve this variable with default options.
    pub fn resolve<E: Evaluator + ?Sized>(
        &self,
        overrides: &Overrides,
        env: &Environment,
        evaluator: &E,
    ) -> Result<Value, VarError> {
        self.resolve_with(overrides, env, evaluator, &ResolveOptions::default())
    }

    pub fn resolve_with<E: Evaluator + ?Sized>(
        &self,
        overrides: &Overrides,
        env: &Environment,
        evaluator: &E,
        options: &ResolveOptions,
    ) -> Result<Value, VarError> {
        let var_type = self.var_type();
        debug!("resolving variable '{}' of type {}", self.id(), var_type);

        if !var_type.is_user_managed() {
            let expr = var_type.expression().unwrap_or_default();
            return self.evaluate(expr, env, evaluator);
        }

        let raw = match overrides.get(self.id()) {
            Some(value) => {
                debug!("using override for '{}'", self.id());
                value.clone()
            }
            None => self.resolve_default(env, evaluator)?,
        };

        let value = var_type.validate(&raw, self.options()).map_err(|message| {
            VarError::Validation { id: self.id().to_string(), message }
        })?;

        self.check_items(&value, self.items(), env, evaluator, options, 0)?;

        Ok(value)
    }

    fn resolve_default<E: Evaluator + ?Sized>(
        &self,
        env: &Environment,
        evaluator: &E,
    ) -> Result<Value, VarError> {
        match self.default_value() {
            DefaultValue::Absent => Err(VarError::MissingValue(self.id().to_string())),
            DefaultValue::Literal(value) => Ok(value.clone()),
            DefaultValue::Expression(expr) => self.evaluate(expr, env, evaluator),
            DefaultValue::ExpressionList(entries) => entries
                .iter()
                .map(|entry| self.evaluate_entry(entry, env, evaluator))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }

    fn check_items<E: Evaluator + ?Sized>(
        &self,
        value: &Value,
        items: &Items,
        env: &Environment,
        evaluator: &E,
        options: &ResolveOptions,
        depth: usize,
    ) -> Result<(), VarError> {
        match items {
            Items::Absent => Ok(()),
            Items::Expression(expr) => {
                if depth >= options.max_items_depth {
                    return Err(VarError::ItemsTooDeep {
                        id: self.id().to_string(),
                        depth: options.max_items_depth,
                    });
                }
                match self.evaluate(expr, env, evaluator)? {
                    Value::String(allowed) => {
                        if value.as_str() == Some(allowed.as_str()) {
                            Ok(())
                        } else {
                            Err(self.not_one_of(&[Value::String(allowed)]))
                        }
                    }
                    evaluated => {
                        let nested = Items::from_value(evaluated).map_err(|kind| {
                            VarError::ItemsKind { id: self.id().to_string(), kind }
                        })?;
                        if nested.is_absent() {
                            return Err(VarError::ItemsKind {
                                id: self.id().to_string(),
                                kind: "null",
                            });
                        }
                        self.check_items(value, &nested, env, evaluator, options, depth + 1)
                    }
                }
            }
            Items::Sequence(entries) => {
                let allowed = entries
                    .iter()
                    .map(|entry| self.evaluate_entry(entry, env, evaluator))
                    .collect::<Result<Vec<_>, _>>()?;
                if allowed.contains(value) {
                    Ok(())
                } else {
                    Err(self.not_one_of(&allowed))
                }
            }
        }
    }

    fn not_one_of(&self, allowed: &[Value]) -> VarError {
        VarError::NotOneOf {
            id: self.id().to_string(),
            allowed: serde_json::to_string(allowed).unwrap_or_default(),
        }
    }

    fn evaluate_entry<E: Evaluator + ?Sized>(
        &self,
        entry: &Entry,
        env: &Environment,
        evaluator: &E,
    ) -> Result<Value, VarError> {
        match entry {
            Entry::Literal(value) => Ok(value.clone()),
            Entry::Expression(expr) => self.evaluate(expr, env, evaluator),
        }
    }

    fn evaluate<E: Evaluator + ?Sized>(
        &self,
        expr: &str,
        env: &Environment,
        evaluator: &E,
    ) -> Result<Value, VarError> {
        let value = evaluator.evaluate(expr, env).map_err(|e| VarError::Evaluation {
            id: self.id().to_string(),
            expression: expr.to_string(),
            message: e.to_string(),
        })?;
        if !self.is_sensitive() {
            debug!("'{}' evaluated to {} value", expr, value_kind(&value));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripting::PathEvaluator;
    use crate::types::VariableType;
    use insta::assert_snapshot;
    use serde_json::json;

    fn env() -> Environment {
        let mut env = Environment::new();
        env.insert_path("this.variable", "scripted world");
        env.insert_path("this.version", "1.2.0");
        env.insert_path("this.allowed", json!(["valid", "$this.variable"]));
        env
    }

    fn var(value: Value) -> Variable {
        Variable::from_value(&value).unwrap()
    }

    fn resolve(v: &Variable, overrides: &Overrides) -> Result<Value, VarError> {
        v.resolve(overrides, &env(), &PathEvaluator)
    }

    #[test]
    fn test_missing_value() {
        let err = resolve(&var(json!("test")), &Overrides::new()).unwrap_err();
        assert_snapshot!(err.to_string(), @"missing value for variable 'test'");
    }

    #[test]
    fn test_override_wins_over_default() {
        let v = var(json!({"id": "test", "default": "from default"}));
        let mut overrides = Overrides::new();
        overrides.insert("test".into(), json!("from override"));
        assert_eq!(resolve(&v, &overrides).unwrap(), json!("from override"));
    }

    #[test]
    fn test_scripted_default() {
        let v = var(json!({"id": "test", "default": "$this.variable"}));
        assert_eq!(resolve(&v, &Overrides::new()).unwrap(), json!("scripted world"));
    }

    #[test]
    fn test_scripted_default_failure_names_everything() {
        let v = var(json!({"id": "test", "default": "$this.nope"}));
        let err = resolve(&v, &Overrides::new()).unwrap_err();
        assert_snapshot!(
            err.to_string(),
            @"couldn't evaluate expression '$this.nope' for variable 'test': 'this.nope' is not defined"
        );
    }

    #[test]
    fn test_literal_defaults() {
        let v = var(json!({"id": "flag", "type": "bool", "default": true}));
        assert_eq!(resolve(&v, &Overrides::new()).unwrap(), json!(true));

        let v = var(json!({"id": "n", "type": "integer", "default": 1000.0}));
        assert_eq!(resolve(&v, &Overrides::new()).unwrap(), json!(1000));
    }

    #[test]
    fn test_expression_list_default() {
        let v = var(json!({"id": "l", "type": "list", "default": ["$this.variable", "plain"]}));
        assert_eq!(
            resolve(&v, &Overrides::new()).unwrap(),
            json!(["scripted world", "plain"])
        );

        let v = var(json!({"id": "l", "type": "list", "default": ["a", "$this.missing"]}));
        assert!(matches!(
            resolve(&v, &Overrides::new()),
            Err(VarError::Evaluation { ref expression, .. }) if expression == "$this.missing"
        ));
    }

    #[test]
    fn test_empty_string_override_for_list() {
        let v = var(json!({"id": "l", "type": "list"}));
        let mut overrides = Overrides::new();
        overrides.insert("l".into(), json!(""));
        assert_eq!(resolve(&v, &overrides).unwrap(), json!([]));
    }

    #[test]
    fn test_validation_error_names_variable() {
        let v = var(json!({"id": "n", "type": "integer"}));
        let mut overrides = Overrides::new();
        overrides.insert("n".into(), json!([1]));
        let err = resolve(&v, &overrides).unwrap_err();
        assert_eq!(err.to_string(), "Expecting integer value, but got list for variable 'n'");
    }

    #[test]
    fn test_items_literal_sequence() {
        let v = var(json!({"id": "test", "items": ["valid", "also valid"]}));
        let mut overrides = Overrides::new();
        overrides.insert("test".into(), json!("also valid"));
        assert_eq!(resolve(&v, &overrides).unwrap(), json!("also valid"));

        overrides.insert("test".into(), json!("not valid"));
        let err = resolve(&v, &overrides).unwrap_err();
        assert_snapshot!(
            err.to_string(),
            @r#"Expecting one of ["valid","also valid"] for variable 'test'"#
        );
    }

    #[test]
    fn test_items_scripted_entries() {
        let v = var(json!({"id": "test", "items": ["$this.variable"], "default": "scripted world"}));
        assert_eq!(resolve(&v, &Overrides::new()).unwrap(), json!("scripted world"));
    }

    #[test]
    fn test_items_single_expression_string() {
        let v = var(json!({"id": "test", "items": "$this.variable"}));
        let mut overrides = Overrides::new();
        overrides.insert("test".into(), json!("scripted world"));
        assert!(resolve(&v, &overrides).is_ok());

        overrides.insert("test".into(), json!("other"));
        let err = resolve(&v, &overrides).unwrap_err();
        assert_eq!(
            err,
            VarError::NotOneOf { id: "test".into(), allowed: r#"["scripted world"]"#.into() }
        );
    }

    #[test]
    fn test_items_expression_evaluating_to_list() {
        let v = var(json!({"id": "test", "items": "$this.allowed"}));
        let mut overrides = Overrides::new();
        overrides.insert("test".into(), json!("scripted world"));
        assert!(resolve(&v, &overrides).is_ok());

        overrides.insert("test".into(), json!("nope"));
        let err = resolve(&v, &overrides).unwrap_err();
        assert_eq!(
            err,
            VarError::NotOneOf { id: "test".into(), allowed: r#"["valid","scripted world"]"#.into() }
        );
    }

    #[test]
    fn test_items_expression_with_bad_kind() {
        let mut e = env();
        e.insert_path("this.count", 3);
        let v = var(json!({"id": "test", "items": "$this.count", "default": "x"}));
        let err = v.resolve(&Overrides::new(), &e, &PathEvaluator).unwrap_err();
        assert_eq!(err, VarError::ItemsKind { id: "test".into(), kind: "integer" });
    }

    #[test]
    fn test_items_depth_bound() {
        let v = var(json!({"id": "test", "items": "$this.allowed", "default": "valid"}));
        let options = ResolveOptions { max_items_depth: 0 };
        let err = v.resolve_with(&Overrides::new(), &env(), &PathEvaluator, &options).unwrap_err();
        assert_eq!(err, VarError::ItemsTooDeep { id: "test".into(), depth: 0 });
    }

    #[test]
    fn test_reserved_type_ignores_overrides() {
        let v = Variable::new("version").unwrap();
        assert_eq!(v.var_type(), VariableType::Version);
        let mut overrides = Overrides::new();
        overrides.insert("version".into(), json!("9.9.9"));
        assert_eq!(resolve(&v, &overrides).unwrap(), json!("1.2.0"));
    }

    #[test]
    fn test_reserved_type_missing_in_env() {
        let v = Variable::new("deployment").unwrap();
        let err = resolve(&v, &Overrides::new()).unwrap_err();
        assert!(matches!(err, VarError::Evaluation { ref id, .. } if id == "deployment"));
    }

    #[test]
    fn test_resolves_with_boxed_evaluator() {
        let evaluator: Box<dyn Evaluator> = Box::new(PathEvaluator);
        let v = var(json!({"id": "test", "default": "$this.variable"}));
        let value = v.resolve(&Overrides::new(), &env(), &evaluator).unwrap();
        assert_eq!(value, json!("scripted world"));
    }
}
