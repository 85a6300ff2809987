//! Built-in evaluator for `$`-prefixed dotted paths and literals.

use serde_json::Value;

use super::environment::Environment;
use super::types::EvalError;
use super::{Evaluator, is_expression};

/// Evaluates `$a.b.c` path lookups and `$`-prefixed JSON literals.
///
/// Sources without a leading `$` evaluate to themselves as plain strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathEvaluator;

impl PathEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for PathEvaluator {
    fn evaluate(&self, source: &str, env: &Environment) -> Result<Value, EvalError> {
        if !is_expression(source) {
            return Ok(Value::String(source.to_string()));
        }

        let expr = source[1..].trim();
        if expr.is_empty() {
            return Err(EvalError::Syntax(source.to_string()));
        }

        // Literal scalars, quoted strings and lists: `$12`, `$true`, `$"text"`
        if let Ok(literal) = serde_json::from_str::<Value>(expr)
            && !literal.is_object()
        {
            return Ok(literal);
        }

        lookup(expr, env)
    }
}

fn lookup(path: &str, env: &Environment) -> Result<Value, EvalError> {
    if !path.split('.').all(is_path_segment) {
        return Err(EvalError::Syntax(format!("${path}")));
    }

    if let Some(value) = env.lookup_path(path) {
        return Ok(value.clone());
    }

    // Walk again to report where the lookup stopped.
    let mut walked = Vec::new();
    let mut current: Option<&Value> = None;
    for segment in path.split('.') {
        let next = match current {
            None => env.get(segment),
            Some(Value::Object(map)) => map.get(segment),
            Some(Value::Array(items)) => {
                segment.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            Some(other) => {
                return Err(EvalError::NotIndexable {
                    path: walked.join("."),
                    field: segment.to_string(),
                    kind: crate::value_kind(other),
                });
            }
        };
        walked.push(segment);
        match next {
            Some(v) => current = Some(v),
            None => return Err(EvalError::Undefined(walked.join("."))),
        }
    }
    Err(EvalError::Undefined(path.to_string()))
}

fn is_path_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        _ => false,
    }
}
