//! Scripted expression evaluation.
//!
//! Default values, enumeration constraints and template mappings may hold
//! scripted expressions: strings starting with `$` that are evaluated
//! against a caller-owned [`Environment`]. Evaluation sits behind the
//! [`Evaluator`] trait; two implementations ship with the crate:
//!
//! - [`PathEvaluator`] resolves dotted paths (`$this.project`) and
//!   `$`-prefixed JSON literals (`$12`, `$"text"`).
//! - [`LuaEvaluator`] evaluates the text after `$` as a Lua expression in a
//!   sandboxed interpreter, with the environment exposed as globals.
//!
//! # Example
//!
//! ```rust
//! use rendervars_core::scripting::{Environment, Evaluator, PathEvaluator};
//!
//! let mut env = Environment::new();
//! env.insert_path("this.project", "shop");
//!
//! let value = PathEvaluator.evaluate("$this.project", &env).unwrap();
//! assert_eq!(value, "shop");
//! ```

pub mod bindings;
pub mod engine;
pub mod environment;
pub mod path;
pub mod types;

use serde_json::Value;

pub use engine::{LuaEngine, LuaEvaluator};
pub use environment::Environment;
pub use path::PathEvaluator;
pub use types::{EvalError, SandboxConfig};

/// Evaluates scripted expressions against an environment.
pub trait Evaluator {
    fn evaluate(&self, source: &str, env: &Environment) -> Result<Value, EvalError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, source: &str, env: &Environment) -> Result<Value, EvalError> {
        (**self).evaluate(source, env)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, source: &str, env: &Environment) -> Result<Value, EvalError> {
        (**self).evaluate(source, env)
    }
}

/// Whether `s` is a scripted expression rather than plain text.
pub fn is_expression(s: &str) -> bool {
    s.starts_with('$')
}
