//! Scripting types and error definitions.

use thiserror::Error;

/// Errors that can occur while evaluating a scripted expression.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Error from the Lua runtime.
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// A dotted path did not resolve to a value.
    #[error("'{0}' is not defined")]
    Undefined(String),

    /// A path segment tried to index into a scalar.
    #[error("can not look up '{field}' in {kind} value at '{path}'")]
    NotIndexable {
        path: String,
        field: String,
        kind: &'static str,
    },

    /// The expression could not be parsed.
    #[error("invalid expression '{0}'")]
    Syntax(String),

    /// The environment could not be built from the given value.
    #[error("expecting a map for the environment, but got {0}")]
    NotAMap(&'static str),
}

/// Configuration for the Lua sandbox.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Maximum memory the Lua VM can allocate (in bytes). 0 = unlimited.
    pub memory_limit: usize,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self::restricted()
    }
}

impl SandboxConfig {
    /// A restrictive sandbox suitable for manifest expressions.
    pub fn restricted() -> Self {
        Self { memory_limit: 10 * 1024 * 1024 }
    }

    pub fn unrestricted() -> Self {
        Self { memory_limit: 0 }
    }
}
