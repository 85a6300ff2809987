//! Errors raised while building or resolving variables.

use thiserror::Error;

use crate::scopes::ScopeError;
use crate::types::VariableType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VarError {
    /// The record has no `id`, or it is empty.
    #[error("missing variable id")]
    MissingId,

    #[error("invalid variable id '{0}'")]
    InvalidId(String),

    #[error("variable id '{0}' can not start with 'PREVIOUS_'")]
    ReservedPrefix(String),

    #[error("expecting a string for variable id, but got {0}")]
    IdKind(&'static str),

    #[error("expecting a string or map for variable, but got {0}")]
    RecordKind(&'static str),

    #[error("unknown variable type '{0}'")]
    UnknownType(String),

    #[error("variable '{id}' is reserved for type '{reserved}', but was declared as '{declared}'")]
    ReservedTypeConflict {
        id: String,
        reserved: VariableType,
        declared: String,
    },

    /// A known record key holds a value of the wrong kind.
    #[error("expecting {expected} for field '{field}' of variable '{id}', but got {kind}")]
    FieldKind {
        id: String,
        field: &'static str,
        expected: &'static str,
        kind: &'static str,
    },

    #[error("invalid scopes for variable '{id}': {source}")]
    Scope {
        id: String,
        #[source]
        source: ScopeError,
    },

    /// Neither an override nor a default is available.
    #[error("missing value for variable '{0}'")]
    MissingValue(String),

    #[error("couldn't evaluate expression '{expression}' for variable '{id}': {message}")]
    Evaluation {
        id: String,
        expression: String,
        message: String,
    },

    /// The type's validator rejected the value.
    #[error("{message} for variable '{id}'")]
    Validation { id: String, message: String },

    /// The value is not in the enumerated set. `allowed` is JSON-encoded.
    #[error("Expecting one of {allowed} for variable '{id}'")]
    NotOneOf { id: String, allowed: String },

    #[error("expecting a string or list for items of variable '{id}', but got {kind}")]
    ItemsKind { id: String, kind: &'static str },

    #[error("items for variable '{id}' nest deeper than {depth} levels")]
    ItemsTooDeep { id: String, depth: usize },
}
