//! Variable types and their coercion rules.
//!
//! Every variable has a type drawn from a fixed, process-wide set. A type is
//! either *user managed*, meaning callers may supply a value that is then
//! coerced by the type's validator, or *reserved*, meaning its value always
//! comes from evaluating a fixed expression against the environment.
//!
//! | type          | user managed | value                                  |
//! |---------------|--------------|----------------------------------------|
//! | `string`      | yes          | passed through                         |
//! | `bool`        | yes          | `true`, `1` or `"1"` are true          |
//! | `integer`     | yes          | floats truncate, strings parse         |
//! | `list`        | yes          | JSON array strings parse               |
//! | `version`     | no           | `$this.version`                        |
//! | `project`     | no           | `$this.project`                        |
//! | `environment` | no           | `$this.environment`                    |
//! | `deployment`  | no           | `$this.deployment`                     |
//! | `client`      | no           | `$this.client`                         |
//!
//! Reserved type names are also reserved variable ids: a variable named
//! `version` is always of type `version`.

pub mod coerce;

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::vars::VarError;

/// A variable type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    String,
    Bool,
    Integer,
    List,
    Version,
    Project,
    Environment,
    Deployment,
    Client,
}

impl VariableType {
    const ALL: [VariableType; 9] = [
        Self::String,
        Self::Bool,
        Self::Integer,
        Self::List,
        Self::Version,
        Self::Project,
        Self::Environment,
        Self::Deployment,
        Self::Client,
    ];

    /// All registered types.
    pub fn all() -> &'static [VariableType] {
        &Self::ALL
    }

    /// Look up a type by name.
    pub fn lookup(name: &str) -> Result<Self, VarError> {
        name.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::List => "list",
            Self::Version => "version",
            Self::Project => "project",
            Self::Environment => "environment",
            Self::Deployment => "deployment",
            Self::Client => "client",
        }
    }

    /// Whether callers may supply values for variables of this type.
    pub fn is_user_managed(&self) -> bool {
        matches!(self, Self::String | Self::Bool | Self::Integer | Self::List)
    }

    /// The fixed expression a reserved type resolves through.
    pub fn expression(&self) -> Option<&'static str> {
        match self {
            Self::Version => Some("$this.version"),
            Self::Project => Some("$this.project"),
            Self::Environment => Some("$this.environment"),
            Self::Deployment => Some("$this.deployment"),
            Self::Client => Some("$this.client"),
            _ => None,
        }
    }

    /// Coerce a raw value into this type's canonical shape.
    ///
    /// Errors carry the bare message; callers attach the variable id.
    pub fn validate(&self, raw: &Value, options: &Map<String, Value>) -> Result<Value, String> {
        match self {
            Self::Bool => coerce::to_bool(raw),
            Self::Integer => coerce::to_integer(raw),
            Self::List => coerce::to_list(raw, options),
            _ => Ok(raw.clone()),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = VarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| VarError::UnknownType(s.to_string()))
    }
}

/// Whether `id` is reserved for a non-user-managed type.
pub fn is_reserved_name(id: &str) -> bool {
    reserved_type(id).is_some()
}

/// The reserved type a variable id maps to, if any.
pub fn reserved_type(id: &str) -> Option<VariableType> {
    VariableType::ALL
        .iter()
        .copied()
        .find(|t| !t.is_user_managed() && t.as_str() == id)
}
