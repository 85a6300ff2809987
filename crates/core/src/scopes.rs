//! Execution stages and the scope sets that gate variables and templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a scope set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("invalid scope '{0}' (expected 'build' or 'deploy')")]
    Invalid(String),

    #[error("scopes can not be empty")]
    Empty,

    #[error("expecting a string or list of strings for scopes, but got {0}")]
    Kind(&'static str),
}

/// An execution stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Build,
    Deploy,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Deploy => "deploy",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(Self::Build),
            "deploy" => Ok(Self::Deploy),
            other => Err(ScopeError::Invalid(other.to_string())),
        }
    }
}

/// A non-empty set of stage names.
///
/// Membership is tested against arbitrary stage strings so that callers
/// passing an unknown stage simply get `false` back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<String>")]
pub struct Scopes(Vec<String>);

impl Scopes {
    /// Both `build` and `deploy`.
    pub fn all() -> Self {
        Self(vec![Stage::Build.to_string(), Stage::Deploy.to_string()])
    }

    pub fn build() -> Self {
        Self(vec![Stage::Build.to_string()])
    }

    pub fn deploy() -> Self {
        Self(vec![Stage::Deploy.to_string()])
    }

    /// Build a scope set from string names, rejecting unknown names.
    pub fn from_names<I, S>(names: I) -> Result<Self, ScopeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut stages: Vec<String> = Vec::new();
        for name in names {
            let stage: Stage = name.as_ref().parse()?;
            if !stages.iter().any(|s| s == stage.as_str()) {
                stages.push(stage.to_string());
            }
        }
        if stages.is_empty() {
            return Err(ScopeError::Empty);
        }
        Ok(Self(stages))
    }

    /// Build a scope set without checking the names.
    ///
    /// Stage names outside `build`/`deploy` are kept as-is, which is only
    /// useful to hosts that drive their own stages.
    pub fn unchecked<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Build a scope set from a single string or a sequence of strings.
    pub fn from_value(value: &Value) -> Result<Self, ScopeError> {
        match value {
            Value::String(s) => Self::from_names([s]),
            Value::Array(items) => {
                let mut names = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => names.push(s.as_str()),
                        other => return Err(ScopeError::Kind(crate::value_kind(other))),
                    }
                }
                Self::from_names(names)
            }
            other => Err(ScopeError::Kind(crate::value_kind(other))),
        }
    }

    pub fn in_scope(&self, stage: &str) -> bool {
        self.0.iter().any(|s| s == stage)
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.in_scope(stage.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::all()
    }
}

impl From<Scopes> for Vec<String> {
    fn from(scopes: Scopes) -> Self {
        scopes.0
    }
}

impl<'de> Deserialize<'de> for Scopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(serde::de::Error::custom)
    }
}
