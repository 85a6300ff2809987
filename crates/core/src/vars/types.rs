//! Value shapes for variable defaults and enumeration constraints.

use serde_json::Value;

/// One element of an expression list: either a literal or a string to be
/// evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Literal(Value),
    Expression(String),
}

impl Entry {
    /// Strings become expressions; everything else is taken literally.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(s) => Self::Expression(s),
            other => Self::Literal(other),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Expression(s) => Value::String(s.clone()),
        }
    }
}

/// The declared default of a variable.
///
/// Decided once from the raw declaration; a map default is rejected at
/// construction time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Absent,
    /// A bool or number used verbatim.
    Literal(Value),
    /// A string evaluated against the environment.
    Expression(String),
    /// A list whose string elements are each evaluated.
    ExpressionList(Vec<Entry>),
}

impl DefaultValue {
    /// Classify a raw default. Returns the offending kind for maps.
    pub fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::Bool(_) | Value::Number(_) => Ok(Self::Literal(value)),
            Value::String(s) => Ok(Self::Expression(s)),
            Value::Array(items) => {
                Ok(Self::ExpressionList(items.into_iter().map(Entry::from_value).collect()))
            }
            Value::Object(_) => Err("map"),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// The enumeration constraint of a variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Items {
    #[default]
    Absent,
    /// Evaluated on each check; a string result is the single allowed
    /// value, a list result is checked as a sequence.
    Expression(String),
    Sequence(Vec<Entry>),
}

impl Items {
    /// Classify a raw `items` declaration. Returns the offending kind for
    /// anything but null, strings and lists.
    pub fn from_value(value: Value) -> Result<Self, &'static str> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::String(s) => Ok(Self::Expression(s)),
            Value::Array(items) => {
                Ok(Self::Sequence(items.into_iter().map(Entry::from_value).collect()))
            }
            other => Err(crate::value_kind(&other)),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}
