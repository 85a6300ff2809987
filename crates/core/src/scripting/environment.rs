//! The named-value environment expressions are evaluated against.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::EvalError;

/// A read-only mapping from names to values, owned by the caller.
///
/// Nested maps are addressed with dotted paths, e.g. `this.project`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(Map<String, Value>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Insert a top-level value, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert a value at a dotted path, creating intermediate maps.
    ///
    /// A non-map value sitting on the path is replaced by a map.
    pub fn insert_path(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.0;
        for part in parents {
            let entry = current
                .entry((*part).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(next) = entry else {
                unreachable!("entry was just made a map");
            };
            current = next;
        }
        current.insert((*last).to_string(), value.into());
    }

    /// Look up a dotted path. Numeric segments index into lists.
    pub fn lookup_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Environment {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Environment {
    type Error = EvalError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(EvalError::NotAMap(crate::value_kind(&other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_path_creates_maps() {
        let mut env = Environment::new();
        env.insert_path("this.variable", "scripted world");
        env.insert_path("this.project", "proj");

        assert_eq!(
            env.get("this"),
            Some(&json!({"variable": "scripted world", "project": "proj"}))
        );
    }

    #[test]
    fn test_insert_path_replaces_scalars() {
        let mut env = Environment::new();
        env.insert("this", 12);
        env.insert_path("this.version", "1.0");
        assert_eq!(env.lookup_path("this.version"), Some(&json!("1.0")));
    }

    #[test]
    fn test_lookup_path_through_lists() {
        let env = Environment::try_from(json!({"a": {"b": ["x", "y"]}})).unwrap();
        assert_eq!(env.lookup_path("a.b.1"), Some(&json!("y")));
        assert_eq!(env.lookup_path("a.b.2"), None);
        assert_eq!(env.lookup_path("a.c"), None);
        assert_eq!(env.lookup_path("a.b.x"), None);
    }

    #[test]
    fn test_try_from_rejects_non_map() {
        let err = Environment::try_from(json!([1, 2])).unwrap_err();
        assert!(matches!(err, EvalError::NotAMap("list")));
    }
}
