//! Coercion rules for the user-managed variable types.

use serde_json::{Map, Value};

use crate::value_kind;

/// Option key selecting the element type of a list.
pub const LIST_ITEM_TYPE: &str = "type";

/// Element types a list may declare.
pub const LIST_ITEM_TYPES: [&str; 4] = ["string", "integer", "bool", "list"];

pub fn to_bool(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::Number(n) if !n.is_f64() => Ok(Value::Bool(n.as_i64() == Some(1))),
        Value::String(s) => Ok(Value::Bool(s == "1")),
        other => Err(format!("Expecting bool value, but got {}", value_kind(other))),
    }
}

pub fn to_integer(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::Number(n) if !n.is_f64() => Ok(raw.clone()),
        Value::Number(n) => match n.as_f64() {
            // i64::MAX as f64 rounds up to 2^63, hence the open upper bound
            Some(f) if f.trunc() >= i64::MIN as f64 && f.trunc() < i64::MAX as f64 => {
                Ok(Value::from(f.trunc() as i64))
            }
            _ => Err(format!("Expecting integer value, but got {n}")),
        },
        Value::String(s) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("Expecting integer value, but got string '{s}'")),
        other => Err(format!("Expecting integer value, but got {}", value_kind(other))),
    }
}

pub fn to_list(raw: &Value, options: &Map<String, Value>) -> Result<Value, String> {
    let item_type = match options.get(LIST_ITEM_TYPE) {
        None => "string",
        Some(Value::String(t)) => t.as_str(),
        Some(other) => {
            return Err(format!(
                "Expecting string for list option '{LIST_ITEM_TYPE}', but got {}",
                value_kind(other)
            ));
        }
    };
    if !LIST_ITEM_TYPES.contains(&item_type) {
        return Err(format!("Unsupported list item type '{item_type}'"));
    }

    match raw {
        Value::Array(items) => {
            for item in items {
                check_item(item_type, item)?;
            }
            Ok(raw.clone())
        }
        Value::String(s) if s.is_empty() => Ok(Value::Array(Vec::new())),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Array(_)) => to_list(&parsed, options),
            Ok(other) => {
                Err(format!("Expecting JSON list value, but got {}", value_kind(&other)))
            }
            Err(e) => Err(format!("Expecting JSON list value, but could not parse '{s}': {e}")),
        },
        other => Err(format!("Expecting list value, but got {}", value_kind(other))),
    }
}

fn check_item(item_type: &str, item: &Value) -> Result<(), String> {
    let matches = match item_type {
        "string" => item.is_string(),
        "integer" => item.is_i64() || item.is_u64(),
        "bool" => item.is_boolean(),
        "list" => item.is_array(),
        other => return Err(format!("Unsupported list item type '{other}'")),
    };
    if matches {
        Ok(())
    } else {
        Err(format!(
            "Expecting '{item_type}' value in list, but got '{}'",
            value_kind(item)
        ))
    }
}
