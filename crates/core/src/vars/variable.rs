//! Variable declarations.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::VarError;
use super::types::{DefaultValue, Items};
use crate::scopes::Scopes;
use crate::types::{VariableType, reserved_type};
use crate::value_kind;

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex"));

const PREVIOUS_PREFIX: &str = "previous_";

/// A declared, typed configuration value of a deployable unit.
///
/// Variables can be declared in two forms:
///
/// Shorthand (a string variable without default):
/// ```yaml
/// inputs:
///   - region
/// ```
///
/// Full form:
/// ```yaml
/// inputs:
///   - id: replicas
///     type: integer
///     default: 3
///     items: [1, 3, 5]
///     scopes: deploy
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Variable {
    id: String,
    var_type: VariableType,
    default: DefaultValue,
    description: Option<String>,
    friendly_name: Option<String>,
    options: Map<String, Value>,
    items: Items,
    sensitive: bool,
    visible: bool,
    eval_before_dependencies: bool,
    scopes: Scopes,
}

impl Variable {
    /// A `string` variable with no default, the shorthand form.
    pub fn new(id: &str) -> Result<Self, VarError> {
        Self::build(id, None)
    }

    /// A variable of the named type with no default.
    pub fn with_type(id: &str, type_name: &str) -> Result<Self, VarError> {
        Self::build(id, Some(type_name))
    }

    fn build(id: &str, type_name: Option<&str>) -> Result<Self, VarError> {
        validate_id(id)?;
        let var_type = resolve_type(id, type_name)?;
        Ok(Self {
            id: id.to_string(),
            var_type,
            default: DefaultValue::Absent,
            description: None,
            friendly_name: None,
            options: Map::new(),
            items: Items::Absent,
            sensitive: false,
            visible: true,
            eval_before_dependencies: true,
            scopes: Scopes::all(),
        })
    }

    /// Build from a shorthand string or a structured record.
    ///
    /// Unknown record keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, VarError> {
        let map = match value {
            Value::String(id) => return Self::new(id),
            Value::Object(map) => map,
            other => return Err(VarError::RecordKind(value_kind(other))),
        };

        let id = match map.get("id") {
            None | Some(Value::Null) => return Err(VarError::MissingId),
            Some(Value::String(id)) => id.as_str(),
            Some(other) => return Err(VarError::IdKind(value_kind(other))),
        };
        // Validate the id before using it in field errors.
        validate_id(id)?;
        let fields = Fields { id, map };

        let type_name = fields.string("type")?;
        let mut var = Self::build(id, type_name.as_deref())?;

        if let Some(raw) = map.get("default") {
            var.set_default(raw.clone())?;
        }
        if let Some(raw) = map.get("items") {
            var.set_items(raw.clone())?;
        }
        if let Some(raw) = map.get("scopes") {
            let scopes = Scopes::from_value(raw)
                .map_err(|source| VarError::Scope { id: id.to_string(), source })?;
            var.set_scopes(scopes);
        }
        if let Some(options) = fields.map("options")? {
            var.options = options;
        }
        var.description = fields.string("description")?;
        var.friendly_name = match fields.string("friendly")? {
            Some(name) => Some(name),
            None => fields.string("friendly_name")?,
        };
        if let Some(b) = fields.bool("sensitive")? {
            var.sensitive = b;
        }
        if let Some(b) = fields.bool("visible")? {
            var.visible = b;
        }
        if let Some(b) = fields.bool("eval_before_dependencies")? {
            var.eval_before_dependencies = b;
        }

        Ok(var)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn var_type(&self) -> VariableType {
        self.var_type
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    pub fn items(&self) -> &Items {
        &self.items
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The display name, falling back to the id.
    pub fn friendly_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.id)
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn eval_before_dependencies(&self) -> bool {
        self.eval_before_dependencies
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn in_scope(&self, stage: &str) -> bool {
        self.scopes.in_scope(stage)
    }

    /// Replace the default. Maps are rejected.
    pub fn set_default(&mut self, raw: Value) -> Result<(), VarError> {
        self.default = DefaultValue::from_value(raw).map_err(|kind| VarError::FieldKind {
            id: self.id.clone(),
            field: "default",
            expected: "a scalar, string or list",
            kind,
        })?;
        Ok(())
    }

    /// Replace the enumeration constraint. Only strings and lists are
    /// accepted.
    pub fn set_items(&mut self, raw: Value) -> Result<(), VarError> {
        self.items = Items::from_value(raw).map_err(|kind| VarError::FieldKind {
            id: self.id.clone(),
            field: "items",
            expected: "a string or list",
            kind,
        })?;
        Ok(())
    }

    pub fn set_options(&mut self, options: Map<String, Value>) {
        self.options = options;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn set_friendly_name(&mut self, name: impl Into<String>) {
        self.friendly_name = Some(name.into());
    }

    pub fn set_sensitive(&mut self, sensitive: bool) {
        self.sensitive = sensitive;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_eval_before_dependencies(&mut self, eval: bool) {
        self.eval_before_dependencies = eval;
    }

    pub fn set_scopes(&mut self, scopes: Scopes) {
        self.scopes = scopes;
    }
}

impl TryFrom<Value> for Variable {
    type Error = VarError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn validate_id(id: &str) -> Result<(), VarError> {
    if id.is_empty() {
        return Err(VarError::MissingId);
    }
    if !ID_RE.is_match(id) {
        return Err(VarError::InvalidId(id.to_string()));
    }
    if id.to_lowercase().starts_with(PREVIOUS_PREFIX) {
        return Err(VarError::ReservedPrefix(id.to_string()));
    }
    Ok(())
}

/// Reserved ids force their own type; everything else defaults to string.
fn resolve_type(id: &str, type_name: Option<&str>) -> Result<VariableType, VarError> {
    match (reserved_type(id), type_name) {
        (Some(reserved), None) => Ok(reserved),
        (Some(reserved), Some(declared)) if declared == reserved.as_str() => Ok(reserved),
        (Some(reserved), Some(declared)) => Err(VarError::ReservedTypeConflict {
            id: id.to_string(),
            reserved,
            declared: declared.to_string(),
        }),
        (None, None) => Ok(VariableType::String),
        (None, Some(declared)) => VariableType::lookup(declared),
    }
}

/// Typed access to the keys of a variable record.
struct Fields<'a> {
    id: &'a str,
    map: &'a Map<String, Value>,
}

impl Fields<'_> {
    fn kind_error(&self, field: &'static str, expected: &'static str, got: &Value) -> VarError {
        VarError::FieldKind {
            id: self.id.to_string(),
            field,
            expected,
            kind: value_kind(got),
        }
    }

    fn string(&self, field: &'static str) -> Result<Option<String>, VarError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.kind_error(field, "a string", other)),
        }
    }

    fn bool(&self, field: &'static str) -> Result<Option<bool>, VarError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.kind_error(field, "a bool", other)),
        }
    }

    fn map(&self, field: &'static str) -> Result<Option<Map<String, Value>>, VarError> {
        match self.map.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(m)) => Ok(Some(m.clone())),
            Some(other) => Err(self.kind_error(field, "a map", other)),
        }
    }
}
