//! Template declarations and stage-gated rendering.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::engine::{RenderContext, RenderError, RenderOptions, Renderer};
use crate::scopes::{ScopeError, Scopes};
use crate::scripting::{Environment, Evaluator};
use crate::value_kind;

/// Suffix stripped from a source file to derive its target.
pub const TEMPLATE_SUFFIX: &str = ".tpl";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("missing template source file")]
    MissingSource,

    #[error("missing target file for template '{}'", file.display())]
    MissingTarget { file: PathBuf },

    #[error("expecting a string or map for template, but got {0}")]
    RecordKind(&'static str),

    #[error("expecting {expected} for field '{field}' of template '{file}', but got {kind}")]
    FieldKind {
        file: String,
        field: &'static str,
        expected: &'static str,
        kind: &'static str,
    },

    #[error("invalid scopes for template '{file}': {source}")]
    Scope {
        file: String,
        #[source]
        source: ScopeError,
    },

    #[error("couldn't evaluate mapping '{key}' for template '{}': {message}", file.display())]
    Evaluation {
        file: PathBuf,
        key: String,
        message: String,
    },

    #[error("couldn't render template '{}': {source}", file.display())]
    Render {
        file: PathBuf,
        #[source]
        source: RenderError,
    },

    #[error("couldn't write template '{}' to '{}': {source}", file.display(), target.display())]
    Write {
        file: PathBuf,
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file to render: source and target paths, the stages it applies to and
/// the values placeholders are filled from.
///
/// Templates can be declared in two forms:
///
/// ```yaml
/// templates:
///   - config.yml.tpl          # target config.yml, both stages
///   - file: main.tf.tpl
///     target: build/main.tf
///     scopes: build
///     mapping:
///       region: $this.inputs.region
///       replicas: 3
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Template {
    source_file: PathBuf,
    target_file: PathBuf,
    scopes: Scopes,
    /// String values are scripted expressions; anything else is used as-is.
    mapping: Map<String, Value>,
}

impl Template {
    /// Shorthand form: target derived from the source, both stages, empty
    /// mapping.
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        let source_file = source_file.into();
        let target_file = default_target(&source_file);
        Self { source_file, target_file, scopes: Scopes::all(), mapping: Map::new() }
    }

    /// Build from a shorthand string or a structured record.
    ///
    /// Recognised keys: `file`, `target`, `scopes`, `mapping`. Unknown keys
    /// are ignored.
    pub fn from_value(value: &Value) -> Result<Self, TemplateError> {
        let map = match value {
            Value::String(file) if file.is_empty() => return Err(TemplateError::MissingSource),
            Value::String(file) => return Ok(Self::new(file)),
            Value::Object(map) => map,
            other => return Err(TemplateError::RecordKind(value_kind(other))),
        };

        let file = match map.get("file") {
            None | Some(Value::Null) => return Err(TemplateError::MissingSource),
            Some(Value::String(s)) if s.is_empty() => return Err(TemplateError::MissingSource),
            Some(Value::String(s)) => s.as_str(),
            Some(other) => {
                return Err(TemplateError::FieldKind {
                    file: String::new(),
                    field: "file",
                    expected: "a string",
                    kind: value_kind(other),
                });
            }
        };
        let kind_error = |field, expected, got: &Value| TemplateError::FieldKind {
            file: file.to_string(),
            field,
            expected,
            kind: value_kind(got),
        };

        let mut template = Self::new(file);
        match map.get("target") {
            None | Some(Value::Null) => {}
            Some(Value::String(target)) => template.target_file = PathBuf::from(target),
            Some(other) => return Err(kind_error("target", "a string", other)),
        }
        if let Some(raw) = map.get("scopes") {
            template.scopes = Scopes::from_value(raw)
                .map_err(|source| TemplateError::Scope { file: file.to_string(), source })?;
        }
        match map.get("mapping") {
            None | Some(Value::Null) => {}
            Some(Value::Object(mapping)) => template.mapping = mapping.clone(),
            Some(other) => return Err(kind_error("mapping", "a map", other)),
        }

        Ok(template)
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn target_file(&self) -> &Path {
        &self.target_file
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub fn mapping(&self) -> &Map<String, Value> {
        &self.mapping
    }

    /// Replace the target path. An empty path is rejected.
    pub fn set_target_file(&mut self, target: impl Into<PathBuf>) -> Result<(), TemplateError> {
        let target = target.into();
        if target.as_os_str().is_empty() {
            return Err(TemplateError::MissingTarget { file: self.source_file.clone() });
        }
        self.target_file = target;
        Ok(())
    }

    pub fn set_scopes(&mut self, scopes: Scopes) {
        self.scopes = scopes;
    }

    pub fn set_mapping(&mut self, mapping: Map<String, Value>) {
        self.mapping = mapping;
    }

    /// Add or replace one mapping entry.
    pub fn insert_mapping(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.mapping.insert(key.into(), value.into());
    }

    /// Make relative source and target paths relative to `dir`.
    ///
    /// An empty target stays empty so that it still fails at render time.
    pub fn rebase(&mut self, dir: &Path) {
        if self.source_file.is_relative() {
            self.source_file = dir.join(&self.source_file);
        }
        if self.target_file.is_relative() && !self.target_file.as_os_str().is_empty() {
            self.target_file = dir.join(&self.target_file);
        }
    }

    pub fn in_scope(&self, stage: &str) -> bool {
        self.scopes.in_scope(stage)
    }

    /// Evaluate the mapping into a flat render context.
    pub fn build_render_context<E: Evaluator + ?Sized>(
        &self,
        env: &Environment,
        evaluator: &E,
    ) -> Result<RenderContext, TemplateError> {
        let mut ctx = RenderContext::new();
        for (key, value) in &self.mapping {
            let resolved = match value {
                Value::String(expr) => {
                    evaluator.evaluate(expr, env).map_err(|e| TemplateError::Evaluation {
                        file: self.source_file.clone(),
                        key: key.clone(),
                        message: e.to_string(),
                    })?
                }
                other => other.clone(),
            };
            ctx.insert(key.clone(), resolved);
        }
        Ok(ctx)
    }

    /// Render for `stage` with strict placeholder checking.
    ///
    /// Does nothing when `stage` is outside the template's scopes.
    pub fn render<E, R>(
        &self,
        stage: &str,
        env: &Environment,
        evaluator: &E,
        renderer: &R,
    ) -> Result<(), TemplateError>
    where
        E: Evaluator + ?Sized,
        R: Renderer + ?Sized,
    {
        self.render_with(stage, env, evaluator, renderer, RenderOptions::strict())
    }

    pub fn render_with<E, R>(
        &self,
        stage: &str,
        env: &Environment,
        evaluator: &E,
        renderer: &R,
        options: RenderOptions,
    ) -> Result<(), TemplateError>
    where
        E: Evaluator + ?Sized,
        R: Renderer + ?Sized,
    {
        if self.source_file.as_os_str().is_empty() {
            return Err(TemplateError::MissingSource);
        }
        if self.target_file.as_os_str().is_empty() {
            return Err(TemplateError::MissingTarget { file: self.source_file.clone() });
        }
        if !self.in_scope(stage) {
            debug!("skipping template {} outside stage '{}'", self.source_file.display(), stage);
            return Ok(());
        }

        let ctx = self.build_render_context(env, evaluator)?;
        let rendered = renderer
            .render_file(&self.source_file, &ctx, options)
            .map_err(|source| TemplateError::Render { file: self.source_file.clone(), source })?;

        debug!(
            "writing template {} to {}",
            self.source_file.display(),
            self.target_file.display()
        );
        fs::write(&self.target_file, rendered).map_err(|source| TemplateError::Write {
            file: self.source_file.clone(),
            target: self.target_file.clone(),
            source,
        })
    }
}

impl TryFrom<Value> for Template {
    type Error = TemplateError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

/// Derive a target path from a template source.
///
/// `a.txt.tpl` becomes `a.txt`; without the template suffix the last
/// extension is stripped. A source without any extension yields an empty
/// path, which fails at render time.
pub fn default_target(source: &Path) -> PathBuf {
    let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
        return PathBuf::new();
    };
    if let Some(stem) = name.strip_suffix(TEMPLATE_SUFFIX)
        && !stem.is_empty()
    {
        return source.with_file_name(stem);
    }
    if source.extension().is_some() {
        return source.with_extension("");
    }
    PathBuf::new()
}
