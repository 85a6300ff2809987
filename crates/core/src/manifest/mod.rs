//! Unit manifests: the declared inputs, outputs and templates of a
//! deployable unit.
//!
//! ```yaml
//! inputs:
//!   - region
//!   - id: replicas
//!     type: integer
//!     default: 3
//! outputs:
//!   - id: url
//!     default: $this.deployment
//! templates:
//!   - file: config.yml.tpl
//!     mapping:
//!       region: $inputs.region
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::scripting::{Environment, Evaluator};
use crate::templates::{RenderOptions, Renderer, Template, TemplateError};
use crate::vars::{Overrides, ResolveOptions, VarError, Variable};

/// Environment key resolved inputs are exposed under.
pub const INPUTS_KEY: &str = "inputs";

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("variable '{0}' is declared more than once")]
    DuplicateId(String),

    #[error(transparent)]
    Variable(#[from] VarError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub inputs: Vec<Variable>,

    #[serde(default)]
    pub outputs: Vec<Variable>,

    #[serde(default)]
    pub templates: Vec<Template>,
}

impl Manifest {
    /// Load a manifest from a YAML (or JSON) file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let s = fs::read_to_string(path)
            .map_err(|e| ManifestError::Io { path: path.to_path_buf(), source: e })?;
        let mut manifest: Manifest = serde_yaml::from_str(&s)
            .map_err(|e| ManifestError::Parse { path: path.to_path_buf(), source: e })?;
        manifest.check_unique_ids()?;
        if let Some(dir) = path.parent() {
            manifest.rebase(dir);
        }
        Ok(manifest)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_yaml::from_str(s)
            .map_err(|e| ManifestError::Parse { path: PathBuf::from("<string>"), source: e })?;
        manifest.check_unique_ids()?;
        Ok(manifest)
    }

    /// Ids must be unique within inputs and within outputs.
    fn check_unique_ids(&self) -> Result<(), ManifestError> {
        for vars in [&self.inputs, &self.outputs] {
            let mut seen = HashSet::new();
            for var in vars {
                if !seen.insert(var.id()) {
                    return Err(ManifestError::DuplicateId(var.id().to_string()));
                }
            }
        }
        Ok(())
    }

    /// Make relative template paths relative to `dir`.
    pub fn rebase(&mut self, dir: &Path) {
        for template in &mut self.templates {
            template.rebase(dir);
        }
    }

    pub fn input(&self, id: &str) -> Option<&Variable> {
        self.inputs.iter().find(|v| v.id() == id)
    }

    /// Resolve the inputs in scope for `stage`, in declaration order,
    /// stopping at the first error.
    pub fn resolve_inputs<E: Evaluator + ?Sized>(
        &self,
        overrides: &Overrides,
        env: &Environment,
        evaluator: &E,
        stage: &str,
        options: &ResolveOptions,
    ) -> Result<Map<String, Value>, ManifestError> {
        resolve_all(&self.inputs, overrides, env, evaluator, stage, options)
    }

    /// Resolve the outputs in scope for `stage`. `values` holds whatever
    /// the deployment reported.
    pub fn resolve_outputs<E: Evaluator + ?Sized>(
        &self,
        values: &Overrides,
        env: &Environment,
        evaluator: &E,
        stage: &str,
        options: &ResolveOptions,
    ) -> Result<Map<String, Value>, ManifestError> {
        resolve_all(&self.outputs, values, env, evaluator, stage, options)
    }

    /// Render every template for `stage`, stopping at the first error.
    ///
    /// Returns the templates that were in scope and written.
    pub fn render_templates<E, R>(
        &self,
        stage: &str,
        env: &Environment,
        evaluator: &E,
        renderer: &R,
        options: RenderOptions,
    ) -> Result<Vec<&Template>, ManifestError>
    where
        E: Evaluator + ?Sized,
        R: Renderer + ?Sized,
    {
        let mut rendered = Vec::new();
        for template in &self.templates {
            template.render_with(stage, env, evaluator, renderer, options)?;
            if template.in_scope(stage) {
                rendered.push(template);
            }
        }
        Ok(rendered)
    }
}

fn resolve_all<E: Evaluator + ?Sized>(
    vars: &[Variable],
    overrides: &Overrides,
    env: &Environment,
    evaluator: &E,
    stage: &str,
    options: &ResolveOptions,
) -> Result<Map<String, Value>, ManifestError> {
    let mut values = Map::new();
    for var in vars.iter().filter(|v| v.in_scope(stage)) {
        let value = var.resolve_with(overrides, env, evaluator, options)?;
        values.insert(var.id().to_string(), value);
    }
    debug!("resolved {} of {} variables for stage '{}'", values.len(), vars.len(), stage);
    Ok(values)
}

/// Copy `env` and expose resolved inputs under `inputs.<id>`.
pub fn with_inputs(env: &Environment, inputs: &Map<String, Value>) -> Environment {
    let mut env = env.clone();
    env.insert(INPUTS_KEY, Value::Object(inputs.clone()));
    env
}
