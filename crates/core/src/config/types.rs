use std::path::PathBuf;

use serde::Deserialize;

use crate::scripting::{EvalError, Evaluator, LuaEvaluator, PathEvaluator, SandboxConfig};
use crate::templates::RenderOptions;
use crate::vars::{DEFAULT_MAX_ITEMS_DEPTH, ResolveOptions};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    #[serde(default)]
    pub resolve: ResolveConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub scripting: ScriptingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResolveConfig {
    #[serde(default = "default_max_items_depth")]
    pub max_items_depth: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self { max_items_depth: default_max_items_depth() }
    }
}

fn default_max_items_depth() -> usize {
    DEFAULT_MAX_ITEMS_DEPTH
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    /// Fail on placeholders missing from a template's mapping.
    #[serde(default = "default_true")]
    pub strict: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { strict: true }
    }
}

fn default_true() -> bool {
    true
}

/// Which evaluator runs `$` expressions.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Path,
    Lua,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScriptingConfig {
    #[serde(default)]
    pub engine: EngineKind,
    /// Lua memory limit in bytes. 0 = unlimited.
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self { engine: EngineKind::default(), memory_limit: default_memory_limit() }
    }
}

fn default_memory_limit() -> usize {
    SandboxConfig::restricted().memory_limit
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration after loading and path expansion.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub resolve: ResolveConfig,
    pub render: RenderConfig,
    pub scripting: ScriptingConfig,
    pub logging: LoggingConfig,
}

impl EngineConfig {
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions { max_items_depth: self.resolve.max_items_depth }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { strict: self.render.strict }
    }

    /// Build the configured evaluator.
    pub fn evaluator(&self) -> Result<Box<dyn Evaluator>, EvalError> {
        match self.scripting.engine {
            EngineKind::Path => Ok(Box::new(PathEvaluator)),
            EngineKind::Lua => {
                let sandbox = SandboxConfig { memory_limit: self.scripting.memory_limit };
                Ok(Box::new(LuaEvaluator::new(sandbox)?))
            }
        }
    }
}
