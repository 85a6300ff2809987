pub mod doctor;
pub mod render;
pub mod resolve;

use color_eyre::eyre::{Result, WrapErr, eyre};
use rendervars_core::config::{ConfigLoader, EngineConfig, default_config_path};
use rendervars_core::{Environment, Evaluator, Manifest, Overrides, VariableType};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::InputArgs;
use crate::logging;

/// Load configuration and start logging, or print the failure and exit.
pub fn load_config(config: Option<&Path>, command: &str) -> EngineConfig {
    match ConfigLoader::load(config) {
        Ok(cfg) => {
            logging::init(&cfg);
            cfg
        }
        Err(e) => {
            println!("FAIL rvars {command}");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}

/// Print a failed command and its error chain, then exit.
pub fn fail(command: &str, err: color_eyre::Report) -> ! {
    println!("FAIL rvars {command}");
    let mut last = String::new();
    for cause in err.chain() {
        let msg = cause.to_string();
        // thiserror messages often embed their source already
        if !last.contains(&msg) {
            println!("{msg}");
        }
        last = msg;
    }
    tracing::debug!("{err:?}");
    logging::flush();
    std::process::exit(1);
}

/// Read the `--env` JSON file, or start from an empty environment.
pub fn load_env(path: Option<&Path>) -> Result<Environment> {
    let Some(path) = path else {
        return Ok(Environment::new());
    };
    let s = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read environment {}", path.display()))?;
    let value: Value = serde_json::from_str(&s)
        .wrap_err_with(|| format!("failed to parse environment {}", path.display()))?;
    Environment::try_from(value)
        .map_err(|e| eyre!("environment {} must be a JSON object: {e}", path.display()))
}

/// Build the configured evaluator.
pub fn evaluator(cfg: &EngineConfig) -> Result<Box<dyn Evaluator>> {
    cfg.evaluator().map_err(|e| eyre!("failed to start the expression engine: {e}"))
}

/// Parse `--set key=value` arguments into overrides.
///
/// Values for `string` variables are kept verbatim. For other declared
/// types a value that parses as JSON keeps its JSON type and anything else
/// is a string, left to the type validator. Undeclared ids stay strings.
pub fn parse_overrides(args: &[String], manifest: &Manifest) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    for arg in args {
        let (key, raw) = arg
            .split_once('=')
            .ok_or_else(|| eyre!("invalid --set '{arg}', expected key=value"))?;
        if key.is_empty() {
            return Err(eyre!("invalid --set '{arg}', key is empty"));
        }
        let declared = manifest
            .inputs
            .iter()
            .chain(&manifest.outputs)
            .find(|v| v.id() == key)
            .map(|v| v.var_type());
        let value = match declared {
            Some(VariableType::String) | None => Value::String(raw.to_string()),
            Some(_) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            }
        };
        overrides.insert(key.to_string(), value);
    }
    Ok(overrides)
}

pub fn load_inputs(args: &InputArgs, manifest: &Manifest) -> Result<(Environment, Overrides)> {
    let env = load_env(args.env.as_deref())?;
    let overrides = parse_overrides(&args.set, manifest)?;
    Ok((env, overrides))
}
