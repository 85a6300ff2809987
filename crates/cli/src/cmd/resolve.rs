use color_eyre::eyre::Result;
use rendervars_core::Manifest;
use rendervars_core::config::EngineConfig;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::{evaluator, fail, load_config, load_inputs};
use crate::ResolveArgs;

pub fn run(config: Option<&Path>, args: &ResolveArgs) {
    let cfg = load_config(config, "resolve");
    match resolve(&cfg, args) {
        Ok(values) => match serde_json::to_string_pretty(&values) {
            Ok(s) => println!("{s}"),
            Err(e) => fail("resolve", e.into()),
        },
        Err(e) => fail("resolve", e),
    }
}

fn resolve(cfg: &EngineConfig, args: &ResolveArgs) -> Result<Value> {
    let manifest = Manifest::load(&args.input.manifest)?;
    let (env, overrides) = load_inputs(&args.input, &manifest)?;
    let evaluator = evaluator(cfg)?;
    let options = cfg.resolve_options();

    debug!("resolving {} for stage '{}'", args.input.manifest.display(), args.stage);
    let values = if args.outputs {
        manifest.resolve_outputs(&overrides, &env, &evaluator, &args.stage, &options)?
    } else {
        manifest.resolve_inputs(&overrides, &env, &evaluator, &args.stage, &options)?
    };
    Ok(Value::Object(values))
}
