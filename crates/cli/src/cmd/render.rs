use color_eyre::eyre::Result;
use rendervars_core::config::EngineConfig;
use rendervars_core::manifest::with_inputs;
use rendervars_core::{Manifest, PlaceholderRenderer, RenderOptions};
use std::path::{Path, PathBuf};
use tracing::info;

use super::{evaluator, fail, load_config, load_inputs};
use crate::RenderArgs;

pub fn run(config: Option<&Path>, args: &RenderArgs) {
    let cfg = load_config(config, "render");
    match render(&cfg, args) {
        Ok(written) => {
            println!("OK   rvars render");
            println!("stage: {}", args.stage);
            println!("rendered: {}", written.len());
            for (source, target) in written {
                println!("  {} -> {}", source.display(), target.display());
            }
        }
        Err(e) => fail("render", e),
    }
}

fn render(cfg: &EngineConfig, args: &RenderArgs) -> Result<Vec<(PathBuf, PathBuf)>> {
    let manifest = Manifest::load(&args.input.manifest)?;
    let (env, overrides) = load_inputs(&args.input, &manifest)?;
    let evaluator = evaluator(cfg)?;

    let inputs = manifest.resolve_inputs(
        &overrides,
        &env,
        &evaluator,
        &args.stage,
        &cfg.resolve_options(),
    )?;
    let env = with_inputs(&env, &inputs);

    let options = if args.lenient { RenderOptions::lenient() } else { cfg.render_options() };
    let rendered =
        manifest.render_templates(&args.stage, &env, &evaluator, &PlaceholderRenderer, options)?;

    info!("rendered {} templates for stage '{}'", rendered.len(), args.stage);
    Ok(rendered
        .into_iter()
        .map(|t| (t.source_file().to_path_buf(), t.target_file().to_path_buf()))
        .collect())
}
