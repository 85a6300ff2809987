use rendervars_core::config::{EngineKind, default_config_path};
use std::path::Path;

use super::load_config;

pub fn run(config: Option<&Path>) {
    let cfg = load_config(config, "doctor");

    println!("OK   rvars doctor");
    println!(
        "path: {}",
        config.map_or_else(
            || default_config_path().display().to_string(),
            |p| p.display().to_string()
        )
    );
    let engine = match cfg.scripting.engine {
        EngineKind::Path => "path",
        EngineKind::Lua => "lua",
    };
    println!("engine: {engine}");
    if cfg.scripting.engine == EngineKind::Lua {
        println!("memory_limit: {}", cfg.scripting.memory_limit);
    }
    println!("strict: {}", cfg.render.strict);
    println!("max_items_depth: {}", cfg.resolve.max_items_depth);
    println!("log_level: {}", cfg.logging.level);
    if let Some(ref file) = cfg.logging.file {
        println!("log_file: {}", file.display());
    }
}
