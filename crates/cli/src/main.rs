mod cmd;
mod logging;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rvars", version, about = "Resolve unit variables and render templates")]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate configuration and print the effective settings
    Doctor,

    /// Resolve a manifest's inputs and print them as JSON
    Resolve(ResolveArgs),

    /// Resolve inputs and render every template in scope
    Render(RenderArgs),
}

/// Where values come from when resolving a manifest.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Unit manifest (YAML or JSON)
    #[arg(long, short)]
    pub manifest: PathBuf,

    /// JSON file with the evaluation environment
    #[arg(long)]
    pub env: Option<PathBuf>,

    /// Override a variable value (key=value, value parsed as JSON when possible)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Deployment stage to filter variables by
    #[arg(long, default_value = "build")]
    pub stage: String,

    /// Resolve outputs instead of inputs
    #[arg(long)]
    pub outputs: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Deployment stage to render for
    #[arg(long)]
    pub stage: String,

    /// Leave unknown placeholders in place instead of failing
    #[arg(long)]
    pub lenient: bool,
}

fn main() {
    if let Err(e) = color_eyre::install() {
        eprintln!("failed to install error reporter: {e}");
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Doctor => cmd::doctor::run(cli.config.as_deref()),
        Commands::Resolve(args) => cmd::resolve::run(cli.config.as_deref(), &args),
        Commands::Render(args) => cmd::render::run(cli.config.as_deref(), &args),
    }

    logging::flush();
}
