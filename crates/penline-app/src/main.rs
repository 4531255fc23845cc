use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use penline_core::{Catalog, EngineConfig};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod replay;

#[derive(Parser, Debug)]
#[command(name = "penline", version)]
struct Cli {
    /// Engine configuration TOML; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the portfolio window (the default).
    Run,
    /// Replay an input script headlessly and save the last frame as PNG.
    Replay {
        /// Replay script JSON.
        script: PathBuf,

        /// Output PNG path.
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_env_filter(filter)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.cmd.unwrap_or(Command::Run) {
        Command::Run => cmd_run(config),
        Command::Replay { script, out } => cmd_replay(&config, script, out),
    }
}

fn cmd_run(config: EngineConfig) -> anyhow::Result<()> {
    info!("Penline starting ({:?} effect, {:?} theme)", config.effect, config.theme);
    let catalog = match &config.catalog {
        Some(path) => Catalog::load(path)
            .with_context(|| format!("load catalog '{}'", path.display()))?,
        None => Catalog::default(),
    };
    penline_ui::run(config, catalog).map_err(|e| anyhow::anyhow!("window failed: {e}"))
}

fn cmd_replay(config: &EngineConfig, script: PathBuf, out: PathBuf) -> anyhow::Result<()> {
    let script = replay::Script::load(&script)?;
    let surface = replay::run(&script, config)?;
    surface
        .save(&out)
        .with_context(|| format!("write PNG '{}'", out.display()))?;
    info!("wrote {}", out.display());
    Ok(())
}
