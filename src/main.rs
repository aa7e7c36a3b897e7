use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use why_am_i_flying::app::{self, Options};
use why_am_i_flying::assets::CharacterId;
use why_am_i_flying::config::project_paths;

#[derive(Parser, Debug)]
#[command(name = "why-am-i-flying")]
#[command(about = "Flap between the pipes. Space to flap, r to restart, h for home, q to quit")]
struct Cli {
    /// Character to fly with (remembered for next time)
    #[arg(long, value_enum)]
    character: Option<CharacterId>,
    /// Frame rate; physics runs one tick per frame
    #[arg(long)]
    fps: Option<u32>,
    /// Disable sound
    #[arg(long)]
    mute: bool,
    /// Seed for pipe placement, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Where settings and the high score live
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Log file (defaults to the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// `RUST_LOG`-style directives on top of an `info` default.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    // The terminal belongs to the renderer, so logs go to a file
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = project_paths(cli.data_dir.as_deref())?;
    init_logging(cli.log_file.as_deref().unwrap_or(&paths.log_path))?;

    let opts = Options {
        character: cli.character,
        fps: cli.fps,
        mute: cli.mute,
        seed: cli.seed,
    };
    app::run(&paths, opts)
}
