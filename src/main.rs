//! Vista Grande loader - headless driver for the loading-overlay coordinator
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use vista_grande::{run_headless, HeadlessOptions};
use vista_loader::config::init_config_dir;
use vista_loader::FileSessionStorage;

/// Vista Grande loader - drive the loading overlays from stdin
#[derive(Parser, Debug)]
#[command(name = "vista")]
#[command(about = "Headless driver for the Vista Grande loading overlays", long_about = None)]
struct Args {
    /// Directory containing .vista-grande/config.toml
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Keep the session in memory (the splash plays on every run)
    #[arg(long)]
    memory_session: bool,

    /// Do not play the initial splash
    #[arg(long)]
    no_splash: bool,

    /// Write a default config file and exit
    #[arg(long)]
    init_config: bool,

    /// End the persisted session before starting
    #[arg(long)]
    reset_session: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    vista_core::logging::init()?;

    let config_dir = args
        .config_dir
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init_config {
        init_config_dir(&config_dir)?;
        eprintln!("Wrote default config under {}", config_dir.display());
        return Ok(());
    }

    if args.reset_session {
        FileSessionStorage::default_location().clear()?;
    }

    run_headless(HeadlessOptions {
        config_dir,
        memory_session: args.memory_session,
        no_splash: args.no_splash,
    })
    .await?;

    Ok(())
}
