/// objview - OBJ wireframe viewer for the terminal
///
/// Loads a Wavefront OBJ scene, prints its statistics, then spins it as a
/// wireframe until Q, Esc or Ctrl-C is pressed.
use anyhow::{Context, Result};
use clap::Parser;
use objview_core::load_obj;
use objview_terminal::{config::load_config, Config, TerminalApp};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "objview", version, about = "Spin an OBJ scene as a terminal wireframe")]
struct Cli {
    /// OBJ scene file to load
    scene: PathBuf,

    /// TOML configuration file (camera, animation, limits)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Frame rate cap, 0 for uncapped
    #[arg(long)]
    fps: Option<u32>,

    /// Exit after rendering this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Print the scene statistics and exit without rendering
    #[arg(long)]
    summary_only: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so the summary on stdout stays clean
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    }
    .with_target_fps(cli.fps);

    let scene = load_obj(&cli.scene, config.limits())
        .with_context(|| format!("Failed to load scene {}", cli.scene.display()))?;

    print!("{}", scene.summary());

    if cli.summary_only {
        return Ok(());
    }

    println!("Starting terminal renderer (press Q to quit)...");

    let mut app = TerminalApp::new(scene, &config)
        .context("Failed to query terminal size")?
        .with_frame_limit(cli.frames);
    app.run().context("Terminal render loop failed")?;

    Ok(())
}
