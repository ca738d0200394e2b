//! # Reverie Main Entry Point
//!
//! Parses the command line, loads configuration and content, and hands
//! control to the scene manager at the main menu.

use clap::Parser;
use log::{error, info};
use macroquad::prelude::*;
use reverie::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use reverie::generation::utils::random_seed;
use reverie::{Catalog, GameConfig, InputHandler, ReverieResult, SceneManager};
use std::path::PathBuf;
use std::rc::Rc;

/// Command line arguments for Reverie.
#[derive(Parser, Debug)]
#[command(name = "reverie")]
#[command(about = "A real-time roguelike shooter through procedurally grown dream rooms")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Game configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Content catalog file (JSON) replacing the built-in tables
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Directory of hand-made level files
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Growth planted in the root room; roughly the number of rooms
    #[arg(long)]
    growth: Option<u32>,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("Reverie v{}", reverie::VERSION),
        window_width: SCREEN_WIDTH as i32,
        window_height: SCREEN_HEIGHT as i32,
        window_resizable: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() -> ReverieResult<()> {
    let args = Args::parse();
    initialize_logging(&args.log_level);
    info!("Starting Reverie v{}", reverie::VERSION);

    let (config, catalog) = match load_setup(&args) {
        Ok(setup) => setup,
        Err(err) => {
            error!("Startup failed: {}", err);
            return Err(err);
        }
    };

    let mut scenes = SceneManager::new(config, Rc::new(catalog), InputHandler::new());
    scenes.run().await
}

/// Initializes `env_logger`; `RUST_LOG` takes precedence over `--log-level`.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();
}

/// Builds the session configuration and content tables from the arguments.
fn load_setup(args: &Args) -> ReverieResult<(GameConfig, Catalog)> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    match args.seed {
        Some(seed) => config.generation.seed = seed,
        None if args.config.is_none() => config.generation.seed = random_seed(),
        None => {}
    }
    if let Some(growth) = args.growth {
        config.generation.initial_growth = growth;
    }
    if let Some(levels) = &args.levels {
        config.levels_dir = Some(levels.clone());
    }
    config.validate()?;

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    catalog.validate()?;

    info!(
        "Seed {}, growth {}, levels from {}",
        config.generation.seed,
        config.generation.initial_growth,
        config
            .levels_dir
            .as_ref()
            .map_or_else(|| "the generator".to_string(), |dir| dir.display().to_string())
    );
    Ok((config, catalog))
}
