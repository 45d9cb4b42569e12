use std::path::PathBuf;

use clap::{Parser, Subcommand};
use realm_config::GameConfig;
use realm_input::{Action, CameraOrientation, InputSnapshot};
use realm_kernel::{FrameEvent, Simulation};
use realm_render::DebugTextRenderer;
use realm_runtime::Game;
use realm_terrain::{Terrain, height_at};
use realm_tools::{FrameInspector, FrameSummary};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "realm-cli", about = "Headless tools for silent-realm")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate the terrain and print its statistics
    Terrain {
        /// Side length in world units
        #[arg(long)]
        size: Option<f32>,
        /// Segments per side
        #[arg(long)]
        resolution: Option<u32>,
    },
    /// Step the player over the terrain with fixed input
    Simulate {
        /// Number of frames to step
        #[arg(short, long, default_value = "300")]
        frames: u64,
        /// Actions held for every frame, e.g. `forward` or `strafe-left`
        #[arg(long = "hold", value_name = "ACTION")]
        hold: Vec<Action>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run full frames against the text backend and print each one
    Render {
        /// Number of frames to draw
        #[arg(short, long, default_value = "3")]
        frames: u64,
    },
}

#[derive(Serialize)]
struct SimulationReport {
    summary: FrameSummary,
    events: Vec<FrameEvent>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = GameConfig::load_or_default(cli.config.as_deref())?;
    tracing::debug!(config = ?cli.config, "realm-cli starting");

    match cli.command {
        Commands::Info => {
            println!("realm-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", realm_common::crate_info());
            println!("terrain: {}", realm_terrain::crate_info());
            println!("input: {}", realm_input::crate_info());
            println!("kernel: {}", realm_kernel::crate_info());
            println!("render: {}", realm_render::crate_info());
            println!("assets: {}", realm_assets::crate_info());
            println!("config: {}", realm_config::crate_info());
            println!("runtime: {}", realm_runtime::crate_info());
            println!("tools: {}", realm_tools::crate_info());
        }
        Commands::Terrain { size, resolution } => {
            let mut terrain_config = config.terrain;
            if let Some(size) = size {
                terrain_config.size = size;
            }
            if let Some(resolution) = resolution {
                terrain_config.resolution = resolution;
            }
            let terrain = Terrain::generate(terrain_config)?;
            println!("{}", FrameInspector::terrain(&terrain));
            println!("Height at origin: {:.3}", height_at(0.0, 0.0));
        }
        Commands::Simulate { frames, hold, json } => {
            let terrain = Terrain::generate(config.terrain)?;
            let mut simulation = Simulation::new(config.player);
            let mut orientation = CameraOrientation::default();
            let input = InputSnapshot::holding(&hold);
            for _ in 0..frames {
                simulation.step(&input, &mut orientation, &terrain);
            }

            let report = SimulationReport {
                summary: FrameInspector::summary(&simulation, &orientation),
                events: simulation.drain_events(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.summary);
                for event in &report.events {
                    match event {
                        FrameEvent::Landed { tick, position } => println!(
                            "  tick {tick}: landed at ({:.2}, {:.2}, {:.2})",
                            position.x, position.y, position.z
                        ),
                        FrameEvent::Jumped { tick } => println!("  tick {tick}: jumped"),
                    }
                }
            }
        }
        Commands::Render { frames } => {
            let mut backend = DebugTextRenderer::new();
            let mut game = Game::start(&mut backend, config)?;
            game.finish_textures(&mut backend);
            for _ in 0..frames {
                game.run_frame(&mut backend);
                if let Some(text) = backend.last_frame() {
                    println!("{text}");
                }
            }
        }
    }

    Ok(())
}
