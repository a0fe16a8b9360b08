#![deny(unsafe_code)]
//! CLI binary for the tileburst effect.
//!
//! Subcommands:
//! - `render`: replay a scenario headlessly, write PNG frames
//! - `list`: print available sources and render modes

mod args;
mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tileburst_core::{RenderMode, Scenario, ScheduledImpact, Surface, TileError};
use tileburst_sources::snapshot::write_png;
use tileburst_sources::SourceKind;

#[derive(Parser)]
#[command(name = "tileburst", about = "Exploding video tiles, rendered headlessly")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a source through the tile renderer and write PNG frames.
    Render {
        /// Source name (e.g. "bars"), ignored with --scenario.
        #[arg(long, default_value = "bars")]
        source: String,

        /// Render mode: rectangles or ellipses.
        #[arg(short, long, default_value = "rectangles")]
        mode: String,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = tileburst_core::config::DEFAULT_SURFACE_WIDTH)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = tileburst_core::config::DEFAULT_SURFACE_HEIGHT)]
        height: usize,

        /// Number of frames to render.
        #[arg(short, long, default_value_t = 60)]
        ticks: usize,

        /// PRNG seed for impact jitter and spin.
        #[arg(long, default_value_t = tileburst_core::config::DEFAULT_SEED)]
        seed: u64,

        /// Apply the tile rotation in ellipse mode too.
        #[arg(long)]
        rotate_ellipses: bool,

        /// Impact at surface point X,Y before tick T; repeatable.
        #[arg(
            long = "impact",
            value_name = "X,Y@T",
            value_parser = args::parse_impact,
            allow_hyphen_values = true
        )]
        impacts: Vec<ScheduledImpact>,

        /// Toggle playback before tick T; repeatable.
        #[arg(long = "toggle", value_name = "T")]
        toggles: Vec<usize>,

        /// Source parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Scenario JSON file; replaces the source, config, and event flags.
        #[arg(long)]
        scenario: Option<PathBuf>,

        /// Where to write the last frame.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Also write every frame into this directory.
        #[arg(long)]
        frames_dir: Option<PathBuf>,
    },
    /// List available sources and render modes.
    List,
}

fn load_scenario(path: &Path) -> Result<Scenario, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scenario {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let sources = SourceKind::list_sources();
            let modes = RenderMode::list_names();
            if cli.json {
                let info = serde_json::json!({
                    "sources": sources,
                    "modes": modes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Sources:");
                for name in sources {
                    println!("  {name}");
                }
                println!("Modes:");
                println!("  {}", modes.join(", "));
            }
        }
        Command::Render {
            source,
            mode,
            width,
            height,
            ticks,
            seed,
            rotate_ellipses,
            impacts,
            toggles,
            params,
            scenario,
            output,
            frames_dir,
        } => {
            let scenario = match scenario {
                Some(path) => load_scenario(&path)?,
                None => {
                    let params: serde_json::Value = serde_json::from_str(&params)
                        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
                    let mut s = Scenario::new(&source, ticks);
                    s.source_params = params;
                    s.config.mode = mode.parse()?;
                    s.config.surface_width = width;
                    s.config.surface_height = height;
                    s.config.seed = seed;
                    s.config.rotate_ellipses = rotate_ellipses;
                    s.impacts = impacts;
                    s.playback_toggles = toggles;
                    s
                }
            };

            if let Some(dir) = &frames_dir {
                fs::create_dir_all(dir)
                    .map_err(|e| CliError::Io(format!("{}: {e}", dir.display())))?;
            }

            let last = scenario.ticks.saturating_sub(1);
            let summary = tileburst_sources::player::play(&scenario, |tick, surface: &Surface| {
                if let Some(dir) = &frames_dir {
                    write_png(surface.pixels(), &dir.join(format!("frame-{tick:04}.png")))?;
                }
                if tick == last {
                    write_png(surface.pixels(), &output)?;
                }
                Ok::<(), TileError>(())
            })?;

            if cli.json {
                let info = serde_json::json!({
                    "source": scenario.source,
                    "mode": scenario.config.mode.name(),
                    "width": scenario.config.surface_width,
                    "height": scenario.config.surface_height,
                    "ticks": summary.ticks,
                    "seed": scenario.config.seed,
                    "impacts": summary.impacts,
                    "tiles": summary.tiles,
                    "tiles_hit": summary.tiles_hit,
                    "settled": summary.settled,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({} mode, {}x{}, {} ticks, {} impacts, seed {}) -> {}",
                    scenario.source,
                    scenario.config.mode,
                    scenario.config.surface_width,
                    scenario.config.surface_height,
                    summary.ticks,
                    summary.impacts,
                    scenario.config.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
