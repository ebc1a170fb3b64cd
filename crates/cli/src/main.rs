#![deny(unsafe_code)]
//! CLI binary for the particle field engine.
//!
//! Subcommands:
//! - `render <preset>`: run a preset headlessly for N ticks, write a PNG
//! - `replay <seed.json>`: re-render a saved seed
//! - `list`: print available presets and parameters

mod error;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use log::info;
use particle_field_core::{FieldConfig, PointerPath, Seed};
use particle_field_engines::snapshot::write_png;
use particle_field_engines::{render_seed, Preset};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "particle-field", about = "Particle field effect renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Scripted pointer motion for headless renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PointerArg {
    None,
    Circle,
    Sweep,
}

impl PointerArg {
    fn path(self, period_ticks: u64) -> PointerPath {
        match self {
            PointerArg::None => PointerPath::None,
            PointerArg::Circle => PointerPath::Circle {
                radius: 0.5,
                period_ticks,
            },
            PointerArg::Sweep => PointerPath::Sweep { period_ticks },
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run a preset for N ticks and write a PNG snapshot.
    Render {
        /// Preset name (e.g. "neural-network").
        preset: String,

        /// Surface width in pixels.
        #[arg(short = 'W', long, default_value_t = 640)]
        width: usize,

        /// Surface height in pixels.
        #[arg(short = 'H', long, default_value_t = 360)]
        height: usize,

        /// Number of frames to run.
        #[arg(short, long, default_value_t = 300)]
        ticks: u64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Pointer motion fed to the field while it runs.
        #[arg(short, long, value_enum, default_value_t = PointerArg::None)]
        pointer: PointerArg,

        /// Ticks per pointer loop.
        #[arg(long, default_value_t = 240)]
        pointer_period: u64,

        /// Parameter overrides as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,

        /// Also write the seed needed to reproduce this render.
        #[arg(long)]
        save_seed: Option<PathBuf>,
    },
    /// Re-render a seed file written by `render --save-seed`.
    Replay {
        /// Path to the seed JSON.
        seed_file: PathBuf,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List available presets and parameters.
    List,
}

fn read_seed(path: &Path) -> Result<Seed, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid seed file {}: {e}", path.display())))
}

fn write_seed(seed: &Seed, path: &Path) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(seed)?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Io(format!("cannot write {}: {e}", path.display())))
}

/// Renders `seed` to `output` and reports the result.
fn render_to(seed: &Seed, output: &Path, json: bool) -> Result<(), CliError> {
    let render = render_seed(seed)?;
    write_png(&render.raster, output)?;
    info!("wrote {}", output.display());

    if json {
        let info = serde_json::json!({
            "preset": seed.preset,
            "width": seed.width,
            "height": seed.height,
            "ticks": seed.ticks,
            "frames": render.frames,
            "seed": seed.seed,
            "params": render.params,
            "output": output.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} ticks, seed {}) -> {}",
            seed.preset,
            seed.width,
            seed.height,
            seed.ticks,
            seed.seed,
            output.display()
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let presets = Preset::list_names();
            let schema = FieldConfig::param_schema();
            if cli.json {
                let info = serde_json::json!({
                    "presets": presets,
                    "params": schema,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Presets:");
                for name in presets {
                    println!("  {name}");
                }
                println!("Params:");
                if let Some(entries) = schema.as_object() {
                    for (key, entry) in entries {
                        let desc = entry["description"].as_str().unwrap_or_default();
                        println!("  {key:<20} {desc}");
                    }
                }
            }
        }
        Command::Render {
            preset,
            width,
            height,
            ticks,
            seed,
            pointer,
            pointer_period,
            params,
            output,
            save_seed,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;

            let mut job = Seed::new(&preset, width, height, seed);
            job.params = params;
            job.ticks = ticks;
            job.pointer = pointer.path(pointer_period);

            render_to(&job, &output, cli.json)?;
            if let Some(path) = save_seed {
                write_seed(&job, &path)?;
            }
        }
        Command::Replay { seed_file, output } => {
            let seed = read_seed(&seed_file)?;
            render_to(&seed, &output, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_args_parse_with_defaults() {
        let cli = Cli::try_parse_from(["particle-field", "render", "repel"]).unwrap();
        match cli.command {
            Command::Render {
                preset,
                width,
                pointer,
                save_seed,
                ..
            } => {
                assert_eq!(preset, "repel");
                assert_eq!(width, 640);
                assert_eq!(pointer, PointerArg::None);
                assert!(save_seed.is_none());
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn pointer_arg_maps_to_path() {
        assert_eq!(PointerArg::None.path(10), PointerPath::None);
        assert_eq!(
            PointerArg::Sweep.path(10),
            PointerPath::Sweep { period_ticks: 10 }
        );
        assert!(matches!(
            PointerArg::Circle.path(10),
            PointerPath::Circle { period_ticks: 10, .. }
        ));
    }

    #[test]
    fn bad_params_json_is_an_input_error() {
        let cli = Cli::try_parse_from(["particle-field", "render", "trail", "--params", "{nope"])
            .unwrap();
        let err = run(cli).err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn unknown_preset_is_an_engine_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("x.png");
        let cli = Cli::try_parse_from([
            "particle-field",
            "render",
            "fireworks",
            "-o",
            out.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(run(cli).err().unwrap().exit_code(), 10);
    }

    #[test]
    fn saved_seed_replays_to_the_same_image() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        let seed_path = dir.path().join("seed.json");

        let cli = Cli::try_parse_from([
            "particle-field",
            "render",
            "attraction",
            "-W",
            "48",
            "-H",
            "32",
            "--ticks",
            "12",
            "--pointer",
            "circle",
            "-o",
            first.to_str().unwrap(),
            "--save-seed",
            seed_path.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).ok().unwrap();

        let cli = Cli::try_parse_from([
            "particle-field",
            "replay",
            seed_path.to_str().unwrap(),
            "-o",
            second.to_str().unwrap(),
        ])
        .unwrap();
        run(cli).ok().unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
        let seed = read_seed(&seed_path).ok().unwrap();
        assert_eq!(seed.preset, "attraction");
        assert_eq!(seed.ticks, 12);
    }

    #[test]
    fn missing_seed_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_seed(&dir.path().join("absent.json")).err().unwrap();
        assert_eq!(err.exit_code(), 11);
    }
}
