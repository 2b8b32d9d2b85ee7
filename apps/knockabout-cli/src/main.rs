use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use knockabout_common::Viewport;
use knockabout_input::{Action, InputEvent, Key, KeyBindings, input_channel};
use knockabout_kernel::StepMode;
use knockabout_render::{DebugTextRenderer, OrbitCamera};
use knockabout_scene::{FrameDriver, PRESETS, SceneConfig, build_scene};
use knockabout_tools::SceneInspector;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knockabout-cli", about = "CLI tool for knockabout scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the built-in presets
    Info,
    /// Print a built-in preset as a config file
    Preset {
        name: String,
        /// Emit JSON instead of YAML
        #[arg(long)]
        json: bool,
    },
    /// Load, validate, and build a scene config file
    Check { path: PathBuf },
    /// Run a scene headless with scripted input
    Run {
        #[command(flatten)]
        source: SceneSource,
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u64,
        /// Directions held from the first frame
        #[arg(long, value_enum)]
        hold: Vec<HoldDirection>,
        /// Frame at which every held direction is released
        #[arg(long)]
        release_at: Option<u64>,
        /// Frames at which jump is pressed
        #[arg(long)]
        jump_at: Vec<u64>,
        /// Print a summary line every N frames (0 disables)
        #[arg(long, default_value = "30")]
        print_every: u64,
        /// Wall time per frame in milliseconds, used by accumulated stepping
        #[arg(long, default_value = "16")]
        frame_ms: u64,
        /// Step physics from accumulated frame time instead of once per frame
        #[arg(long)]
        accumulate: bool,
    },
}

#[derive(clap::Args)]
struct SceneSource {
    /// Built-in scene preset
    #[arg(long, default_value = "pyramid", conflicts_with = "config")]
    preset: String,
    /// Scene config file (.yaml, .yml, or .json)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HoldDirection {
    Forward,
    Back,
    Left,
    Right,
}

impl HoldDirection {
    fn action(self) -> Action {
        match self {
            HoldDirection::Forward => Action::Forward,
            HoldDirection::Back => Action::Back,
            HoldDirection::Left => Action::Left,
            HoldDirection::Right => Action::Right,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("knockabout-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("presets: {}", PRESETS.join(", "));
            for name in PRESETS {
                let config = SceneConfig::preset(name)?;
                let balls = config.pyramid.as_ref().map_or(0, |p| p.ball_count());
                println!(
                    "  {name}: tick={}Hz speed={} jump={} balls={balls}",
                    config.tick_rate_hz, config.control.speed, config.control.jump_velocity
                );
            }
        }
        Commands::Preset { name, json } => {
            let config = SceneConfig::preset(&name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_yaml_string()?);
            }
        }
        Commands::Check { path } => {
            let config = load_config(Some(&path), "")?;
            let scene = build_scene(&config)
                .with_context(|| format!("scene {} failed to build", path.display()))?;
            println!(
                "OK: {} ({} bodies, {} synced, {} renderables)",
                config.name,
                knockabout_kernel::PhysicsWorld::body_count(&scene.world),
                scene.registry.len(),
                scene.render.len()
            );
        }
        Commands::Run {
            source,
            frames,
            hold,
            release_at,
            jump_at,
            print_every,
            frame_ms,
            accumulate,
        } => {
            let mut config = load_config(source.config.as_deref(), &source.preset)?;
            if accumulate {
                config.step_mode = StepMode::Accumulated {
                    max_steps_per_frame: 5,
                };
            }
            let scene = build_scene(&config).context("failed to build scene")?;

            let viewport = Viewport::default();
            let camera = OrbitCamera::new(config.camera, viewport.aspect());
            let (input, receiver) = input_channel();
            let mut driver = FrameDriver::new(scene, &config, camera, receiver)?;
            let mut renderer = DebugTextRenderer::new(viewport);
            let bindings = &config.control.bindings;

            let held: Vec<Key> = hold
                .iter()
                .map(|d| key_for(bindings, d.action()))
                .collect::<Result<_>>()?;
            let jump_key = key_for(bindings, Action::Jump)?;

            for key in &held {
                input.send(InputEvent::down(key.clone()));
            }

            tracing::info!(scene = %config.name, frames, ?hold, "headless run");
            driver.start();
            let frame_dt = Duration::from_millis(frame_ms);
            let mut last = String::new();
            for frame in 0..frames {
                if release_at == Some(frame) {
                    for key in &held {
                        input.send(InputEvent::up(key.clone()));
                    }
                }
                if jump_at.contains(&frame) {
                    input.send(InputEvent::down(jump_key.clone()));
                    input.send(InputEvent::up(jump_key.clone()));
                }
                if let Some(out) = driver.tick(frame_dt, &mut renderer) {
                    last = out;
                }
                if print_every > 0 && (frame + 1) % print_every == 0 {
                    println!("{}", SceneInspector::summary(&driver));
                }
            }
            print!("{last}");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, preset: &str) -> Result<SceneConfig> {
    let config = match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SceneConfig::preset(preset)?,
    };
    config
        .validate()
        .with_context(|| format!("scene {:?} is invalid", config.name))?;
    Ok(config)
}

fn key_for(bindings: &KeyBindings, action: Action) -> Result<Key> {
    match bindings.keys_for(action).next() {
        Some(key) => Ok(key.clone()),
        None => bail!("no key bound to {action:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_parse() {
        let cli = Cli::try_parse_from([
            "knockabout-cli",
            "run",
            "--preset",
            "solo",
            "--hold",
            "forward",
            "--hold",
            "left",
            "--jump-at",
            "5",
            "--frames",
            "10",
        ])
        .unwrap();
        let Commands::Run {
            source,
            hold,
            jump_at,
            frames,
            ..
        } = cli.command
        else {
            panic!("expected run");
        };
        assert_eq!(source.preset, "solo");
        assert_eq!(hold.len(), 2);
        assert_eq!(jump_at, vec![5]);
        assert_eq!(frames, 10);
    }

    #[test]
    fn preset_and_config_conflict() {
        let parsed = Cli::try_parse_from([
            "knockabout-cli",
            "run",
            "--preset",
            "solo",
            "--config",
            "scene.yaml",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn default_bindings_cover_cli_actions() {
        let bindings = KeyBindings::default();
        assert_eq!(key_for(&bindings, Action::Jump).unwrap(), Key::new("Space"));
        assert_eq!(
            key_for(&bindings, HoldDirection::Back.action()).unwrap(),
            Key::new("KeyS")
        );
        assert!(key_for(&KeyBindings::empty(), Action::Jump).is_err());
    }

    #[test]
    fn load_config_by_preset() {
        assert_eq!(load_config(None, "solo").unwrap().name, "solo");
        assert!(load_config(None, "nope").is_err());
    }
}
