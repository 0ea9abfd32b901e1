use anyhow::Context;
use clap::{Parser, Subcommand};
use roadster_input::{InputScript, InputState};
use roadster_kernel::{CameraPose, SimConfig, Simulation, VehicleState};
use roadster_render::{DebugTextRenderer, FrameView, Renderer, Scene};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roadster-cli", about = "Run the roadster car simulation headless")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding vehicle and camera-follow parameters
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the active parameters
    Info,
    /// Drive the car through a scripted input sequence
    Run {
        /// Input script, e.g. "forward*60, forward+left*30, none*120"
        #[arg(short, long)]
        script: String,
        /// Print every tick, not just the final frame
        #[arg(long)]
        trace: bool,
        /// Emit one JSON object per tick instead of text
        #[arg(long)]
        json: bool,
    },
    /// Let the car coast from a given speed and count frames until it stops
    Coast {
        /// Starting speed, clamped to the maximum
        #[arg(short, long, default_value = "0.5", allow_hyphen_values = true)]
        speed: f32,
    },
}

#[derive(Serialize)]
struct TickRecord {
    tick: u64,
    input: String,
    vehicle: VehicleState,
    camera: CameraPose,
}

impl TickRecord {
    fn capture(sim: &Simulation, input: &InputState) -> Self {
        Self {
            tick: sim.tick_count(),
            input: input.to_string(),
            vehicle: *sim.vehicle(),
            camera: *sim.camera(),
        }
    }
}

/// Feed every frame of `script` to `sim`, calling `on_tick` after each.
fn drive<F>(sim: &mut Simulation, script: &InputScript, mut on_tick: F) -> anyhow::Result<()>
where
    F: FnMut(&Simulation, &InputState) -> anyhow::Result<()>,
{
    for input in script.frames() {
        sim.tick(&input);
        on_tick(sim, &input)?;
    }
    Ok(())
}

/// Coast with no input until the car is stationary. Returns the frame count.
fn frames_to_stop(sim: &mut Simulation, limit: u64) -> Option<u64> {
    let start = sim.tick_count();
    while !sim.vehicle().is_stationary() {
        if sim.tick_count() - start >= limit {
            return None;
        }
        sim.tick(&InputState::NONE);
    }
    Some(sim.tick_count() - start)
}

/// Frames coasting may take from `speed`: `ceil(|speed| / friction)`.
fn stop_bound(speed: f32, friction: f32) -> u64 {
    (speed.abs() / friction).ceil() as u64
}

/// Starting state for a coast run. Rejects non-finite speeds and clamps the
/// rest to the speed limit.
fn coast_start(speed: f32, config: &SimConfig) -> anyhow::Result<VehicleState> {
    anyhow::ensure!(speed.is_finite(), "starting speed must be finite, got {speed}");
    let max = config.vehicle.max_speed;
    Ok(VehicleState {
        speed: speed.clamp(-max, max),
        ..VehicleState::at_rest(config.vehicle.ride_height)
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = SimConfig::load_or_default(cli.params.as_deref())?;
    let scene = Scene::default();
    let renderer = DebugTextRenderer::new();

    match cli.command {
        Commands::Info => {
            println!("roadster-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", roadster_input::crate_info());
            println!("render: {}", roadster_render::crate_info());
            println!("parameters:\n{}", config.to_json_pretty()?);
        }
        Commands::Run {
            script,
            trace,
            json,
        } => {
            let script: InputScript = script.parse().context("invalid input script")?;
            tracing::info!(frames = script.len(), "running script");

            let mut sim = Simulation::new(config);
            drive(&mut sim, &script, |sim, input| {
                if json {
                    let record = TickRecord::capture(sim, input);
                    println!("{}", serde_json::to_string(&record)?);
                } else if trace {
                    let frame = FrameView::from_simulation(sim);
                    print!("{}", renderer.render(&scene, &frame));
                }
                Ok(())
            })?;

            if !json {
                let v = sim.vehicle();
                let frame = FrameView::from_simulation(&sim);
                print!("{}", renderer.render(&scene, &frame));
                println!(
                    "speed={:.4} heading={:.4} state_hash={:#018x}",
                    v.speed,
                    v.heading,
                    sim.state_hash()
                );
            }
        }
        Commands::Coast { speed } => {
            let start = coast_start(speed, &config)?;
            let mut sim = Simulation::with_vehicle(config, start);
            let bound = stop_bound(start.speed, config.vehicle.friction);
            match frames_to_stop(&mut sim, 1_000_000) {
                Some(frames) => {
                    println!(
                        "stopped after {frames} frames (bound {bound}), travelled {:.3}",
                        sim.vehicle().position.z
                    );
                }
                None => anyhow::bail!("car did not stop; is friction zero?"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coast_from_top_speed_stops_within_bound() {
        let config = SimConfig::default();
        let start = coast_start(0.5, &config).unwrap();
        let bound = stop_bound(start.speed, config.vehicle.friction);
        assert_eq!(bound, 100);
        let mut sim = Simulation::with_vehicle(config, start);
        let frames = frames_to_stop(&mut sim, 10_000).unwrap();
        assert!(frames <= bound);
        assert!(frames >= 99);
    }

    #[test]
    fn coast_rejects_non_finite_speed() {
        let config = SimConfig::default();
        for speed in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let err = coast_start(speed, &config).unwrap_err();
            assert!(err.to_string().contains("finite"));
        }
    }

    #[test]
    fn coast_start_clamps_to_limit() {
        let config = SimConfig::default();
        assert_eq!(coast_start(3.0, &config).unwrap().speed, 0.5);
        assert_eq!(coast_start(-3.0, &config).unwrap().speed, -0.5);
    }

    #[test]
    fn coast_without_friction_hits_limit() {
        let config = SimConfig {
            vehicle: roadster_kernel::VehicleParams {
                friction: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let start = VehicleState {
            speed: 0.1,
            ..VehicleState::default()
        };
        let mut sim = Simulation::with_vehicle(config, start);
        assert_eq!(frames_to_stop(&mut sim, 50), None);
    }

    #[test]
    fn drive_visits_every_frame() {
        let script: InputScript = "forward*10, none*5".parse().unwrap();
        let mut sim = Simulation::default();
        let mut seen = Vec::new();
        drive(&mut sim, &script, |sim, input| {
            seen.push((sim.tick_count(), input.forward));
            Ok(())
        })
        .unwrap();
        assert_eq!(seen.len(), 15);
        assert_eq!(seen[0], (1, true));
        assert_eq!(seen[14], (15, false));
    }

    #[test]
    fn tick_record_serializes() {
        let mut sim = Simulation::default();
        let input = InputState::NONE.with(roadster_input::Control::Forward);
        sim.tick(&input);
        let json = serde_json::to_string(&TickRecord::capture(&sim, &input)).unwrap();
        assert!(json.contains(r#""tick":1"#));
        assert!(json.contains(r#""input":"forward""#));
        assert!(json.contains(r#""speed":0.01"#));
    }
}
