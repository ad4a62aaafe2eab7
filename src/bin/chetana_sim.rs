//! Scripted simulation runner.
//!
//! Drives the full autonomy stack against the in-memory motion controller
//! inside a square room. Sensor samples are synthesized from the
//! dead-reckoned pose: light bumps fall off with distance to the nearest
//! wall along each channel, and the bumper closes when the nose is
//! against a wall.
//!
//! Usage:
//!   chetana-sim --goal "follow the right wall for 20 seconds"
//!   chetana-sim --config chetana.toml --cycles 2000 --seed 7

use chetana::{
    Autonomy, ChetanaConfig, GoalOptions, LightBumps, LightChannel, ManualClock, Pose, Result,
    SensorSample, SimulatedMotionController, SpatialEvent,
};
use clap::Parser;
use std::path::PathBuf;

/// Chetana simulation runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Goal text handed to the mission planner
    #[arg(short, long, default_value = "patrol for 30 seconds")]
    goal: String,

    /// Number of control cycles to run
    #[arg(short = 'n', long, default_value_t = 600)]
    cycles: usize,

    /// Milliseconds of simulated time per cycle
    #[arg(long, default_value_t = 250)]
    cycle_ms: u64,

    /// Wander RNG seed (overrides the config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Side length of the square room in mm
    #[arg(long, default_value_t = 3000.0)]
    room_mm: f64,
}

/// Distance at which a light bump saturates, in mm
const LIGHT_NEAR_MM: f64 = 60.0;
/// Light reading at `LIGHT_NEAR_MM`
const LIGHT_MAX: f64 = 1000.0;
/// Nose-to-wall distance that closes the bumper
const BUMP_DISTANCE_MM: f64 = 80.0;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ChetanaConfig::load(path)?,
        None => ChetanaConfig::default(),
    };
    if args.seed.is_some() {
        config.behavior.rng_seed = args.seed;
    }

    let clock = ManualClock::new(0);
    let mut autonomy = Autonomy::new(&config, SimulatedMotionController::new(), clock.shared());
    let summaries = autonomy.subscribe_spatial();

    autonomy.enable_autonomy("simulation");
    autonomy.ingest_goal(
        &args.goal,
        GoalOptions {
            append: false,
            source: "chetana-sim".to_string(),
        },
    );

    let room = Room::new(args.room_mm);
    let mut battery = 100.0;

    for cycle in 0..args.cycles {
        clock.advance(args.cycle_ms);

        let pose = autonomy
            .spatial()
            .map(|s| s.pose())
            .unwrap_or_default();
        battery = (battery - 0.01_f64).max(0.0);
        autonomy.handle_sensor_sample(room.sample(&pose, battery));

        let event = autonomy.motion_mut().and_then(|m| m.poll());
        if let Some(event) = event {
            autonomy.handle_motion_event(event);
        }

        if let Some(rx) = &summaries {
            for SpatialEvent::Summary(summary) in rx.try_iter() {
                log::debug!("cycle {}: {}", cycle, summary.summary);
            }
        }
    }

    log::info!("{}", autonomy.describe_status());
    for step in autonomy.planner().history() {
        log::info!(
            "step {} {} ({}): {}",
            step.id,
            step.behavior,
            step.note,
            step.result.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Axis-aligned room centred on the start pose.
struct Room {
    half: f64,
}

impl Room {
    fn new(side_mm: f64) -> Self {
        Self {
            half: side_mm.max(2.0 * BUMP_DISTANCE_MM) / 2.0,
        }
    }

    /// Distance from `(x, y)` to the nearest wall along `heading_deg`.
    fn ray_distance(&self, x: f64, y: f64, heading_deg: f64) -> f64 {
        let (sin, cos) = heading_deg.to_radians().sin_cos();
        let along = |pos: f64, dir: f64| {
            if dir > 1e-9 {
                (self.half - pos) / dir
            } else if dir < -1e-9 {
                (-self.half - pos) / dir
            } else {
                f64::INFINITY
            }
        };
        along(x, cos).min(along(y, sin)).max(0.0)
    }

    fn light(&self, pose: &Pose, channel: LightChannel) -> f64 {
        let distance = self.ray_distance(pose.x, pose.y, pose.heading + channel.relative_angle());
        (LIGHT_MAX * LIGHT_NEAR_MM / distance.max(LIGHT_NEAR_MM)).round()
    }

    fn sample(&self, pose: &Pose, battery: f64) -> SensorSample {
        let bumps = LightBumps {
            left: Some(self.light(pose, LightChannel::Left)),
            front_left: Some(self.light(pose, LightChannel::FrontLeft)),
            center_left: Some(self.light(pose, LightChannel::CenterLeft)),
            center_right: Some(self.light(pose, LightChannel::CenterRight)),
            front_right: Some(self.light(pose, LightChannel::FrontRight)),
            right: Some(self.light(pose, LightChannel::Right)),
        };

        let left_gap = self.ray_distance(pose.x, pose.y, pose.heading + 30.0);
        let right_gap = self.ray_distance(pose.x, pose.y, pose.heading - 30.0);
        let contact = left_gap.min(right_gap) < BUMP_DISTANCE_MM;

        SensorSample {
            bump_left: Some(contact && left_gap <= right_gap),
            bump_right: Some(contact && right_gap < left_gap),
            light_bumps: Some(bumps),
            battery_percentage: Some(battery.round()),
            ..Default::default()
        }
    }
}
