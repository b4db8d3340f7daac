mod config;
mod pacer;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use simsync_articulated::ArticulatedModel;
use simsync_assets::{load_channel, load_description, ModelLoader};
use simsync_common::{BodyId, BoxVolume};
use simsync_kernel::{ModelStatus, PhysicsEngine, RigidWorld, SimulationLoop};
use simsync_render::{DebugTextRenderer, RenderView, Renderer, SceneGraph};
use tracing_subscriber::EnvFilter;

use crate::config::SceneConfig;
use crate::pacer::FramePacer;

#[derive(Parser)]
#[command(
    name = "simsync-cli",
    about = "Drive a physics world and a render scene in lockstep"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Load a robot description and report its structure
    Validate {
        /// Path to a robot description (JSON)
        description: PathBuf,
    },
    /// Run the simulation loop headless
    Run {
        /// Number of frames to run
        #[arg(short, long)]
        frames: Option<u64>,
        /// Seconds between frames
        #[arg(long)]
        frame_interval: Option<f64>,
        /// Pace frames against the wall clock instead of synthetic timestamps
        #[arg(long)]
        realtime: bool,
        /// Robot description to load, overriding the config
        #[arg(long)]
        robot: Option<PathBuf>,
        /// Run without a robot
        #[arg(long, conflicts_with = "robot")]
        no_robot: bool,
        /// Print every scene node after the last frame
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::default(),
    };

    match cli.command {
        Commands::Info => {
            println!("simsync-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", simsync_common::crate_info());
            println!("articulated: {}", simsync_articulated::crate_info());
            println!("assets: {}", simsync_assets::crate_info());
            println!("kernel: {}", simsync_kernel::crate_info());
            println!("render: {}", simsync_render::crate_info());
        }
        Commands::Validate { description } => validate(&description)?,
        Commands::Run {
            frames,
            frame_interval,
            realtime,
            robot,
            no_robot,
            dump,
        } => {
            if let Some(frames) = frames {
                config.frames = frames;
            }
            if let Some(interval) = frame_interval {
                config.frame_interval = interval;
            }
            if no_robot {
                config.robot = None;
            } else if let Some(path) = robot {
                config.robot.get_or_insert_with(Default::default).description = path;
            }
            config.validate()?;
            run(&config, realtime, dump)?;
        }
    }

    Ok(())
}

fn validate(path: &Path) -> anyhow::Result<()> {
    let mut model = simsync_assets::load_description(path)
        .with_context(|| format!("loading {}", path.display()))?;
    model.recompute_world_transforms();
    let bounds = model.bounds()?;

    println!("model: {}", model.name());
    println!("root: {}", model.root().name());
    println!("links: {}", model.links().len());
    println!("joints: {}", model.joints().len());
    for joint in model.joints().values() {
        match joint.limit() {
            Some(limit) => println!(
                "  {:<8} {:?} [{:.3}, {:.3}]",
                joint.name(),
                joint.kind(),
                limit.lower,
                limit.upper
            ),
            None => println!("  {:<8} {:?}", joint.name(), joint.kind()),
        }
    }
    let size = bounds.size();
    println!(
        "rest bounds: {:.3} x {:.3} x {:.3}",
        size.x, size.y, size.z
    );
    Ok(())
}

/// The world, scene and loop driven by the `run` command.
struct Session {
    world: RigidWorld,
    scene: SceneGraph,
    sim: SimulationLoop,
    body: BodyId,
    pacer: FramePacer,
    steps: u64,
    regressions: u64,
}

impl Session {
    fn new(config: &SceneConfig, realtime: bool) -> anyhow::Result<Self> {
        let mut world = RigidWorld::new(Vec3::from(config.gravity));
        let body = world.add_body(config.body.to_body());
        let initial = world
            .body_pose(body)
            .context("box body missing right after creation")?;

        let mut scene = SceneGraph::new();
        let node = scene.add_node("box", initial);

        let mut sim = SimulationLoop::new(config.timing.clone())?;
        sim.register_pair(&world, &scene, body, node)?;

        if let Some(robot) = config.robot.clone() {
            // Synthetic runs finish in microseconds, so the description is
            // loaded up front and delivered on the first tick.
            let handle = if realtime {
                ModelLoader::new().load(robot.description.clone())
            } else {
                let (completer, handle) = load_channel(robot.description.clone());
                completer.complete(load_description(&robot.description));
                handle
            };
            sim.attach_loader(
                handle,
                Some(Box::new(move |model: &mut ArticulatedModel| robot.apply(model))),
            );
        }

        let pacer = if realtime {
            FramePacer::realtime(config.frame_interval)
        } else {
            FramePacer::synthetic(config.frame_interval)
        };

        Ok(Self {
            world,
            scene,
            sim,
            body,
            pacer,
            steps: 0,
            regressions: 0,
        })
    }

    fn run_frames(&mut self, frames: u64) {
        for _ in 0..frames {
            let now = self.pacer.next_frame();
            let report = self.sim.tick(now, &mut self.world, &mut self.scene);
            self.steps += u64::from(report.steps);
            if report.clock_regression.is_some() {
                self.regressions += 1;
            }
            if let Some(pose) = self.world.body_pose(self.body) {
                tracing::debug!(
                    frame = report.frame,
                    x = pose.position.x,
                    y = pose.position.y,
                    z = pose.position.z,
                    "box"
                );
            }
        }
    }
}

fn run(config: &SceneConfig, realtime: bool, dump: bool) -> anyhow::Result<()> {
    let mut session = Session::new(config, realtime)?;
    session.run_frames(config.frames);
    let Session {
        world,
        scene,
        sim,
        body,
        steps,
        regressions,
        ..
    } = session;

    let fixed_step = sim.accumulator().fixed_step();
    println!(
        "frames: {}, physics steps: {}, simulated: {:.3}s",
        sim.frame(),
        steps,
        steps as f64 * fixed_step
    );
    if regressions > 0 {
        println!("clock regressions: {regressions}");
    }

    if let Some(box_body) = world.body(body) {
        let p = box_body.pose.position;
        let half = Vec3::from(config.body.half_extents);
        let lowest = BoxVolume::new(Vec3::ZERO, half)
            .world_bounds(&box_body.pose)
            .min
            .y;
        println!(
            "box: pos=({:.3}, {:.3}, {:.3}) spin={:.3} rad/s lowest={:.3}",
            p.x,
            p.y,
            p.z,
            box_body.angular_velocity.length(),
            lowest
        );
    }

    match sim.model_status() {
        ModelStatus::Ready => {
            if let Some(model) = sim.model() {
                let bounds = model.bounds()?;
                println!(
                    "robot: {} ({} links) lowest={:.3} highest={:.3}",
                    model.name(),
                    model.links().len(),
                    bounds.min.y,
                    bounds.max.y
                );
            }
        }
        ModelStatus::Loading => println!("robot: still loading"),
        ModelStatus::Failed => {
            if let Some(e) = sim.load_error() {
                println!("robot: failed ({e})");
            }
        }
        ModelStatus::Absent => println!("robot: none"),
    }
    println!("state hash: {:#018x}", world.state_hash());

    if dump {
        print!(
            "{}",
            DebugTextRenderer::new().render(&scene, &RenderView::default())
        );
    }
    Ok(())
}
