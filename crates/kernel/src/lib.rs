//! Simulation kernel: fixed-timestep accumulation, physics stepping, and
//! body-to-node pose synchronization, driven one frame at a time.
//!
//! # Invariants
//! - Physics only ever advances in whole fixed steps.
//! - Every registered body/node pair is copied on every tick, stepped or not.
//! - The articulated model is never touched before its load has completed.
//! - Neither the physics world nor the render scene is owned here; both are
//!   passed into each call.

pub mod accumulator;
pub mod clock;
pub mod config;
pub mod physics;
pub mod sim_loop;
pub mod sync;
pub mod world;

pub use accumulator::{CatchUpPolicy, ClockRegression, StepPlan, TimeAccumulator};
pub use clock::MonotonicClock;
pub use config::{ConfigurationError, LoopConfig};
pub use physics::{PhysicsEngine, RenderScene};
pub use sim_loop::{ModelStatus, OnLoad, SimulationLoop, TickReport};
pub use sync::{PairRegistry, SyncPair};
pub use world::{RigidBody, RigidWorld};

pub fn crate_info() -> &'static str {
    "simsync-kernel v0.1.0"
}
