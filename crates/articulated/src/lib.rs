//! Articulated model: a tree of links connected by named joints.
//!
//! # Invariants
//! - Structure (links, joints) is frozen once `ModelBuilder::build` succeeds.
//! - Setting joint values and propagating world transforms are separate steps.
//! - Fixed joints always read 0.

mod builder;
mod error;
mod joint;
mod link;
mod model;

pub use builder::{JointSpec, LinkSpec, ModelBuilder};
pub use error::{ModelError, UnknownJointError};
pub use joint::{Joint, JointKind, JointLimit};
pub use link::{Link, LinkId};
pub use model::ArticulatedModel;

pub fn crate_info() -> &'static str {
    "simsync-articulated v0.1.0"
}
