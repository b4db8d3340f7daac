//! Shared types: poses, body/node identifiers, bounding volumes.
//!
//! # Invariants
//! - A `Pose` orientation is a unit quaternion after every write.

mod bounds;
mod types;

pub use bounds::{Aabb, BoxVolume};
pub use types::{BodyId, NodeId, Pose};

pub fn crate_info() -> &'static str {
    "simsync-common v0.1.0"
}
