//! Boundaries to the two scene graphs the loop keeps in step.

use glam::{Quat, Vec3};
use simsync_common::{BodyId, NodeId, Pose};

/// The physics engine as seen by the loop.
///
/// The loop only ever asks for whole fixed steps. Any internal sub-stepping is
/// the engine's own business and is not visible to the accumulator.
pub trait PhysicsEngine {
    /// Advance the world by exactly `fixed_step` seconds.
    fn step(&mut self, fixed_step: f64);

    /// Current pose of a body, or `None` if it no longer exists.
    fn body_pose(&self, id: BodyId) -> Option<Pose>;

    fn has_body(&self, id: BodyId) -> bool {
        self.body_pose(id).is_some()
    }
}

/// The render scene graph as seen by the loop.
///
/// The loop writes node poses and never reads them back; render state is
/// derived from physics and model state, not the other way round.
pub trait RenderScene {
    /// Create a node for a newly available model link.
    fn create_node(&mut self, name: &str) -> NodeId;

    fn has_node(&self, id: NodeId) -> bool;

    fn set_position(&mut self, id: NodeId, position: Vec3);

    /// Write an orientation; implementations keep it normalized.
    fn set_orientation(&mut self, id: NodeId, orientation: Quat);

    /// Position first, then orientation.
    fn write_pose(&mut self, id: NodeId, pose: &Pose) {
        self.set_position(id, pose.position);
        self.set_orientation(id, pose.rotation());
    }
}
