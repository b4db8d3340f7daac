use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a body owned by the physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub Uuid);

impl BodyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier of a node owned by the render scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Rigid placement in world space: position plus orientation.
///
/// The orientation is renormalized on every write, so composing poses for
/// thousands of frames never drifts away from a unit quaternion. A degenerate
/// quaternion (zero length or non-finite) collapses to identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPose", into = "RawPose")]
pub struct Pose {
    pub position: Vec3,
    rotation: Quat,
}

#[derive(Serialize, Deserialize)]
struct RawPose {
    position: Vec3,
    rotation: Quat,
}

impl From<RawPose> for Pose {
    fn from(raw: RawPose) -> Self {
        Pose::new(raw.position, raw.rotation)
    }
}

impl From<Pose> for RawPose {
    fn from(pose: Pose) -> Self {
        RawPose {
            position: pose.position,
            rotation: pose.rotation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation: normalize_or_identity(rotation),
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn from_rotation(rotation: Quat) -> Self {
        Self::new(Vec3::ZERO, rotation)
    }

    /// Build a pose from a translation and fixed-axis roll/pitch/yaw angles
    /// (radians), applied as `Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn from_xyz_rpy(xyz: [f32; 3], rpy: [f32; 3]) -> Self {
        let rotation = Quat::from_euler(EulerRot::ZYX, rpy[2], rpy[1], rpy[0]);
        Self::new(Vec3::from_array(xyz), rotation)
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = normalize_or_identity(rotation);
    }

    /// `self * other`: express `other` (given in this pose's frame) in the parent frame.
    pub fn compose(&self, other: &Pose) -> Pose {
        Pose::new(
            self.position + self.rotation * other.position,
            self.rotation * other.rotation,
        )
    }

    pub fn inverse(&self) -> Pose {
        let inv = self.rotation.inverse();
        Pose::new(inv * -self.position, inv)
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        // q and -q encode the same orientation.
        let same_rotation = self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff);
        self.position.abs_diff_eq(other.position, max_abs_diff) && same_rotation
    }
}

fn normalize_or_identity(q: Quat) -> Quat {
    let len_sq = q.length_squared();
    if !len_sq.is_finite() || len_sq <= f32::EPSILON {
        Quat::IDENTITY
    } else {
        q / len_sq.sqrt()
    }
}
