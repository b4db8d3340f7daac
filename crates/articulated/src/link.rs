use simsync_common::{BoxVolume, Pose};

/// Index of a link inside its model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

/// A rigid segment of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub(crate) name: String,
    /// Transform relative to the parent joint frame (or the model placement for the root).
    pub(crate) local: Pose,
    /// Last propagated world pose.
    pub(crate) world: Pose,
    pub(crate) visual: Option<BoxVolume>,
    pub(crate) parent_joint: Option<String>,
    pub(crate) child_joints: Vec<String>,
}

impl Link {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local(&self) -> Pose {
        self.local
    }

    pub fn world(&self) -> Pose {
        self.world
    }

    pub fn visual(&self) -> Option<&BoxVolume> {
        self.visual.as_ref()
    }

    pub fn parent_joint(&self) -> Option<&str> {
        self.parent_joint.as_deref()
    }

    pub fn child_joints(&self) -> &[String] {
        &self.child_joints
    }

    pub fn is_root(&self) -> bool {
        self.parent_joint.is_none()
    }
}
