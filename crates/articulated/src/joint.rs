use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use simsync_common::Pose;

use crate::LinkId;

/// Degree-of-freedom type of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    /// Rotation about the axis, usually bounded.
    Revolute,
    /// Translation along the axis.
    Prismatic,
    /// Rigid connection; value is always 0.
    Fixed,
    /// Unbounded rotation about the axis.
    Continuous,
}

impl JointKind {
    pub fn is_fixed(self) -> bool {
        matches!(self, JointKind::Fixed)
    }
}

/// Closed range a joint value is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimit {
    pub lower: f32,
    pub upper: f32,
}

impl JointLimit {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn is_valid(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
    }

    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.lower, self.upper)
    }
}

/// A named degree of freedom between a parent and a child link.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    name: String,
    kind: JointKind,
    axis: Vec3,
    value: f32,
    limit: Option<JointLimit>,
    parent: LinkId,
    child: LinkId,
}

impl Joint {
    pub(crate) fn new(
        name: String,
        kind: JointKind,
        axis: Vec3,
        limit: Option<JointLimit>,
        parent: LinkId,
        child: LinkId,
    ) -> Self {
        Self {
            name,
            kind,
            axis,
            value: 0.0,
            // continuous and fixed joints ignore limits
            limit: match kind {
                JointKind::Revolute | JointKind::Prismatic => limit,
                JointKind::Continuous | JointKind::Fixed => None,
            },
            parent,
            child,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> JointKind {
        self.kind
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn limit(&self) -> Option<JointLimit> {
        self.limit
    }

    pub fn parent(&self) -> LinkId {
        self.parent
    }

    pub fn child(&self) -> LinkId {
        self.child
    }

    /// Apply a commanded value and return what was actually stored.
    ///
    /// Bounded joints clamp instead of rejecting. Fixed joints stay at 0.
    /// Non-finite commands leave the current value untouched.
    pub fn set_value(&mut self, value: f32) -> f32 {
        if self.kind.is_fixed() {
            return self.value;
        }
        if !value.is_finite() {
            tracing::warn!(joint = %self.name, value, "ignoring non-finite joint command");
            return self.value;
        }
        self.value = match self.limit {
            Some(limit) => limit.clamp(value),
            None => value,
        };
        self.value
    }

    /// Transform contributed by the current value, in the child link frame.
    pub fn motion(&self) -> Pose {
        match self.kind {
            JointKind::Revolute | JointKind::Continuous => {
                Pose::from_rotation(Quat::from_axis_angle(self.axis, self.value))
            }
            JointKind::Prismatic => Pose::from_position(self.axis * self.value),
            JointKind::Fixed => Pose::IDENTITY,
        }
    }
}
