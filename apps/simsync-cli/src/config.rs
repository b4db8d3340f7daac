use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use simsync_articulated::{ArticulatedModel, JointKind, ModelError, UnknownJointError};
use simsync_common::Pose;
use simsync_kernel::{LoopConfig, RigidBody};

/// Everything the `run` command sets up. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    #[serde(rename = "loop")]
    pub timing: LoopConfig,
    pub gravity: [f32; 3],
    pub body: BodyConfig,
    pub robot: Option<RobotConfig>,
    /// Frames to run.
    pub frames: u64,
    /// Seconds between frames.
    pub frame_interval: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            timing: LoopConfig::default(),
            gravity: [0.0, -9.82, 0.0],
            body: BodyConfig::default(),
            robot: Some(RobotConfig::default()),
            frames: 300,
            frame_interval: 1.0 / 60.0,
        }
    }
}

impl SceneConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene config {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing scene config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.timing.validate()?;
        anyhow::ensure!(
            self.frame_interval.is_finite() && self.frame_interval >= 0.0,
            "frame_interval must be a non-negative number of seconds, got {}",
            self.frame_interval
        );
        anyhow::ensure!(
            self.body.mass.is_finite() && self.body.mass >= 0.0,
            "body mass must be non-negative, got {}",
            self.body.mass
        );
        Ok(())
    }
}

/// The free-falling box paired with a render node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f32,
    pub half_extents: [f32; 3],
    pub position: [f32; 3],
    pub linear_velocity: [f32; 3],
    /// Radians per second.
    pub angular_velocity: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            half_extents: [1.0, 1.0, 1.0],
            position: [0.0, 0.0, 0.0],
            linear_velocity: [0.0, 0.0, 0.0],
            angular_velocity: [0.0, 10.0, 0.0],
            linear_damping: 0.01,
            angular_damping: 0.5,
        }
    }
}

impl BodyConfig {
    pub fn to_body(&self) -> RigidBody {
        RigidBody::new(self.mass)
            .with_pose(Pose::from_position(Vec3::from(self.position)))
            .with_linear_velocity(Vec3::from(self.linear_velocity))
            .with_angular_velocity(Vec3::from(self.angular_velocity))
            .with_damping(self.linear_damping, self.angular_damping)
    }
}

/// The articulated robot loaded in the background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub description: PathBuf,
    /// Placement rotation about world X, in degrees.
    pub rotate_x_degrees: f32,
    /// Joint targets in degrees (or length units for prismatic joints).
    ///
    /// A key names either one joint or a numbered family: `HP` sets `HP1`,
    /// `HP2`, and so on. A key that is itself a joint name sets only that
    /// joint, so `HP1` leaves `HP10` alone.
    pub pose: BTreeMap<String, f32>,
    /// Height of the plane the robot is set down on.
    pub ground_y: f32,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            description: PathBuf::from("data/hexapod.robot.json"),
            rotate_x_degrees: -90.0,
            pose: BTreeMap::from([
                ("HP".to_owned(), 30.0),
                ("KP".to_owned(), 120.0),
                ("AP".to_owned(), -60.0),
            ]),
            ground_y: 0.0,
        }
    }
}

impl RobotConfig {
    pub fn placement(&self) -> Pose {
        Pose::from_rotation(Quat::from_rotation_x(self.rotate_x_degrees.to_radians()))
    }

    /// Resolve `pose` against the joints of `model`.
    ///
    /// Values come back in radians for rotational joints. A key matching no
    /// joint is an error.
    pub fn joint_targets(
        &self,
        model: &ArticulatedModel,
    ) -> Result<Vec<(String, f32)>, UnknownJointError> {
        let mut targets = Vec::new();
        for (key, &value) in &self.pose {
            let matched: Vec<&str> = if model.joint(key).is_some() {
                vec![key.as_str()]
            } else {
                model
                    .joints()
                    .keys()
                    .map(String::as_str)
                    .filter(|name| {
                        name.strip_prefix(key.as_str()).is_some_and(|rest| {
                            !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
                        })
                    })
                    .collect()
            };
            if matched.is_empty() {
                return Err(UnknownJointError { name: key.clone() });
            }
            for name in matched {
                let rotational = model
                    .joint(name)
                    .is_some_and(|j| j.kind() != JointKind::Prismatic);
                let value = if rotational { value.to_radians() } else { value };
                targets.push((name.to_owned(), value));
            }
        }
        Ok(targets)
    }

    /// Place, pose and ground a freshly loaded model.
    pub fn apply(&self, model: &mut ArticulatedModel) -> Result<(), ModelError> {
        model.set_placement(self.placement());
        let targets = self.joint_targets(model)?;
        for (name, value) in &targets {
            model.set_joint_value(name, *value)?;
        }
        if let Some(shift) = model.ground_to_plane(self.ground_y)? {
            tracing::debug!(shift, "robot set down on ground plane");
        }
        Ok(())
    }
}
