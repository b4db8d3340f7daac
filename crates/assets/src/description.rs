use glam::Vec3;
use serde::{Deserialize, Serialize};
use simsync_articulated::{
    ArticulatedModel, JointKind, JointSpec, LinkSpec, ModelBuilder, ModelError,
};
use simsync_common::{BoxVolume, Pose};

/// Flattened robot description: links and the joints connecting them.
///
/// Mirrors the structure of a URDF document after XML parsing. Angles are in
/// radians, lengths in model units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotDescription {
    pub name: String,
    pub links: Vec<LinkDescription>,
    #[serde(default)]
    pub joints: Vec<JointDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub name: String,
    #[serde(default)]
    pub visual: Option<VisualDescription>,
}

/// Box-shaped visual extent of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDescription {
    #[serde(default)]
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default = "default_axis")]
    pub axis: [f32; 3],
    #[serde(default)]
    pub limit: Option<LimitDescription>,
}

/// Child frame offset: translation plus fixed-axis roll/pitch/yaw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    #[serde(default)]
    pub xyz: [f32; 3],
    #[serde(default)]
    pub rpy: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitDescription {
    pub lower: f32,
    pub upper: f32,
}

fn default_axis() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

impl RobotDescription {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the document and freeze it into a model.
    pub fn into_model(self) -> Result<ArticulatedModel, ModelError> {
        let mut builder = ModelBuilder::new(self.name);
        for link in self.links {
            let mut spec = LinkSpec::new(link.name);
            if let Some(visual) = link.visual {
                spec = spec.with_visual(BoxVolume::new(
                    Vec3::from_array(visual.center),
                    Vec3::from_array(visual.half_extents),
                ));
            }
            builder.add_link(spec);
        }
        for joint in self.joints {
            let mut spec = JointSpec::new(joint.name, joint.kind, joint.parent, joint.child)
                .with_origin(Pose::from_xyz_rpy(joint.origin.xyz, joint.origin.rpy))
                .with_axis(Vec3::from_array(joint.axis));
            if let Some(limit) = joint.limit {
                spec = spec.with_limit(limit.lower, limit.upper);
            }
            builder.add_joint(spec);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARM: &str = r#"{
        "name": "arm",
        "links": [
            { "name": "base", "visual": { "half_extents": [0.5, 0.1, 0.5] } },
            { "name": "upper" },
            { "name": "gripper" }
        ],
        "joints": [
            {
                "name": "shoulder", "type": "revolute", "parent": "base", "child": "upper",
                "origin": { "xyz": [0.0, 0.1, 0.0] },
                "axis": [0.0, 0.0, 1.0],
                "limit": { "lower": -1.5, "upper": 1.5 }
            },
            { "name": "wrist", "type": "fixed", "parent": "upper", "child": "gripper" }
        ]
    }"#;

    #[test]
    fn parses_and_builds() {
        let desc = RobotDescription::from_json(ARM).unwrap();
        assert_eq!(desc.links.len(), 3);
        assert_eq!(desc.joints[0].kind, JointKind::Revolute);
        assert_eq!(desc.joints[1].axis, [1.0, 0.0, 0.0]);
        assert_eq!(desc.joints[1].origin, Origin::default());

        let model = desc.into_model().unwrap();
        assert_eq!(model.name(), "arm");
        let shoulder = model.joint("shoulder").unwrap();
        assert_eq!(shoulder.limit().unwrap().upper, 1.5);
        assert_eq!(model.link("upper").unwrap().local().position, Vec3::new(0.0, 0.1, 0.0));
        assert!(model.link("base").unwrap().visual().is_some());
    }

    #[test]
    fn unknown_joint_type_is_a_parse_error() {
        let json = ARM.replace("\"fixed\"", "\"floating\"");
        assert!(RobotDescription::from_json(&json).is_err());
    }

    #[test]
    fn structural_errors_surface_from_builder() {
        let json = ARM.replace("\"child\": \"gripper\"", "\"child\": \"upper\"");
        let desc = RobotDescription::from_json(&json).unwrap();
        assert!(matches!(
            desc.into_model(),
            Err(ModelError::MultipleParents { .. })
        ));
    }

    #[test]
    fn description_round_trips_through_json() {
        let desc = RobotDescription::from_json(ARM).unwrap();
        let json = serde_json::to_string(&desc).unwrap();
        assert_eq!(RobotDescription::from_json(&json).unwrap(), desc);
    }

    #[test]
    fn bundled_hexapod_poses_and_grounds() {
        let json = include_str!("../../../data/hexapod.robot.json");
        let mut model = RobotDescription::from_json(json).unwrap().into_model().unwrap();
        assert_eq!(model.links().len(), 25);
        assert_eq!(model.joints().len(), 24);
        assert_eq!(model.root().name(), "base_link");

        for i in 1..=6 {
            for (prefix, degrees) in [("HP", 30.0_f32), ("KP", 120.0), ("AP", -60.0)] {
                let applied = model
                    .set_joint_value(&format!("{prefix}{i}"), degrees.to_radians())
                    .unwrap();
                assert!((applied - degrees.to_radians()).abs() < 1e-6);
            }
        }
        model.set_placement(simsync_common::Pose::from_rotation(
            glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        ));
        assert!(model.ground_to_plane(0.0).unwrap().is_some());
        assert!(model.bounds().unwrap().min.y.abs() < 1e-5);
    }
}
