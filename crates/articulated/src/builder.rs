use std::collections::{BTreeMap, VecDeque};

use glam::Vec3;
use simsync_common::{BoxVolume, Pose};

use crate::{ArticulatedModel, Joint, JointKind, JointLimit, Link, LinkId, ModelError};

/// Description of a link before the model is frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub name: String,
    pub visual: Option<BoxVolume>,
}

impl LinkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual: None,
        }
    }

    pub fn with_visual(mut self, visual: BoxVolume) -> Self {
        self.visual = Some(visual);
        self
    }
}

/// Description of a joint before the model is frozen.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    /// Child link frame relative to the parent link frame at value 0.
    pub origin: Pose,
    pub axis: Vec3,
    pub limit: Option<JointLimit>,
}

impl JointSpec {
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            origin: Pose::IDENTITY,
            axis: Vec3::X,
            limit: None,
        }
    }

    pub fn with_origin(mut self, origin: Pose) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_axis(mut self, axis: Vec3) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_limit(mut self, lower: f32, upper: f32) -> Self {
        self.limit = Some(JointLimit::new(lower, upper));
        self
    }
}

/// Incrementally populated model structure.
///
/// Links and joints may be added in any order; `build` validates the tree and
/// freezes it into an [`ArticulatedModel`].
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    name: String,
    links: Vec<LinkSpec>,
    joints: Vec<JointSpec>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_link(&mut self, link: LinkSpec) -> &mut Self {
        self.links.push(link);
        self
    }

    pub fn add_joint(&mut self, joint: JointSpec) -> &mut Self {
        self.joints.push(joint);
        self
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn build(self) -> Result<ArticulatedModel, ModelError> {
        let mut link_index: BTreeMap<String, LinkId> = BTreeMap::new();
        let mut links = Vec::with_capacity(self.links.len());
        for spec in self.links {
            if link_index.contains_key(&spec.name) {
                return Err(ModelError::DuplicateLink(spec.name));
            }
            link_index.insert(spec.name.clone(), LinkId(links.len()));
            links.push(Link {
                name: spec.name,
                local: Pose::IDENTITY,
                world: Pose::IDENTITY,
                visual: spec.visual,
                parent_joint: None,
                child_joints: Vec::new(),
            });
        }

        let mut joints: BTreeMap<String, Joint> = BTreeMap::new();
        for spec in self.joints {
            if joints.contains_key(&spec.name) {
                return Err(ModelError::DuplicateJoint(spec.name));
            }
            let lookup = |link: &str| {
                link_index
                    .get(link)
                    .copied()
                    .ok_or_else(|| ModelError::UnknownLink {
                        joint: spec.name.clone(),
                        link: link.to_string(),
                    })
            };
            let parent = lookup(&spec.parent)?;
            let child = lookup(&spec.child)?;

            let axis = if spec.kind.is_fixed() {
                spec.axis.normalize_or_zero()
            } else {
                let axis = spec.axis.normalize_or_zero();
                if axis == Vec3::ZERO {
                    return Err(ModelError::DegenerateAxis(spec.name));
                }
                axis
            };
            if let Some(limit) = spec.limit {
                if !limit.is_valid() {
                    return Err(ModelError::InvalidLimit {
                        joint: spec.name,
                        lower: limit.lower,
                        upper: limit.upper,
                    });
                }
            }

            let child_link = &mut links[child.0];
            if let Some(first) = &child_link.parent_joint {
                return Err(ModelError::MultipleParents {
                    link: child_link.name.clone(),
                    first: first.clone(),
                    second: spec.name,
                });
            }
            child_link.parent_joint = Some(spec.name.clone());
            child_link.local = spec.origin;
            links[parent.0].child_joints.push(spec.name.clone());

            let joint = Joint::new(spec.name.clone(), spec.kind, axis, spec.limit, parent, child);
            joints.insert(spec.name, joint);
        }

        let roots: Vec<LinkId> = (0..links.len())
            .map(LinkId)
            .filter(|id| links[id.0].parent_joint.is_none())
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(ModelError::NoRoot),
            [root] => *root,
            many => {
                return Err(ModelError::MultipleRoots(
                    many.iter().map(|id| links[id.0].name.clone()).collect(),
                ));
            }
        };

        // breadth-first, so every parent precedes its children
        let mut order = Vec::with_capacity(links.len());
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for joint_name in &links[id.0].child_joints {
                if let Some(joint) = joints.get(joint_name) {
                    queue.push_back(joint.child());
                }
            }
        }
        if order.len() != links.len() {
            let missing = links
                .iter()
                .enumerate()
                .find(|(i, _)| !order.contains(&LinkId(*i)))
                .map(|(_, link)| link.name.clone())
                .unwrap_or_default();
            return Err(ModelError::Unreachable(missing));
        }

        tracing::debug!(
            model = %self.name,
            links = links.len(),
            joints = joints.len(),
            "articulated model built"
        );
        Ok(ArticulatedModel::from_parts(
            self.name, links, link_index, joints, root, order,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_links() -> ModelBuilder {
        let mut b = ModelBuilder::new("m");
        b.add_link(LinkSpec::new("base")).add_link(LinkSpec::new("arm"));
        b
    }

    #[test]
    fn builds_simple_chain() {
        let mut b = two_links();
        b.add_joint(JointSpec::new("j", JointKind::Revolute, "base", "arm").with_axis(Vec3::Z));
        let model = b.build().unwrap();
        assert_eq!(model.links().len(), 2);
        assert_eq!(model.root().name(), "base");
        assert!(model.joint("j").is_some());
    }

    #[test]
    fn axis_is_normalized() {
        let mut b = two_links();
        b.add_joint(
            JointSpec::new("j", JointKind::Revolute, "base", "arm").with_axis(Vec3::new(0.0, 0.0, 4.0)),
        );
        let model = b.build().unwrap();
        assert_eq!(model.joint("j").unwrap().axis(), Vec3::Z);
    }

    #[test]
    fn duplicate_link_rejected() {
        let mut b = two_links();
        b.add_link(LinkSpec::new("arm"));
        assert_eq!(b.build(), Err(ModelError::DuplicateLink("arm".into())));
    }

    #[test]
    fn duplicate_joint_rejected() {
        let mut b = two_links();
        b.add_link(LinkSpec::new("hand"));
        b.add_joint(JointSpec::new("j", JointKind::Fixed, "base", "arm"));
        b.add_joint(JointSpec::new("j", JointKind::Fixed, "arm", "hand"));
        assert_eq!(b.build(), Err(ModelError::DuplicateJoint("j".into())));
    }

    #[test]
    fn unknown_link_rejected() {
        let mut b = two_links();
        b.add_joint(JointSpec::new("j", JointKind::Fixed, "base", "ghost"));
        assert!(matches!(
            b.build(),
            Err(ModelError::UnknownLink { link, .. }) if link == "ghost"
        ));
    }

    #[test]
    fn second_parent_rejected() {
        let mut b = two_links();
        b.add_link(LinkSpec::new("other"));
        b.add_joint(JointSpec::new("a", JointKind::Fixed, "base", "arm"));
        b.add_joint(JointSpec::new("b", JointKind::Fixed, "other", "arm"));
        assert!(matches!(b.build(), Err(ModelError::MultipleParents { .. })));
    }

    #[test]
    fn several_roots_rejected() {
        let b = two_links();
        assert!(matches!(b.build(), Err(ModelError::MultipleRoots(r)) if r.len() == 2));
    }

    #[test]
    fn empty_model_has_no_root() {
        assert_eq!(ModelBuilder::new("empty").build(), Err(ModelError::NoRoot));
    }

    #[test]
    fn cycle_is_unreachable() {
        let mut b = two_links();
        b.add_link(LinkSpec::new("c"));
        // arm <-> c form a loop detached from base
        b.add_joint(JointSpec::new("x", JointKind::Fixed, "arm", "c"));
        b.add_joint(JointSpec::new("y", JointKind::Fixed, "c", "arm"));
        assert!(matches!(b.build(), Err(ModelError::Unreachable(_))));
    }

    #[test]
    fn zero_axis_rejected_for_moving_joint() {
        let mut b = two_links();
        b.add_joint(JointSpec::new("j", JointKind::Prismatic, "base", "arm").with_axis(Vec3::ZERO));
        assert_eq!(b.build(), Err(ModelError::DegenerateAxis("j".into())));

        let mut b = two_links();
        b.add_joint(JointSpec::new("j", JointKind::Fixed, "base", "arm").with_axis(Vec3::ZERO));
        assert!(b.build().is_ok());
    }

    #[test]
    fn inverted_limit_rejected() {
        let mut b = two_links();
        b.add_joint(
            JointSpec::new("j", JointKind::Revolute, "base", "arm")
                .with_axis(Vec3::Z)
                .with_limit(1.0, -1.0),
        );
        assert!(matches!(b.build(), Err(ModelError::InvalidLimit { .. })));
    }
}
