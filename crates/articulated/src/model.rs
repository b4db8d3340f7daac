use std::collections::BTreeMap;

use simsync_common::{Aabb, Pose};

use crate::{Joint, Link, LinkId, ModelError, UnknownJointError};

/// A frozen link tree whose joint values and placement stay mutable.
///
/// Commanding joints only marks the model dirty; world poses are refreshed by
/// [`ArticulatedModel::recompute_world_transforms`], so a batch of commands
/// pays for one propagation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticulatedModel {
    name: String,
    links: Vec<Link>,
    link_index: BTreeMap<String, LinkId>,
    joints: BTreeMap<String, Joint>,
    root: LinkId,
    /// Top-down traversal order; parents precede children.
    order: Vec<LinkId>,
    placement: Pose,
    dirty: bool,
    grounded: bool,
}

impl ArticulatedModel {
    pub(crate) fn from_parts(
        name: String,
        links: Vec<Link>,
        link_index: BTreeMap<String, LinkId>,
        joints: BTreeMap<String, Joint>,
        root: LinkId,
        order: Vec<LinkId>,
    ) -> Self {
        Self {
            name,
            links,
            link_index,
            joints,
            root,
            order,
            placement: Pose::IDENTITY,
            dirty: true,
            grounded: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Link {
        &self.links[self.root.0]
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.link_index.get(name).map(|id| &self.links[id.0])
    }

    /// World pose from the last propagation.
    pub fn link_world_pose(&self, name: &str) -> Option<Pose> {
        self.link(name).map(Link::world)
    }

    pub fn joints(&self) -> &BTreeMap<String, Joint> {
        &self.joints
    }

    pub fn joint(&self, name: &str) -> Option<&Joint> {
        self.joints.get(name)
    }

    pub fn joint_value(&self, name: &str) -> Result<f32, UnknownJointError> {
        self.joints
            .get(name)
            .map(Joint::value)
            .ok_or_else(|| UnknownJointError { name: name.into() })
    }

    /// Command a joint. Returns the value actually applied after clamping.
    pub fn set_joint_value(&mut self, name: &str, value: f32) -> Result<f32, UnknownJointError> {
        let joint = self
            .joints
            .get_mut(name)
            .ok_or_else(|| UnknownJointError { name: name.into() })?;
        let applied = joint.set_value(value);
        self.dirty = true;
        Ok(applied)
    }

    /// Command several joints at once. Every name is checked before any value
    /// is applied, so an unknown name leaves the model untouched.
    pub fn set_joint_values(&mut self, values: &[(&str, f32)]) -> Result<(), UnknownJointError> {
        if let Some((missing, _)) = values.iter().find(|(n, _)| !self.joints.contains_key(*n)) {
            return Err(UnknownJointError {
                name: (*missing).into(),
            });
        }
        for (name, value) in values {
            self.set_joint_value(name, *value)?;
        }
        Ok(())
    }

    pub fn placement(&self) -> Pose {
        self.placement
    }

    pub fn set_placement(&mut self, placement: Pose) {
        self.placement = placement;
        self.dirty = true;
    }

    /// Whether joints or placement changed since the last propagation.
    pub fn needs_recompute(&self) -> bool {
        self.dirty
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Propagate world poses from the root down.
    ///
    /// `world(root) = placement * local(root)` and
    /// `world(child) = world(parent) * local(child) * motion(joint)`.
    pub fn recompute_world_transforms(&mut self) {
        for i in 0..self.order.len() {
            let id = self.order[i];
            let link = &self.links[id.0];
            let (parent_world, motion) = match link
                .parent_joint
                .as_deref()
                .and_then(|n| self.joints.get(n))
            {
                Some(joint) => (self.links[joint.parent().0].world, joint.motion()),
                None => (self.placement, Pose::IDENTITY),
            };
            let world = parent_world.compose(&link.local).compose(&motion);
            self.links[id.0].world = world;
        }
        self.dirty = false;
    }

    /// Visit every link top-down.
    pub fn traverse(&self, mut visit: impl FnMut(&Link)) {
        for id in &self.order {
            visit(&self.links[id.0]);
        }
    }

    /// World-space bounds of all link visuals (link origins for links without one).
    pub fn bounds(&self) -> Result<Aabb, ModelError> {
        if self.dirty {
            return Err(ModelError::StaleTransforms);
        }
        let mut aabb = Aabb::EMPTY;
        for link in &self.links {
            match &link.visual {
                Some(visual) => aabb = aabb.union(&visual.world_bounds(&link.world)),
                None => aabb.include_point(link.world.position),
            }
        }
        Ok(aabb)
    }

    /// Translate the model vertically so its lowest point rests on `plane_y`.
    ///
    /// Runs once per model: returns the applied shift the first time and
    /// `None` on every later call.
    pub fn ground_to_plane(&mut self, plane_y: f32) -> Result<Option<f32>, ModelError> {
        if self.grounded {
            tracing::debug!(model = %self.name, "model already grounded");
            return Ok(None);
        }
        if self.dirty {
            self.recompute_world_transforms();
        }
        let shift = plane_y - self.bounds()?.min.y;
        self.placement.position.y += shift;
        for link in &mut self.links {
            link.world.position.y += shift;
        }
        self.grounded = true;
        tracing::debug!(model = %self.name, shift, "model grounded");
        Ok(Some(shift))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JointKind, JointSpec, LinkSpec, ModelBuilder};
    use glam::{Quat, Vec3};
    use simsync_common::BoxVolume;
    use std::f32::consts::{FRAC_PI_2, PI};

    /// base -> coxa (HP1, yaw) -> femur (KP1, pitch) -> tibia (AP1, pitch) -> foot (fixed)
    fn leg() -> ArticulatedModel {
        let mut b = ModelBuilder::new("leg");
        for name in ["base", "coxa", "femur", "tibia", "foot"] {
            b.add_link(LinkSpec::new(name));
        }
        b.add_joint(
            JointSpec::new("HP1", JointKind::Revolute, "base", "coxa")
                .with_axis(Vec3::Z)
                .with_limit(-FRAC_PI_2, FRAC_PI_2),
        );
        b.add_joint(
            JointSpec::new("KP1", JointKind::Revolute, "coxa", "femur")
                .with_origin(Pose::from_position(Vec3::X))
                .with_axis(Vec3::Y)
                .with_limit(-PI, PI),
        );
        b.add_joint(
            JointSpec::new("AP1", JointKind::Revolute, "femur", "tibia")
                .with_origin(Pose::from_position(Vec3::X))
                .with_axis(Vec3::Y)
                .with_limit(-PI, PI),
        );
        b.add_joint(
            JointSpec::new("F1", JointKind::Fixed, "tibia", "foot")
                .with_origin(Pose::from_position(Vec3::X)),
        );
        b.build().unwrap()
    }

    #[test]
    fn child_world_is_parent_then_local_then_motion() {
        let mut b = ModelBuilder::new("pair");
        b.add_link(LinkSpec::new("parent")).add_link(LinkSpec::new("child"));
        let origin = Pose::new(Vec3::new(0.5, 0.0, 0.2), Quat::from_rotation_x(0.3));
        b.add_joint(
            JointSpec::new("hinge", JointKind::Revolute, "parent", "child")
                .with_origin(origin)
                .with_axis(Vec3::Z),
        );
        let mut model = b.build().unwrap();
        let placement = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.8));
        model.set_placement(placement);
        model.set_joint_value("hinge", 0.6).unwrap();
        model.recompute_world_transforms();

        let parent_world = model.link_world_pose("parent").unwrap();
        assert!(parent_world.abs_diff_eq(&placement, 1e-6));

        let motion = Pose::from_rotation(Quat::from_axis_angle(Vec3::Z, 0.6));
        let expected = parent_world.compose(&origin).compose(&motion);
        let child_world = model.link_world_pose("child").unwrap();
        assert!(child_world.abs_diff_eq(&expected, 1e-6));
    }

    #[test]
    fn posed_leg_reaches_reference_foot_position() {
        let mut model = leg();
        model
            .set_joint_values(&[
                ("HP1", 30f32.to_radians()),
                ("KP1", 120f32.to_radians()),
                ("AP1", (-60f32).to_radians()),
            ])
            .unwrap();
        model.recompute_world_transforms();

        // Knee and ankle pitch fold the leg in the vertical plane at 30 degrees yaw:
        // reach 1 + cos(120) + cos(60) = 1, drop sin(120) + sin(60) = sqrt(3).
        let yaw = 30f32.to_radians();
        let expected = Vec3::new(yaw.cos(), yaw.sin(), -(3f32.sqrt()));
        let foot = model.link_world_pose("foot").unwrap().position;
        assert!(
            foot.abs_diff_eq(expected, 1e-5),
            "foot at {foot:?}, expected {expected:?}"
        );
    }

    #[test]
    fn unknown_joint_is_an_error() {
        let mut model = leg();
        let err = model.set_joint_value("nonexistent", 1.0).unwrap_err();
        assert_eq!(err.name, "nonexistent");
        assert!(model.joint_value("nonexistent").is_err());
    }

    #[test]
    fn out_of_range_command_is_clamped() {
        let mut model = leg();
        let applied = model.set_joint_value("HP1", 3.0).unwrap();
        assert_eq!(applied, FRAC_PI_2);
        assert_eq!(model.joint_value("HP1").unwrap(), FRAC_PI_2);
    }

    #[test]
    fn batch_with_unknown_name_changes_nothing() {
        let mut model = leg();
        model.recompute_world_transforms();
        let err = model
            .set_joint_values(&[("HP1", 0.5), ("XX9", 1.0)])
            .unwrap_err();
        assert_eq!(err.name, "XX9");
        assert_eq!(model.joint_value("HP1").unwrap(), 0.0);
        assert!(!model.needs_recompute());
    }

    #[test]
    fn commands_defer_propagation() {
        let mut model = leg();
        model.recompute_world_transforms();
        let before = model.link_world_pose("foot").unwrap();

        model.set_joint_value("HP1", 0.4).unwrap();
        assert!(model.needs_recompute());
        assert_eq!(model.link_world_pose("foot").unwrap(), before);
        assert_eq!(model.bounds(), Err(ModelError::StaleTransforms));

        model.recompute_world_transforms();
        assert!(!model.needs_recompute());
        assert_ne!(model.link_world_pose("foot").unwrap(), before);
    }

    #[test]
    fn traverse_visits_parents_first() {
        let model = leg();
        let mut names = Vec::new();
        model.traverse(|link| names.push(link.name().to_string()));
        assert_eq!(names, ["base", "coxa", "femur", "tibia", "foot"]);
    }

    #[test]
    fn bounds_cover_visuals_and_bare_links() {
        let mut b = ModelBuilder::new("box");
        b.add_link(LinkSpec::new("body").with_visual(BoxVolume::new(Vec3::ZERO, Vec3::splat(0.5))));
        b.add_link(LinkSpec::new("tip"));
        b.add_joint(
            JointSpec::new("j", JointKind::Fixed, "body", "tip")
                .with_origin(Pose::from_position(Vec3::new(0.0, -2.0, 0.0))),
        );
        let mut model = b.build().unwrap();
        model.recompute_world_transforms();
        let aabb = model.bounds().unwrap();
        assert_eq!(aabb.min, Vec3::new(-0.5, -2.0, -0.5));
        assert_eq!(aabb.max, Vec3::splat(0.5));
    }

    #[test]
    fn grounding_happens_once() {
        let mut model = leg();
        // z-up description shown in a y-up world
        model.set_placement(Pose::from_rotation(Quat::from_rotation_x(-FRAC_PI_2)));
        model.set_joint_value("KP1", FRAC_PI_2).unwrap();

        let shift = model.ground_to_plane(0.0).unwrap().unwrap();
        assert!(shift > 0.0);
        assert!(model.is_grounded());
        assert!(model.bounds().unwrap().min.y.abs() < 1e-5);
        assert!((model.placement().position.y - shift).abs() < 1e-6);

        model.set_joint_value("KP1", 0.0).unwrap();
        assert_eq!(model.ground_to_plane(0.0).unwrap(), None);

        // propagation after grounding keeps the shifted placement
        model.set_joint_value("KP1", FRAC_PI_2).unwrap();
        model.recompute_world_transforms();
        assert!(model.bounds().unwrap().min.y.abs() < 1e-5);
    }
}
