use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use simsync_common::{BodyId, Pose};

use crate::PhysicsEngine;

/// A simulated rigid body.
///
/// A mass of zero marks the body static: it keeps its pose and is never integrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    pub mass: f32,
    /// Collision shape handle; not interpreted by the integrator.
    pub shape: u64,
    pub pose: Pose,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Fraction of linear velocity lost per second.
    pub linear_damping: f32,
    /// Fraction of angular velocity lost per second.
    pub angular_damping: f32,
}

impl RigidBody {
    pub fn new(mass: f32) -> Self {
        Self {
            mass: mass.max(0.0),
            shape: 0,
            pose: Pose::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.01,
            angular_damping: 0.01,
        }
    }

    pub fn new_static() -> Self {
        Self::new(0.0)
    }

    pub fn with_shape(mut self, shape: u64) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.angular_velocity = velocity;
        self
    }

    /// Damping coefficients are clamped to `0.0..=1.0`.
    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear.clamp(0.0, 1.0);
        self.angular_damping = angular.clamp(0.0, 1.0);
        self
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }

    fn integrate(&mut self, gravity: Vec3, dt: f32) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += gravity * dt;
        self.linear_velocity *= (1.0 - self.linear_damping).powf(dt);
        self.angular_velocity *= (1.0 - self.angular_damping).powf(dt);

        self.pose.position += self.linear_velocity * dt;

        let w = self.angular_velocity;
        let q = self.pose.rotation();
        let spin = Quat::from_xyzw(w.x, w.y, w.z, 0.0) * q;
        self.pose.set_rotation(q + spin * (0.5 * dt));
    }
}

/// In-memory rigid-body world: gravity plus damped free motion, no contacts.
///
/// Bodies live in a BTreeMap so iteration, and therefore integration order,
/// is identical on every platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidWorld {
    bodies: BTreeMap<BodyId, RigidBody>,
    gravity: Vec3,
    step_count: u64,
    elapsed: f64,
}

impl Default for RigidWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.82, 0.0))
    }
}

impl RigidWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            bodies: BTreeMap::new(),
            gravity,
            step_count: 0,
            elapsed: 0.0,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    /// Number of fixed steps taken so far.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Simulated seconds so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bodies(&self) -> &BTreeMap<BodyId, RigidBody> {
        &self.bodies
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyId {
        let id = BodyId::new();
        self.bodies.insert(id, body);
        id
    }

    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        self.bodies.remove(&id)
    }

    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.bodies.get(&id)
    }

    /// Mutable access for one-time setup (initial velocity, damping).
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.bodies.get_mut(&id)
    }

    /// Deterministic hash of the simulated state, in canonical body order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.step_count.to_le_bytes());
        for body in self.bodies.values() {
            let r = body.pose.rotation();
            let floats = [
                body.pose.position.x,
                body.pose.position.y,
                body.pose.position.z,
                r.x,
                r.y,
                r.z,
                r.w,
                body.linear_velocity.x,
                body.linear_velocity.y,
                body.linear_velocity.z,
                body.angular_velocity.x,
                body.angular_velocity.y,
                body.angular_velocity.z,
            ];
            for f in floats {
                mix(&mut h, &f.to_le_bytes());
            }
        }
        h
    }
}

impl PhysicsEngine for RigidWorld {
    fn step(&mut self, fixed_step: f64) {
        let dt = fixed_step as f32;
        for body in self.bodies.values_mut() {
            body.integrate(self.gravity, dt);
        }
        self.step_count += 1;
        self.elapsed += fixed_step;
    }

    fn body_pose(&self, id: BodyId) -> Option<Pose> {
        self.bodies.get(&id).map(|b| b.pose)
    }
}
