use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::Pose;

/// Axis-aligned bounding box in world space.
///
/// An empty box has `min > max` on every axis and absorbs nothing until the
/// first point is included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.include_point(p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }
}

/// Oriented box in a link's local frame, used as its visual extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoxVolume {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let h = self.half_extents;
        let mut out = [Vec3::ZERO; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -h.x } else { h.x };
            let sy = if i & 2 == 0 { -h.y } else { h.y };
            let sz = if i & 4 == 0 { -h.z } else { h.z };
            *corner = self.center + Vec3::new(sx, sy, sz);
        }
        out
    }

    /// World-space bounds of this box placed at `pose`.
    pub fn world_bounds(&self, pose: &Pose) -> Aabb {
        Aabb::from_points(self.corners().map(|c| pose.transform_point(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn empty_box_absorbs_first_point() {
        let mut aabb = Aabb::EMPTY;
        assert!(aabb.is_empty());
        aabb.include_point(Vec3::new(1.0, -2.0, 3.0));
        assert!(!aabb.is_empty());
        assert_eq!(aabb.min, aabb.max);
        assert_eq!(aabb.size(), Vec3::ZERO);
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::from_points([Vec3::ZERO, Vec3::ONE]);
        let b = Aabb::from_points([Vec3::splat(-1.0), Vec3::splat(0.5)]);
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
        assert_eq!(Aabb::EMPTY.union(&a), a);
    }

    #[test]
    fn box_corners_are_distinct() {
        let b = BoxVolume::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        let corners = b.corners();
        for i in 0..8 {
            for j in (i + 1)..8 {
                assert_ne!(corners[i], corners[j]);
            }
        }
    }

    #[test]
    fn rotated_box_grows_world_bounds() {
        let b = BoxVolume::new(Vec3::ZERO, Vec3::splat(1.0));
        let pose = Pose::new(Vec3::new(0.0, 5.0, 0.0), Quat::from_rotation_y(FRAC_PI_4));
        let aabb = b.world_bounds(&pose);
        let diag = 2.0_f32.sqrt();
        assert!((aabb.max.x - diag).abs() < 1e-5);
        assert!((aabb.min.y - 4.0).abs() < 1e-5);
        assert!((aabb.max.y - 6.0).abs() < 1e-5);
    }

    #[test]
    fn negative_half_extents_are_made_positive() {
        let b = BoxVolume::new(Vec3::ZERO, Vec3::new(-1.0, 1.0, -2.0));
        assert_eq!(b.half_extents, Vec3::new(1.0, 1.0, 2.0));
    }
}
