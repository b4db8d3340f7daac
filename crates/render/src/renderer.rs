use std::fmt::Write;

use glam::Vec3;

use crate::SceneGraph;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(10.0, 10.0, 10.0),
            target: Vec3::ZERO,
            fov_degrees: 50.0,
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the scene graph and a view and produces output. It never
/// writes back: node poses belong to the simulation loop.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> Self::Output;
}

/// Produces a human-readable dump of every node, sorted by name.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneGraph, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} nodes) ===", scene.len());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z, view.fov_degrees
        );

        let mut nodes: Vec<_> = scene.nodes().map(|(_, node)| node).collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        for node in nodes {
            let p = node.pose.position;
            let (axis, angle) = node.pose.rotation().to_axis_angle();
            let _ = writeln!(
                out,
                "  {:<16} pos=({:.3}, {:.3}, {:.3}) rot={:.1}deg about ({:.2}, {:.2}, {:.2})",
                node.name,
                p.x,
                p.y,
                p.z,
                angle.to_degrees(),
                axis.x,
                axis.y,
                axis.z
            );
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use simsync_common::Pose;

    #[test]
    fn empty_scene() {
        let output = DebugTextRenderer::new().render(&SceneGraph::new(), &RenderView::default());
        assert!(output.contains("0 nodes"));
        assert!(output.contains("fov=50"));
    }

    #[test]
    fn nodes_listed_by_name() {
        let mut scene = SceneGraph::new();
        scene.add_node("zeta", Pose::IDENTITY);
        scene.add_node(
            "alpha",
            Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());

        assert!(output.contains("2 nodes"));
        let alpha = output.find("alpha").unwrap();
        let zeta = output.find("zeta").unwrap();
        assert!(alpha < zeta);
        assert!(output.contains("pos=(1.000, 2.000, 3.000)"));
        assert!(output.contains("rot=90.0deg"));
    }
}
