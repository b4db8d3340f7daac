use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use simsync_common::{NodeId, Pose};
use simsync_kernel::RenderScene;

/// A named node carrying a world-space pose.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub name: String,
    pub pose: Pose,
}

/// Flat scene graph keyed by node id.
///
/// Nodes are never parented to each other: every pose written here is
/// already in world space.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, RenderNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at `pose` and return its id.
    pub fn add_node(&mut self, name: impl Into<String>, pose: Pose) -> NodeId {
        let id = NodeId::new();
        self.nodes.insert(
            id,
            RenderNode {
                name: name.into(),
                pose,
            },
        );
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<RenderNode> {
        self.nodes.remove(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&RenderNode> {
        self.nodes.get(&id)
    }

    pub fn find(&self, name: &str) -> Option<(NodeId, &RenderNode)> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, node)| (*id, node))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &RenderNode)> {
        self.nodes.iter()
    }
}

impl RenderScene for SceneGraph {
    fn create_node(&mut self, name: &str) -> NodeId {
        self.add_node(name, Pose::IDENTITY)
    }

    fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn set_position(&mut self, id: NodeId, position: Vec3) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.pose.position = position,
            None => tracing::debug!(?id, "position written to missing node"),
        }
    }

    fn set_orientation(&mut self, id: NodeId, orientation: Quat) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.pose.set_rotation(orientation),
            None => tracing::debug!(?id, "orientation written to missing node"),
        }
    }
}
