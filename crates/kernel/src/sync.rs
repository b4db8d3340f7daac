use simsync_common::{BodyId, NodeId};

use crate::{ConfigurationError, PhysicsEngine, RenderScene};

/// One physics body and the render node whose pose mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPair {
    pub body: BodyId,
    pub node: NodeId,
}

/// The set of body/node pairs, one-to-one in both directions.
#[derive(Debug, Clone, Default)]
pub struct PairRegistry {
    pairs: Vec<SyncPair>,
}

impl PairRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[SyncPair] {
        &self.pairs
    }

    pub fn node_for(&self, body: BodyId) -> Option<NodeId> {
        self.pairs.iter().find(|p| p.body == body).map(|p| p.node)
    }

    /// Pair `body` with `node` after checking both exist and neither is taken.
    pub fn register<P, R>(
        &mut self,
        physics: &P,
        scene: &R,
        body: BodyId,
        node: NodeId,
    ) -> Result<SyncPair, ConfigurationError>
    where
        P: PhysicsEngine + ?Sized,
        R: RenderScene + ?Sized,
    {
        if !physics.has_body(body) {
            return Err(ConfigurationError::UnknownBody(body));
        }
        if !scene.has_node(node) {
            return Err(ConfigurationError::UnknownNode(node));
        }
        if self.pairs.iter().any(|p| p.body == body) {
            return Err(ConfigurationError::BodyAlreadyPaired(body));
        }
        if self.pairs.iter().any(|p| p.node == node) {
            return Err(ConfigurationError::NodeAlreadyPaired(node));
        }
        let pair = SyncPair { body, node };
        self.pairs.push(pair);
        tracing::debug!(?body, ?node, "sync pair registered");
        Ok(pair)
    }

    /// Copy every body's pose onto its node, in registration order.
    ///
    /// Returns the number of pairs copied. Bodies that have disappeared from
    /// the physics world are skipped.
    pub fn copy_all<P, R>(&self, physics: &P, scene: &mut R) -> usize
    where
        P: PhysicsEngine + ?Sized,
        R: RenderScene + ?Sized,
    {
        let mut copied = 0;
        for pair in &self.pairs {
            match physics.body_pose(pair.body) {
                Some(pose) => {
                    scene.write_pose(pair.node, &pose);
                    copied += 1;
                }
                None => tracing::warn!(body = ?pair.body, "paired body vanished; skipping pose copy"),
            }
        }
        copied
    }
}
