//! The per-frame driver.
//!
//! One call to [`SimulationLoop::tick`] is one rendered frame: take delivery of
//! a pending model, turn elapsed wall time into fixed physics steps, copy body
//! poses onto their render nodes, and push articulated-model link poses into
//! the scene when they changed.

use std::collections::BTreeMap;

use simsync_articulated::{ArticulatedModel, ModelError};
use simsync_assets::{LoadError, LoadHandle};
use simsync_common::{BodyId, NodeId};

use crate::{
    ClockRegression, ConfigurationError, LoopConfig, PairRegistry, PhysicsEngine, RenderScene,
    SyncPair, TimeAccumulator,
};

/// Setup run once on a freshly loaded model, before it becomes visible to the loop.
pub type OnLoad = Box<dyn FnOnce(&mut ArticulatedModel) -> Result<(), ModelError> + Send>;

/// Where the articulated model is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStatus {
    /// No model attached.
    Absent,
    /// A load is in flight.
    Loading,
    /// The model is available for joint commands.
    Ready,
    /// The load failed; see [`SimulationLoop::load_error`].
    Failed,
}

enum ModelSlot {
    Absent,
    Loading {
        handle: LoadHandle,
        on_load: Option<OnLoad>,
    },
    Ready(ArticulatedModel),
    Failed(LoadError),
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Zero-based index of this tick.
    pub frame: u64,
    /// Physics steps run.
    pub steps: u32,
    /// Body poses copied onto render nodes.
    pub pose_copies: usize,
    /// Whether articulated-model world transforms were recomputed.
    pub recomputed: bool,
    pub clock_regression: Option<ClockRegression>,
}

/// Keeps a physics world and a render scene in step, one frame at a time.
///
/// Neither side is owned: both are passed into every call that needs them.
pub struct SimulationLoop {
    accumulator: TimeAccumulator,
    pairs: PairRegistry,
    slot: ModelSlot,
    link_nodes: BTreeMap<String, NodeId>,
    link_nodes_pending: bool,
    frame: u64,
}

impl SimulationLoop {
    pub fn new(config: LoopConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            accumulator: TimeAccumulator::from_config(&config)?,
            pairs: PairRegistry::new(),
            slot: ModelSlot::Absent,
            link_nodes: BTreeMap::new(),
            link_nodes_pending: false,
            frame: 0,
        })
    }

    /// Drive `node` from `body` on every subsequent tick.
    pub fn register_pair<P, R>(
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
        self.pairs.register(physics, scene, body, node)
    }

    /// Take delivery of a model from `handle` on a later tick.
    ///
    /// `on_load` runs once on the delivered model; an error from it fails the
    /// load with [`LoadError::Setup`]. Any model attached earlier is dropped.
    /// Its link nodes stay in the scene but are no longer updated.
    pub fn attach_loader(&mut self, handle: LoadHandle, on_load: Option<OnLoad>) {
        if !matches!(self.slot, ModelSlot::Absent) {
            tracing::warn!(source = %handle.source().display(), "replacing previously attached model");
        }
        tracing::debug!(source = %handle.source().display(), "waiting for model load");
        self.link_nodes.clear();
        self.link_nodes_pending = false;
        self.slot = ModelSlot::Loading { handle, on_load };
    }

    /// Install a model that is already loaded. Link nodes are created on the next tick.
    pub fn attach_model(&mut self, model: ArticulatedModel) {
        if !matches!(self.slot, ModelSlot::Absent) {
            tracing::warn!(model = model.name(), "replacing previously attached model");
        }
        self.link_nodes.clear();
        self.install(model);
    }

    pub fn model_status(&self) -> ModelStatus {
        match self.slot {
            ModelSlot::Absent => ModelStatus::Absent,
            ModelSlot::Loading { .. } => ModelStatus::Loading,
            ModelSlot::Ready(_) => ModelStatus::Ready,
            ModelSlot::Failed(_) => ModelStatus::Failed,
        }
    }

    pub fn model(&self) -> Option<&ArticulatedModel> {
        match &self.slot {
            ModelSlot::Ready(model) => Some(model),
            _ => None,
        }
    }

    /// Mutable access for joint commands; `None` until the model is ready.
    pub fn model_mut(&mut self) -> Option<&mut ArticulatedModel> {
        match &mut self.slot {
            ModelSlot::Ready(model) => Some(model),
            _ => None,
        }
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        match &self.slot {
            ModelSlot::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Render node mirroring the named link, once the model is in the scene.
    pub fn link_node(&self, link: &str) -> Option<NodeId> {
        self.link_nodes.get(link).copied()
    }

    pub fn pairs(&self) -> &PairRegistry {
        &self.pairs
    }

    /// Number of ticks run so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn accumulator(&self) -> &TimeAccumulator {
        &self.accumulator
    }

    /// Run one frame at wall time `now` (seconds). Never fails.
    pub fn tick<P, R>(&mut self, now: f64, physics: &mut P, scene: &mut R) -> TickReport
    where
        P: PhysicsEngine + ?Sized,
        R: RenderScene + ?Sized,
    {
        let frame = self.frame;
        self.frame += 1;

        self.poll_load();
        let mirror = self.create_link_nodes(scene);

        let plan = self.accumulator.advance(now);
        for _ in 0..plan.steps {
            physics.step(plan.fixed_step);
        }

        let pose_copies = self.pairs.copy_all(&*physics, scene);

        let mut recomputed = false;
        if let ModelSlot::Ready(model) = &mut self.slot {
            if model.needs_recompute() {
                model.recompute_world_transforms();
                recomputed = true;
            }
            if recomputed || mirror {
                for link in model.links() {
                    if let Some(&node) = self.link_nodes.get(link.name()) {
                        scene.write_pose(node, &link.world());
                    }
                }
            }
        }

        tracing::trace!(frame, steps = plan.steps, pose_copies, recomputed, "tick");
        TickReport {
            frame,
            steps: plan.steps,
            pose_copies,
            recomputed,
            clock_regression: plan.clock_regression,
        }
    }

    fn install(&mut self, model: ArticulatedModel) {
        tracing::debug!(
            model = model.name(),
            links = model.links().len(),
            joints = model.joints().len(),
            "articulated model ready"
        );
        self.slot = ModelSlot::Ready(model);
        self.link_nodes_pending = true;
    }

    fn poll_load(&mut self) {
        let ModelSlot::Loading { handle, .. } = &mut self.slot else {
            return;
        };
        let Some(delivered) = handle.poll() else {
            return;
        };
        let ModelSlot::Loading { handle, on_load } =
            std::mem::replace(&mut self.slot, ModelSlot::Absent)
        else {
            return;
        };

        let result = delivered.and_then(|mut model| {
            if let Some(setup) = on_load {
                setup(&mut model).map_err(LoadError::Setup)?;
            }
            Ok(model)
        });
        match result {
            Ok(model) => self.install(model),
            Err(e) => {
                tracing::error!(source = %handle.source().display(), error = %e, "model load failed; continuing without it");
                self.slot = ModelSlot::Failed(e);
            }
        }
    }

    /// Returns whether nodes were created this call.
    fn create_link_nodes<R>(&mut self, scene: &mut R) -> bool
    where
        R: RenderScene + ?Sized,
    {
        if !self.link_nodes_pending {
            return false;
        }
        let ModelSlot::Ready(model) = &self.slot else {
            return false;
        };
        self.link_nodes_pending = false;
        for link in model.links() {
            let node = scene.create_node(link.name());
            self.link_nodes.insert(link.name().to_owned(), node);
        }
        true
    }
}
