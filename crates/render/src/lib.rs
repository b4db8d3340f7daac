//! Render side of the synchronizer: a scene graph the loop writes into and a
//! renderer-agnostic interface that reads it back out.
//!
//! # Invariants
//! - Renderers never mutate the scene graph.
//! - Node orientations are unit quaternions.
//!
//! The only renderer shipped is a debug text renderer; a GPU backend plugs in
//! behind the same trait.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};
pub use scene::{RenderNode, SceneGraph};

pub fn crate_info() -> &'static str {
    "simsync-render v0.1.0"
}
