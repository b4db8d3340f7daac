//! Robot description loading.
//!
//! A description document is parsed into an [`ArticulatedModel`] off the frame
//! loop and handed back exactly once through a [`LoadHandle`].
//!
//! # Invariants
//! - A handle yields its result at most once; later polls return `None`.
//! - A loader that disappears without completing is reported, not waited on forever.

mod description;
mod loader;

pub use description::{
    JointDescription, LimitDescription, LinkDescription, Origin, RobotDescription,
    VisualDescription,
};
pub use loader::{load_channel, load_description, Completer, LoadError, LoadHandle, ModelLoader};

pub use simsync_articulated::ArticulatedModel;

pub fn crate_info() -> &'static str {
    "simsync-assets v0.1.0"
}
