//! Scene contract between the platform loop and concrete scenes.
//!
//! The runtime (or a test) drives a [`Scene`] through the renderer-style
//! callbacks; each scene tracks where it is with a [`Lifecycle`] and reports
//! GPU setup failures as [`SceneError`].

mod lifecycle;
mod scene;

pub use lifecycle::{Lifecycle, LifecycleState};
pub use scene::{Scene, SceneError};
