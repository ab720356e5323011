//! Desktop host loop.
//!
//! Owns the winit event loop and window and drives a scene against a
//! [`crate::render::WgpuBackend`].

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
