//! Mirage engine crate.
//!
//! Platform and GPU runtime plus the reusable pieces every scene is built
//! from: the math kernel, rotation-sensor reconciliation, gesture
//! recognizers, signed distance fields and framebuffer management.

pub mod core;
pub mod device;
pub mod gesture;
pub mod input;
pub mod logging;
pub mod math;
pub mod render;
pub mod sdf;
pub mod sensor;
pub mod time;
pub mod window;
