//! Time subsystem.
//!
//! Provides stable, testable scene timing without coupling to the runtime.
//! Intended usage:
//! - one `SceneClock` per scene instance
//! - call `tick(now)` once per rendered frame to obtain `FrameTime`
//! - call `reset()` when the scene resets; elapsed time restarts at zero

mod scene_clock;

pub use scene_clock::{FrameTime, SceneClock};
