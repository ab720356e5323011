//! Device rotation reconciliation.
//!
//! Raw rotation-vector samples arrive on a producer thread and land in a
//! single-slot [`RotationFeed`]. The render thread polls the feed once per
//! tick into a [`RotationTracker`], which turns the latest sample into a
//! render-space rotation relative to the session baseline.

mod feed;
mod orientation;
mod sample;
mod tracker;

pub use feed::RotationFeed;
pub use orientation::ScreenOrientation;
pub use sample::RotationSample;
pub use tracker::{RotationSensor, RotationTracker, TrackerState};
