//! Touch gesture recognizers.
//!
//! Each recognizer consumes the same [`TouchEvent`](crate::input::TouchEvent)
//! stream independently and reports deltas the scene integrates into its
//! camera or object pose.

mod config;
mod fling;
mod pan;
mod pinch;
mod pointer_pair;
mod rotation;
mod velocity;

pub use config::GestureConfig;
pub use fling::{FlingIntegrator, steps_to_stop};
pub use pan::{PanFlingDetector, PanGesture};
pub use pinch::PinchDetector;
pub use pointer_pair::{PairChange, PointerPair, TrackedPointer};
pub use rotation::{RotationGestureDetector, angle_between_lines};
pub use velocity::VelocityTracker;
