use std::time::Duration;

/// Tunables shared by the gesture recognizers.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// A single-pointer press shorter than this is a tap, not a fling.
    pub tap_threshold: Duration,
    /// Fling velocity multiplier applied once per frame.
    pub fling_drag: f32,
    /// Fling speed below which the fling stops.
    pub fling_epsilon: f32,
    /// Upper bound on the lift-off velocity, in pixels per second.
    pub max_fling_velocity: f32,
    /// Only samples this recent contribute to the lift-off velocity.
    pub velocity_horizon: Duration,
    /// Radians of rotation per pixel of pan.
    pub pan_sensitivity: f32,
    /// Pointer spans shorter than this (pixels) do not produce pinch deltas.
    pub min_pinch_span: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold: Duration::from_millis(200),
            fling_drag: 0.95,
            fling_epsilon: 0.01,
            max_fling_velocity: 8000.0,
            velocity_horizon: Duration::from_millis(100),
            pan_sensitivity: 0.005,
            min_pinch_span: 1.0,
        }
    }
}
