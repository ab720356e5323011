use crate::math::Vec2;

/// Post-release momentum with per-frame exponential drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlingIntegrator {
    velocity: Vec2,
    drag: f32,
    epsilon: f32,
}

impl FlingIntegrator {
    pub fn new(drag: f32, epsilon: f32) -> Self {
        Self {
            velocity: Vec2::ZERO,
            drag: drag.clamp(0.0, 1.0),
            epsilon: epsilon.max(0.0),
        }
    }

    /// Starts a fling. Non-finite velocities are ignored.
    pub fn launch(&mut self, velocity: Vec2) {
        self.velocity = if velocity.is_finite() { velocity } else { Vec2::ZERO };
    }

    pub fn stop(&mut self) {
        self.velocity = Vec2::ZERO;
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Applies one frame of drag and returns the decayed velocity. The
    /// velocity snaps to zero once its magnitude drops below epsilon.
    pub fn step(&mut self) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        self.velocity = self.velocity * self.drag;
        if self.velocity.length() < self.epsilon {
            self.velocity = Vec2::ZERO;
        }
        self.velocity
    }
}

/// Number of [`FlingIntegrator::step`] calls needed for a fling of speed
/// `v` to stop: `ceil(ln(epsilon / v) / ln(drag))`.
pub fn steps_to_stop(v: f32, drag: f32, epsilon: f32) -> u32 {
    if v < epsilon || v <= 0.0 {
        return 0;
    }
    if drag <= 0.0 {
        return 1;
    }
    if drag >= 1.0 {
        return u32::MAX;
    }
    ((epsilon / v).ln() / drag.ln()).ceil() as u32
}
