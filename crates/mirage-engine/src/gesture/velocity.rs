use std::collections::VecDeque;
use std::time::Duration;

use crate::math::Vec2;

const MAX_SAMPLES: usize = 20;

/// Estimates pointer velocity from recent position samples.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    samples: VecDeque<(Duration, Vec2)>,
    horizon: Duration,
}

impl VelocityTracker {
    pub fn new(horizon: Duration) -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            horizon,
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn add(&mut self, timestamp: Duration, position: Vec2) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back((timestamp, position));
    }

    /// Average velocity in pixels per second over the samples within the
    /// horizon of the newest one. Zero when fewer than two samples qualify
    /// or no time has passed between them.
    pub fn velocity(&self) -> Vec2 {
        let Some(&(newest_t, newest_p)) = self.samples.back() else {
            return Vec2::ZERO;
        };
        let cutoff = newest_t.saturating_sub(self.horizon);
        let Some(&(oldest_t, oldest_p)) = self.samples.iter().find(|(t, _)| *t >= cutoff) else {
            return Vec2::ZERO;
        };
        let dt = newest_t.saturating_sub(oldest_t).as_secs_f32();
        if dt <= f32::EPSILON {
            return Vec2::ZERO;
        }
        (newest_p - oldest_p) / dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn constant_motion() {
        let mut t = VelocityTracker::new(ms(100));
        for i in 0..5 {
            t.add(ms(i * 10), Vec2::new(i as f32 * 5.0, 0.0));
        }
        let v = t.velocity();
        assert!((v.x - 500.0).abs() < 1.0e-2, "{v:?}");
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn old_samples_fall_outside_horizon() {
        let mut t = VelocityTracker::new(ms(100));
        t.add(ms(0), Vec2::new(-1000.0, 0.0));
        t.add(ms(500), Vec2::new(0.0, 0.0));
        t.add(ms(550), Vec2::new(0.0, 10.0));
        let v = t.velocity();
        assert!((v.y - 200.0).abs() < 1.0e-2);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn single_sample_has_no_velocity() {
        let mut t = VelocityTracker::new(ms(100));
        assert_eq!(t.velocity(), Vec2::ZERO);
        t.add(ms(3), Vec2::new(1.0, 1.0));
        assert_eq!(t.velocity(), Vec2::ZERO);
        t.add(ms(3), Vec2::new(9.0, 1.0));
        assert_eq!(t.velocity(), Vec2::ZERO);
    }
}
