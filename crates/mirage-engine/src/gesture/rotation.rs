use crate::input::TouchEvent;
use crate::math::{Vec2, wrap_angle};

use super::{PairChange, PointerPair, TrackedPointer};

/// Signed angle from the line `a0 → a1` to the line `b0 → b1`, in `(-π, π]`.
pub fn angle_between_lines(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> f32 {
    let from = (a1 - a0).angle();
    let to = (b1 - b0).angle();
    wrap_angle(to - from)
}

/// Two-finger rotation recognizer.
///
/// The angle of the current gesture is measured against the line through
/// both start positions. When the gesture ends it is folded into a lifetime
/// rotation that persists across gestures.
#[derive(Debug, Default, Clone)]
pub struct RotationGestureDetector {
    pair: PointerPair,
    angle: f32,
    lifetime: f32,
}

impl RotationGestureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Angle of the gesture in progress.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Sum of every finished gesture.
    #[inline]
    pub fn lifetime_rotation(&self) -> f32 {
        self.lifetime
    }

    /// Lifetime rotation plus the gesture in progress.
    #[inline]
    pub fn total_rotation(&self) -> f32 {
        self.lifetime + self.angle
    }

    pub fn reset(&mut self) {
        self.pair.clear();
        self.angle = 0.0;
        self.lifetime = 0.0;
    }

    /// Feeds one event; returns the rotation delta since the previous event
    /// when the pair moved.
    pub fn on_touch_event(&mut self, ev: &TouchEvent) -> Option<f32> {
        match self.pair.on_touch_event(ev) {
            PairChange::Formed => {
                self.angle = 0.0;
                None
            }
            PairChange::Moved => {
                let (a, b) = self.pair.pair()?;
                let angle = Self::measure(a, b);
                let delta = wrap_angle(angle - self.angle);
                self.angle = angle;
                Some(delta)
            }
            PairChange::Broken => {
                self.lifetime += self.angle;
                self.angle = 0.0;
                None
            }
            PairChange::None => None,
        }
    }

    fn measure(a: &TrackedPointer, b: &TrackedPointer) -> f32 {
        angle_between_lines(a.start, b.start, a.current, b.current)
    }
}

#[cfg(test)]
mod tests {
    use core::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
    use std::time::Duration;

    use super::*;
    use crate::input::TouchTracker;
    use crate::math::Mat2;

    fn t() -> Duration {
        Duration::ZERO
    }

    /// Rotates both pointers about their midpoint in `steps` increments.
    fn rotate_pair(
        touches: &mut TouchTracker,
        detector: &mut RotationGestureDetector,
        center: Vec2,
        radius: f32,
        total: f32,
        steps: u32,
    ) -> f32 {
        let mut sum = 0.0;
        for i in 1..=steps {
            let r = Mat2::rotation(total * i as f32 / steps as f32);
            let offset = r * Vec2::new(radius, 0.0);
            let mv = touches
                .move_to(&[(1, center - offset), (2, center + offset)], t())
                .unwrap();
            sum += detector.on_touch_event(&mv).unwrap_or(0.0);
        }
        sum
    }

    #[test]
    fn angle_between_lines_is_signed_and_wrapped() {
        let o = Vec2::ZERO;
        assert!((angle_between_lines(o, Vec2::new(1.0, 0.0), o, Vec2::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_between_lines(o, Vec2::new(1.0, 0.0), o, Vec2::new(0.0, -1.0)) + FRAC_PI_2).abs() < 1e-6);
        let a = angle_between_lines(o, Vec2::new(-1.0, 0.01), o, Vec2::new(-1.0, -0.01));
        assert!(a.abs() < 0.1, "{a}");
        let flip = angle_between_lines(o, Vec2::new(1.0, 0.0), o, Vec2::new(-1.0, 0.0));
        assert!((flip - PI).abs() < 1e-6);
    }

    #[test]
    fn quarter_turn_accumulates_to_half_pi() {
        let mut touches = TouchTracker::new();
        let mut det = RotationGestureDetector::new();
        let center = Vec2::new(200.0, 300.0);
        det.on_touch_event(&touches.press(1, center - Vec2::new(50.0, 0.0), t()));
        det.on_touch_event(&touches.press(2, center + Vec2::new(50.0, 0.0), t()));

        let deltas = rotate_pair(&mut touches, &mut det, center, 50.0, FRAC_PI_2, 6);
        assert!((deltas - FRAC_PI_2).abs() < 1e-4);
        assert!((det.angle() - FRAC_PI_2).abs() < 1e-4);
        assert_eq!(det.lifetime_rotation(), 0.0);

        let end = center + Mat2::rotation(FRAC_PI_2) * Vec2::new(50.0, 0.0);
        det.on_touch_event(&touches.release(2, end, t()).unwrap());
        assert!((det.lifetime_rotation() - FRAC_PI_2).abs() < 1e-4);
        assert_eq!(det.angle(), 0.0);
    }

    #[test]
    fn lifetime_persists_across_gestures() {
        let mut touches = TouchTracker::new();
        let mut det = RotationGestureDetector::new();
        let center = Vec2::ZERO;
        for _ in 0..2 {
            det.on_touch_event(&touches.press(1, Vec2::new(-10.0, 0.0), t()));
            det.on_touch_event(&touches.press(2, Vec2::new(10.0, 0.0), t()));
            rotate_pair(&mut touches, &mut det, center, 10.0, FRAC_PI_4, 3);
            det.on_touch_event(&touches.release(1, Vec2::ZERO, t()).unwrap());
            det.on_touch_event(&touches.release(2, Vec2::ZERO, t()).unwrap());
        }
        assert!((det.lifetime_rotation() - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn single_pointer_never_rotates() {
        let mut touches = TouchTracker::new();
        let mut det = RotationGestureDetector::new();
        det.on_touch_event(&touches.press(1, Vec2::ZERO, t()));
        let mv = touches.move_to(&[(1, Vec2::new(30.0, 40.0))], t()).unwrap();
        assert_eq!(det.on_touch_event(&mv), None);
        det.on_touch_event(&touches.release(1, Vec2::ZERO, t()).unwrap());
        assert_eq!(det.lifetime_rotation(), 0.0);
    }
}
