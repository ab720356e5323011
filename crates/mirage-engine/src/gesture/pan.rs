use std::time::Duration;

use crate::input::{TouchAction, TouchEvent};
use crate::math::Vec2;

use super::{GestureConfig, VelocityTracker};

/// Output of [`PanFlingDetector`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PanGesture {
    /// Movement since the previous move event, in pixels.
    Pan(Vec2),
    /// Short press released at this position.
    Tap(Vec2),
    /// Release velocity in pixels per second, already clamped.
    Fling(Vec2),
}

/// Single-pointer pan, tap and fling recognizer.
///
/// The first move after a down is swallowed: its delta is measured against
/// the down position, which platforms report unreliably. A second pointer
/// going down suspends the recognizer until every pointer lifts.
#[derive(Debug, Clone)]
pub struct PanFlingDetector {
    tap_threshold: Duration,
    max_velocity: f32,
    tracked: Option<u64>,
    down_at: Duration,
    last: Vec2,
    awaiting_first_move: bool,
    multi_touch: bool,
    velocity: VelocityTracker,
}

impl PanFlingDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            tap_threshold: config.tap_threshold,
            max_velocity: config.max_fling_velocity.max(0.0),
            tracked: None,
            down_at: Duration::ZERO,
            last: Vec2::ZERO,
            awaiting_first_move: false,
            multi_touch: false,
            velocity: VelocityTracker::new(config.velocity_horizon),
        }
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracked.is_some() && !self.multi_touch
    }

    pub fn on_touch_event(&mut self, ev: &TouchEvent) -> Option<PanGesture> {
        match ev.action {
            TouchAction::Down => {
                let pos = ev.action_position()?;
                self.tracked = Some(ev.action_id);
                self.down_at = ev.timestamp;
                self.last = pos;
                self.awaiting_first_move = true;
                self.multi_touch = false;
                self.velocity.clear();
                self.velocity.add(ev.timestamp, pos);
                None
            }

            TouchAction::PointerDown => {
                self.multi_touch = true;
                None
            }

            TouchAction::Move => {
                if !self.is_tracking() {
                    return None;
                }
                let pos = ev.position(self.tracked?)?;
                self.velocity.add(ev.timestamp, pos);
                if self.awaiting_first_move {
                    self.awaiting_first_move = false;
                    self.last = pos;
                    return None;
                }
                let delta = pos - self.last;
                self.last = pos;
                (delta != Vec2::ZERO).then_some(PanGesture::Pan(delta))
            }

            TouchAction::PointerUp => None,

            TouchAction::Up => {
                let tracked = self.tracked.take()?;
                if self.multi_touch || tracked != ev.action_id {
                    return None;
                }
                let pos = ev.action_position().unwrap_or(self.last);
                let held = ev.timestamp.saturating_sub(self.down_at);
                if held < self.tap_threshold {
                    return Some(PanGesture::Tap(pos));
                }
                self.velocity.add(ev.timestamp, pos);
                let v = self.clamp(self.velocity.velocity());
                (v != Vec2::ZERO).then_some(PanGesture::Fling(v))
            }

            TouchAction::Cancel => {
                self.tracked = None;
                self.velocity.clear();
                None
            }
        }
    }

    fn clamp(&self, v: Vec2) -> Vec2 {
        let speed = v.length();
        if speed > self.max_velocity {
            v * (self.max_velocity / speed)
        } else {
            v
        }
    }
}
