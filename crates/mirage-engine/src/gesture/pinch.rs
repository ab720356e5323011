use crate::input::TouchEvent;

use super::{GestureConfig, PairChange, PointerPair};

/// Two-finger pinch recognizer reporting incremental scale factors.
#[derive(Debug, Clone)]
pub struct PinchDetector {
    pair: PointerPair,
    min_span: f32,
    span: f32,
}

impl PinchDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            pair: PointerPair::new(),
            min_span: config.min_pinch_span.max(f32::EPSILON),
            span: 0.0,
        }
    }

    /// Current distance between the two pointers; zero without a pair.
    #[inline]
    pub fn span(&self) -> f32 {
        self.span
    }

    /// Feeds one event; returns `current_span / previous_span` when the pair
    /// moved. Spans shorter than the configured minimum produce no factor.
    pub fn on_touch_event(&mut self, ev: &TouchEvent) -> Option<f32> {
        match self.pair.on_touch_event(ev) {
            PairChange::Formed => {
                self.span = self.current_span()?;
                None
            }
            PairChange::Moved => {
                let span = self.current_span()?;
                let previous = std::mem::replace(&mut self.span, span);
                if previous < self.min_span || span < self.min_span {
                    return None;
                }
                Some(span / previous)
            }
            PairChange::Broken => {
                // A replacement pointer may have re-formed the pair.
                self.span = self.current_span().unwrap_or(0.0);
                None
            }
            PairChange::None => None,
        }
    }

    fn current_span(&self) -> Option<f32> {
        let (a, b) = self.pair.pair()?;
        Some((b.current - a.current).length())
    }
}
