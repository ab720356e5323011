use crate::input::{TouchAction, TouchEvent};
use crate::math::Vec2;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrackedPointer {
    pub id: u64,
    /// Position when the current pair was formed.
    pub start: Vec2,
    pub current: Vec2,
}

impl TrackedPointer {
    fn new(id: u64, position: Vec2) -> Self {
        Self {
            id,
            start: position,
            current: position,
        }
    }
}

/// How a [`PointerPair`] changed in response to one event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PairChange {
    /// Nothing relevant to the pair happened.
    None,
    /// Both slots just became occupied; start positions were captured.
    Formed,
    /// Tracked pointers moved while the pair was complete.
    Moved,
    /// The pair lost a pointer (or was cancelled) after being complete.
    Broken,
}

/// Two-slot pointer bookkeeping shared by the two-finger recognizers.
///
/// When the pointer in the first slot lifts, the second slot moves into the
/// first rather than the state being dropped. If a third pointer is still
/// down it takes over the free slot and the pair re-forms.
#[derive(Debug, Default, Clone)]
pub struct PointerPair {
    slots: [Option<TrackedPointer>; 2],
}

impl PointerPair {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn first(&self) -> Option<&TrackedPointer> {
        self.slots[0].as_ref()
    }

    #[inline]
    pub fn second(&self) -> Option<&TrackedPointer> {
        self.slots[1].as_ref()
    }

    /// Both slots filled.
    pub fn pair(&self) -> Option<(&TrackedPointer, &TrackedPointer)> {
        Some((self.slots[0].as_ref()?, self.slots[1].as_ref()?))
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }

    pub fn on_touch_event(&mut self, ev: &TouchEvent) -> PairChange {
        let was_complete = self.is_complete();
        match ev.action {
            TouchAction::Down => {
                self.clear();
                if let Some(pos) = ev.action_position() {
                    self.slots[0] = Some(TrackedPointer::new(ev.action_id, pos));
                }
                PairChange::None
            }

            TouchAction::PointerDown => {
                if was_complete {
                    return PairChange::None;
                }
                let Some(pos) = ev.action_position() else {
                    return PairChange::None;
                };
                self.fill(ev.action_id, pos);
                self.formed_if_complete()
            }

            TouchAction::Move => {
                let mut moved = false;
                for slot in self.slots.iter_mut().flatten() {
                    if let Some(pos) = ev.position(slot.id) {
                        moved |= slot.current != pos;
                        slot.current = pos;
                    }
                }
                if was_complete && moved {
                    PairChange::Moved
                } else {
                    PairChange::None
                }
            }

            TouchAction::PointerUp => {
                let lifting = ev.action_id;
                if self.slots[1].is_some_and(|p| p.id == lifting) {
                    self.slots[1] = None;
                } else if self.slots[0].is_some_and(|p| p.id == lifting) {
                    self.slots[0] = self.slots[1].take();
                } else {
                    return PairChange::None;
                }

                // A pointer still down but untracked takes the free slot.
                let replacement = ev
                    .remaining()
                    .find(|p| !self.tracks(p.id))
                    .map(|p| (p.id, p.position));
                if let Some((id, pos)) = replacement {
                    self.fill(id, pos);
                    if self.is_complete() {
                        self.restart();
                    }
                }

                if was_complete { PairChange::Broken } else { PairChange::None }
            }

            TouchAction::Up | TouchAction::Cancel => {
                self.clear();
                if was_complete { PairChange::Broken } else { PairChange::None }
            }
        }
    }

    fn tracks(&self, id: u64) -> bool {
        self.slots.iter().flatten().any(|p| p.id == id)
    }

    fn fill(&mut self, id: u64, position: Vec2) {
        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(TrackedPointer::new(id, position));
        }
    }

    fn formed_if_complete(&mut self) -> PairChange {
        if self.is_complete() {
            self.restart();
            PairChange::Formed
        } else {
            PairChange::None
        }
    }

    /// Captures current positions as the gesture start.
    fn restart(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.start = slot.current;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::input::TouchTracker;

    fn t() -> Duration {
        Duration::ZERO
    }

    #[test]
    fn forms_on_second_pointer() {
        let mut touches = TouchTracker::new();
        let mut pair = PointerPair::new();
        assert_eq!(pair.on_touch_event(&touches.press(1, Vec2::ZERO, t())), PairChange::None);
        let ev = touches.press(2, Vec2::new(10.0, 0.0), t());
        assert_eq!(pair.on_touch_event(&ev), PairChange::Formed);
        let (a, b) = pair.pair().unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(b.start, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn first_slot_lifting_swaps_second_into_first() {
        let mut touches = TouchTracker::new();
        let mut pair = PointerPair::new();
        pair.on_touch_event(&touches.press(1, Vec2::ZERO, t()));
        pair.on_touch_event(&touches.press(2, Vec2::new(10.0, 0.0), t()));

        let up = touches.release(1, Vec2::ZERO, t()).unwrap();
        assert_eq!(pair.on_touch_event(&up), PairChange::Broken);
        assert_eq!(pair.first().map(|p| p.id), Some(2));
        assert!(pair.second().is_none());

        let ev = touches.press(3, Vec2::new(0.0, 10.0), t());
        assert_eq!(pair.on_touch_event(&ev), PairChange::Formed);
        let (a, b) = pair.pair().unwrap();
        assert_eq!((a.id, b.id), (2, 3));
    }

    #[test]
    fn third_pointer_replaces_lifted_one() {
        let mut touches = TouchTracker::new();
        let mut pair = PointerPair::new();
        pair.on_touch_event(&touches.press(1, Vec2::ZERO, t()));
        pair.on_touch_event(&touches.press(2, Vec2::new(10.0, 0.0), t()));
        // Third pointer is ignored while the pair is complete.
        assert_eq!(pair.on_touch_event(&touches.press(3, Vec2::new(5.0, 5.0), t())), PairChange::None);

        let up = touches.release(2, Vec2::new(10.0, 0.0), t()).unwrap();
        assert_eq!(pair.on_touch_event(&up), PairChange::Broken);
        let (a, b) = pair.pair().unwrap();
        assert_eq!((a.id, b.id), (1, 3));
        assert_eq!(b.start, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn moves_update_current_only() {
        let mut touches = TouchTracker::new();
        let mut pair = PointerPair::new();
        pair.on_touch_event(&touches.press(1, Vec2::ZERO, t()));
        pair.on_touch_event(&touches.press(2, Vec2::new(10.0, 0.0), t()));
        let mv = touches.move_to(&[(2, Vec2::new(12.0, 1.0))], t()).unwrap();
        assert_eq!(pair.on_touch_event(&mv), PairChange::Moved);
        let (_, b) = pair.pair().unwrap();
        assert_eq!(b.start, Vec2::new(10.0, 0.0));
        assert_eq!(b.current, Vec2::new(12.0, 1.0));
    }

    #[test]
    fn up_clears_pair() {
        let mut touches = TouchTracker::new();
        let mut pair = PointerPair::new();
        pair.on_touch_event(&touches.press(1, Vec2::ZERO, t()));
        let up = touches.release(1, Vec2::ZERO, t()).unwrap();
        assert_eq!(pair.on_touch_event(&up), PairChange::None);
        assert!(pair.first().is_none());
    }
}
