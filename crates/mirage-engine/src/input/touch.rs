use std::time::Duration;

use crate::math::Vec2;

use super::types::{TouchAction, TouchEvent, TouchPointer};

/// Folds single-contact changes into multi-pointer [`TouchEvent`]s.
///
/// Pointers are kept in the order they went down.
#[derive(Debug, Default, Clone)]
pub struct TouchTracker {
    active: Vec<TouchPointer>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn active(&self) -> &[TouchPointer] {
        &self.active
    }

    #[inline]
    pub fn is_active(&self, id: u64) -> bool {
        self.active.iter().any(|p| p.id == id)
    }

    /// Pointer `id` went down. A pointer that is already down is treated as
    /// a move.
    pub fn press(&mut self, id: u64, position: Vec2, timestamp: Duration) -> TouchEvent {
        if self.is_active(id) {
            return self
                .move_to(&[(id, position)], timestamp)
                .unwrap_or_else(|| self.snapshot(TouchAction::Move, id, timestamp));
        }
        let action = if self.active.is_empty() {
            TouchAction::Down
        } else {
            TouchAction::PointerDown
        };
        self.active.push(TouchPointer { id, position });
        self.snapshot(action, id, timestamp)
    }

    /// Moves every listed pointer that is down. Returns `None` when none of
    /// them is.
    pub fn move_to(&mut self, moves: &[(u64, Vec2)], timestamp: Duration) -> Option<TouchEvent> {
        let mut moved = false;
        for &(id, position) in moves {
            if let Some(p) = self.active.iter_mut().find(|p| p.id == id) {
                p.position = position;
                moved = true;
            }
        }
        let first = self.active.first()?.id;
        moved.then(|| self.snapshot(TouchAction::Move, first, timestamp))
    }

    /// Pointer `id` lifted at `position`. Returns `None` for unknown ids.
    pub fn release(&mut self, id: u64, position: Vec2, timestamp: Duration) -> Option<TouchEvent> {
        let index = self.active.iter().position(|p| p.id == id)?;
        self.active[index].position = position;
        let action = if self.active.len() == 1 {
            TouchAction::Up
        } else {
            TouchAction::PointerUp
        };
        let event = self.snapshot(action, id, timestamp);
        self.active.remove(index);
        Some(event)
    }

    /// Aborts the gesture. Returns `None` when nothing was down.
    pub fn cancel(&mut self, timestamp: Duration) -> Option<TouchEvent> {
        let first = self.active.first()?.id;
        let event = self.snapshot(TouchAction::Cancel, first, timestamp);
        self.active.clear();
        Some(event)
    }

    fn snapshot(&self, action: TouchAction, action_id: u64, timestamp: Duration) -> TouchEvent {
        TouchEvent::new(action, action_id, self.active.clone(), timestamp)
    }
}
