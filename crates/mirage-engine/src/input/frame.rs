use std::collections::HashSet;

use super::types::{Key, TouchEvent};

/// Per-frame input deltas.
///
/// `InputState` provides the current state (held keys, active pointers).
/// `InputFrame` buffers what happened since the previous frame so the render
/// thread can consume it at the start of its tick.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Touch events in arrival order.
    pub touches: Vec<TouchEvent>,

    /// Keys pressed this frame.
    pub keys_pressed: HashSet<Key>,

    /// Keys released this frame.
    pub keys_released: HashSet<Key>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.touches.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn push_touch(&mut self, ev: TouchEvent) {
        self.touches.push(ev);
    }

    /// Moves the buffered touch events out, leaving the key sets untouched.
    pub fn drain_touches(&mut self) -> std::vec::Drain<'_, TouchEvent> {
        self.touches.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.touches.is_empty() && self.keys_pressed.is_empty() && self.keys_released.is_empty()
    }
}
