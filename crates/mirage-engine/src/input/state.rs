use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::math::Vec2;

use super::frame::InputFrame;
use super::touch::TouchTracker;
use super::types::{ButtonState, InputEvent, Key, KeyState, Modifiers, MouseButton, TouchPhase};

/// Pointer id used for the left mouse button when it emulates a touch.
pub const MOUSE_POINTER_ID: u64 = u64::MAX;
/// Pointer id of the second touch synthesized while Ctrl is held.
pub const MIRROR_POINTER_ID: u64 = u64::MAX - 1;

/// Current input state for a single window.
///
/// Holds "is down" information, cursor position and the active touch set.
/// Per-frame transitions are recorded into an `InputFrame`.
#[derive(Debug)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the window is focused.
    pub focused: bool,

    /// Cursor position in logical pixels.
    pub cursor_pos: Option<Vec2>,

    /// Set of currently held keys.
    pub keys_down: HashSet<Key>,

    /// Logical window size; the mirrored pointer reflects about its center.
    pub viewport: Vec2,

    touches: TouchTracker,
    mouse_touch: bool,
    epoch: Instant,
}

impl InputState {
    pub fn new(epoch: Instant) -> Self {
        Self {
            modifiers: Modifiers::default(),
            focused: true,
            cursor_pos: None,
            keys_down: HashSet::new(),
            viewport: Vec2::ZERO,
            touches: TouchTracker::new(),
            mouse_touch: false,
            epoch,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    pub fn touches(&self) -> &TouchTracker {
        &self.touches
    }

    /// Applies a platform-agnostic input event to the current state and writes
    /// deltas to `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent, now: Instant) {
        let ts = now.saturating_duration_since(self.epoch);

        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = m;
            }

            InputEvent::Focused(f) => {
                self.focused = f;
                if !f {
                    // On focus loss nothing is held any more; abort the gesture.
                    self.keys_down.clear();
                    self.mouse_touch = false;
                    if let Some(cancel) = self.touches.cancel(ts) {
                        frame.push_touch(cancel);
                    }
                }
            }

            InputEvent::Key { key, state, .. } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        frame.keys_pressed.insert(key);
                    }
                }
                KeyState::Released => {
                    if self.keys_down.remove(&key) {
                        frame.keys_released.insert(key);
                    }
                }
            },

            InputEvent::CursorMoved { x, y } => {
                let pos = Vec2::new(x, y);
                self.cursor_pos = Some(pos);
                if self.mouse_touch {
                    let mirror = self.mirror(pos);
                    let moves = [(MOUSE_POINTER_ID, pos), (MIRROR_POINTER_ID, mirror)];
                    if let Some(mv) = self.touches.move_to(&moves, ts) {
                        frame.push_touch(mv);
                    }
                }
            }

            InputEvent::MouseButton {
                button: MouseButton::Left,
                state,
            } => self.apply_mouse_touch(frame, state, ts),

            InputEvent::MouseButton { .. } => {}

            InputEvent::Touch { id, phase, x, y } => {
                let pos = Vec2::new(x, y);
                let ev = match phase {
                    TouchPhase::Started => Some(self.touches.press(id, pos, ts)),
                    TouchPhase::Moved => self.touches.move_to(&[(id, pos)], ts),
                    TouchPhase::Ended => self.touches.release(id, pos, ts),
                    TouchPhase::Cancelled => self.touches.cancel(ts),
                };
                if let Some(ev) = ev {
                    frame.push_touch(ev);
                }
            }
        }
    }

    fn apply_mouse_touch(&mut self, frame: &mut InputFrame, state: ButtonState, ts: Duration) {
        let pos = self.cursor_pos.unwrap_or(Vec2::ZERO);
        match state {
            ButtonState::Pressed if !self.mouse_touch => {
                self.mouse_touch = true;
                frame.push_touch(self.touches.press(MOUSE_POINTER_ID, pos, ts));
                if self.modifiers.ctrl {
                    let mirror = self.mirror(pos);
                    frame.push_touch(self.touches.press(MIRROR_POINTER_ID, mirror, ts));
                }
            }
            ButtonState::Released if self.mouse_touch => {
                self.mouse_touch = false;
                let mirror = self.mirror(pos);
                if let Some(ev) = self.touches.release(MIRROR_POINTER_ID, mirror, ts) {
                    frame.push_touch(ev);
                }
                if let Some(ev) = self.touches.release(MOUSE_POINTER_ID, pos, ts) {
                    frame.push_touch(ev);
                }
            }
            _ => {}
        }
    }

    fn mirror(&self, pos: Vec2) -> Vec2 {
        self.viewport - pos
    }

    /// Helper queries
    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }
}
