use std::fmt;
use std::time::Duration;

use crate::math::Vec2;

/// Keyboard key identifier.
///
/// Only the keys the desktop host binds are named; everything else maps to
/// `Key::Unknown(u32)` with a stable platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Shift,
    Control,
    Alt,

    P,
    R,

    Digit0,
    Digit1,
    Digit2,
    Digit3,

    /// Platform-dependent key not yet represented here.
    Unknown(u32),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Phase of a single raw platform touch contact.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TouchPhase {
    Started,
    Moved,
    Ended,
    Cancelled,
}

/// Platform-agnostic raw input events emitted by the runtime.
///
/// These describe single contacts and buttons. [`super::InputState`] folds
/// them into multi-pointer [`TouchEvent`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: KeyState,
        /// Stable platform code when available (e.g. scancode).
        code: u32,
        /// True when event is a key-repeat.
        repeat: bool,
    },

    /// Cursor position in logical pixels.
    CursorMoved { x: f32, y: f32 },

    MouseButton {
        button: MouseButton,
        state: ButtonState,
    },

    /// One raw touch contact, position in logical pixels.
    Touch {
        id: u64,
        phase: TouchPhase,
        x: f32,
        y: f32,
    },

    /// Window focus change.
    Focused(bool),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ── touch ─────────────────────────────────────────────────────────────────

/// What changed in a [`TouchEvent`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TouchAction {
    /// First pointer went down.
    Down,
    /// An additional pointer went down.
    PointerDown,
    /// One or more pointers moved.
    Move,
    /// A non-last pointer lifted.
    PointerUp,
    /// The last pointer lifted.
    Up,
    /// The gesture was aborted by the platform.
    Cancel,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TouchPointer {
    pub id: u64,
    pub position: Vec2,
}

/// Multi-pointer touch event.
///
/// `pointers` always holds every pointer that is down at the time of the
/// event, including the one lifting on `PointerUp` / `Up`. `action_id`
/// names the pointer the action applies to; for `Move` and `Cancel` it is
/// the first pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub action_id: u64,
    pub pointers: Vec<TouchPointer>,
    /// Time since an arbitrary fixed epoch; only differences are meaningful.
    pub timestamp: Duration,
}

impl TouchEvent {
    pub fn new(
        action: TouchAction,
        action_id: u64,
        pointers: Vec<TouchPointer>,
        timestamp: Duration,
    ) -> Self {
        Self {
            action,
            action_id,
            pointers,
            timestamp,
        }
    }

    #[inline]
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Position of pointer `id`, if it is part of this event.
    pub fn position(&self, id: u64) -> Option<Vec2> {
        self.pointers
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.position)
    }

    /// Position of the pointer the action applies to.
    pub fn action_position(&self) -> Option<Vec2> {
        self.position(self.action_id)
    }

    /// Pointers that remain down after this event.
    pub fn remaining(&self) -> impl Iterator<Item = &TouchPointer> + '_ {
        let (action, action_id) = (self.action, self.action_id);
        self.pointers.iter().filter(move |p| match action {
            TouchAction::Cancel => false,
            TouchAction::PointerUp | TouchAction::Up => p.id != action_id,
            _ => true,
        })
    }
}
