//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `InputEvent`s; `InputState`
//! folds them into Android-style multi-pointer `TouchEvent`s.

mod frame;
pub mod platform;
mod state;
mod touch;
mod types;

pub use frame::InputFrame;
pub use state::{InputState, MIRROR_POINTER_ID, MOUSE_POINTER_ID};
pub use touch::TouchTracker;
pub use types::{
    ButtonState,
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    TouchAction,
    TouchEvent,
    TouchPhase,
    TouchPointer,
};
