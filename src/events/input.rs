//! Keyboard events fed into the [`InputManager`](crate::resources::input::InputManager).
//!
//! Key codes are plain strings (`"KeyA"`, `"ArrowLeft"`, `"Space"`), the same
//! codes used by keybinding files.

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    Released,
}

/// One key transition reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: String,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn pressed(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: KeyEventKind::Pressed,
        }
    }

    pub fn released(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: KeyEventKind::Released,
        }
    }
}
