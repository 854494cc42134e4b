//! Keyboard state resource.
//!
//! The host reports key transitions; components read the pressed state of
//! the keys their bindings name. Unknown keys read as released.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::events::input::{KeyEvent, KeyEventKind};

/// Key code to pressed-state map.
#[derive(Debug, Default)]
pub struct InputManager {
    keymap: RefCell<FxHashMap<String, bool>>,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&self, code: &str) {
        self.keymap.borrow_mut().insert(code.to_string(), true);
    }

    pub fn key_up(&self, code: &str) {
        self.keymap.borrow_mut().insert(code.to_string(), false);
    }

    /// Apply one host key transition.
    pub fn handle(&self, event: &KeyEvent) {
        match event.kind {
            KeyEventKind::Pressed => self.key_down(&event.code),
            KeyEventKind::Released => self.key_up(&event.code),
        }
    }

    pub fn is_pressed(&self, code: &str) -> bool {
        self.keymap.borrow().get(code).copied().unwrap_or(false)
    }

    /// Release every key, e.g. when the host loses focus.
    pub fn clear(&self) {
        self.keymap.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_transitions() {
        let input = InputManager::new();
        assert!(!input.is_pressed("KeyA"));

        input.handle(&KeyEvent::pressed("KeyA"));
        assert!(input.is_pressed("KeyA"));
        assert!(!input.is_pressed("KeyD"));

        input.handle(&KeyEvent::released("KeyA"));
        assert!(!input.is_pressed("KeyA"));

        input.key_down("Space");
        input.clear();
        assert!(!input.is_pressed("Space"));
    }
}
