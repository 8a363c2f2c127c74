//! Keyboard state
//!
//! Keys are tracked by physical code (`KeyboardEvent.code`), so holding
//! Shift never turns `KeyZ` into a different key.

use crate::sim::TickInput;

/// Held game keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    shift_left: bool,
    shift_right: bool,
    fire: bool,
    special: bool,
    pause: bool,
    start: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Returns false for keys the game ignores
    /// (the host only swallows browser defaults for mapped keys).
    pub fn set(&mut self, code: &str, down: bool) -> bool {
        let slot = match code {
            "ArrowLeft" => &mut self.left,
            "ArrowRight" => &mut self.right,
            "ArrowUp" => &mut self.up,
            "ArrowDown" => &mut self.down,
            "ShiftLeft" => &mut self.shift_left,
            "ShiftRight" => &mut self.shift_right,
            "KeyZ" => &mut self.fire,
            "KeyX" => &mut self.special,
            "Escape" | "KeyP" => &mut self.pause,
            "Enter" | "Space" => &mut self.start,
            _ => return false,
        };
        *slot = down;
        true
    }

    /// Drop every held key (focus loss never delivers the keyups)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Snapshot for the next simulation step
    pub fn to_input(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            up: self.up,
            down: self.down,
            focus: self.shift_left || self.shift_right,
            fire: self.fire,
            special: self.special,
            pause: self.pause,
            start: self.start,
        }
    }
}
