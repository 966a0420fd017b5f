//! Input event types for pointer and keyboard state.

use serde::{Deserialize, Serialize};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Ctrl held.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Only Alt held.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
}

/// A button press inside the viewport, in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerDown {
    pub button: MouseButton,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerDown {
    /// Left click at the given position with the given modifiers.
    pub fn left(x: f32, y: f32, modifiers: Modifiers) -> Self {
        Self {
            button: MouseButton::Left,
            x,
            y,
            modifiers,
        }
    }

    /// Pointer position as an array.
    pub fn position(&self) -> [f32; 2] {
        [self.x, self.y]
    }
}
