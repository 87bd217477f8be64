//! Pointer and keyboard events as seen by the drag controller.

use crate::snap::SnapModifiers;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other,
}

impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            _ => MouseButton::Other,
        }
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }

    pub fn alt() -> Self {
        Self { alt: true, ..Self::NONE }
    }
}

impl From<winit::keyboard::ModifiersState> for Modifiers {
    fn from(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            meta: state.super_key(),
        }
    }
}

/// A single modifier key, used to bind snapping behaviours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
    Meta,
}

impl ModifierKey {
    /// Check if this key is down in `modifiers`.
    pub fn is_held(self, modifiers: &Modifiers) -> bool {
        match self {
            ModifierKey::Shift => modifiers.shift,
            ModifierKey::Ctrl => modifiers.ctrl,
            ModifierKey::Alt => modifiers.alt,
            ModifierKey::Meta => modifiers.meta,
        }
    }
}

/// Which modifier triggers which snapping behaviour during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierBindings {
    /// Constrain the drag to its dominant axis.
    pub axis_lock: ModifierKey,
    /// Snap to the grid instead of guides.
    pub grid: ModifierKey,
}

impl Default for ModifierBindings {
    fn default() -> Self {
        Self {
            axis_lock: ModifierKey::Shift,
            grid: ModifierKey::Alt,
        }
    }
}

impl ModifierBindings {
    /// Translate held keys into snapping flags.
    pub fn resolve(&self, modifiers: &Modifiers) -> SnapModifiers {
        SnapModifiers {
            axis_lock: self.axis_lock.is_held(modifiers),
            grid: self.grid.is_held(modifiers),
        }
    }
}

/// Identifier of a pointer (mouse, pen or touch contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The mouse, for hosts with a single pointer.
    pub const MOUSE: Self = Self(0);
}

/// A pointer event in canvas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub id: PointerId,
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Left-button mouse event with no modifiers held.
    pub fn new(position: Point) -> Self {
        Self {
            id: PointerId::MOUSE,
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_id(mut self, id: PointerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keys the drag controller reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Escape,
    Other(String),
}

impl From<&winit::keyboard::Key> for Key {
    fn from(key: &winit::keyboard::Key) -> Self {
        use winit::keyboard::{Key as WinitKey, NamedKey};
        match key {
            WinitKey::Named(NamedKey::Escape) => Key::Escape,
            WinitKey::Character(text) => Key::Other(text.to_string()),
            other => Key::Other(format!("{other:?}")),
        }
    }
}

/// Pointer capture could not be acquired.
#[derive(Debug, Error)]
#[error("pointer capture unavailable for pointer {pointer:?}: {reason}")]
pub struct CaptureError {
    pub pointer: PointerId,
    pub reason: String,
}

impl CaptureError {
    pub fn new(pointer: PointerId, reason: impl Into<String>) -> Self {
        Self {
            pointer,
            reason: reason.into(),
        }
    }
}
