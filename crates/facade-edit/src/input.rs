use facade_core::camera::Viewport;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
}

/// The single modifier the edit rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKey {
    None,
    Ctrl,
    Shift,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
    };
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
    };

    /// Ctrl wins when both are held.
    pub fn key(&self) -> ModifierKey {
        if self.ctrl {
            ModifierKey::Ctrl
        } else if self.shift {
            ModifierKey::Shift
        } else {
            ModifierKey::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    C,
    F,
    Y,
    Z,
    Escape,
    Control,
    Shift,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point2<f64>,
    pub camera: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub button: MouseButton,
}

impl PointerEvent {
    pub fn new(camera: impl Into<String>, viewport: Viewport, position: Point2<f64>) -> Self {
        Self {
            position,
            camera: camera.into(),
            viewport,
            modifiers: Modifiers::NONE,
            button: MouseButton::Left,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputEvent {
    PointerMove(PointerEvent),
    PointerPress(PointerEvent),
    PointerDrag(PointerEvent),
    PointerRelease(PointerEvent),
    Wheel {
        pointer: PointerEvent,
        delta: f64,
    },
    KeyPress {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyRelease {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

/// FIFO of host events waiting to be consumed by the tool.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Extend<InputEvent> for EventQueue {
    fn extend<T: IntoIterator<Item = InputEvent>>(&mut self, iter: T) {
        self.events.extend(iter);
    }
}
