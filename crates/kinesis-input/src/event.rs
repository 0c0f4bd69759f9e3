//! Typed input events produced by devices each frame.
//!
//! Every event kind is a plain struct stamped with the id of the device that
//! produced it. Instances live in the [`EventStore`](crate::pool::EventStore)
//! and are only reachable through handles, so a released event can never be
//! observed again.

use std::time::Duration;

use glam::Vec2;
use kinesis_core::DeviceId;
use winit::keyboard::KeyCode;

use crate::button_state::ButtonTransition;
use crate::device::gamepad::{GamePadAxis, GamePadButton};
use crate::device::mouse::MouseButton;

/// Closed set of event kinds routed by the [`EventRouter`](crate::router::EventRouter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Key,
    Pointer,
    MouseButton,
    MouseWheel,
    GameControllerButton,
    GameControllerAxis,
    PovController,
    GamePadButton,
    GamePadAxis,
    TextInput,
}

impl EventKind {
    /// Number of event kinds.
    pub const COUNT: usize = 10;

    /// Every event kind, in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Key,
        Self::Pointer,
        Self::MouseButton,
        Self::MouseWheel,
        Self::GameControllerButton,
        Self::GameControllerAxis,
        Self::PovController,
        Self::GamePadButton,
        Self::GamePadAxis,
        Self::TextInput,
    ];

    /// Dense index of this kind, in `0..COUNT`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A keyboard key changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub device: DeviceId,
    pub key: KeyCode,
    pub state: ButtonTransition,
    /// Number of auto-repeats since the key went down (0 for the initial press).
    pub repeat_count: u32,
}

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventType {
    Pressed,
    Moved,
    Released,
    Canceled,
}

impl PointerEventType {
    /// Returns `true` for the phases that end a contact.
    #[inline]
    #[must_use]
    pub const fn ends_contact(self) -> bool {
        matches!(self, Self::Released | Self::Canceled)
    }
}

/// A finger or mouse pointer pressed, moved or released.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub device: DeviceId,
    /// Pointer id, unique per device while the contact is active.
    pub pointer_id: u32,
    /// Position normalized to `[0, 1]` on both axes.
    pub position: Vec2,
    /// Movement since the previous event of this pointer, normalized.
    pub delta_position: Vec2,
    /// Time since the previous event of this pointer.
    pub delta_time: Duration,
    pub event_type: PointerEventType,
    /// Whether the pointer is in contact after this event.
    pub is_down: bool,
    /// Surface size in device units, for converting to absolute coordinates.
    pub surface_size: Vec2,
}

impl PointerEvent {
    /// Position in device units (pixels).
    #[inline]
    #[must_use]
    pub fn absolute_position(&self) -> Vec2 {
        self.position * self.surface_size
    }

    /// Movement in device units (pixels).
    #[inline]
    #[must_use]
    pub fn absolute_delta_position(&self) -> Vec2 {
        self.delta_position * self.surface_size
    }
}

/// A mouse button changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub device: DeviceId,
    pub button: MouseButton,
    pub state: ButtonTransition,
}

/// The mouse wheel turned.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseWheelEvent {
    pub device: DeviceId,
    /// Wheel movement in notches, positive away from the user.
    pub wheel_delta: f32,
}

/// A generic game controller button changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameControllerButtonEvent {
    pub device: DeviceId,
    pub index: usize,
    pub state: ButtonTransition,
}

/// A generic game controller axis moved.
#[derive(Debug, Clone, PartialEq)]
pub struct GameControllerAxisEvent {
    pub device: DeviceId,
    pub index: usize,
    pub value: f32,
}

/// A point-of-view hat changed direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PovControllerEvent {
    pub device: DeviceId,
    pub index: usize,
    /// Direction in turns, `0.0` is up and values grow clockwise.
    pub value: f32,
    /// `false` when the hat is centered.
    pub enabled: bool,
}

/// A gamepad button changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePadButtonEvent {
    pub device: DeviceId,
    pub button: GamePadButton,
    pub state: ButtonTransition,
}

/// A gamepad axis moved.
#[derive(Debug, Clone, PartialEq)]
pub struct GamePadAxisEvent {
    pub device: DeviceId,
    pub axis: GamePadAxis,
    pub value: f32,
}

/// Kind of text produced by a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextInputEventType {
    /// Committed text.
    Input,
    /// In-progress IME composition.
    Composition,
}

/// Text typed on a keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInputEvent {
    pub device: DeviceId,
    pub text: String,
    pub event_type: TextInputEventType,
    /// Cursor position inside the composition, in characters.
    pub composition_start: usize,
    /// Selected length inside the composition, in characters.
    pub composition_length: usize,
}

/// Borrowed view of a pooled event, valid until the owning frame ends.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent<'a> {
    Key(&'a KeyEvent),
    Pointer(&'a PointerEvent),
    MouseButton(&'a MouseButtonEvent),
    MouseWheel(&'a MouseWheelEvent),
    GameControllerButton(&'a GameControllerButtonEvent),
    GameControllerAxis(&'a GameControllerAxisEvent),
    PovController(&'a PovControllerEvent),
    GamePadButton(&'a GamePadButtonEvent),
    GamePadAxis(&'a GamePadAxisEvent),
    TextInput(&'a TextInputEvent),
}

impl InputEvent<'_> {
    /// Kind tag of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Key(_) => EventKind::Key,
            Self::Pointer(_) => EventKind::Pointer,
            Self::MouseButton(_) => EventKind::MouseButton,
            Self::MouseWheel(_) => EventKind::MouseWheel,
            Self::GameControllerButton(_) => EventKind::GameControllerButton,
            Self::GameControllerAxis(_) => EventKind::GameControllerAxis,
            Self::PovController(_) => EventKind::PovController,
            Self::GamePadButton(_) => EventKind::GamePadButton,
            Self::GamePadAxis(_) => EventKind::GamePadAxis,
            Self::TextInput(_) => EventKind::TextInput,
        }
    }

    /// Device that produced this event.
    #[must_use]
    pub const fn device(&self) -> DeviceId {
        match self {
            Self::Key(e) => e.device,
            Self::Pointer(e) => e.device,
            Self::MouseButton(e) => e.device,
            Self::MouseWheel(e) => e.device,
            Self::GameControllerButton(e) => e.device,
            Self::GameControllerAxis(e) => e.device,
            Self::PovController(e) => e.device,
            Self::GamePadButton(e) => e.device,
            Self::GamePadAxis(e) => e.device,
            Self::TextInput(e) => e.device,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_indices_are_dense() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn absolute_pointer_coordinates() {
        let event = PointerEvent {
            device: DeviceId::NIL,
            pointer_id: 0,
            position: Vec2::new(0.5, 0.25),
            delta_position: Vec2::new(0.1, 0.0),
            delta_time: Duration::ZERO,
            event_type: PointerEventType::Moved,
            is_down: true,
            surface_size: Vec2::new(800.0, 400.0),
        };
        assert_eq!(event.absolute_position(), Vec2::new(400.0, 100.0));
        assert_eq!(event.absolute_delta_position(), Vec2::new(80.0, 0.0));
    }
}
