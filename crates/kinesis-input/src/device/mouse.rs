//! Mouse buttons and the queue-fed mouse device.

use std::time::Duration;

use glam::Vec2;
use winit::event::MouseButton as WinitMouseButton;

use crate::button_state::ButtonTransition;
use crate::device::pointer::{PointerPoint, PointerSample, PointerState};
use crate::device::{
    DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice, MouseDevice, PointerDevice,
};
use crate::event::{MouseButtonEvent, MouseWheelEvent, PointerEvent, PointerEventType};
use crate::pool::EventSink;
use crate::queue::RawQueue;

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
}

impl MouseButton {
    /// Number of tracked buttons.
    pub const COUNT: usize = 5;
}

impl TryFrom<WinitMouseButton> for MouseButton {
    type Error = ();

    fn try_from(button: WinitMouseButton) -> Result<Self, Self::Error> {
        match button {
            WinitMouseButton::Left => Ok(Self::Left),
            WinitMouseButton::Right => Ok(Self::Right),
            WinitMouseButton::Middle => Ok(Self::Middle),
            WinitMouseButton::Back => Ok(Self::Back),
            WinitMouseButton::Forward => Ok(Self::Forward),
            WinitMouseButton::Other(_) => Err(()),
        }
    }
}

/// Raw input accepted by a [`Mouse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MouseInput {
    /// Cursor moved to a normalized position.
    Moved { position: Vec2, timestamp: Duration },
    Button {
        button: MouseButton,
        pressed: bool,
        timestamp: Duration,
    },
    /// Wheel turned by some notches.
    Wheel { delta: f32 },
    SurfaceResized(Vec2),
}

/// Pointer id used for the mouse cursor.
pub const MOUSE_POINTER_ID: u32 = 0;

/// Mouse fed by a raw sample queue.
///
/// The cursor is exposed as pointer [`MOUSE_POINTER_ID`]: it is "down" while
/// any button is held, so gestures work with a mouse as with one finger.
#[derive(Debug)]
pub struct Mouse {
    info: DeviceInfo,
    state: PointerState,
    position: Vec2,
    buttons: [bool; MouseButton::COUNT],
    queue: RawQueue<MouseInput>,
    scratch: Vec<MouseInput>,
}

impl Mouse {
    /// Create a mouse reading from `queue`.
    #[must_use]
    pub fn new(info: DeviceInfo, surface_size: Vec2, queue: RawQueue<MouseInput>) -> Self {
        let mut state = PointerState::new(info.id, surface_size);
        state.retain_pointer(MOUSE_POINTER_ID, Vec2::ZERO);
        Self {
            state,
            info,
            position: Vec2::ZERO,
            buttons: [false; MouseButton::COUNT],
            queue,
            scratch: Vec::new(),
        }
    }

    fn any_button_down(&self) -> bool {
        self.buttons.iter().any(|&down| down)
    }

    fn emit_pointer(
        &mut self,
        events: &mut EventSink<'_>,
        event_type: PointerEventType,
        timestamp: Duration,
    ) {
        let sample = PointerSample {
            id: MOUSE_POINTER_ID,
            position: self.position,
            event_type,
            timestamp,
        };
        let state = &mut self.state;
        events.emit::<PointerEvent>(self.info.id, |e| state.apply(&sample, e));
    }

    fn apply(&mut self, input: MouseInput, events: &mut EventSink<'_>) {
        match input {
            MouseInput::Moved {
                position,
                timestamp,
            } => {
                self.position = position;
                self.emit_pointer(events, PointerEventType::Moved, timestamp);
            }
            MouseInput::Button {
                button,
                pressed,
                timestamp,
            } => {
                let slot = button as usize;
                if self.buttons[slot] == pressed {
                    return;
                }
                let was_any_down = self.any_button_down();
                self.buttons[slot] = pressed;
                events.emit::<MouseButtonEvent>(self.info.id, |e| {
                    e.button = button;
                    e.state = ButtonTransition::from_pressed(pressed);
                });

                if pressed && !was_any_down {
                    self.emit_pointer(events, PointerEventType::Pressed, timestamp);
                } else if !pressed && !self.any_button_down() {
                    self.emit_pointer(events, PointerEventType::Released, timestamp);
                }
            }
            MouseInput::Wheel { delta } => {
                events.emit::<MouseWheelEvent>(self.info.id, |e| e.wheel_delta = delta);
            }
            MouseInput::SurfaceResized(size) => self.state.set_surface_size(size),
        }
    }
}

impl InputDevice for Mouse {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::POINTER | DeviceCapabilities::MOUSE
    }

    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus {
        self.state.begin_frame();
        let mut inputs = std::mem::take(&mut self.scratch);
        self.queue.drain_into(&mut inputs);
        for input in inputs.drain(..) {
            self.apply(input, events);
        }
        self.scratch = inputs;
        DeviceStatus::Connected
    }

    fn as_pointer(&self) -> Option<&dyn PointerDevice> {
        Some(self)
    }

    fn as_mouse(&self) -> Option<&dyn MouseDevice> {
        Some(self)
    }
}

impl PointerDevice for Mouse {
    fn surface_size(&self) -> Vec2 {
        self.state.surface_size()
    }

    fn pointers(&self) -> &[PointerPoint] {
        self.state.points()
    }
}

impl MouseDevice for Mouse {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons[button as usize]
    }
}
