//! Gamepads with a fixed button and axis layout.

use bitflags::bitflags;
use glam::Vec2;
use kinesis_core::constants::EPSILON;
use serde::{Deserialize, Serialize};

use crate::button_state::ButtonTransition;
use crate::device::{DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice};
use crate::event::{GamePadAxisEvent, GamePadButtonEvent};
use crate::pool::EventSink;

bitflags! {
    /// Gamepad buttons. A state holds several, an event exactly one.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GamePadButton: u16 {
        const PAD_UP         = 1 << 0;
        const PAD_DOWN       = 1 << 1;
        const PAD_LEFT       = 1 << 2;
        const PAD_RIGHT      = 1 << 3;
        const START          = 1 << 4;
        const BACK           = 1 << 5;
        const LEFT_THUMB     = 1 << 6;
        const RIGHT_THUMB    = 1 << 7;
        const LEFT_SHOULDER  = 1 << 8;
        const RIGHT_SHOULDER = 1 << 9;
        const A              = 1 << 12;
        const B              = 1 << 13;
        const X              = 1 << 14;
        const Y              = 1 << 15;
    }
}

/// Analog gamepad axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePadAxis {
    LeftThumbX,
    LeftThumbY,
    RightThumbX,
    RightThumbY,
    LeftTrigger,
    RightTrigger,
}

impl GamePadAxis {
    pub const ALL: [Self; 6] = [
        Self::LeftThumbX,
        Self::LeftThumbY,
        Self::RightThumbX,
        Self::RightThumbY,
        Self::LeftTrigger,
        Self::RightTrigger,
    ];
}

/// Snapshot of a gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamePadState {
    pub buttons: GamePadButton,
    /// Thumbsticks in `[-1, 1]`.
    pub left_thumb: Vec2,
    pub right_thumb: Vec2,
    /// Triggers in `[0, 1]`.
    pub left_trigger: f32,
    pub right_trigger: f32,
}

impl GamePadState {
    /// Current value of one axis.
    #[must_use]
    pub const fn axis(&self, axis: GamePadAxis) -> f32 {
        match axis {
            GamePadAxis::LeftThumbX => self.left_thumb.x,
            GamePadAxis::LeftThumbY => self.left_thumb.y,
            GamePadAxis::RightThumbX => self.right_thumb.x,
            GamePadAxis::RightThumbY => self.right_thumb.y,
            GamePadAxis::LeftTrigger => self.left_trigger,
            GamePadAxis::RightTrigger => self.right_trigger,
        }
    }

    /// Emit one event per button edge and per moved axis since `previous`.
    pub fn emit_changes(&self, previous: &Self, device: &DeviceInfo, events: &mut EventSink<'_>) {
        let changed = self.buttons ^ previous.buttons;
        for button in changed.iter() {
            let down = self.buttons.contains(button);
            events.emit::<GamePadButtonEvent>(device.id, |e| {
                e.button = button;
                e.state = ButtonTransition::from_pressed(down);
            });
        }
        for axis in GamePadAxis::ALL {
            let value = self.axis(axis);
            if (value - previous.axis(axis)).abs() > EPSILON {
                events.emit::<GamePadAxisEvent>(device.id, |e| {
                    e.axis = axis;
                    e.value = value;
                });
            }
        }
    }
}

/// How a gamepad obtains its slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePadIndexPolicy {
    /// The hardware dictates the slot (e.g. a numbered controller port).
    Fixed(usize),
    /// The manager picks the slot.
    #[default]
    Assignable,
}

/// A gamepad device.
pub trait GamePadDevice {
    /// Latest polled state.
    fn state(&self) -> &GamePadState;

    fn index_policy(&self) -> GamePadIndexPolicy;

    fn is_button_down(&self, button: GamePadButton) -> bool {
        self.state().buttons.contains(button)
    }
}

/// Platform binding that reads a gamepad's current state.
pub trait GamePadBackend: Send {
    /// Read the current state. An error means the pad is gone.
    fn poll(&mut self) -> kinesis_core::Result<GamePadState>;
}

/// Gamepad polled once per frame through a [`GamePadBackend`].
#[derive(Debug)]
pub struct GamePad<B> {
    info: DeviceInfo,
    policy: GamePadIndexPolicy,
    backend: B,
    state: GamePadState,
}

impl<B: GamePadBackend> GamePad<B> {
    /// Wrap a backend.
    #[must_use]
    pub fn new(info: DeviceInfo, policy: GamePadIndexPolicy, backend: B) -> Self {
        Self {
            info,
            policy,
            backend,
            state: GamePadState::default(),
        }
    }
}

impl<B: GamePadBackend> InputDevice for GamePad<B> {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::GAMEPAD
    }

    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus {
        match self.backend.poll() {
            Ok(state) => {
                state.emit_changes(&self.state, &self.info, events);
                self.state = state;
                DeviceStatus::Connected
            }
            Err(err) => {
                tracing::warn!(device = %self.info.name, "Gamepad poll failed: {err}");
                DeviceStatus::Disconnected {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn as_gamepad(&self) -> Option<&dyn GamePadDevice> {
        Some(self)
    }
}

impl<B: GamePadBackend> GamePadDevice for GamePad<B> {
    fn state(&self) -> &GamePadState {
        &self.state
    }

    fn index_policy(&self) -> GamePadIndexPolicy {
        self.policy
    }
}
