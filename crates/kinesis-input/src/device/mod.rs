//! Input devices and their capability traits.
//!
//! Every device implements [`InputDevice`]. Capabilities are expressed as
//! separate traits ([`KeyboardDevice`], [`PointerDevice`], ...) reachable
//! through the `as_*` accessors, so the registry can classify a device without
//! knowing its concrete type.

pub mod controller;
pub mod gamepad;
pub mod keyboard;
pub mod mouse;
pub mod pointer;
pub mod sensor;

use bitflags::bitflags;
use glam::Vec2;
use kinesis_core::DeviceId;
use winit::keyboard::KeyCode;

use crate::pool::EventSink;

pub use controller::{GameControllerDevice, GameControllerState, Pov};
pub use gamepad::{
    GamePadAxis, GamePadBackend, GamePadButton, GamePadDevice, GamePadIndexPolicy, GamePadState,
};
pub use mouse::MouseButton;
pub use pointer::{PointerPoint, PointerSample, PointerState};
pub use sensor::{SensorDevice, SensorKind, SensorValue};

bitflags! {
    /// What a device can do. A device may combine several capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeviceCapabilities: u8 {
        const KEYBOARD        = 0b0000_0001;
        const POINTER         = 0b0000_0010;
        const MOUSE           = 0b0000_0100;
        const GAME_CONTROLLER = 0b0000_1000;
        const GAMEPAD         = 0b0001_0000;
        const SENSOR          = 0b0010_0000;
        const TEXT_INPUT      = 0b0100_0000;
    }
}

/// Outcome of a device update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    /// The device is healthy.
    Connected,
    /// The device faulted or went away; the registry unregisters it.
    Disconnected {
        /// Human readable reason, for logs.
        reason: String,
    },
}

/// Identity of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: DeviceId,
    pub name: String,
    /// Higher priority devices are preferred as "first of their kind".
    pub priority: i32,
}

impl DeviceInfo {
    /// Create device info with the default priority.
    #[must_use]
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            priority: kinesis_core::constants::DEFAULT_DEVICE_PRIORITY,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// A source of input samples known to the registry.
pub trait InputDevice: Send {
    /// Identity of the device.
    fn info(&self) -> &DeviceInfo;

    /// Capability tags used to classify the device.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Turn the raw samples received since the last frame into events.
    ///
    /// Faults must be caught here and reported as
    /// [`DeviceStatus::Disconnected`]; they never propagate further.
    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus;

    /// Unique id.
    fn id(&self) -> DeviceId {
        self.info().id
    }

    /// Display name.
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Priority among devices of the same kind.
    fn priority(&self) -> i32 {
        self.info().priority
    }

    fn as_keyboard(&self) -> Option<&dyn KeyboardDevice> {
        None
    }

    fn as_pointer(&self) -> Option<&dyn PointerDevice> {
        None
    }

    fn as_mouse(&self) -> Option<&dyn MouseDevice> {
        None
    }

    fn as_game_controller(&self) -> Option<&dyn GameControllerDevice> {
        None
    }

    fn as_gamepad(&self) -> Option<&dyn GamePadDevice> {
        None
    }

    fn as_sensor(&self) -> Option<&dyn SensorDevice> {
        None
    }

    fn as_sensor_mut(&mut self) -> Option<&mut dyn SensorDevice> {
        None
    }
}

/// A device with keys.
pub trait KeyboardDevice {
    /// Keys currently held, in press order.
    fn down_keys(&self) -> &[KeyCode];

    /// Returns `true` if `key` is held.
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.down_keys().contains(&key)
    }
}

/// A device reporting positions on a 2D surface (touch screen, mouse, pen).
pub trait PointerDevice {
    /// Surface size in device units.
    fn surface_size(&self) -> Vec2;

    /// Tracked pointers, including idle ones released this frame.
    fn pointers(&self) -> &[PointerPoint];

    /// Height divided by width of the surface.
    fn surface_aspect_ratio(&self) -> f32 {
        let size = self.surface_size();
        kinesis_core::math::ratio_or_zero(size.y, size.x)
    }
}

/// A pointer device with buttons and a wheel.
pub trait MouseDevice: PointerDevice {
    /// Normalized cursor position.
    fn position(&self) -> Vec2;

    /// Returns `true` if `button` is held.
    fn is_button_down(&self, button: MouseButton) -> bool;
}
