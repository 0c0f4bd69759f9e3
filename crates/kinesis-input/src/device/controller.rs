//! Generic game controllers with indexed buttons, axes and POV hats.

use kinesis_core::constants::EPSILON;

use crate::button_state::ButtonTransition;
use crate::device::{DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice};
use crate::event::{GameControllerAxisEvent, GameControllerButtonEvent, PovControllerEvent};
use crate::pool::EventSink;
use crate::queue::RawQueue;

/// Direction of a point-of-view hat.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pov {
    /// Direction in turns, `0.0` is up.
    pub value: f32,
    /// `false` while centered.
    pub enabled: bool,
}

/// Snapshot of a generic controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameControllerState {
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
    pub povs: Vec<Pov>,
}

impl GameControllerState {
    /// All-released state with the given layout.
    #[must_use]
    pub fn with_layout(buttons: usize, axes: usize, povs: usize) -> Self {
        Self {
            buttons: vec![false; buttons],
            axes: vec![0.0; axes],
            povs: vec![Pov::default(); povs],
        }
    }

    /// Emit an event for every element that differs from `previous`.
    ///
    /// Elements missing from either snapshot count as released, zero or
    /// centered, so a layout that shrinks releases what it dropped.
    pub fn emit_changes(&self, previous: &Self, device: &DeviceInfo, events: &mut EventSink<'_>) {
        for index in 0..self.buttons.len().max(previous.buttons.len()) {
            let down = self.buttons.get(index).copied().unwrap_or(false);
            if previous.buttons.get(index).copied().unwrap_or(false) != down {
                events.emit::<GameControllerButtonEvent>(device.id, |e| {
                    e.index = index;
                    e.state = ButtonTransition::from_pressed(down);
                });
            }
        }
        for index in 0..self.axes.len().max(previous.axes.len()) {
            let value = self.axes.get(index).copied().unwrap_or(0.0);
            let before = previous.axes.get(index).copied().unwrap_or(0.0);
            if (before - value).abs() > EPSILON {
                events.emit::<GameControllerAxisEvent>(device.id, |e| {
                    e.index = index;
                    e.value = value;
                });
            }
        }
        for index in 0..self.povs.len().max(previous.povs.len()) {
            let pov = self.povs.get(index).copied().unwrap_or_default();
            let before = previous.povs.get(index).copied().unwrap_or_default();
            if before.enabled != pov.enabled || (before.value - pov.value).abs() > EPSILON {
                events.emit::<PovControllerEvent>(device.id, |e| {
                    e.index = index;
                    e.value = pov.value;
                    e.enabled = pov.enabled;
                });
            }
        }
    }
}

/// A controller exposing indexed elements.
///
/// Reads outside the layout return a released, zero or centered value.
pub trait GameControllerDevice {
    fn state(&self) -> &GameControllerState;

    fn button_count(&self) -> usize {
        self.state().buttons.len()
    }

    fn axis_count(&self) -> usize {
        self.state().axes.len()
    }

    fn pov_count(&self) -> usize {
        self.state().povs.len()
    }

    fn is_button_down(&self, index: usize) -> bool {
        self.state().buttons.get(index).copied().unwrap_or(false)
    }

    fn axis(&self, index: usize) -> f32 {
        self.state().axes.get(index).copied().unwrap_or(0.0)
    }

    fn pov(&self, index: usize) -> Pov {
        self.state().povs.get(index).copied().unwrap_or_default()
    }
}

/// Controller fed by a queue of state snapshots.
///
/// Every snapshot is diffed against the one before it, so a press and release
/// landing in the same frame still produce both events.
#[derive(Debug)]
pub struct GameController {
    info: DeviceInfo,
    state: GameControllerState,
    queue: RawQueue<GameControllerState>,
    scratch: Vec<GameControllerState>,
}

impl GameController {
    /// Create a controller reading from `queue`.
    #[must_use]
    pub fn new(info: DeviceInfo, queue: RawQueue<GameControllerState>) -> Self {
        Self {
            info,
            state: GameControllerState::default(),
            queue,
            scratch: Vec::new(),
        }
    }
}

impl InputDevice for GameController {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::GAME_CONTROLLER
    }

    fn update(&mut self, events: &mut EventSink<'_>) -> DeviceStatus {
        self.queue.drain_into(&mut self.scratch);
        for snapshot in self.scratch.drain(..) {
            snapshot.emit_changes(&self.state, &self.info, events);
            self.state = snapshot;
        }
        DeviceStatus::Connected
    }

    fn as_game_controller(&self) -> Option<&dyn GameControllerDevice> {
        Some(self)
    }
}

impl GameControllerDevice for GameController {
    fn state(&self) -> &GameControllerState {
        &self.state
    }
}
