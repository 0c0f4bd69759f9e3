//! Resolved per-frame input state.

use glam::Vec2;
use kinesis_core::DeviceId;
use winit::keyboard::KeyCode;

use crate::button_state::ButtonTransition;
use crate::device::{GamePadButton, MouseButton};
use crate::event::{EventKind, InputEvent, TextInputEventType};
use crate::modifiers::Modifiers;
use crate::router::InputEventListener;

/// Held values merged across devices, with this frame's edges.
///
/// A value is down while any device holds it. It is pressed when the first
/// device takes it and released when the last one lets go.
#[derive(Debug)]
struct Held<T> {
    holders: Vec<(DeviceId, T)>,
    down: Vec<T>,
    pressed: Vec<T>,
    released: Vec<T>,
}

impl<T> Default for Held<T> {
    fn default() -> Self {
        Self {
            holders: Vec::new(),
            down: Vec::new(),
            pressed: Vec::new(),
            released: Vec::new(),
        }
    }
}

impl<T: PartialEq + Copy> Held<T> {
    fn clear_edges(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    fn apply(&mut self, device: DeviceId, value: T, transition: ButtonTransition) {
        match transition {
            ButtonTransition::Down => {
                if self.holders.contains(&(device, value)) {
                    return;
                }
                self.holders.push((device, value));
                if !self.down.contains(&value) {
                    self.down.push(value);
                    self.pressed.push(value);
                }
            }
            ButtonTransition::Up => {
                if let Some(i) = self.holders.iter().position(|h| *h == (device, value)) {
                    self.holders.remove(i);
                    self.drop_if_free(value);
                }
            }
        }
    }

    fn release_device(&mut self, device: DeviceId) -> usize {
        let mut freed = Vec::new();
        self.holders.retain(|&(holder, value)| {
            if holder == device {
                freed.push(value);
                return false;
            }
            true
        });
        for &value in &freed {
            self.drop_if_free(value);
        }
        freed.len()
    }

    fn drop_if_free(&mut self, value: T) {
        if self.holders.iter().any(|&(_, v)| v == value) {
            return;
        }
        if let Some(i) = self.down.iter().position(|v| *v == value) {
            self.down.remove(i);
            self.released.push(value);
        }
    }
}

/// Keyboard, mouse and gamepad state resolved from the frame's events.
///
/// Registered with the router like any other listener. Transient lists
/// (pressed, released, deltas) are cleared at the start of every frame.
#[derive(Debug, Default)]
pub struct InputState {
    keys: Held<KeyCode>,
    buttons: Held<MouseButton>,
    mouse_delta: Vec2,
    absolute_mouse_delta: Vec2,
    wheel_delta: f32,
    last_pointer_device: Option<DeviceId>,
    pad_down: Vec<(DeviceId, GamePadButton)>,
    pad_pressed: Vec<(DeviceId, GamePadButton)>,
    pad_released: Vec<(DeviceId, GamePadButton)>,
    text: String,
    mice: Vec<DeviceId>,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything that only lives for one frame.
    pub fn begin_frame(&mut self) {
        self.keys.clear_edges();
        self.buttons.clear_edges();
        self.mouse_delta = Vec2::ZERO;
        self.absolute_mouse_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
        self.pad_pressed.clear();
        self.pad_released.clear();
        self.text.clear();
    }

    /// Let go of everything `device` still holds, recording release edges
    /// for this frame. Returns the number of keys and buttons released.
    pub fn release_device(&mut self, device: DeviceId) -> usize {
        let mut released = self.keys.release_device(device) + self.buttons.release_device(device);
        let pad_released = &mut self.pad_released;
        self.pad_down.retain(|&(holder, button)| {
            if holder == device {
                pad_released.push((holder, button));
                released += 1;
                return false;
            }
            true
        });
        if self.last_pointer_device == Some(device) {
            self.last_pointer_device = None;
        }
        self.mice.retain(|&mouse| mouse != device);
        released
    }

    /// Devices whose pointer movement counts as mouse movement.
    pub fn set_mouse_devices(&mut self, mice: &[DeviceId]) {
        self.mice.clear();
        self.mice.extend_from_slice(mice);
    }

    #[must_use]
    pub fn keys_down(&self) -> &[KeyCode] {
        &self.keys.down
    }

    #[must_use]
    pub fn keys_pressed(&self) -> &[KeyCode] {
        &self.keys.pressed
    }

    #[must_use]
    pub fn keys_released(&self) -> &[KeyCode] {
        &self.keys.released
    }

    #[must_use]
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.down.contains(&key)
    }

    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys.pressed.contains(&key)
    }

    #[must_use]
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys.released.contains(&key)
    }

    /// Modifier flags derived from the held keys.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_down_keys(&self.keys.down)
    }

    #[must_use]
    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.buttons.down.contains(&button)
    }

    #[must_use]
    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons.pressed.contains(&button)
    }

    #[must_use]
    pub fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        self.buttons.released.contains(&button)
    }

    /// Normalized mouse movement this frame.
    #[must_use]
    pub const fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Mouse movement this frame in pixels.
    #[must_use]
    pub const fn absolute_mouse_delta(&self) -> Vec2 {
        self.absolute_mouse_delta
    }

    /// Largest wheel movement seen this frame, in notches.
    #[must_use]
    pub const fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    /// Device that produced the most recent pointer event.
    #[must_use]
    pub const fn last_pointer_device(&self) -> Option<DeviceId> {
        self.last_pointer_device
    }

    /// Returns `true` if `button` went down on any gamepad this frame.
    #[must_use]
    pub fn is_pad_button_pressed(&self, button: GamePadButton) -> bool {
        self.pad_pressed.iter().any(|&(_, b)| b == button)
    }

    /// Returns `true` if `button` came up on any gamepad this frame.
    #[must_use]
    pub fn is_pad_button_released(&self, button: GamePadButton) -> bool {
        self.pad_released.iter().any(|&(_, b)| b == button)
    }

    /// Gamepad button presses this frame, with their device.
    #[must_use]
    pub fn pad_pressed(&self) -> &[(DeviceId, GamePadButton)] {
        &self.pad_pressed
    }

    #[must_use]
    pub fn pad_released(&self) -> &[(DeviceId, GamePadButton)] {
        &self.pad_released
    }

    /// Text committed this frame.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl InputEventListener for InputState {
    fn event_kinds(&self) -> &'static [EventKind] {
        &[
            EventKind::Key,
            EventKind::Pointer,
            EventKind::MouseButton,
            EventKind::MouseWheel,
            EventKind::GamePadButton,
            EventKind::TextInput,
        ]
    }

    fn process_event(&mut self, event: &InputEvent<'_>) {
        match *event {
            InputEvent::Key(e) => self.keys.apply(e.device, e.key, e.state),
            InputEvent::MouseButton(e) => self.buttons.apply(e.device, e.button, e.state),
            InputEvent::MouseWheel(e) => {
                if e.wheel_delta.abs() > self.wheel_delta.abs() {
                    self.wheel_delta = e.wheel_delta;
                }
            }
            InputEvent::Pointer(e) => {
                self.last_pointer_device = Some(e.device);
                if self.mice.contains(&e.device) {
                    self.mouse_delta += e.delta_position;
                    self.absolute_mouse_delta += e.absolute_delta_position();
                }
            }
            InputEvent::GamePadButton(e) => {
                let held = (e.device, e.button);
                match e.state {
                    ButtonTransition::Down => {
                        if !self.pad_down.contains(&held) {
                            self.pad_down.push(held);
                        }
                        self.pad_pressed.push(held);
                    }
                    ButtonTransition::Up => {
                        self.pad_down.retain(|&h| h != held);
                        self.pad_released.push(held);
                    }
                }
            }
            InputEvent::TextInput(e) if e.event_type == TextInputEventType::Input => {
                self.text.push_str(&e.text);
            }
            _ => {}
        }
    }
}
