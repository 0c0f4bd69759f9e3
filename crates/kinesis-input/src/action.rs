//! Action mapping system for input handling.

use hashbrown::HashMap;
use kinesis_core::DeviceId;
use winit::keyboard::KeyCode;

use crate::button_state::ButtonState;
use crate::device::{GamePadButton, GamePadDevice, MouseButton};
use crate::modifiers::Modifiers;
use crate::state::InputState;

/// An input that can be bound to an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// A keyboard key.
    Key(KeyCode),
    /// A keyboard key with required modifiers.
    KeyWithModifiers(KeyCode, Modifiers),
    /// A mouse button.
    Mouse(MouseButton),
    /// A button of the default gamepad.
    GamePad(GamePadButton),
}

impl InputBinding {
    /// Create a key binding with modifiers.
    #[must_use]
    pub const fn key_with_modifiers(key: KeyCode, modifiers: Modifiers) -> Self {
        Self::KeyWithModifiers(key, modifiers)
    }

    fn is_held(self, state: &InputState, pad: Option<&dyn GamePadDevice>) -> bool {
        match self {
            Self::Key(key) => state.is_key_down(key),
            Self::KeyWithModifiers(key, modifiers) => {
                state.is_key_down(key) && state.modifiers().contains(modifiers)
            }
            Self::Mouse(button) => state.is_mouse_button_down(button),
            Self::GamePad(button) => pad.is_some_and(|p| p.is_button_down(button)),
        }
    }

    fn went_down(self, state: &InputState, pad_id: Option<DeviceId>) -> bool {
        match self {
            Self::Key(key) => state.is_key_pressed(key),
            Self::KeyWithModifiers(key, modifiers) => {
                state.is_key_pressed(key) && state.modifiers().contains(modifiers)
            }
            Self::Mouse(button) => state.is_mouse_button_pressed(button),
            Self::GamePad(button) => state
                .pad_pressed()
                .iter()
                .any(|&(device, b)| Some(device) == pad_id && b == button),
        }
    }
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<MouseButton> for InputBinding {
    fn from(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

impl From<GamePadButton> for InputBinding {
    fn from(button: GamePadButton) -> Self {
        Self::GamePad(button)
    }
}

/// An action that can be triggered by input bindings.
#[derive(Debug)]
struct Action {
    bindings: Vec<InputBinding>,
    state: ButtonState,
}

impl Action {
    const fn new() -> Self {
        Self {
            bindings: Vec::new(),
            state: ButtonState::Released,
        }
    }

    fn add_binding(&mut self, binding: InputBinding) {
        if !self.bindings.contains(&binding) {
            self.bindings.push(binding);
        }
    }
}

/// Action mapping system.
///
/// Maps named actions to input bindings, allowing multiple inputs per action.
/// States are resolved once per frame from the [`InputState`] and the default
/// gamepad.
#[derive(Debug, Default)]
pub struct ActionMap {
    actions: HashMap<String, Action>,
}

impl ActionMap {
    /// Create a new action map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new action map with a builder pattern.
    #[must_use]
    pub fn builder() -> ActionMapBuilder {
        ActionMapBuilder::default()
    }

    /// Add a binding to an action, creating the action if it doesn't exist.
    pub fn bind(&mut self, action: impl Into<String>, binding: impl Into<InputBinding>) {
        self.actions
            .entry(action.into())
            .or_insert_with(Action::new)
            .add_binding(binding.into());
    }

    /// Remove a binding from an action.
    pub fn unbind(&mut self, action: &str, binding: InputBinding) {
        if let Some(action) = self.actions.get_mut(action) {
            action.bindings.retain(|b| *b != binding);
        }
    }

    /// Get the bindings for an action.
    #[must_use]
    pub fn get_bindings(&self, action: &str) -> Option<&[InputBinding]> {
        self.actions.get(action).map(|a| a.bindings.as_slice())
    }

    /// Resolve every action for this frame.
    ///
    /// A binding pressed and released within one frame still yields a
    /// `JustPressed` frame followed by a `JustReleased` one.
    pub fn update(&mut self, state: &InputState, pad: Option<(DeviceId, &dyn GamePadDevice)>) {
        let pad_id = pad.map(|(id, _)| id);
        let pad = pad.map(|(_, p)| p);
        for action in self.actions.values_mut() {
            let active = action
                .bindings
                .iter()
                .any(|b| b.is_held(state, pad) || b.went_down(state, pad_id));
            action.state.update_level(active);
        }
    }

    /// State of an action. Unknown actions are released.
    #[must_use]
    pub fn state(&self, action: &str) -> ButtonState {
        self.actions.get(action).map_or(ButtonState::Released, |a| a.state)
    }

    /// Returns `true` if the action is currently pressed.
    #[must_use]
    pub fn is_pressed(&self, action: &str) -> bool {
        self.state(action).is_pressed()
    }

    /// Returns `true` if the action was just pressed this frame.
    #[must_use]
    pub fn is_just_pressed(&self, action: &str) -> bool {
        self.state(action).is_just_pressed()
    }

    /// Returns `true` if the action was just released this frame.
    #[must_use]
    pub fn is_just_released(&self, action: &str) -> bool {
        self.state(action).is_just_released()
    }
}

/// Builder for creating an action map with a fluent API.
#[derive(Debug, Default)]
pub struct ActionMapBuilder {
    actions: ActionMap,
}

impl ActionMapBuilder {
    /// Add a binding to an action.
    #[must_use]
    pub fn bind(mut self, action: impl Into<String>, binding: impl Into<InputBinding>) -> Self {
        self.actions.bind(action, binding);
        self
    }

    /// Build the action map.
    #[must_use]
    pub fn build(self) -> ActionMap {
        self.actions
    }
}
