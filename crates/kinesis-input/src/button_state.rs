//! Button edges and per-frame button state tracking.

/// Edge carried by a button event: the button went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonTransition {
    /// The button was pressed.
    Down,
    /// The button was released.
    Up,
}

impl ButtonTransition {
    /// Build a transition from a pressed flag.
    #[inline]
    #[must_use]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Self::Down
        } else {
            Self::Up
        }
    }

    /// Returns `true` for [`ButtonTransition::Down`].
    #[inline]
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self, Self::Down)
    }
}

/// Frame-relative state of a logical button (an action, a key, a pad button).
///
/// ```text
/// Released ─Down─> JustPressed ─advance()─> Pressed
///     ^                                        │
///     │                                        Up
///     │                                        v
///     └─────────advance()──────────── JustReleased
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    /// Went down this frame.
    JustPressed,
    /// Held down.
    Pressed,
    /// Came up this frame.
    JustReleased,
    /// Not held.
    #[default]
    Released,
}

impl ButtonState {
    /// Returns `true` if the button is held (including this frame's press).
    #[inline]
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::JustPressed | Self::Pressed)
    }

    /// Returns `true` if the button went down this frame.
    #[inline]
    #[must_use]
    pub const fn is_just_pressed(self) -> bool {
        matches!(self, Self::JustPressed)
    }

    /// Returns `true` if the button came up this frame.
    #[inline]
    #[must_use]
    pub const fn is_just_released(self) -> bool {
        matches!(self, Self::JustReleased)
    }

    /// Returns `true` if the button is not held.
    #[inline]
    #[must_use]
    pub const fn is_released(self) -> bool {
        matches!(self, Self::JustReleased | Self::Released)
    }

    /// Apply an edge. Repeated edges in the same direction are ignored.
    #[inline]
    pub fn apply(&mut self, transition: ButtonTransition) {
        match transition {
            ButtonTransition::Down if !self.is_pressed() => *self = Self::JustPressed,
            ButtonTransition::Up if self.is_pressed() => *self = Self::JustReleased,
            _ => {}
        }
    }

    /// Resolve the state for a frame from a level signal (held or not).
    ///
    /// Used by consumers that only see whether a button is held this frame,
    /// such as action bindings polled against resolved device state.
    #[inline]
    pub fn update_level(&mut self, held: bool) {
        self.advance();
        self.apply(ButtonTransition::from_pressed(held));
    }

    /// Drop the "just" part of the state at a frame boundary.
    #[inline]
    pub fn advance(&mut self) {
        match *self {
            Self::JustPressed => *self = Self::Pressed,
            Self::JustReleased => *self = Self::Released,
            _ => {}
        }
    }
}
