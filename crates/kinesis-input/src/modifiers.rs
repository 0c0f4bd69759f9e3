//! Modifier key flags.

use bitflags::bitflags;
use winit::keyboard::KeyCode;

bitflags! {
    /// Modifier keys held on the keyboards, merged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const CTRL  = 0b0000_0010;
        const ALT   = 0b0000_0100;
        /// Windows or Command key.
        const SUPER = 0b0000_1000;
    }
}

impl Modifiers {
    /// Flag contributed by one key, empty for non-modifier keys.
    #[must_use]
    pub const fn of_key(key: KeyCode) -> Self {
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Self::SHIFT,
            KeyCode::ControlLeft | KeyCode::ControlRight => Self::CTRL,
            KeyCode::AltLeft | KeyCode::AltRight => Self::ALT,
            KeyCode::SuperLeft | KeyCode::SuperRight | KeyCode::Meta => Self::SUPER,
            _ => Self::empty(),
        }
    }

    /// Derive modifier flags from the keys currently held.
    #[must_use]
    pub fn from_down_keys(keys: &[KeyCode]) -> Self {
        keys.iter().fold(Self::empty(), |mods, &key| mods | Self::of_key(key))
    }
}
