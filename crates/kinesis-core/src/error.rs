//! Error types for the input pipeline.

use thiserror::Error;

use crate::types::DeviceId;

/// Pipeline-wide error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A device with the same id is already registered
    #[error("Device {0} is already registered")]
    DuplicateDevice(DeviceId),

    /// The device is not registered
    #[error("Device {0} is not registered")]
    DeviceNotRegistered(DeviceId),

    /// The device exists but does not have the requested capability
    #[error("Device {id} is not a {expected}")]
    WrongDeviceKind {
        /// Offending device
        id: DeviceId,
        /// Capability that was expected
        expected: &'static str,
    },

    /// A gamepad with a hardware-reported slot was asked to move
    #[error("Gamepad {0} has a fixed index and cannot be reassigned")]
    FixedGamePadIndex(DeviceId),

    /// The physical device stopped responding
    #[error("Device unreachable: {0}")]
    DeviceUnreachable(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
