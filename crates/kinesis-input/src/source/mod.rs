//! Input sources: producers of devices.
//!
//! A source owns the link to some platform layer. Once per frame the manager
//! asks each source for the devices that appeared or went away since the last
//! frame and applies those changes to the registry.

pub mod queue_source;
pub mod window;

use kinesis_core::DeviceId;

use crate::device::InputDevice;

pub use queue_source::{
    ControllerFeed, GamePadFeed, KeyboardFeed, MouseFeed, QueueSource, SensorFeed, SourceHandle,
    TouchFeed,
};
pub use window::WinitInput;

/// Hot-plug changes collected from sources during one frame.
#[derive(Default)]
pub struct DeviceChanges {
    pub added: Vec<Box<dyn InputDevice>>,
    pub removed: Vec<DeviceId>,
}

impl DeviceChanges {
    /// Returns `true` if no device was added or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl std::fmt::Debug for DeviceChanges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let added: Vec<_> = self.added.iter().map(|d| d.id()).collect();
        f.debug_struct("DeviceChanges")
            .field("added", &added)
            .field("removed", &self.removed)
            .finish()
    }
}

/// Something that adds and removes devices.
pub trait InputSource: Send {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Report hot-plug changes since the previous call.
    fn update(&mut self, changes: &mut DeviceChanges);
}
