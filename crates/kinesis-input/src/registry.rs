//! Live device set, classified by capability.

use std::cmp::Reverse;

use hashbrown::HashSet;
use kinesis_core::{DeviceId, Error, Result};
use tracing::{info, warn};

use crate::device::{
    DeviceCapabilities, DeviceStatus, GameControllerDevice, GamePadDevice, InputDevice,
    KeyboardDevice, MouseDevice, PointerDevice, SensorDevice,
};
use crate::gamepad_slots::{GamePadSlots, SlotChange};
use crate::pool::EventSink;

/// Topology change reported for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChange {
    Added(DeviceId),
    Removed(DeviceId),
    /// A gamepad moved to a new slot (or got its first one).
    GamePadIndexChanged {
        device: DeviceId,
        previous: Option<usize>,
        index: usize,
    },
}

/// Ids of the devices having one capability, best first.
#[derive(Debug, Default)]
struct KindList(Vec<DeviceId>);

/// Owns every registered device.
///
/// Devices of each capability are kept sorted by descending priority (ties
/// keep registration order), so the "first" device of a kind is always the
/// highest-priority one currently registered.
#[derive(Default)]
pub struct DeviceRegistry {
    devices: Vec<Box<dyn InputDevice>>,
    ids: HashSet<DeviceId>,
    keyboards: KindList,
    pointers: KindList,
    mice: KindList,
    controllers: KindList,
    gamepads: KindList,
    sensors: KindList,
    slots: GamePadSlots,
    changes: Vec<DeviceChange>,
}

impl std::fmt::Debug for DeviceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.devices.iter().map(|d| d.name()).collect();
        f.debug_struct("DeviceRegistry")
            .field("devices", &names)
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

impl DeviceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a device.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateDevice`] if a device with the same id is registered;
    /// the registry is left unchanged.
    pub fn register(&mut self, device: Box<dyn InputDevice>) -> Result<()> {
        let id = device.id();
        if !self.ids.insert(id) {
            return Err(Error::DuplicateDevice(id));
        }
        info!(
            device = %id,
            name = device.name(),
            capabilities = ?device.capabilities(),
            "Device added"
        );

        let policy = device.as_gamepad().map(|pad| pad.index_policy());
        self.devices.push(device);
        self.changes.push(DeviceChange::Added(id));
        if let Some(policy) = policy {
            let moved = self.slots.connect(id, policy);
            self.record_slot_changes(moved);
        }
        self.classify();
        Ok(())
    }

    /// Unregister a device and hand it back.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceNotRegistered`] if no device has this id.
    pub fn unregister(&mut self, id: DeviceId) -> Result<Box<dyn InputDevice>> {
        let position = self
            .devices
            .iter()
            .position(|d| d.id() == id)
            .ok_or(Error::DeviceNotRegistered(id))?;
        let device = self.devices.remove(position);
        self.ids.remove(&id);
        info!(device = %id, name = device.name(), "Device removed");

        self.changes.push(DeviceChange::Removed(id));
        if device.as_gamepad().is_some() {
            let moved = self.slots.disconnect(id);
            self.record_slot_changes(moved);
        }
        self.classify();
        Ok(device)
    }

    /// Move an assignable gamepad to another slot.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceNotRegistered`], [`Error::WrongDeviceKind`] for
    /// non-gamepads and [`Error::FixedGamePadIndex`] for fixed-index pads.
    pub fn request_gamepad_index(&mut self, id: DeviceId, index: usize) -> Result<()> {
        let device = self.device(id).ok_or(Error::DeviceNotRegistered(id))?;
        if device.as_gamepad().is_none() {
            return Err(Error::WrongDeviceKind {
                id,
                expected: "gamepad",
            });
        }
        let moved = self.slots.request_index(id, index)?;
        self.record_slot_changes(moved);
        Ok(())
    }

    /// Update every device, emitting its events into `events`.
    ///
    /// Devices reporting [`DeviceStatus::Disconnected`] are unregistered
    /// after the pass and returned.
    pub fn update_devices(&mut self, events: &mut EventSink<'_>) -> Vec<Box<dyn InputDevice>> {
        let mut faulted = Vec::new();
        for device in &mut self.devices {
            if let DeviceStatus::Disconnected { reason } = device.update(events) {
                warn!(device = %device.id(), name = device.name(), %reason, "Device disconnected");
                faulted.push(device.id());
            }
        }
        faulted
            .into_iter()
            .filter_map(|id| self.unregister(id).ok())
            .collect()
    }

    /// Changes recorded since the last [`DeviceRegistry::clear_changes`].
    #[must_use]
    pub fn changes(&self) -> &[DeviceChange] {
        &self.changes
    }

    /// Forget the recorded changes. Called at the start of every frame.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns `true` if a device with this id is registered.
    #[must_use]
    pub fn contains(&self, id: DeviceId) -> bool {
        self.ids.contains(&id)
    }

    /// Device by id.
    #[must_use]
    pub fn device(&self, id: DeviceId) -> Option<&dyn InputDevice> {
        self.devices.iter().find(|d| d.id() == id).map(|d| &**d)
    }

    /// Every device, in registration order.
    pub fn devices(&self) -> impl Iterator<Item = &dyn InputDevice> + '_ {
        self.devices.iter().map(|d| &**d)
    }

    /// Highest-priority keyboard.
    #[must_use]
    pub fn keyboard(&self) -> Option<&dyn KeyboardDevice> {
        self.keyboards().next()
    }

    /// Keyboards by priority.
    pub fn keyboards(&self) -> impl Iterator<Item = &dyn KeyboardDevice> + '_ {
        self.kind(&self.keyboards).filter_map(|d| d.as_keyboard())
    }

    /// Highest-priority pointer device (touch surface, mouse, pen).
    #[must_use]
    pub fn pointer(&self) -> Option<&dyn PointerDevice> {
        self.pointers().next()
    }

    /// Pointer devices by priority.
    pub fn pointers(&self) -> impl Iterator<Item = &dyn PointerDevice> + '_ {
        self.kind(&self.pointers).filter_map(|d| d.as_pointer())
    }

    /// Id of the highest-priority pointer device.
    #[must_use]
    pub fn pointer_id(&self) -> Option<DeviceId> {
        self.pointers.0.first().copied()
    }

    /// Highest-priority mouse.
    #[must_use]
    pub fn mouse(&self) -> Option<&dyn MouseDevice> {
        self.mice().next()
    }

    /// Mice by priority.
    pub fn mice(&self) -> impl Iterator<Item = &dyn MouseDevice> + '_ {
        self.kind(&self.mice).filter_map(|d| d.as_mouse())
    }

    /// Ids of every mouse.
    #[must_use]
    pub fn mouse_ids(&self) -> &[DeviceId] {
        &self.mice.0
    }

    /// Generic game controllers by priority.
    pub fn game_controllers(&self) -> impl Iterator<Item = &dyn GameControllerDevice> + '_ {
        self.kind(&self.controllers).filter_map(|d| d.as_game_controller())
    }

    /// Gamepads by priority. Use [`DeviceRegistry::gamepad`] for slot order.
    pub fn gamepads(&self) -> impl Iterator<Item = &dyn GamePadDevice> + '_ {
        self.kind(&self.gamepads).filter_map(|d| d.as_gamepad())
    }

    /// Gamepad exposed in `index`.
    #[must_use]
    pub fn gamepad(&self, index: usize) -> Option<&dyn GamePadDevice> {
        self.slots
            .device_at(index)
            .and_then(|id| self.device(id))
            .and_then(|d| d.as_gamepad())
    }

    /// Gamepad in the lowest occupied slot.
    #[must_use]
    pub fn default_gamepad(&self) -> Option<&dyn GamePadDevice> {
        self.default_gamepad_id()
            .and_then(|id| self.device(id))
            .and_then(|d| d.as_gamepad())
    }

    /// Id of the gamepad in the lowest occupied slot.
    #[must_use]
    pub fn default_gamepad_id(&self) -> Option<DeviceId> {
        self.slots.iter().next().map(|(_, id)| id)
    }

    /// Slot of a gamepad.
    #[must_use]
    pub fn gamepad_index(&self, id: DeviceId) -> Option<usize> {
        self.slots.index_of(id)
    }

    /// Slot table of the connected gamepads.
    #[must_use]
    pub const fn gamepad_slots(&self) -> &GamePadSlots {
        &self.slots
    }

    /// Sensors by priority.
    pub fn sensors(&self) -> impl Iterator<Item = &dyn SensorDevice> + '_ {
        self.kind(&self.sensors).filter_map(|d| d.as_sensor())
    }

    /// Sensor by id, for enabling or disabling it.
    pub fn sensor_mut(&mut self, id: DeviceId) -> Option<&mut dyn SensorDevice> {
        self.devices
            .iter_mut()
            .find(|d| d.id() == id)
            .and_then(|d| d.as_sensor_mut())
    }

    fn kind<'a>(&'a self, list: &'a KindList) -> impl Iterator<Item = &'a dyn InputDevice> + 'a {
        list.0.iter().filter_map(move |&id| self.device(id))
    }

    fn record_slot_changes(&mut self, moved: Vec<SlotChange>) {
        self.changes
            .extend(moved.into_iter().map(|c| DeviceChange::GamePadIndexChanged {
                device: c.device,
                previous: c.previous,
                index: c.current,
            }));
    }

    fn classify(&mut self) {
        let mut ranked: Vec<(DeviceId, i32, DeviceCapabilities)> = self
            .devices
            .iter()
            .map(|d| (d.id(), d.priority(), d.capabilities()))
            .collect();
        ranked.sort_by_key(|&(_, priority, _)| Reverse(priority));

        let pick = |flag: DeviceCapabilities| {
            KindList(
                ranked
                    .iter()
                    .filter(|(_, _, caps)| caps.contains(flag))
                    .map(|&(id, _, _)| id)
                    .collect(),
            )
        };
        self.keyboards = pick(DeviceCapabilities::KEYBOARD);
        self.pointers = pick(DeviceCapabilities::POINTER);
        self.mice = pick(DeviceCapabilities::MOUSE);
        self.controllers = pick(DeviceCapabilities::GAME_CONTROLLER);
        self.gamepads = pick(DeviceCapabilities::GAMEPAD);
        self.sensors = pick(DeviceCapabilities::SENSOR);
    }
}
