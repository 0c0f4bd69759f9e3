//! Mapping of physical gamepads to logical player slots.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use kinesis_core::{DeviceId, Error, Result};

use crate::device::GamePadIndexPolicy;

/// A gamepad whose slot changed during a reassignment pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotChange {
    pub device: DeviceId,
    pub previous: Option<usize>,
    pub current: usize,
}

#[derive(Debug, Clone)]
struct Occupant {
    device: DeviceId,
    policy: GamePadIndexPolicy,
    slot: Option<usize>,
    requested: Option<usize>,
}

/// Lowest slot not in `taken`.
fn lowest_free(taken: &HashSet<usize>) -> usize {
    (0..=taken.len())
        .find(|slot| !taken.contains(slot))
        .unwrap_or(taken.len())
}

/// Slot table for connected gamepads.
///
/// Reassignment runs only when the topology changes:
///
/// 1. Fixed-index gamepads take their hardware slot.
/// 2. Assignable gamepads keep their current slot unless a fixed gamepad or an
///    earlier-registered assignable gamepad already holds it.
/// 3. Everything left over takes the lowest empty slot, in registration order.
///
/// Each slot then exposes its earliest-registered occupant. Only two fixed
/// gamepads reporting the same hardware slot can share one. Slots may be
/// sparse and any `usize` is a valid slot.
#[derive(Debug, Clone, Default)]
pub struct GamePadSlots {
    /// Connected gamepads in registration order.
    occupants: Vec<Occupant>,
    by_index: BTreeMap<usize, DeviceId>,
}

impl GamePadSlots {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a gamepad and rebalance.
    pub fn connect(&mut self, device: DeviceId, policy: GamePadIndexPolicy) -> Vec<SlotChange> {
        if self.position(device).is_none() {
            self.occupants.push(Occupant {
                device,
                policy,
                slot: None,
                requested: None,
            });
        }
        self.reassign()
    }

    /// Remove a gamepad and rebalance. Unknown devices are ignored.
    pub fn disconnect(&mut self, device: DeviceId) -> Vec<SlotChange> {
        if let Some(position) = self.position(device) {
            self.occupants.remove(position);
        }
        self.reassign()
    }

    /// Ask for an assignable gamepad to move to `slot`.
    ///
    /// The move happens unless a fixed gamepad or an earlier-registered
    /// assignable one holds `slot`, in which case the requester falls back to
    /// the lowest empty slot.
    ///
    /// # Errors
    ///
    /// [`Error::DeviceNotRegistered`] for unknown devices and
    /// [`Error::FixedGamePadIndex`] for fixed-index gamepads. The table is
    /// left unchanged in both cases.
    pub fn request_index(&mut self, device: DeviceId, slot: usize) -> Result<Vec<SlotChange>> {
        let position = self
            .position(device)
            .ok_or(Error::DeviceNotRegistered(device))?;
        let occupant = &mut self.occupants[position];
        if let GamePadIndexPolicy::Fixed(_) = occupant.policy {
            return Err(Error::FixedGamePadIndex(device));
        }
        occupant.requested = Some(slot);
        Ok(self.reassign())
    }

    /// Slot of a connected gamepad.
    #[must_use]
    pub fn index_of(&self, device: DeviceId) -> Option<usize> {
        self.position(device).and_then(|p| self.occupants[p].slot)
    }

    /// Gamepad exposed in `slot`.
    #[must_use]
    pub fn device_at(&self, slot: usize) -> Option<DeviceId> {
        self.by_index.get(&slot).copied()
    }

    /// Exposed gamepads ordered by slot, with their slot.
    pub fn iter(&self) -> impl Iterator<Item = (usize, DeviceId)> + '_ {
        self.by_index.iter().map(|(&slot, &device)| (slot, device))
    }

    /// Number of connected gamepads, including ones sharing a fixed slot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Returns `true` if no gamepad is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    fn position(&self, device: DeviceId) -> Option<usize> {
        self.occupants.iter().position(|o| o.device == device)
    }

    fn reassign(&mut self) -> Vec<SlotChange> {
        let previous: Vec<Option<usize>> = self.occupants.iter().map(|o| o.slot).collect();
        let mut taken: HashSet<usize> = HashSet::new();
        let mut placed: Vec<Option<usize>> = vec![None; self.occupants.len()];

        for (i, occupant) in self.occupants.iter().enumerate() {
            if let GamePadIndexPolicy::Fixed(slot) = occupant.policy {
                placed[i] = Some(slot);
                taken.insert(slot);
            }
        }

        for (i, occupant) in self.occupants.iter().enumerate() {
            if occupant.policy != GamePadIndexPolicy::Assignable {
                continue;
            }
            if let Some(slot) = occupant.requested.or(occupant.slot) {
                if taken.insert(slot) {
                    placed[i] = Some(slot);
                }
            }
        }

        for entry in placed.iter_mut().filter(|p| p.is_none()) {
            let slot = lowest_free(&taken);
            *entry = Some(slot);
            taken.insert(slot);
        }

        self.by_index.clear();
        let mut changes = Vec::new();
        for ((occupant, slot), before) in self.occupants.iter_mut().zip(placed).zip(previous) {
            let Some(slot) = slot else { continue };
            occupant.slot = Some(slot);
            occupant.requested = None;
            self.by_index.entry(slot).or_insert(occupant.device);
            if before != Some(slot) {
                tracing::debug!(device = %occupant.device, ?before, slot, "Gamepad slot assigned");
                changes.push(SlotChange {
                    device: occupant.device,
                    previous: before,
                    current: slot,
                });
            }
        }
        changes
    }
}
