//! Core identity types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of an input device.
///
/// Identity is the UUID: two devices with the same id are the same device, and
/// registering a second one is a wiring error.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(transparent)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    /// Namespace for ids derived from stable device names.
    const NAMESPACE: Uuid = Uuid::from_u128(0x6b69_6e65_7369_7300_8000_0000_0000_0001);

    /// The nil id, used as a placeholder before an event is stamped.
    pub const NIL: Self = Self(Uuid::nil());

    /// Create a fresh random id.
    #[must_use]
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a deterministic id from a stable name (e.g. a hardware path).
    ///
    /// The same name always yields the same id, so a device that is unplugged
    /// and plugged back in keeps its identity.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Self::NAMESPACE, name.as_bytes()))
    }

    /// The underlying UUID.
    #[inline]
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_ids_are_stable() {
        assert_eq!(DeviceId::from_name("touch0"), DeviceId::from_name("touch0"));
        assert_ne!(DeviceId::from_name("touch0"), DeviceId::from_name("touch1"));
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(DeviceId::new_random(), DeviceId::new_random());
    }
}
