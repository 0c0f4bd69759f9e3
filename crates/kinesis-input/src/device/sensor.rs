//! Motion and orientation sensors.
//!
//! Sensors expose their latest reading only; they do not emit routed events.

use glam::{Quat, Vec3};

use crate::device::{DeviceCapabilities, DeviceInfo, DeviceStatus, InputDevice};
use crate::pool::EventSink;
use crate::queue::RawQueue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Accelerometer,
    Gyroscope,
    Gravity,
    UserAcceleration,
    Orientation,
    Compass,
}

/// A sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    /// Acceleration, rotation rate or gravity vector.
    Vector(Vec3),
    /// Device orientation.
    Rotation(Quat),
    /// Compass heading in radians from magnetic north.
    Heading(f32),
}

impl SensorValue {
    /// Neutral reading for a sensor kind.
    #[must_use]
    pub const fn zero(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Orientation => Self::Rotation(Quat::IDENTITY),
            SensorKind::Compass => Self::Heading(0.0),
            _ => Self::Vector(Vec3::ZERO),
        }
    }
}

/// A sensor device.
pub trait SensorDevice {
    fn kind(&self) -> SensorKind;

    /// Latest reading.
    fn value(&self) -> SensorValue;

    /// Disabled sensors keep their last reading and drop new samples.
    fn is_enabled(&self) -> bool;

    fn set_enabled(&mut self, enabled: bool);
}

/// Sensor fed by a queue of readings.
#[derive(Debug)]
pub struct Sensor {
    info: DeviceInfo,
    kind: SensorKind,
    value: SensorValue,
    enabled: bool,
    queue: RawQueue<SensorValue>,
    scratch: Vec<SensorValue>,
}

impl Sensor {
    /// Create an enabled sensor reading from `queue`.
    #[must_use]
    pub fn new(info: DeviceInfo, kind: SensorKind, queue: RawQueue<SensorValue>) -> Self {
        Self {
            info,
            kind,
            value: SensorValue::zero(kind),
            enabled: true,
            queue,
            scratch: Vec::new(),
        }
    }
}

impl InputDevice for Sensor {
    fn info(&self) -> &DeviceInfo {
        &self.info
    }

    fn capabilities(&self) -> DeviceCapabilities {
        DeviceCapabilities::SENSOR
    }

    fn update(&mut self, _events: &mut EventSink<'_>) -> DeviceStatus {
        self.queue.drain_into(&mut self.scratch);
        if self.enabled {
            if let Some(&latest) = self.scratch.last() {
                self.value = latest;
            }
        }
        self.scratch.clear();
        DeviceStatus::Connected
    }

    fn as_sensor(&self) -> Option<&dyn SensorDevice> {
        Some(self)
    }

    fn as_sensor_mut(&mut self) -> Option<&mut dyn SensorDevice> {
        Some(self)
    }
}

impl SensorDevice for Sensor {
    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn value(&self) -> SensorValue {
        self.value
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::EventStore;
    use kinesis_core::DeviceId;

    #[test]
    fn keeps_latest_reading_while_enabled() {
        let queue = RawQueue::new();
        let info = DeviceInfo::new(DeviceId::from_name("accel"), "Accelerometer");
        let mut sensor = Sensor::new(info, SensorKind::Accelerometer, queue.clone());
        assert_eq!(sensor.value(), SensorValue::Vector(Vec3::ZERO));

        let mut store = EventStore::new();
        let mut frame = Vec::new();
        queue.extend([
            SensorValue::Vector(Vec3::X),
            SensorValue::Vector(Vec3::Y),
        ]);
        sensor.update(&mut EventSink::new(&mut store, &mut frame));
        assert_eq!(sensor.value(), SensorValue::Vector(Vec3::Y));
        assert!(frame.is_empty());

        sensor.set_enabled(false);
        queue.push(SensorValue::Vector(Vec3::Z));
        sensor.update(&mut EventSink::new(&mut store, &mut frame));
        assert_eq!(sensor.value(), SensorValue::Vector(Vec3::Y));
        assert!(queue.is_empty());
    }

    #[test]
    fn orientation_starts_at_identity() {
        assert_eq!(
            SensorValue::zero(SensorKind::Orientation),
            SensorValue::Rotation(Quat::IDENTITY)
        );
    }
}
