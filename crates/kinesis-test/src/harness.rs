//! Scripted frame driver.
//!
//! The harness owns an [`InputManager`] fed by one [`QueueSource`]. Tests add
//! devices by name, push raw samples through the returned feeds and advance
//! the pipeline with [`InputHarness::step`], which also advances a simulated
//! clock used for sample timestamps.

use std::time::Duration;

use kinesis_core::DeviceId;
use kinesis_input::{
    DeviceInfo, GamePadFeed, GamePadIndexPolicy, GestureEvent, InputConfig, InputManager,
    KeyboardFeed, MouseFeed, QueueSource, SourceHandle, TouchFeed,
};

use crate::{HarnessConfig, Result, TestError};

/// Frame-by-frame driver for an [`InputManager`].
#[derive(Debug)]
pub struct InputHarness {
    input: InputManager,
    handle: SourceHandle,
    config: HarnessConfig,
    now: Duration,
    frames: u64,
}

impl Default for InputHarness {
    fn default() -> Self {
        Self::new(HarnessConfig::default())
    }
}

impl InputHarness {
    /// Create a harness with no devices.
    #[must_use]
    pub fn new(config: HarnessConfig) -> Self {
        let source = QueueSource::new("harness");
        let handle = source.handle().clone();
        let mut input = InputManager::new(
            InputConfig::default()
                .with_surface_size(config.surface_size)
                .with_pool_leak_threshold(config.pool_leak_threshold),
        );
        input.add_source(source);
        Self {
            input,
            handle,
            config,
            now: Duration::ZERO,
            frames: 0,
        }
    }

    #[must_use]
    pub const fn input(&self) -> &InputManager {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputManager {
        &mut self.input
    }

    /// Handle of the harness source, for adding custom devices.
    #[must_use]
    pub const fn handle(&self) -> &SourceHandle {
        &self.handle
    }

    /// Simulated time; use it as the timestamp of pushed samples.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    #[must_use]
    pub fn keyboard(&self, name: &str) -> KeyboardFeed {
        self.handle.add_keyboard(info(name))
    }

    #[must_use]
    pub fn mouse(&self, name: &str) -> MouseFeed {
        self.handle.add_mouse(info(name), self.config.surface_size)
    }

    #[must_use]
    pub fn touch_surface(&self, name: &str) -> TouchFeed {
        self.handle
            .add_touch_surface(info(name), self.config.surface_size)
    }

    #[must_use]
    pub fn gamepad(&self, name: &str, policy: GamePadIndexPolicy) -> GamePadFeed {
        self.handle.add_gamepad(info(name), policy)
    }

    /// Run one frame and return the gesture events it produced.
    pub fn step(&mut self) -> Result<Vec<GestureEvent>> {
        self.input.update(self.config.frame_time)?;
        self.now += self.config.frame_time;
        self.frames += 1;
        Ok(self.input.gesture_events())
    }

    /// Run `count` frames, collecting their gesture events in order.
    pub fn step_n(&mut self, count: usize) -> Result<Vec<GestureEvent>> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(self.step()?);
        }
        Ok(events)
    }

    /// Run enough frames to cover `duration` of simulated time.
    pub fn step_for(&mut self, duration: Duration) -> Result<Vec<GestureEvent>> {
        let frame = self.config.frame_time.as_nanos().max(1);
        let count = duration.as_nanos().div_ceil(frame);
        self.step_n(usize::try_from(count).unwrap_or(usize::MAX))
    }

    /// Check that only the current frame's events are live in the pools.
    pub fn expect_no_leaks(&self) -> Result<()> {
        let live = self.input.event_store().total_active();
        let frame = self.input.events().count();
        if live == frame {
            Ok(())
        } else {
            tracing::warn!(live, frame, "Pooled events leaked");
            Err(TestError::Expectation(format!(
                "{live} pooled events live, {frame} belong to the current frame"
            )))
        }
    }
}

fn info(name: &str) -> DeviceInfo {
    DeviceInfo::new(DeviceId::from_name(name), name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use kinesis_input::KeyCode;

    #[test]
    fn clock_advances_per_frame() {
        let mut harness = InputHarness::default();
        harness.step_n(3).unwrap();
        assert_eq!(harness.frames(), 3);
        assert_eq!(harness.now(), Duration::from_millis(48));

        harness.step_for(Duration::from_millis(20)).unwrap();
        assert_eq!(harness.frames(), 5);
    }

    #[test]
    fn named_devices_are_registered_on_step() {
        let mut harness = InputHarness::default();
        let keyboard = harness.keyboard("kb");
        let touch = harness.touch_surface("touch");
        assert!(harness.input().registry().is_empty());

        keyboard.key(KeyCode::KeyQ, true);
        touch.down(0, Vec2::new(0.5, 0.5), harness.now());
        harness.step().unwrap();

        assert_eq!(harness.input().registry().len(), 2);
        assert!(harness.input().is_key_pressed(KeyCode::KeyQ));
        assert_eq!(harness.input().events().count(), 2);
        harness.expect_no_leaks().unwrap();
    }
}
