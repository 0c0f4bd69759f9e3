//! Test harness for the Kinesis input pipeline.
//!
//! Provides scripted, frame-by-frame driving of an [`InputManager`] through
//! queue-fed devices with a simulated clock.
//!
//! [`InputManager`]: kinesis_input::InputManager

pub mod harness;

pub use harness::InputHarness;

use std::time::Duration;

use glam::Vec2;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TestError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] kinesis_core::Error),
    #[error("Expectation failed: {0}")]
    Expectation(String),
}

pub type Result<T> = std::result::Result<T, TestError>;

/// Harness configuration.
#[derive(Debug, Clone, Copy)]
pub struct HarnessConfig {
    /// Simulated time between frames.
    pub frame_time: Duration,
    /// Surface size given to touch surfaces and mice.
    pub surface_size: Vec2,
    /// Warning threshold handed to the manager.
    pub pool_leak_threshold: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            frame_time: Duration::from_millis(16),
            surface_size: Vec2::new(1000.0, 1000.0),
            pool_leak_threshold: 0,
        }
    }
}
