//! Core types, math, and errors for the Kinesis input pipeline.
//!
//! This crate provides the foundational types used throughout the pipeline:
//! - Device identity ([`DeviceId`])
//! - 2D math helpers for pointer and gesture computations
//! - The pipeline-wide error type

pub mod error;
pub mod math;
pub mod types;

pub use error::{Error, Result};
pub use math::{cross, signed_angle, ScreenRatio};
pub use types::DeviceId;

/// Pipeline-wide constants
pub mod constants {
    /// Vector lengths below this are treated as degenerate (zero).
    pub const EPSILON: f32 = 1e-5;
    /// Priority given to devices that do not specify one.
    pub const DEFAULT_DEVICE_PRIORITY: i32 = 0;
}
