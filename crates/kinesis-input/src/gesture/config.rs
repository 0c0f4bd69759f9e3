//! Gesture configuration.
//!
//! Configs are plain values fixed when a gesture is added. Distances are
//! measured in the ratio-corrected space described by
//! [`ScreenRatio`](kinesis_core::math::ScreenRatio), times in seconds.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Direction constraint for drags and flicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GestureShape {
    /// Any direction.
    #[default]
    Free,
    /// Mostly along the x axis.
    Horizontal,
    /// Mostly along the y axis.
    Vertical,
}

impl GestureShape {
    /// Returns `true` if `translation` stays within `margin` of the shape's axis.
    #[must_use]
    pub fn accepts(self, translation: Vec2, margin: Vec2) -> bool {
        match self {
            Self::Free => true,
            Self::Horizontal => translation.y.abs() <= margin.y,
            Self::Vertical => translation.x.abs() <= margin.x,
        }
    }
}

/// One or more quick presses in about the same place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapConfig {
    pub required_fingers: usize,
    /// Longest press that still counts as a tap.
    pub max_press_time: Duration,
    /// Longest gap between two taps of one group.
    pub max_time_between_taps: Duration,
    /// Largest drift during a press, and between taps of one group.
    pub max_distance: f32,
    /// The group is reported as soon as it reaches this many taps.
    pub max_taps: u32,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            required_fingers: 1,
            max_press_time: Duration::from_secs(1),
            max_time_between_taps: Duration::from_millis(400),
            max_distance: 0.04,
            max_taps: 2,
        }
    }
}

impl TapConfig {
    #[must_use]
    pub const fn with_required_fingers(mut self, fingers: usize) -> Self {
        self.required_fingers = fingers;
        self
    }

    #[must_use]
    pub const fn with_max_press_time(mut self, time: Duration) -> Self {
        self.max_press_time = time;
        self
    }

    #[must_use]
    pub const fn with_max_time_between_taps(mut self, time: Duration) -> Self {
        self.max_time_between_taps = time;
        self
    }

    #[must_use]
    pub const fn with_max_distance(mut self, distance: f32) -> Self {
        self.max_distance = distance;
        self
    }

    #[must_use]
    pub const fn with_max_taps(mut self, taps: u32) -> Self {
        self.max_taps = taps;
        self
    }
}

/// A press held in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LongPressConfig {
    pub required_fingers: usize,
    pub press_time: Duration,
    /// Largest drift of any finger before the press is abandoned.
    pub max_translation: f32,
}

impl Default for LongPressConfig {
    fn default() -> Self {
        Self {
            required_fingers: 1,
            press_time: Duration::from_secs(1),
            max_translation: 0.02,
        }
    }
}

impl LongPressConfig {
    #[must_use]
    pub const fn with_required_fingers(mut self, fingers: usize) -> Self {
        self.required_fingers = fingers;
        self
    }

    #[must_use]
    pub const fn with_press_time(mut self, time: Duration) -> Self {
        self.press_time = time;
        self
    }

    #[must_use]
    pub const fn with_max_translation(mut self, distance: f32) -> Self {
        self.max_translation = distance;
        self
    }
}

/// Continuous movement of the finger centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragConfig {
    pub required_fingers: usize,
    /// Distance the centroid must travel before the drag starts.
    pub min_distance: f32,
    pub shape: GestureShape,
    /// Allowed deviation from the shape's axis before the drag starts.
    pub allowed_error_margin: Vec2,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            required_fingers: 1,
            min_distance: 0.02,
            shape: GestureShape::Free,
            allowed_error_margin: Vec2::splat(0.02),
        }
    }
}

impl DragConfig {
    #[must_use]
    pub const fn with_required_fingers(mut self, fingers: usize) -> Self {
        self.required_fingers = fingers;
        self
    }

    #[must_use]
    pub const fn with_min_distance(mut self, distance: f32) -> Self {
        self.min_distance = distance;
        self
    }

    #[must_use]
    pub const fn with_shape(mut self, shape: GestureShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub const fn with_allowed_error_margin(mut self, margin: Vec2) -> Self {
        self.allowed_error_margin = margin;
        self
    }
}

/// A short fast stroke, reported when the fingers lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlickConfig {
    pub required_fingers: usize,
    pub min_length: f32,
    /// Minimum length divided by stroke duration, per second.
    pub min_average_speed: f32,
    pub shape: GestureShape,
    pub allowed_error_margin: Vec2,
}

impl Default for FlickConfig {
    fn default() -> Self {
        Self {
            required_fingers: 1,
            min_length: 0.04,
            min_average_speed: 0.4,
            shape: GestureShape::Free,
            allowed_error_margin: Vec2::splat(0.02),
        }
    }
}

impl FlickConfig {
    #[must_use]
    pub const fn with_required_fingers(mut self, fingers: usize) -> Self {
        self.required_fingers = fingers;
        self
    }

    #[must_use]
    pub const fn with_min_length(mut self, length: f32) -> Self {
        self.min_length = length;
        self
    }

    #[must_use]
    pub const fn with_min_average_speed(mut self, speed: f32) -> Self {
        self.min_average_speed = speed;
        self
    }

    #[must_use]
    pub const fn with_shape(mut self, shape: GestureShape) -> Self {
        self.shape = shape;
        self
    }

    #[must_use]
    pub const fn with_allowed_error_margin(mut self, margin: Vec2) -> Self {
        self.allowed_error_margin = margin;
        self
    }
}

/// Two-finger rotation, scale and translation.
///
/// The gesture starts once any one of the three thresholds is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Radians.
    pub min_rotation: f32,
    /// Minimum deviation of the scale factor from 1.
    pub min_scale: f32,
    /// Minimum distance travelled by the midpoint of the two fingers.
    pub min_translation: f32,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            min_rotation: 0.1,
            min_scale: 0.075,
            min_translation: 0.016,
        }
    }
}

impl CompositeConfig {
    #[must_use]
    pub const fn with_min_rotation(mut self, radians: f32) -> Self {
        self.min_rotation = radians;
        self
    }

    #[must_use]
    pub const fn with_min_scale(mut self, scale: f32) -> Self {
        self.min_scale = scale;
        self
    }

    #[must_use]
    pub const fn with_min_translation(mut self, distance: f32) -> Self {
        self.min_translation = distance;
        self
    }
}

/// Configuration of any gesture kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureConfig {
    Tap(TapConfig),
    LongPress(LongPressConfig),
    Drag(DragConfig),
    Flick(FlickConfig),
    Composite(CompositeConfig),
}

impl From<TapConfig> for GestureConfig {
    fn from(config: TapConfig) -> Self {
        Self::Tap(config)
    }
}

impl From<LongPressConfig> for GestureConfig {
    fn from(config: LongPressConfig) -> Self {
        Self::LongPress(config)
    }
}

impl From<DragConfig> for GestureConfig {
    fn from(config: DragConfig) -> Self {
        Self::Drag(config)
    }
}

impl From<FlickConfig> for GestureConfig {
    fn from(config: FlickConfig) -> Self {
        Self::Flick(config)
    }
}

impl From<CompositeConfig> for GestureConfig {
    fn from(config: CompositeConfig) -> Self {
        Self::Composite(config)
    }
}
