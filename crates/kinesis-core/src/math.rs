//! Math utilities for pointer and gesture computations.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::EPSILON;

/// 2D cross product (z component of the 3D cross product).
#[inline]
#[must_use]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// Signed angle in radians that rotates unit vector `from` onto unit vector `to`.
///
/// The magnitude comes from the dot product, the sign from the 2D cross product.
/// Inputs are expected to be normalized; the dot product is clamped so rounding
/// never produces NaN.
#[inline]
#[must_use]
pub fn signed_angle(from: Vec2, to: Vec2) -> f32 {
    let angle = from.dot(to).clamp(-1.0, 1.0).acos();
    if cross(from, to) < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Returns `numerator / denominator`, or zero when the denominator is degenerate.
#[inline]
#[must_use]
pub fn ratio_or_zero(numerator: f32, denominator: f32) -> f32 {
    if denominator.abs() < EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Aspect ratio (height / width) of a pointer surface.
///
/// Pointer positions are normalized to `[0, 1]` on both axes, which stretches
/// distances on non-square surfaces. Scaling `y` by the ratio maps a normalized
/// position into an isotropic space where thresholds mean the same thing in
/// every direction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenRatio(f32);

impl Default for ScreenRatio {
    fn default() -> Self {
        Self::SQUARE
    }
}

impl ScreenRatio {
    /// Square surface.
    pub const SQUARE: Self = Self(1.0);

    /// Create a ratio from a surface size in pixels.
    ///
    /// Degenerate sizes fall back to a square surface.
    #[must_use]
    pub fn from_size(size: Vec2) -> Self {
        if size.x.abs() < EPSILON || size.y.abs() < EPSILON {
            Self::SQUARE
        } else {
            Self(size.y / size.x)
        }
    }

    /// Raw height / width value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Map a normalized position or vector into isotropic space.
    #[inline]
    #[must_use]
    pub fn to_isotropic(self, v: Vec2) -> Vec2 {
        Vec2::new(v.x, v.y * self.0)
    }

    /// Map an isotropic position or vector back to normalized space.
    #[inline]
    #[must_use]
    pub fn to_normalized(self, v: Vec2) -> Vec2 {
        Vec2::new(v.x, v.y / self.0)
    }
}
