// ============================================================================
// tubecrop-core/src/geometry.rs
// ============================================================================
//
// GEOMETRY: Crop Boxes, Rescaling and the Minimum-Size Policy
//
// Tube boxes are authored against a reference resolution that may differ from
// the decoded frame size of the file we actually hold. `rescale` maps a box
// from reference space into actual-pixel space by linear scaling with integer
// truncation toward zero.
//
// KEY COMPONENTS:
// - Resolution: height/width pair
// - CropBox: box in reference space
// - RescaledBox: box in actual-pixel space
// - SizePolicy: minimum crop width/height a clip must reach

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// A frame size. Height comes first to match the tube record field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub height: i64,
    pub width: i64,
}

impl Resolution {
    pub fn new(height: i64, width: i64) -> Self {
        Self { height, width }
    }
}

/// A pixel box in reference-resolution space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CropBox {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i64 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i64 {
        self.bottom.saturating_sub(self.top)
    }
}

/// A pixel box in actual-frame space.
///
/// Width or height may come out zero or negative after truncation. Such
/// boxes are never clamped here; [`SizePolicy::admits`] rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RescaledBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl RescaledBox {
    pub fn crop_width(&self) -> i64 {
        self.right.saturating_sub(self.left)
    }

    pub fn crop_height(&self) -> i64 {
        self.bottom.saturating_sub(self.top)
    }

    /// ffmpeg `crop` filter arguments: `w:h:x:y`.
    pub fn crop_filter(&self) -> String {
        format!(
            "crop={}:{}:{}:{}",
            self.crop_width(),
            self.crop_height(),
            self.left,
            self.top
        )
    }
}

/// Maps `crop_box` from `reference` space onto `actual` frame geometry.
///
/// Each coordinate is scaled as `value * actual / reference` in integer
/// arithmetic, which truncates toward zero and returns the box unchanged
/// when both resolutions are equal.
///
/// # Errors
///
/// Returns [`CoreError::DivisionByZero`] when either reference dimension is 0
/// and [`CoreError::CoordinateOutOfRange`] when a coordinate is too large to
/// scale in 64-bit arithmetic.
pub fn rescale(
    crop_box: &CropBox,
    reference: Resolution,
    actual: Resolution,
) -> CoreResult<RescaledBox> {
    if reference.height == 0 || reference.width == 0 {
        return Err(CoreError::DivisionByZero {
            height: reference.height,
            width: reference.width,
        });
    }

    Ok(RescaledBox {
        left: scale(crop_box.left, actual.width, reference.width, "L")?,
        top: scale(crop_box.top, actual.height, reference.height, "T")?,
        right: scale(crop_box.right, actual.width, reference.width, "R")?,
        bottom: scale(crop_box.bottom, actual.height, reference.height, "B")?,
    })
}

fn scale(value: i64, actual: i64, reference: i64, field: &'static str) -> CoreResult<i64> {
    value
        .checked_mul(actual)
        .and_then(|v| v.checked_div(reference))
        .ok_or(CoreError::CoordinateOutOfRange { field, value })
}

/// Minimum crop size a rescaled box must reach to be transcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizePolicy {
    pub min_width: i64,
    pub min_height: i64,
}

impl SizePolicy {
    pub fn new(min_width: i64, min_height: i64) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    /// True when the box is non-degenerate and at least the minimum size.
    pub fn admits(&self, rescaled: &RescaledBox) -> bool {
        let (w, h) = (rescaled.crop_width(), rescaled.crop_height());
        w > 0 && h > 0 && w >= self.min_width && h >= self.min_height
    }
}
