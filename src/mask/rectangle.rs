//! The `{left, top, width, height}` payload posted by the edit page

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Rectangle in the uploaded image's pixel space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskRectangle {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Deserialize)]
struct RawRectangle {
    left: Value,
    top: Value,
    width: Value,
    height: Value,
}

impl MaskRectangle {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Parse the `mask_data` form field.
    ///
    /// Every key must be present and hold a JSON number. Fractional values,
    /// as produced by browser canvases, are rounded to the nearest pixel.
    pub fn from_json(data: &str) -> Result<Self> {
        let raw: RawRectangle = serde_json::from_str(data)
            .map_err(|e| AppError::MalformedRequest(format!("invalid mask_data: {}", e)))?;

        Ok(Self {
            left: pixel("left", &raw.left)?,
            top: pixel("top", &raw.top)?,
            width: pixel("width", &raw.width)?,
            height: pixel("height", &raw.height)?,
        })
    }

    /// Intersect with `[0, width) x [0, height)`.
    ///
    /// Returns half-open `(x0, y0, x1, y1)` bounds, or `None` when nothing of
    /// the rectangle lands on the canvas. A negative extent spans back from
    /// the anchor edge.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let (x0, x1) = span(self.left, self.width, width);
        let (y0, y1) = span(self.top, self.height, height);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }

        Some((x0, y0, x1, y1))
    }
}

fn span(start: i64, extent: i64, limit: u32) -> (u32, u32) {
    let end = start.saturating_add(extent);
    let (lo, hi) = if extent < 0 { (end, start) } else { (start, end) };
    let limit = i64::from(limit);

    // Both values are within [0, limit] after clamping, so the casts are lossless
    (lo.clamp(0, limit) as u32, hi.clamp(0, limit) as u32)
}

fn pixel(key: &str, value: &Value) -> Result<i64> {
    let number = value
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| {
            AppError::MalformedRequest(format!("mask_data.{} must be a number, got {}", key, value))
        })?;

    Ok(number.round() as i64)
}
