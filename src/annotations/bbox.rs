/*!
 * Bounding boxes as stored in annotation files, and their conversion to
 * raster drawing coordinates.
 *
 * Annotation boxes use a bottom-left origin (Y grows upward from the bottom
 * edge of the image). Raster images are addressed from the top-left corner,
 * so the Y axis is flipped with `y' = image_height - y` before drawing.
 *
 * NOTE: the bottom-left convention is assumed, not verified against real
 * exported data. If boxes show up mirrored vertically, the flip in
 * `to_draw_rect` is the one place to change.
 */

use serde_json::Value;

use crate::errors::BoxError;

// @struct: Box corners exactly as annotated (bottom-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

// @struct: Normalized rectangle in top-left-origin pixel coordinates (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Parse one `[x1, y1, x2, y2]` entry. Numbers are truncated toward zero.
    pub fn from_json(value: &Value) -> Result<Self, BoxError> {
        let coords = match value {
            Value::Array(coords) => coords,
            other => return Err(BoxError::NotAList(other.to_string())),
        };

        if coords.len() != 4 {
            return Err(BoxError::WrongArity(coords.len()));
        }

        let mut parsed = [0i64; 4];
        for (slot, coord) in parsed.iter_mut().zip(coords) {
            let number = coord
                .as_f64()
                .ok_or_else(|| BoxError::NotNumeric(coord.to_string()))?;
            *slot = truncate_coordinate(number)?;
        }

        Ok(Self::new(parsed[0], parsed[1], parsed[2], parsed[3]))
    }

    /// Convert to a top-left-origin rectangle for an image of the given height.
    ///
    /// The top edge of the result comes from `max(y1, y2)` in annotation space,
    /// so `y_min = height - max(y1, y2)` and `y_max = height - min(y1, y2)`.
    pub fn to_draw_rect(&self, image_height: u32) -> Result<DrawRect, BoxError> {
        let height = i64::from(image_height);
        let y1_flipped = height - self.y1;
        let y2_flipped = height - self.y2;

        Ok(DrawRect {
            x_min: to_pixel(self.x1.min(self.x2))?,
            y_min: to_pixel(y1_flipped.min(y2_flipped))?,
            x_max: to_pixel(self.x1.max(self.x2))?,
            y_max: to_pixel(y1_flipped.max(y2_flipped))?,
        })
    }
}

impl DrawRect {
    /// Top-left corner as `(x, y)`
    pub fn top_left(&self) -> (i32, i32) {
        (self.x_min, self.y_min)
    }

    /// Bottom-right corner as `(x, y)`
    pub fn bottom_right(&self) -> (i32, i32) {
        (self.x_max, self.y_max)
    }

    /// Rectangle shrunk by `inset` pixels on every side, if anything is left
    pub fn inset(&self, inset: i32) -> Option<DrawRect> {
        let rect = DrawRect {
            x_min: self.x_min.checked_add(inset)?,
            y_min: self.y_min.checked_add(inset)?,
            x_max: self.x_max.checked_sub(inset)?,
            y_max: self.y_max.checked_sub(inset)?,
        };
        (rect.x_min <= rect.x_max && rect.y_min <= rect.y_max).then_some(rect)
    }
}

fn truncate_coordinate(number: f64) -> Result<i64, BoxError> {
    if !number.is_finite() || number.abs() >= i64::MAX as f64 {
        return Err(BoxError::OutOfRange(number));
    }
    Ok(number.trunc() as i64)
}

fn to_pixel(value: i64) -> Result<i32, BoxError> {
    i32::try_from(value).map_err(|_| BoxError::OutOfRange(value as f64))
}
