//! Per-pixel collision masks.
//!
//! Each row of a mask is a bitset stored in a `u128`, so sprites are limited
//! to 128 pixels across. Overlap is tested by shifting one mask's rows onto
//! the other's and AND-ing them.

use serde::{Deserialize, Serialize};

/// Widest mask supported by the row bitsets.
pub const MAX_MASK_WIDTH: usize = 128;

/// Outline a mask is rasterized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaskShape {
    /// Every pixel of the bounding box is solid
    Solid,
    /// The ellipse inscribed in the bounding box
    Ellipse,
}

/// A rasterized collision mask.
///
/// # Examples
///
/// ```
/// use reverie::{MaskShape, PixelMask};
///
/// let a = PixelMask::new(MaskShape::Solid, 10, 10);
/// let b = PixelMask::new(MaskShape::Solid, 10, 10);
/// assert!(a.overlaps(&b, (9, 9)));
/// assert!(!a.overlaps(&b, (10, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: usize,
    height: usize,
    rows: Vec<u128>,
}

impl PixelMask {
    pub fn new(shape: MaskShape, width: usize, height: usize) -> Self {
        let width = width.min(MAX_MASK_WIDTH);
        let rows = (0..height)
            .map(|y| {
                (0..width)
                    .filter(|x| shape.covers(*x, y, width, height))
                    .fold(0u128, |row, x| row | (1u128 << x))
            })
            .collect();
        Self { width, height, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether pixel `(x, y)` is solid.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && self.rows.get(y).map_or(false, |row| row >> x & 1 == 1)
    }

    /// Tests overlap with `other` placed at `offset` relative to this mask's
    /// top-left corner.
    pub fn overlaps(&self, other: &PixelMask, offset: (i32, i32)) -> bool {
        let (dx, dy) = offset;
        if dx >= self.width as i32 || -dx >= other.width as i32 {
            return false;
        }

        for (other_y, other_row) in other.rows.iter().enumerate() {
            let y = other_y as i32 + dy;
            if y < 0 {
                continue;
            }
            let Some(row) = self.rows.get(y as usize) else {
                break;
            };
            let shifted = if dx >= 0 {
                other_row << dx as u32
            } else {
                other_row >> (-dx) as u32
            };
            if row & shifted != 0 {
                return true;
            }
        }
        false
    }
}

impl MaskShape {
    fn covers(self, x: usize, y: usize, width: usize, height: usize) -> bool {
        match self {
            MaskShape::Solid => true,
            MaskShape::Ellipse => {
                let rx = width as f32 / 2.0;
                let ry = height as f32 / 2.0;
                let nx = (x as f32 + 0.5 - rx) / rx;
                let ny = (y as f32 + 0.5 - ry) / ry;
                nx * nx + ny * ny <= 1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_mask_is_full() {
        let mask = PixelMask::new(MaskShape::Solid, 5, 3);
        for y in 0..3 {
            for x in 0..5 {
                assert!(mask.get(x, y));
            }
        }
        assert!(!mask.get(5, 0));
        assert!(!mask.get(0, 3));
    }

    #[test]
    fn test_ellipse_corners_are_empty() {
        let mask = PixelMask::new(MaskShape::Ellipse, 20, 20);
        assert!(mask.get(10, 10));
        assert!(!mask.get(0, 0));
        assert!(!mask.get(19, 19));
    }

    #[test]
    fn test_ellipse_bounding_boxes_can_touch_without_overlap() {
        // Corners of two circles overlap as boxes but not as pixels.
        let a = PixelMask::new(MaskShape::Ellipse, 20, 20);
        let b = PixelMask::new(MaskShape::Ellipse, 20, 20);
        assert!(!a.overlaps(&b, (17, 17)));
        assert!(a.overlaps(&b, (10, 0)));
    }

    #[test]
    fn test_negative_offsets() {
        let a = PixelMask::new(MaskShape::Solid, 10, 10);
        let b = PixelMask::new(MaskShape::Solid, 4, 4);
        assert!(a.overlaps(&b, (-3, -3)));
        assert!(!a.overlaps(&b, (-4, 0)));
        assert!(!a.overlaps(&b, (0, -4)));
    }

    #[test]
    fn test_wide_masks_are_clamped() {
        let mask = PixelMask::new(MaskShape::Solid, 400, 2);
        assert_eq!(mask.width(), MAX_MASK_WIDTH);
        assert!(mask.get(127, 1));
    }
}
