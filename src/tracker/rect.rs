//! Axis-aligned rectangles in absolute pixel coordinates.
//!
//! Two representations are used along the pipeline:
//! - [`RawRegion`]: top-left corner plus extent, as produced by component extraction
//! - [`BoundingBox`]: top-left / bottom-right corners, as consumed by the tracker and renderers

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Minimal enclosing rectangle of a connected foreground component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawRegion {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl RawRegion {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a region spanning `[x1, x2) × [y1, y2)`.
    #[inline]
    pub fn from_corners(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2.saturating_sub(x1),
            height: y2.saturating_sub(y1),
        }
    }

    /// Centre of the rectangle, in continuous pixel coordinates.
    #[inline]
    pub fn centroid(&self) -> Point2<f64> {
        Point2::new(
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Same rectangle in corner form.
    #[inline]
    pub fn to_box(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

/// Box to render, in TLBR form: `x1 < x2`, `y1 < y2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    #[inline]
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Convert to `[x1, y1, x2, y2]`.
    #[inline]
    pub fn to_tlbr(&self) -> [u32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Whether the box has positive extent on both axes.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    #[inline]
    pub fn top_left(&self) -> Point2<f64> {
        Point2::new(self.x1 as f64, self.y1 as f64)
    }

    /// Euclidean distance between the top-left corners of two boxes.
    #[inline]
    pub fn corner_distance(&self, other: &BoundingBox) -> f64 {
        nalgebra::distance(&self.top_left(), &other.top_left())
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Calculate Intersection over Union (IoU) with another box.
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        let inter_area = x2.saturating_sub(x1) as u64 * y2.saturating_sub(y1) as u64;
        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0 {
            (inter_area as f64 / union_area as f64) as f32
        } else {
            0.0
        }
    }
}

impl From<BoundingBox> for [u32; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_tlbr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_conversions() {
        let region = RawRegion::new(10, 20, 30, 40);
        assert_eq!(region.to_box().to_tlbr(), [10, 20, 40, 60]);
        assert_eq!(region.area(), 1200);

        let c = region.centroid();
        assert_eq!(c.x, 25.0);
        assert_eq!(c.y, 40.0);
    }

    #[test]
    fn test_from_corners() {
        let region = RawRegion::from_corners(10, 10, 20, 20);
        assert_eq!(region, RawRegion::new(10, 10, 10, 10));
    }

    #[test]
    fn test_corner_distance() {
        let a = BoundingBox::new(5, 5, 25, 25);
        let b = BoundingBox::new(8, 9, 30, 30);
        assert!((a.corner_distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_iou() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(5, 5, 15, 15);

        // Intersection: 5x5 = 25
        // Union: 100 + 100 - 25 = 175
        let iou = a.iou(&b);
        assert!((iou - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_no_overlap() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(20, 20, 30, 30);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_same_box() {
        let a = BoundingBox::new(0, 0, 10, 10);
        assert!((a.iou(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_union() {
        let a = BoundingBox::new(0, 5, 10, 10);
        let b = BoundingBox::new(5, 0, 15, 8);
        assert_eq!(a.union(&b), BoundingBox::new(0, 0, 15, 10));
    }

    #[test]
    fn test_validity() {
        assert!(BoundingBox::new(0, 0, 1, 1).is_valid());
        assert!(!BoundingBox::new(3, 0, 3, 1).is_valid());
    }
}
