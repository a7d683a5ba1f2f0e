//! Geometry module
//!
//! Points, sizes and rectangles plus the conversions between the two
//! coordinate conventions used by the window system:
//! - desktop space: origin at the bottom-left of the primary display, Y up
//! - device space: origin at the top-left of the primary display, Y down
//!
//! Display bounds are reported in desktop space. Cursor warps, synthesized
//! events and window attributes all use device space.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Degenerate bounds {width}x{height}: relative positions need a non-zero area")]
    DegenerateBounds { width: f64, height: f64 },
}

pub type GeometryResult<T> = Result<T, GeometryError>;

/// A point in either coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether a rectangle of this size fits inside `other` on both axes
    pub fn fits_within(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// An axis-aligned rectangle described by its minimum corner and size.
///
/// In desktop space the origin is the bottom-left corner; in device space
/// it is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Containment test for desktop-space rectangles.
    ///
    /// Left and top edges are inside, right and bottom edges are not, so a
    /// point on the seam between two adjacent displays belongs to exactly
    /// one of them.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x()
            && point.x < self.max_x()
            && point.y > self.min_y()
            && point.y <= self.max_y()
    }

    /// Convert a desktop-space rectangle into device space (or back).
    ///
    /// The flipped origin is the corner that becomes the minimum corner in
    /// the other convention, i.e. the top-left corner when going to device
    /// space.
    pub fn flipped(&self, reference_height: f64) -> Rect {
        Rect::new(
            self.origin.x,
            reference_height - self.max_y(),
            self.size.width,
            self.size.height,
        )
    }
}

/// A point expressed as a fraction (0.0 to 1.0) of some bounds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelativePoint {
    pub fx: f64,
    pub fy: f64,
}

/// Flip a desktop-space point into device space.
///
/// The conversion is its own inverse for the same reference height, which
/// is always the height of the primary display's full bounds.
pub fn to_device_space(point: Point, reference_height: f64) -> Point {
    Point::new(point.x, reference_height - point.y)
}

/// Flip a device-space point back into desktop space
pub fn to_desktop_space(point: Point, reference_height: f64) -> Point {
    to_device_space(point, reference_height)
}

/// Express `point` as a fraction of `bounds`
pub fn to_relative(point: Point, bounds: &Rect) -> GeometryResult<RelativePoint> {
    if bounds.size.is_degenerate() {
        return Err(GeometryError::DegenerateBounds {
            width: bounds.width(),
            height: bounds.height(),
        });
    }

    Ok(RelativePoint {
        fx: (point.x - bounds.min_x()) / bounds.width(),
        fy: (point.y - bounds.min_y()) / bounds.height(),
    })
}

/// Map a relative position back into absolute coordinates within `bounds`
pub fn from_relative(relative: RelativePoint, bounds: &Rect) -> Point {
    Point::new(
        bounds.min_x() + bounds.width() * relative.fx,
        bounds.min_y() + bounds.height() * relative.fy,
    )
}

/// Clamp the origin of a `size`-sized rectangle so it stays inside `within`.
///
/// Each axis is clamped independently to
/// `[within.min, within.max - size]`. When the rectangle is larger than
/// `within` on an axis, it is pinned to the minimum edge.
pub fn clamp_origin(origin: Point, size: Size, within: &Rect) -> Point {
    fn clamp_axis(value: f64, lower: f64, upper: f64) -> f64 {
        if upper < lower {
            lower
        } else {
            value.clamp(lower, upper)
        }
    }

    Point::new(
        clamp_axis(origin.x, within.min_x(), within.max_x() - size.width),
        clamp_axis(origin.y, within.min_y(), within.max_y() - size.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON,
            "{:?} != {:?}",
            a,
            b
        );
    }

    #[test]
    fn test_device_space_is_self_inverse() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1920.0, 1080.0),
            Point::new(-1024.0, 1500.5),
            Point::new(2432.25, -300.0),
        ];

        for height in [1080.0, 1440.0, 900.0] {
            for p in points {
                assert_eq!(to_device_space(to_device_space(p, height), height), p);
                assert_eq!(to_desktop_space(to_device_space(p, height), height), p);
            }
        }
    }

    #[test]
    fn test_device_space_flips_y() {
        let p = to_device_space(Point::new(100.0, 80.0), 1080.0);
        assert_eq!(p, Point::new(100.0, 1000.0));
    }

    #[test]
    fn test_relative_round_trip() {
        let bounds = Rect::new(1920.0, -200.0, 1024.0, 768.0);
        let p = Point::new(2100.5, 311.25);

        let relative = to_relative(p, &bounds).unwrap();
        assert!(relative.fx > 0.0 && relative.fx < 1.0);
        assert!(relative.fy > 0.0 && relative.fy < 1.0);
        assert_close(from_relative(relative, &bounds), p);
    }

    #[test]
    fn test_relative_maps_between_displays() {
        let source = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let dest = Rect::new(1920.0, 0.0, 1024.0, 768.0);

        let relative = to_relative(source.center(), &source).unwrap();
        assert_close(from_relative(relative, &dest), dest.center());
    }

    #[test]
    fn test_relative_rejects_degenerate_bounds() {
        let bounds = Rect::new(0.0, 0.0, 0.0, 1080.0);
        let err = to_relative(Point::new(1.0, 1.0), &bounds).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateBounds { .. }));
    }

    #[test]
    fn test_contains_is_exclusive_on_shared_edge() {
        let left = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let right = Rect::new(1920.0, 0.0, 1024.0, 768.0);
        let seam = Point::new(1920.0, 500.0);

        assert!(!left.contains(seam));
        assert!(right.contains(seam));
    }

    #[test]
    fn test_flipped_rect() {
        // Secondary display sitting above the primary in desktop space
        let above = Rect::new(0.0, 1080.0, 1920.0, 1200.0);
        let device = above.flipped(1080.0);
        assert_eq!(device, Rect::new(0.0, -1200.0, 1920.0, 1200.0));
        assert_eq!(device.flipped(1080.0), above);
    }

    #[test]
    fn test_clamp_origin() {
        let within = Rect::new(1920.0, 25.0, 1024.0, 743.0);
        let size = Size::new(400.0, 300.0);

        let clamped = clamp_origin(Point::new(2800.0, 10.0), size, &within);
        assert_eq!(clamped, Point::new(2544.0, 25.0));

        let untouched = clamp_origin(Point::new(2000.0, 100.0), size, &within);
        assert_eq!(untouched, Point::new(2000.0, 100.0));
    }

    #[test]
    fn test_clamp_origin_oversized_pins_to_min() {
        let within = Rect::new(0.0, 0.0, 800.0, 600.0);
        let clamped = clamp_origin(Point::new(50.0, 50.0), Size::new(1000.0, 700.0), &within);
        assert_eq!(clamped, Point::new(0.0, 0.0));
    }
}
