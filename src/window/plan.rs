//! Target geometry for a window moving between displays

use crate::geometry::{
    clamp_origin, from_relative, to_desktop_space, to_device_space, to_relative, GeometryResult,
    Point, Rect, Size,
};
use crate::screen::Display;

/// Window position (top-left corner, device space) and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub position: Point,
    pub size: Size,
}

impl WindowGeometry {
    pub fn new(position: Point, size: Size) -> Self {
        Self { position, size }
    }

    /// Frame in device space
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    /// Center in device space
    pub fn center(&self) -> Point {
        self.frame().center()
    }
}

/// Where a window should go
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelocationPlan {
    pub target: WindowGeometry,
    /// The window filled its display's usable area before the move
    pub was_maximized: bool,
    /// The window will fill the destination's usable area
    pub maximize: bool,
}

/// Whether a window of `size` fills a usable area of `usable`, allowing
/// `tolerance` device units of slack on each axis
pub fn is_maximized(size: Size, usable: Size, tolerance: f64) -> bool {
    (size.width - usable.width).abs() < tolerance
        && (size.height - usable.height).abs() < tolerance
}

/// Compute the window's geometry on `destination`.
///
/// Maximized windows, and windows that would not fit the destination's
/// usable area, are sized to that area. Everything else keeps its size and
/// its proportional position, clamped to stay fully inside the usable area.
pub fn plan_relocation(
    current: &WindowGeometry,
    source: &Display,
    destination: &Display,
    reference_height: f64,
    tolerance: f64,
) -> GeometryResult<RelocationPlan> {
    let was_maximized = is_maximized(current.size, source.usable_bounds.size, tolerance);
    let maximize = was_maximized || !current.size.fits_within(destination.usable_bounds.size);
    let usable = destination.device_usable_bounds(reference_height);

    let target = if maximize {
        WindowGeometry::new(usable.origin, destination.usable_bounds.size)
    } else {
        let desktop_position = to_desktop_space(current.position, reference_height);
        let relative = to_relative(desktop_position, &source.bounds)?;
        let mapped = from_relative(relative, &destination.bounds);
        let position = to_device_space(mapped, reference_height);

        WindowGeometry::new(clamp_origin(position, current.size, &usable), current.size)
    };

    Ok(RelocationPlan {
        target,
        was_maximized,
        maximize,
    })
}
