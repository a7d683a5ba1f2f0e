//! Display descriptions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Opaque display identifier.
///
/// Stable per physical output for the session, but only trusted within a
/// single relocation request: displays can be unplugged at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(pub u32);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An attached display
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    /// Identifier reported by the window system
    pub id: DisplayId,
    /// Human-readable name
    pub name: String,
    /// Full frame in desktop space
    pub bounds: Rect,
    /// Frame minus the menu bar and dock, in desktop space
    pub usable_bounds: Rect,
    /// Built into the machine (laptop panel)
    pub built_in: bool,
    /// Carries the menu bar; its height is the global flip reference
    pub primary: bool,
}

impl Display {
    pub fn new(id: u32, name: impl Into<String>, bounds: Rect, usable_bounds: Rect) -> Self {
        Self {
            id: DisplayId(id),
            name: name.into(),
            bounds,
            usable_bounds,
            built_in: false,
            primary: false,
        }
    }

    pub fn with_built_in(mut self, built_in: bool) -> Self {
        self.built_in = built_in;
        self
    }

    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }

    /// Center of the full bounds, in desktop space
    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Full bounds in device space
    pub fn device_bounds(&self, reference_height: f64) -> Rect {
        self.bounds.flipped(reference_height)
    }

    /// Usable bounds in device space
    pub fn device_usable_bounds(&self, reference_height: f64) -> Rect {
        self.usable_bounds.flipped(reference_height)
    }

    /// Label used in listings, e.g. `Studio Display (2560x1440) [Main]`
    pub fn label(&self) -> String {
        let mut tags = Vec::new();
        if self.built_in {
            tags.push("Built-in");
        }
        if self.primary {
            tags.push("Main");
        }

        let size = format!("{}x{}", self.bounds.width() as i64, self.bounds.height() as i64);
        if tags.is_empty() {
            format!("{} ({})", self.name, size)
        } else {
            format!("{} ({}) [{}]", self.name, size, tags.join(", "))
        }
    }
}
