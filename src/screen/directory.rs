//! Display directory
//!
//! A snapshot of the attached displays taken at the start of a relocation
//! request. Snapshots are never cached across requests so a hot-plug event
//! between two hotkey presses cannot leave us holding a stale identifier.

use crate::geometry::Point;
use crate::platform::{DisplayProvider, PlatformResult};

use super::{Display, DisplayId};

/// Ordered list of displays, primary first
#[derive(Debug, Clone, Default)]
pub struct DisplayDirectory {
    displays: Vec<Display>,
}

impl DisplayDirectory {
    /// Enumerate the currently attached displays
    pub fn enumerate(provider: &dyn DisplayProvider) -> PlatformResult<Self> {
        let displays = provider.displays()?;
        tracing::debug!("Enumerated {} display(s)", displays.len());
        Ok(Self::from_displays(displays))
    }

    pub fn from_displays(displays: Vec<Display>) -> Self {
        Self { displays }
    }

    /// Displays in window-system enumeration order
    pub fn displays(&self) -> &[Display] {
        &self.displays
    }

    pub fn len(&self) -> usize {
        self.displays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.displays.is_empty()
    }

    /// The first-listed display
    pub fn primary(&self) -> Option<&Display> {
        self.displays.first()
    }

    /// Height of the first display's full bounds.
    ///
    /// This is the one reference used for every desktop/device flip, even
    /// for points on secondary displays.
    pub fn reference_height(&self) -> f64 {
        self.primary().map(|d| d.bounds.height()).unwrap_or(0.0)
    }

    /// Look up a display by identifier
    pub fn find(&self, id: DisplayId) -> Option<&Display> {
        self.displays.iter().find(|d| d.id == id)
    }

    /// The display whose full bounds contain a desktop-space point
    pub fn display_at(&self, point: Point) -> Option<&Display> {
        self.displays.iter().find(|d| d.bounds.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn dual() -> DisplayDirectory {
        DisplayDirectory::from_displays(vec![
            Display::new(
                69732928,
                "Primary",
                Rect::new(0.0, 0.0, 1920.0, 1080.0),
                Rect::new(0.0, 0.0, 1920.0, 1055.0),
            )
            .with_primary(true),
            Display::new(
                722475837,
                "Secondary",
                Rect::new(1920.0, 0.0, 1024.0, 768.0),
                Rect::new(1920.0, 0.0, 1024.0, 768.0),
            ),
        ])
    }

    #[test]
    fn test_reference_height_is_first_display() {
        assert_eq!(dual().reference_height(), 1080.0);
        assert_eq!(DisplayDirectory::default().reference_height(), 0.0);
    }

    #[test]
    fn test_find() {
        let directory = dual();
        assert_eq!(directory.find(DisplayId(722475837)).unwrap().name, "Secondary");
        assert!(directory.find(DisplayId(42)).is_none());
    }

    #[test]
    fn test_display_at() {
        let directory = dual();
        assert_eq!(
            directory.display_at(Point::new(100.0, 100.0)).unwrap().name,
            "Primary"
        );
        assert_eq!(
            directory.display_at(Point::new(2000.0, 700.0)).unwrap().name,
            "Secondary"
        );
        // Below the shorter secondary display: nobody owns this point
        assert!(directory.display_at(Point::new(2000.0, 900.0)).is_none());
    }
}
