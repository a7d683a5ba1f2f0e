//! Visual feedback
//!
//! A short-lived ring drawn around the cursor after it lands on a new
//! display. The overlay ignores input, sits above regular windows and
//! disposes itself when its animation ends. Rendering is best effort:
//! implementations log failures and never report them to the caller.

use std::time::Duration;

use crate::config::FeedbackConfig;
use crate::cursor::ease_out_cubic;
use crate::geometry::{Point, Rect};

/// Scale of the ring when the animation starts
pub const START_SCALE: f64 = 0.5;
/// Scale of the ring when the animation ends
pub const END_SCALE: f64 = 1.5;

/// Size and timing of the highlight ring
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    /// Ring diameter at scale 1.0
    pub diameter: f64,
    /// Stroke width of the ring
    pub ring_width: f64,
    pub duration: Duration,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::from(&FeedbackConfig::default())
    }
}

impl From<&FeedbackConfig> for HighlightStyle {
    fn from(config: &FeedbackConfig) -> Self {
        Self {
            diameter: config.ring_diameter,
            ring_width: config.ring_width,
            duration: Duration::from_millis(config.duration_ms),
        }
    }
}

impl HighlightStyle {
    /// Overlay frame (desktop space) centred on `center`, large enough for
    /// the ring at its final scale.
    pub fn panel_rect(&self, center: Point) -> Rect {
        let side = self.diameter * END_SCALE + self.ring_width * 2.0;
        Rect::new(center.x - side / 2.0, center.y - side / 2.0, side, side)
    }

    /// Animation state after `elapsed`
    pub fn frame_at(&self, elapsed: Duration) -> HighlightFrame {
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        HighlightFrame::at(progress)
    }
}

/// Scale and opacity of the ring at one point of the animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightFrame {
    pub scale: f64,
    pub opacity: f64,
}

impl HighlightFrame {
    /// Frame at linear progress `t` (0.0 to 1.0), eased out
    pub fn at(t: f64) -> Self {
        let eased = ease_out_cubic(t);
        Self {
            scale: START_SCALE + (END_SCALE - START_SCALE) * eased,
            opacity: 1.0 - eased,
        }
    }
}

/// Renders the highlight ring
pub trait Highlighter: Send + Sync {
    /// Show the ring centred on a desktop-space point
    fn highlight(&self, at: Point, style: &HighlightStyle);
}
