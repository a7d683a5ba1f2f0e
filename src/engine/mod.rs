//! Relocation engine
//!
//! Turns a fired hotkey into cursor (and optionally window) movement:
//! - resolves the target display from a fresh display snapshot
//! - picks the center-jump, drag-carry or window-move path
//! - animates the cursor, then highlights and refocuses
//!
//! [`AppContext`] owns everything the engine needs for the lifetime of the
//! process.

mod context;
mod error;
mod relocator;

pub use context::AppContext;
pub use error::{RelocationError, RelocationResult};
pub use relocator::Relocator;

use crate::geometry::{Point, Rect};
use crate::screen::DisplayId;

/// What a fired hotkey asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocationRequest {
    /// Display to move to
    pub display: DisplayId,
    /// Move the frontmost window along with the cursor
    pub move_window: bool,
}

impl RelocationRequest {
    pub fn cursor(display: DisplayId) -> Self {
        Self {
            display,
            move_window: false,
        }
    }

    pub fn window(display: DisplayId) -> Self {
        Self {
            display,
            move_window: true,
        }
    }
}

/// Result of handling a request
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The cursor landed on `target` (device space)
    CursorMoved { display: DisplayId, target: Point },
    /// The frontmost window now occupies `frame` (device space)
    WindowMoved {
        display: DisplayId,
        frame: Rect,
        maximized: bool,
    },
    /// A newer request took over the cursor before this one finished
    Superseded,
    /// Nothing happened
    Skipped(RelocationError),
}
