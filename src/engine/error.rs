//! Relocation errors
//!
//! None of these are fatal: each aborts only the relocation in progress and
//! ends up as a log line.

use thiserror::Error;
use tracing::Level;

use crate::geometry::GeometryError;
use crate::platform::PlatformError;
use crate::screen::DisplayId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelocationError {
    #[error("Display {0} is not attached")]
    DisplayNotFound(DisplayId),

    #[error("No displays attached")]
    NoDisplays,

    #[error("Cursor is not on any display")]
    CursorOffscreen,

    #[error("Frontmost application has no windows")]
    NoWindow,

    #[error("Window center is not on any display")]
    WindowOffscreen,

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

pub type RelocationResult<T> = Result<T, RelocationError>;

impl RelocationError {
    /// Log level for a relocation aborted by this error. Missing targets and
    /// refused permissions are expected and only abort the request;
    /// window-system failures are not.
    pub fn severity(&self) -> Level {
        match self {
            RelocationError::Platform(PlatformError::Platform(_)) => Level::ERROR,
            _ => Level::WARN,
        }
    }
}
