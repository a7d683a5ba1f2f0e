//! Platform trait definitions
//!
//! Defines the window-system services the relocation engine consumes.
//! Platform-specific implementations provide them; tests use in-memory
//! fakes.

use thiserror::Error;

use crate::geometry::{Point, Size};
use crate::screen::Display;

/// Errors reported by the window system
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Attribute not supported: {0}")]
    AttributeUnsupported(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Not supported on this platform")]
    NotSupported,
}

pub type PlatformResult<T> = Result<T, PlatformError>;

/// Process identifier of a running application
pub type ProcessId = i32;

/// Handle to a window of the frontmost application.
///
/// Handles are tokens issued by an [`AccessibilityBridge`] and are only
/// valid until the next call to [`AccessibilityBridge::frontmost_windows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// Handle to an arbitrary UI element (e.g. the one under the cursor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// Enumerates attached displays
pub trait DisplayProvider: Send + Sync {
    /// Displays in window-system order, primary first
    fn displays(&self) -> PlatformResult<Vec<Display>>;
}

/// Cursor state and cursor/input primitives
pub trait PointerDevice: Send + Sync {
    /// Current cursor location in desktop space
    fn location(&self) -> PlatformResult<Point>;

    /// Whether the primary mouse button is currently held
    fn is_primary_button_down(&self) -> bool;

    /// Whether any mouse button is currently held
    fn is_any_button_down(&self) -> bool;

    /// Move the cursor to a device-space point.
    ///
    /// Never requires elevated permissions.
    fn warp(&self, to: Point) -> PlatformResult<()>;

    /// Synthesize a primary-button drag event at a device-space point.
    ///
    /// Requires input synthesis permission; fails with
    /// [`PlatformError::PermissionDenied`] without it.
    fn post_drag(&self, at: Point) -> PlatformResult<()>;
}

/// Accessibility bridge used to read and write window geometry
pub trait AccessibilityBridge: Send + Sync {
    /// Whether the process has been granted accessibility access
    fn is_trusted(&self) -> bool;

    /// Windows of the frontmost application, frontmost first
    fn frontmost_windows(&self) -> PlatformResult<Vec<WindowHandle>>;

    /// Window position (top-left corner, device space)
    fn window_position(&self, window: WindowHandle) -> PlatformResult<Point>;

    /// Window size
    fn window_size(&self, window: WindowHandle) -> PlatformResult<Size>;

    fn set_window_position(&self, window: WindowHandle, position: Point) -> PlatformResult<()>;

    fn set_window_size(&self, window: WindowHandle, size: Size) -> PlatformResult<()>;

    /// The UI element at a device-space point, if any
    fn element_at(&self, point: Point) -> PlatformResult<Option<ElementHandle>>;

    /// Owning process of an element
    fn owner_pid(&self, element: ElementHandle) -> PlatformResult<ProcessId>;

    /// Bring an application to the front
    fn activate(&self, pid: ProcessId) -> PlatformResult<()>;
}
