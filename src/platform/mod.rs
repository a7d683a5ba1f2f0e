//! Platform module - window-system services
//!
//! This module provides abstractions for:
//! - Enumerating displays
//! - Reading the cursor and warping it, synthesizing drag events
//! - Reading and writing window geometry through the accessibility layer
//! - Showing the transient cursor highlight

mod traits;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(test)]
pub mod fake;

use std::sync::Arc;

pub use traits::*;

use crate::feedback::Highlighter;

#[cfg(target_os = "macos")]
pub use macos::{
    is_process_trusted, MacOSAccessibility, MacOSDisplays, MacOSHighlighter, MacOSPointer,
};

/// The set of window-system services the engine runs against
#[derive(Clone)]
pub struct Platform {
    pub displays: Arc<dyn DisplayProvider>,
    pub pointer: Arc<dyn PointerDevice>,
    pub accessibility: Arc<dyn AccessibilityBridge>,
    pub highlighter: Arc<dyn Highlighter>,
}

impl Platform {
    /// Services backed by the host window system
    #[cfg(target_os = "macos")]
    pub fn native() -> PlatformResult<Self> {
        Ok(Self {
            displays: Arc::new(MacOSDisplays::new()),
            pointer: Arc::new(MacOSPointer::new()),
            accessibility: Arc::new(MacOSAccessibility::new()),
            highlighter: Arc::new(MacOSHighlighter::new()),
        })
    }

    #[cfg(not(target_os = "macos"))]
    pub fn native() -> PlatformResult<Self> {
        Err(PlatformError::NotSupported)
    }
}

/// Get the current platform name
pub fn platform_name() -> &'static str {
    #[cfg(target_os = "macos")]
    return "macOS";

    #[cfg(target_os = "linux")]
    return "Linux";

    #[cfg(target_os = "windows")]
    return "Windows";

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return "Unknown";
}
