//! Hotkey module - global key chords mapped to displays
//!
//! This module provides:
//! - The fixed key table and modifier sets used by stored bindings
//! - The registry that maps chords to relocation requests
//! - Global key capture that delivers pressed chords

mod keys;
mod modifiers;
mod registry;

#[cfg(target_os = "macos")]
mod macos;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use keys::Key;
pub use modifiers::{Modifier, ModifierSet, WindowMoveModifier};
pub use registry::{HotkeyBinding, HotkeyRegistry};

#[cfg(target_os = "macos")]
pub use macos::MacOSKeyCapture;

/// Errors that can occur during key capture
#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Not supported on this platform")]
    NotSupported,

    #[error("Key capture already started")]
    AlreadyStarted,

    #[error("Key capture not started")]
    NotStarted,
}

pub type HotkeyResult<T> = Result<T, HotkeyError>;

/// A key pressed together with a set of modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: ModifierSet,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: ModifierSet) -> Self {
        Self { key, modifiers }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.modifiers, self.key)
    }
}

/// Global key capture
#[async_trait]
pub trait KeyCapture: Send + Sync {
    /// Start capturing; every key-down of a bindable key is delivered
    /// together with the modifiers held at that moment
    async fn start(&mut self) -> HotkeyResult<mpsc::Receiver<KeyChord>>;

    /// Stop delivering chords
    async fn stop(&mut self) -> HotkeyResult<()>;

    /// Check if capture is currently active
    fn is_capturing(&self) -> bool;
}

/// Key capture backed by the host window system
#[cfg(target_os = "macos")]
pub fn native_capture() -> HotkeyResult<Box<dyn KeyCapture>> {
    Ok(Box::new(MacOSKeyCapture::new()))
}

#[cfg(not(target_os = "macos"))]
pub fn native_capture() -> HotkeyResult<Box<dyn KeyCapture>> {
    Err(HotkeyError::NotSupported)
}
