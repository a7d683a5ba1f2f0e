//! Hotkey binding persistence
//!
//! Bindings are stored as an ordered JSON array of
//! `{ "displayID", "keyCode", "modifiers" }` records, where `keyCode` is an
//! index into the fixed key table and `modifiers` carries host event-flag
//! bits. A missing or unreadable store falls back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::hotkey::{HotkeyBinding, Key, Modifier, ModifierSet};
use crate::screen::{Display, DisplayId};

use super::ConfigResult;

/// Number of displays that get a default binding
const DEFAULT_BINDING_COUNT: usize = 3;

/// A binding as persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBinding {
    #[serde(rename = "displayID")]
    pub display_id: u32,
    #[serde(rename = "keyCode")]
    pub key_code: i64,
    pub modifiers: u64,
}

impl StoredBinding {
    /// Decode into a binding; `None` when the key index is out of range
    pub fn to_binding(&self) -> Option<HotkeyBinding> {
        let key = Key::from_index(self.key_code)?;
        Some(HotkeyBinding::new(
            DisplayId(self.display_id),
            key,
            ModifierSet::from_event_flags(self.modifiers),
        ))
    }
}

impl From<&HotkeyBinding> for StoredBinding {
    fn from(binding: &HotkeyBinding) -> Self {
        Self {
            display_id: binding.display.0,
            key_code: binding.key.index() as i64,
            modifiers: binding.modifiers.to_event_flags(),
        }
    }
}

/// File-backed binding store
#[derive(Debug, Clone)]
pub struct BindingStore {
    path: PathBuf,
}

impl BindingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored bindings.
    ///
    /// Returns `None` when nothing usable is stored: the file is missing,
    /// unreadable, or does not decode. Callers treat all three the same way.
    pub fn load(&self) -> Option<Vec<StoredBinding>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored bindings at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<StoredBinding>>(&contents) {
            Ok(stored) => {
                tracing::debug!("Loaded {} stored binding(s)", stored.len());
                Some(stored)
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring malformed bindings in {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Persist bindings, replacing whatever is stored
    pub fn save(&self, bindings: &[HotkeyBinding]) -> ConfigResult<()> {
        let stored: Vec<StoredBinding> = bindings.iter().map(StoredBinding::from).collect();
        let contents = serde_json::to_string_pretty(&stored)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    /// Forget stored bindings so the defaults apply again
    pub fn clear(&self) -> ConfigResult<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Effective bindings for the given displays
    pub fn resolve(&self, displays: &[Display]) -> Vec<HotkeyBinding> {
        resolve_bindings(self.load(), displays)
    }
}

/// Turn stored records into bindings, falling back to the defaults when
/// nothing is stored. Records with an out-of-range key index are skipped.
pub fn resolve_bindings(
    stored: Option<Vec<StoredBinding>>,
    displays: &[Display],
) -> Vec<HotkeyBinding> {
    let Some(stored) = stored else {
        return default_bindings(displays);
    };

    stored
        .iter()
        .filter_map(|record| {
            let binding = record.to_binding();
            if binding.is_none() {
                tracing::warn!(
                    "Skipping binding for display {}: key index {} out of range",
                    record.display_id,
                    record.key_code
                );
            }
            binding
        })
        .collect()
}

/// Command-Shift-1/2/3 on the first three displays, in enumeration order
pub fn default_bindings(displays: &[Display]) -> Vec<HotkeyBinding> {
    let modifiers = ModifierSet::of(&[Modifier::Command, Modifier::Shift]);

    displays
        .iter()
        .take(DEFAULT_BINDING_COUNT)
        .enumerate()
        .filter_map(|(index, display)| {
            Key::from_index(index as i64).map(|key| HotkeyBinding::new(display.id, key, modifiers))
        })
        .collect()
}
