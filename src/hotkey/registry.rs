//! Hotkey registry
//!
//! Maps key chords to relocation requests. The registry is rebuilt
//! wholesale whenever bindings or the window-move modifier change.

use std::collections::HashMap;

use crate::engine::RelocationRequest;
use crate::screen::DisplayId;

use super::{Key, KeyChord, ModifierSet, WindowMoveModifier};

/// A key chord bound to a display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub display: DisplayId,
    pub key: Key,
    pub modifiers: ModifierSet,
}

impl HotkeyBinding {
    pub fn new(display: DisplayId, key: Key, modifiers: ModifierSet) -> Self {
        Self {
            display,
            key,
            modifiers,
        }
    }

    /// Chord that moves only the cursor
    pub fn chord(&self) -> KeyChord {
        KeyChord::new(self.key, self.modifiers)
    }

    /// Chord that also moves the frontmost window, if window moves are enabled
    pub fn window_chord(&self, window_modifier: WindowMoveModifier) -> Option<KeyChord> {
        window_modifier
            .modifier()
            .map(|m| KeyChord::new(self.key, self.modifiers.with(m)))
    }
}

/// Registered chords
#[derive(Debug, Default)]
pub struct HotkeyRegistry {
    actions: HashMap<KeyChord, RelocationRequest>,
}

impl HotkeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every binding plus its window-move variant
    pub fn from_bindings(bindings: &[HotkeyBinding], window_modifier: WindowMoveModifier) -> Self {
        let mut registry = Self::new();

        for binding in bindings {
            registry.register(binding.chord(), RelocationRequest::cursor(binding.display));

            if let Some(chord) = binding.window_chord(window_modifier) {
                registry.register(chord, RelocationRequest::window(binding.display));
            }
        }

        tracing::debug!(
            "Registered {} hotkey(s) for {} binding(s)",
            registry.len(),
            bindings.len()
        );
        registry
    }

    /// Register a chord. A chord that is already registered is replaced:
    /// the last registration wins.
    pub fn register(&mut self, chord: KeyChord, request: RelocationRequest) {
        if let Some(previous) = self.actions.insert(chord, request) {
            tracing::warn!(
                "Hotkey {} was bound to display {}, now bound to display {}",
                chord,
                previous.display,
                request.display
            );
        }
    }

    /// Action for a pressed chord
    pub fn lookup(&self, chord: &KeyChord) -> Option<RelocationRequest> {
        self.actions.get(chord).copied()
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registrations sorted by key then modifiers, for listings
    pub fn entries(&self) -> Vec<(KeyChord, RelocationRequest)> {
        let mut entries: Vec<_> = self.actions.iter().map(|(c, r)| (*c, *r)).collect();
        entries.sort_by_key(|(chord, _)| (chord.key, chord.modifiers.to_event_flags()));
        entries
    }
}
