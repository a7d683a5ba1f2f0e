//! Modifier keys

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Command,
    Shift,
    Option,
    Control,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Control,
        Modifier::Option,
        Modifier::Shift,
        Modifier::Command,
    ];

    fn bit(self) -> u8 {
        match self {
            Modifier::Command => 1 << 0,
            Modifier::Shift => 1 << 1,
            Modifier::Option => 1 << 2,
            Modifier::Control => 1 << 3,
        }
    }

    /// Bit used for this modifier in host event flags (and in stored bindings)
    pub fn event_flag(self) -> u64 {
        match self {
            Modifier::Shift => 1 << 17,
            Modifier::Control => 1 << 18,
            Modifier::Option => 1 << 19,
            Modifier::Command => 1 << 20,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Modifier::Command => "⌘",
            Modifier::Shift => "⇧",
            Modifier::Option => "⌥",
            Modifier::Control => "⌃",
        }
    }
}

impl FromStr for Modifier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cmd" | "command" => Ok(Modifier::Command),
            "shift" => Ok(Modifier::Shift),
            "opt" | "option" | "alt" => Ok(Modifier::Option),
            "ctrl" | "control" => Ok(Modifier::Control),
            other => Err(format!("unknown modifier '{}'", other)),
        }
    }
}

/// Set of modifiers held with a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierSet(u8);

impl ModifierSet {
    pub const EMPTY: ModifierSet = ModifierSet(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    pub fn of(modifiers: &[Modifier]) -> Self {
        modifiers.iter().fold(Self::EMPTY, |set, m| set.with(*m))
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) {
        self.0 |= modifier.bit();
    }

    pub fn remove(&mut self, modifier: Modifier) {
        self.0 &= !modifier.bit();
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        Modifier::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Decode host event flags; bits other than the four modifiers are ignored
    pub fn from_event_flags(flags: u64) -> Self {
        Modifier::ALL
            .into_iter()
            .filter(|m| flags & m.event_flag() != 0)
            .fold(Self::EMPTY, |set, m| set.with(m))
    }

    pub fn to_event_flags(&self) -> u64 {
        self.iter().fold(0, |flags, m| flags | m.event_flag())
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.iter() {
            write!(f, "{}", m.symbol())?;
        }
        Ok(())
    }
}

/// Comma-separated modifier names, e.g. `cmd,shift`. At least one is
/// required; bare keys are never hotkeys.
impl FromStr for ModifierSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let set = s
            .split(',')
            .filter(|name| !name.trim().is_empty())
            .map(Modifier::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(|modifiers| ModifierSet::of(&modifiers))?;

        if set.is_empty() {
            return Err("at least one modifier is required".to_string());
        }
        Ok(set)
    }
}

/// Which of a modifier's two physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Physical modifier keys currently held. Left and right keys are tracked
/// apart, so releasing one keeps the modifier active while the other is
/// still down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldModifiers {
    left: ModifierSet,
    right: ModifierSet,
}

impl HeldModifiers {
    pub fn press(&mut self, modifier: Modifier, side: Side) {
        self.side_mut(side).insert(modifier);
    }

    pub fn release(&mut self, modifier: Modifier, side: Side) {
        self.side_mut(side).remove(modifier);
    }

    pub fn current(&self) -> ModifierSet {
        ModifierSet(self.left.0 | self.right.0)
    }

    fn side_mut(&mut self, side: Side) -> &mut ModifierSet {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// Modifier that turns a binding into its "move window too" variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowMoveModifier {
    #[default]
    None,
    Control,
    Option,
    Command,
    Shift,
}

impl WindowMoveModifier {
    /// The modifier to add, or `None` when window moves are disabled
    pub fn modifier(self) -> Option<Modifier> {
        match self {
            WindowMoveModifier::None => None,
            WindowMoveModifier::Control => Some(Modifier::Control),
            WindowMoveModifier::Option => Some(Modifier::Option),
            WindowMoveModifier::Command => Some(Modifier::Command),
            WindowMoveModifier::Shift => Some(Modifier::Shift),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_flags_round_trip() {
        let set = ModifierSet::of(&[Modifier::Command, Modifier::Shift]);
        assert_eq!(set.to_event_flags(), (1 << 20) | (1 << 17));
        assert_eq!(ModifierSet::from_event_flags(set.to_event_flags()), set);
    }

    #[test]
    fn test_unknown_flag_bits_ignored() {
        // Caps lock (1 << 16) and device-dependent low bits
        let flags = (1 << 16) | 0x0100 | (1 << 19);
        assert_eq!(
            ModifierSet::from_event_flags(flags),
            ModifierSet::of(&[Modifier::Option])
        );
    }

    #[test]
    fn test_display_order() {
        let set = ModifierSet::of(&[Modifier::Command, Modifier::Control, Modifier::Shift]);
        assert_eq!(set.to_string(), "⌃⇧⌘");
        assert_eq!(ModifierSet::EMPTY.to_string(), "");
    }

    #[test]
    fn test_insert_remove() {
        let mut set = ModifierSet::new();
        set.insert(Modifier::Option);
        assert!(set.contains(Modifier::Option));
        set.remove(Modifier::Option);
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_modifier_list() {
        assert_eq!(
            "cmd,shift".parse::<ModifierSet>(),
            Ok(ModifierSet::of(&[Modifier::Command, Modifier::Shift]))
        );
        assert_eq!(
            "Control, alt".parse::<ModifierSet>(),
            Ok(ModifierSet::of(&[Modifier::Control, Modifier::Option]))
        );
        assert!("cmd,hyper".parse::<ModifierSet>().is_err());
        assert!("".parse::<ModifierSet>().is_err());
        assert!(",".parse::<ModifierSet>().is_err());
    }

    #[test]
    fn test_held_modifiers_track_sides() {
        let mut held = HeldModifiers::default();
        held.press(Modifier::Shift, Side::Left);
        held.press(Modifier::Shift, Side::Right);
        held.press(Modifier::Command, Side::Left);

        // Right shift up, left shift still down
        held.release(Modifier::Shift, Side::Right);
        assert_eq!(
            held.current(),
            ModifierSet::of(&[Modifier::Command, Modifier::Shift])
        );

        held.release(Modifier::Shift, Side::Left);
        assert_eq!(held.current(), ModifierSet::of(&[Modifier::Command]));

        // A release without a matching press changes nothing
        held.release(Modifier::Command, Side::Right);
        assert_eq!(held.current(), ModifierSet::of(&[Modifier::Command]));
    }

    #[test]
    fn test_window_move_modifier() {
        assert_eq!(WindowMoveModifier::default(), WindowMoveModifier::None);
        assert_eq!(WindowMoveModifier::None.modifier(), None);
        assert_eq!(WindowMoveModifier::Option.modifier(), Some(Modifier::Option));

        let parsed: WindowMoveModifier = serde_json::from_str("\"command\"").unwrap();
        assert_eq!(parsed, WindowMoveModifier::Command);
    }
}
