//! Fixed key table
//!
//! Bindings store a key as an index into this table, so its order is part
//! of the persisted format and must never change.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keys that can be bound to a display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Key {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Zero,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

/// Number of bindable keys
pub const KEY_COUNT: usize = 36;

/// Stored key index -> key
pub const KEY_TABLE: [Key; KEY_COUNT] = [
    Key::One,
    Key::Two,
    Key::Three,
    Key::Four,
    Key::Five,
    Key::Six,
    Key::Seven,
    Key::Eight,
    Key::Nine,
    Key::Zero,
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

impl Key {
    /// Key for a stored index; `None` when the index is out of range
    pub fn from_index(index: i64) -> Option<Key> {
        usize::try_from(index)
            .ok()
            .and_then(|i| KEY_TABLE.get(i).copied())
    }

    /// Position of this key in the table
    pub fn index(self) -> usize {
        // Declaration order matches KEY_TABLE
        self as usize
    }

    /// Character printed on the key cap
    pub fn as_char(self) -> char {
        const CHARS: &[u8; KEY_COUNT] = b"1234567890abcdefghijklmnopqrstuvwxyz";
        CHARS[self.index()] as char
    }

    /// Key for a character (case-insensitive)
    pub fn from_char(c: char) -> Option<Key> {
        let c = c.to_ascii_lowercase();
        KEY_TABLE.iter().copied().find(|k| k.as_char() == c)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char().to_ascii_uppercase())
    }
}
