//! Screen management module
//!
//! Handles:
//! - Display descriptions (identifier, full and usable bounds)
//! - Per-request display snapshots and lookups
//! - Choosing the reference height for desktop/device flips

mod directory;
mod display;

pub use directory::DisplayDirectory;
pub use display::{Display, DisplayId};
