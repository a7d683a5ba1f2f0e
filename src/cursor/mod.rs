//! Cursor module
//!
//! Animated cursor movement between points in device space.

mod animator;

pub use animator::{ease_out_cubic, interpolate, Animation, AnimationOutcome, CursorAnimator};
