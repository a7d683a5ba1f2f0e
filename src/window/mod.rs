//! Window module
//!
//! Moves the frontmost window between displays:
//! - classifies it as maximized or not against its current display
//! - plans the target frame on the destination display
//! - writes the frame back (size, then position) and verifies it stuck

mod plan;
mod relocator;

pub use plan::{is_maximized, plan_relocation, RelocationPlan, WindowGeometry};
pub use relocator::WindowRelocator;
