//! Window relocation through the accessibility bridge

use std::sync::Arc;

use crate::config::WindowConfig;
use crate::engine::{RelocationError, RelocationResult};
use crate::geometry::to_desktop_space;
use crate::platform::{AccessibilityBridge, WindowHandle};
use crate::screen::{Display, DisplayDirectory};

use super::{plan_relocation, RelocationPlan, WindowGeometry};

/// Moves the frontmost window to another display
pub struct WindowRelocator {
    accessibility: Arc<dyn AccessibilityBridge>,
    config: WindowConfig,
}

impl WindowRelocator {
    pub fn new(accessibility: Arc<dyn AccessibilityBridge>, config: WindowConfig) -> Self {
        Self {
            accessibility,
            config,
        }
    }

    /// Move the first window of the frontmost application onto `destination`
    pub async fn relocate(
        &self,
        directory: &DisplayDirectory,
        destination: &Display,
    ) -> RelocationResult<RelocationPlan> {
        let windows = self.accessibility.frontmost_windows()?;
        let window = *windows.first().ok_or(RelocationError::NoWindow)?;
        tracing::debug!("Frontmost application has {} window(s)", windows.len());

        let current = WindowGeometry::new(
            self.accessibility.window_position(window)?,
            self.accessibility.window_size(window)?,
        );

        let reference_height = directory.reference_height();
        let center = to_desktop_space(current.center(), reference_height);
        let source = directory
            .display_at(center)
            .ok_or(RelocationError::WindowOffscreen)?;

        let plan = plan_relocation(
            &current,
            source,
            destination,
            reference_height,
            self.config.maximize_tolerance,
        )?;

        tracing::debug!(
            "Window {:?} on display {} -> {:?} on display {} (maximized: {}, maximize: {})",
            current.frame(),
            source.id,
            plan.target.frame(),
            destination.id,
            plan.was_maximized,
            plan.maximize
        );

        self.apply(window, &plan.target).await?;

        if plan.maximize {
            // Some applications re-adjust their frame shortly after an
            // external resize; a second pass puts it back
            tokio::time::sleep(self.config.reapply_delay()).await;
            self.apply(window, &plan.target).await?;
        }

        Ok(plan)
    }

    /// Write size then position, re-reading both and retrying until they
    /// stick or the attempt budget runs out
    async fn apply(&self, window: WindowHandle, target: &WindowGeometry) -> RelocationResult<()> {
        let attempts = self.config.max_write_attempts.max(1);

        for attempt in 1..=attempts {
            // Size first: resizing after a move makes some window managers
            // recenter the window
            self.accessibility.set_window_size(window, target.size)?;
            tokio::time::sleep(self.config.settle_delay()).await;
            self.accessibility.set_window_position(window, target.position)?;

            if self.is_applied(window, target) {
                return Ok(());
            }

            if attempt < attempts {
                tracing::debug!("Window geometry not applied yet, retry {}/{}", attempt, attempts - 1);
                tokio::time::sleep(self.config.settle_delay()).await;
            }
        }

        tracing::debug!(
            "Window geometry not confirmed after {} attempt(s); leaving it to the application",
            attempts
        );
        Ok(())
    }

    fn is_applied(&self, window: WindowHandle, target: &WindowGeometry) -> bool {
        let tolerance = self.config.position_tolerance;

        let (position, size) = match (
            self.accessibility.window_position(window),
            self.accessibility.window_size(window),
        ) {
            (Ok(position), Ok(size)) => (position, size),
            // Nothing to compare against; trust the write
            _ => return true,
        };

        (position.x - target.position.x).abs() <= tolerance
            && (position.y - target.position.y).abs() <= tolerance
            && (size.width - target.size.width).abs() <= tolerance
            && (size.height - target.size.height).abs() <= tolerance
    }
}
