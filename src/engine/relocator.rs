//! Relocation orchestration

use std::time::Duration;

use tracing::Level;

use crate::config::{Config, FeedbackConfig};
use crate::cursor::{AnimationOutcome, CursorAnimator};
use crate::feedback::HighlightStyle;
use crate::geometry::{from_relative, to_desktop_space, to_device_space, to_relative, Point};
use crate::platform::{Platform, PlatformResult};
use crate::screen::{Display, DisplayDirectory};
use crate::window::WindowRelocator;

use super::{Outcome, RelocationError, RelocationRequest, RelocationResult};

/// Handles relocation requests against a platform
pub struct Relocator {
    platform: Platform,
    animator: CursorAnimator,
    windows: WindowRelocator,
    duration: Duration,
    style: HighlightStyle,
    feedback: FeedbackConfig,
}

impl Relocator {
    pub fn new(platform: Platform, config: &Config) -> Self {
        Self {
            animator: CursorAnimator::new(platform.pointer.clone(), &config.animation),
            windows: WindowRelocator::new(platform.accessibility.clone(), config.window.clone()),
            duration: config.animation.duration(),
            style: HighlightStyle::from(&config.feedback),
            feedback: config.feedback.clone(),
            platform,
        }
    }

    /// Same platform, new settings. The animator keeps its in-flight slot,
    /// so a request handled after a reload still supersedes one started
    /// before it.
    pub fn reconfigured(&self, config: &Config) -> Self {
        Self {
            animator: self.animator.reconfigured(&config.animation),
            windows: WindowRelocator::new(
                self.platform.accessibility.clone(),
                config.window.clone(),
            ),
            duration: config.animation.duration(),
            style: HighlightStyle::from(&config.feedback),
            feedback: config.feedback.clone(),
            platform: self.platform.clone(),
        }
    }

    /// Handle one request. Failures are logged and reported as
    /// [`Outcome::Skipped`]; they never escape.
    pub async fn handle(&self, request: RelocationRequest) -> Outcome {
        match self.relocate(request).await {
            Ok(outcome) => {
                tracing::info!("Relocation to display {}: {:?}", request.display, outcome);
                outcome
            }
            Err(e) => {
                if e.severity() == Level::ERROR {
                    tracing::error!("Relocation to display {} failed: {}", request.display, e);
                } else {
                    tracing::warn!("Relocation to display {} skipped: {}", request.display, e);
                }
                Outcome::Skipped(e)
            }
        }
    }

    async fn relocate(&self, request: RelocationRequest) -> RelocationResult<Outcome> {
        // Fresh snapshot every time: display ids are not trusted across requests
        let directory = DisplayDirectory::enumerate(self.platform.displays.as_ref())?;
        if directory.is_empty() {
            return Err(RelocationError::NoDisplays);
        }

        let target = directory
            .find(request.display)
            .cloned()
            .ok_or(RelocationError::DisplayNotFound(request.display))?;

        if request.move_window {
            return self.move_window(&directory, &target).await;
        }

        // Any held button counts as mid-drag; drag events themselves are
        // only synthesized for the primary button
        if self.platform.pointer.is_any_button_down() {
            self.carry_drag(&directory, &target).await
        } else {
            self.jump_to_center(&directory, &target).await
        }
    }

    /// Move the cursor to the center of the target display
    async fn jump_to_center(
        &self,
        directory: &DisplayDirectory,
        target: &Display,
    ) -> RelocationResult<Outcome> {
        let reference_height = directory.reference_height();
        let destination = to_device_space(target.center(), reference_height);

        if self.animate_to(destination, reference_height).await == AnimationOutcome::Superseded {
            return Ok(Outcome::Superseded);
        }

        self.highlight(destination, reference_height);
        self.refocus(destination);

        Ok(Outcome::CursorMoved {
            display: target.id,
            target: destination,
        })
    }

    /// Mid-drag: keep the cursor's proportional position so whatever is
    /// being dragged lands in the same place on the new display
    async fn carry_drag(
        &self,
        directory: &DisplayDirectory,
        target: &Display,
    ) -> RelocationResult<Outcome> {
        let reference_height = directory.reference_height();
        let cursor = self.platform.pointer.location()?;
        let source = directory
            .display_at(cursor)
            .ok_or(RelocationError::CursorOffscreen)?;

        let relative = to_relative(cursor, &source.bounds)?;
        let destination = to_device_space(from_relative(relative, &target.bounds), reference_height);

        if self.animate_to(destination, reference_height).await == AnimationOutcome::Superseded {
            return Ok(Outcome::Superseded);
        }

        // No refocus: activating another application would end the drag
        self.highlight(destination, reference_height);

        Ok(Outcome::CursorMoved {
            display: target.id,
            target: destination,
        })
    }

    /// Move the frontmost window, then bring the cursor to its center
    async fn move_window(
        &self,
        directory: &DisplayDirectory,
        target: &Display,
    ) -> RelocationResult<Outcome> {
        let plan = self.windows.relocate(directory, target).await?;
        let reference_height = directory.reference_height();
        let center = plan.target.center();

        if self.animate_to(center, reference_height).await == AnimationOutcome::Completed {
            self.highlight(center, reference_height);
            self.refocus(center);
        }

        Ok(Outcome::WindowMoved {
            display: target.id,
            frame: plan.target.frame(),
            maximized: plan.maximize,
        })
    }

    async fn animate_to(&self, destination: Point, reference_height: f64) -> AnimationOutcome {
        let from = match self.platform.pointer.location() {
            Ok(location) => to_device_space(location, reference_height),
            Err(e) => {
                tracing::debug!("Cursor location unavailable ({}), warping directly", e);
                destination
            }
        };

        self.animator
            .smooth_move(from, destination, self.duration)
            .finished()
            .await
    }

    fn highlight(&self, at: Point, reference_height: f64) {
        if self.feedback.enabled {
            self.platform
                .highlighter
                .highlight(to_desktop_space(at, reference_height), &self.style);
        }
    }

    fn refocus(&self, at: Point) {
        if !self.feedback.refocus {
            return;
        }

        if let Err(e) = self.focus_at(at) {
            tracing::debug!("Refocus at ({:.0}, {:.0}) failed: {}", at.x, at.y, e);
        }
    }

    fn focus_at(&self, at: Point) -> PlatformResult<()> {
        let accessibility = &self.platform.accessibility;

        let Some(element) = accessibility.element_at(at)? else {
            tracing::debug!("No element under the cursor");
            return Ok(());
        };

        let pid = accessibility.owner_pid(element)?;
        accessibility.activate(pid)?;
        tracing::debug!("Focused process {}", pid);
        Ok(())
    }
}
