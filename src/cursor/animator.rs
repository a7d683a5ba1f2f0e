//! Smooth cursor movement
//!
//! Moves the cursor along an ease-out-cubic curve by warping it on a
//! periodic ticker. At most one animation runs at a time: starting a new one
//! cancels the one in flight.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::AnimationConfig;
use crate::geometry::Point;
use crate::platform::{PlatformError, PointerDevice};

/// `1 - (1 - t)^3`, with `t` clamped to `[0, 1]`
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Point at eased progress `progress` between `from` and `to`
pub fn interpolate(from: Point, to: Point, progress: f64) -> Point {
    Point::new(
        from.x + (to.x - from.x) * progress,
        from.y + (to.y - from.y) * progress,
    )
}

/// How an animation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The cursor reached the requested endpoint
    Completed,
    /// A newer animation took over before this one finished
    Superseded,
}

/// Handle to a running animation.
///
/// Resolves exactly once, when the animation completes or is superseded.
#[derive(Debug)]
pub struct Animation {
    done: oneshot::Receiver<AnimationOutcome>,
}

impl Animation {
    /// Wait for the animation to end
    pub async fn finished(self) -> AnimationOutcome {
        // The task only drops its sender without sending when the runtime
        // shuts down, which is as good as being superseded
        self.done.await.unwrap_or(AnimationOutcome::Superseded)
    }
}

type InFlight = Arc<Mutex<Option<CancellationToken>>>;

/// Drives the cursor along animated paths
pub struct CursorAnimator {
    pointer: Arc<dyn PointerDevice>,
    tick: Duration,
    follow_drag: bool,
    in_flight: InFlight,
}

impl CursorAnimator {
    pub fn new(pointer: Arc<dyn PointerDevice>, config: &AnimationConfig) -> Self {
        Self {
            pointer,
            tick: config.tick(),
            follow_drag: config.follow_drag,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Same cursor, new settings. The result shares the in-flight slot with
    /// `self`, so an animation started through either one stops the other's.
    pub fn reconfigured(&self, config: &AnimationConfig) -> Self {
        Self {
            pointer: self.pointer.clone(),
            tick: config.tick(),
            follow_drag: config.follow_drag,
            in_flight: self.in_flight.clone(),
        }
    }

    /// Animate the cursor from `from` to `to` (device space) over `duration`.
    ///
    /// Returns immediately; the animation runs on the current runtime. Any
    /// animation still in flight is stopped first.
    pub fn smooth_move(&self, from: Point, to: Point, duration: Duration) -> Animation {
        let token = CancellationToken::new();
        if let Ok(mut slot) = self.in_flight.lock() {
            if let Some(previous) = slot.replace(token.clone()) {
                previous.cancel();
            }
        }

        let (tx, rx) = oneshot::channel();
        let run = AnimationRun {
            pointer: self.pointer.clone(),
            from,
            to,
            duration,
            tick: self.tick,
            follow_drag: self.follow_drag,
        };

        tokio::spawn(async move {
            let outcome = run.drive(token).await;
            let _ = tx.send(outcome);
        });

        Animation { done: rx }
    }
}

struct AnimationRun {
    pointer: Arc<dyn PointerDevice>,
    from: Point,
    to: Point,
    duration: Duration,
    tick: Duration,
    follow_drag: bool,
}

impl AnimationRun {
    async fn drive(self, token: CancellationToken) -> AnimationOutcome {
        tracing::debug!(
            "Animating cursor ({:.1}, {:.1}) -> ({:.1}, {:.1}) over {:?}",
            self.from.x,
            self.from.y,
            self.to.x,
            self.to.y,
            self.duration
        );

        let start = Instant::now();
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("Cursor animation superseded");
                    return AnimationOutcome::Superseded;
                }
                _ = ticker.tick() => {}
            }

            let elapsed = start.elapsed();
            if elapsed >= self.duration {
                break;
            }

            let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
            self.step(interpolate(self.from, self.to, ease_out_cubic(t)));
        }

        // Land exactly on the endpoint rather than the last interpolated point
        self.step(self.to);
        AnimationOutcome::Completed
    }

    fn step(&self, point: Point) {
        if let Err(e) = self.pointer.warp(point) {
            tracing::debug!("Cursor warp failed: {}", e);
        }

        if self.follow_drag && self.pointer.is_primary_button_down() {
            match self.pointer.post_drag(point) {
                Ok(()) => {}
                Err(PlatformError::PermissionDenied(_)) => {
                    tracing::trace!("Drag event not delivered: input synthesis not permitted");
                }
                Err(e) => tracing::debug!("Drag event failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakeDesktop;

    fn animator(desktop: &Arc<FakeDesktop>) -> CursorAnimator {
        CursorAnimator::new(desktop.clone(), &AnimationConfig::default())
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert_eq!(ease_out_cubic(-1.0), 0.0);
    }

    #[test]
    fn test_interpolate() {
        let p = interpolate(Point::new(0.0, 100.0), Point::new(200.0, 0.0), 0.25);
        assert_eq!(p, Point::new(50.0, 75.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ends_exactly_at_target() {
        let desktop = FakeDesktop::dual();
        let animator = animator(&desktop);
        let to = Point::new(2432.123456789, 696.987654321);

        let outcome = animator
            .smooth_move(Point::new(10.0, 10.0), to, Duration::from_millis(250))
            .finished()
            .await;

        assert_eq!(outcome, AnimationOutcome::Completed);
        let warps = desktop.warps();
        assert!(warps.len() > 2, "expected intermediate frames, got {:?}", warps);
        assert_eq!(*warps.last().unwrap(), to);
    }

    #[tokio::test(start_paused = true)]
    async fn test_path_is_monotonic() {
        let desktop = FakeDesktop::dual();
        let animator = animator(&desktop);

        animator
            .smooth_move(Point::new(0.0, 0.0), Point::new(1000.0, 0.0), Duration::from_millis(300))
            .finished()
            .await;

        let xs: Vec<f64> = desktop.warps().iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_duration_completes_once() {
        let desktop = FakeDesktop::dual();
        let animator = animator(&desktop);
        let to = Point::new(5.0, 6.0);

        let outcome = animator
            .smooth_move(Point::new(0.0, 0.0), to, Duration::ZERO)
            .finished()
            .await;

        assert_eq!(outcome, AnimationOutcome::Completed);
        assert_eq!(desktop.warps(), vec![to]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_move_supersedes_previous() {
        let desktop = FakeDesktop::dual();
        let animator = animator(&desktop);

        let first = animator.smooth_move(
            Point::new(0.0, 0.0),
            Point::new(1000.0, 1000.0),
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        let second_target = Point::new(-500.0, 40.0);
        let second = animator.smooth_move(
            Point::new(0.0, 0.0),
            second_target,
            Duration::from_millis(200),
        );

        assert_eq!(first.finished().await, AnimationOutcome::Superseded);
        assert_eq!(second.finished().await, AnimationOutcome::Completed);

        // Let the superseded ticker prove it no longer warps
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*desktop.warps().last().unwrap(), second_target);
        assert!(!desktop.warps().contains(&Point::new(1000.0, 1000.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigured_animator_supersedes_original() {
        let desktop = FakeDesktop::dual();
        let original = animator(&desktop);

        let first = original.smooth_move(
            Point::new(0.0, 0.0),
            Point::new(1000.0, 1000.0),
            Duration::from_secs(1),
        );
        tokio::time::sleep(Duration::from_millis(100)).await;

        let config = AnimationConfig {
            tick_ms: 8,
            ..AnimationConfig::default()
        };
        let updated = original.reconfigured(&config);
        let second = updated.smooth_move(
            Point::new(0.0, 0.0),
            Point::new(20.0, 20.0),
            Duration::from_millis(100),
        );

        assert_eq!(first.finished().await, AnimationOutcome::Superseded);
        assert_eq!(second.finished().await, AnimationOutcome::Completed);
        assert_eq!(updated.tick, Duration::from_millis(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_follows_path_when_button_held() {
        let desktop = FakeDesktop::dual();
        desktop.set_button_down(true);
        let animator = animator(&desktop);
        let to = Point::new(300.0, 300.0);

        animator
            .smooth_move(Point::new(0.0, 0.0), to, Duration::from_millis(100))
            .finished()
            .await;

        let drags = desktop.drags();
        assert_eq!(drags.len(), desktop.warps().len());
        assert_eq!(*drags.last().unwrap(), to);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_denied_still_moves_cursor() {
        let desktop = FakeDesktop::dual();
        desktop.set_button_down(true);
        desktop.set_trusted(false);
        let animator = animator(&desktop);
        let to = Point::new(300.0, 300.0);

        let outcome = animator
            .smooth_move(Point::new(0.0, 0.0), to, Duration::from_millis(100))
            .finished()
            .await;

        assert_eq!(outcome, AnimationOutcome::Completed);
        assert!(desktop.drags().is_empty());
        assert_eq!(*desktop.warps().last().unwrap(), to);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_drag_when_button_released() {
        let desktop = FakeDesktop::dual();
        let animator = animator(&desktop);

        animator
            .smooth_move(Point::new(0.0, 0.0), Point::new(10.0, 10.0), Duration::from_millis(50))
            .finished()
            .await;

        assert!(desktop.drags().is_empty());
    }
}
