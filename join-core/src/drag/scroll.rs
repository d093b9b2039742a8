//! Edge auto-scroll while a card is held near the top or bottom of the
//! viewport.

use tracing::trace;

use super::surface::{FrameHandle, Surface};

/// Edge zone and speed limit of auto-scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollConfig {
    /// Height of the band at each edge that triggers scrolling (default: 200).
    pub edge_zone: f64,
    /// Scroll distance per frame at the very edge (default: 15).
    pub max_speed: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            edge_zone: 200.0,
            max_speed: 15.0,
        }
    }
}

/// Scroll velocity for a pointer at height `y` in a viewport of `viewport`.
///
/// Negative inside the top zone, positive inside the bottom zone, zero in
/// between. Linear in penetration depth and floored, so `y = 50` with a
/// 200 zone and speed 15 gives `-11`. The top zone wins when the zones
/// overlap on short viewports.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn scroll_speed(y: f64, viewport: f64, config: &ScrollConfig) -> i32 {
    let zone = config.edge_zone;
    if zone <= 0.0 {
        return 0;
    }
    let limit = viewport - zone;
    if y < zone {
        let depth = ((zone - y) / zone).min(1.0);
        -((depth * config.max_speed).floor() as i32)
    } else if y > limit {
        let depth = ((y - limit) / zone).min(1.0);
        (depth * config.max_speed).floor() as i32
    } else {
        0
    }
}

/// Self-rescheduling scroll loop.
///
/// Holds at most one pending frame. The frame is cancelled the moment the
/// velocity returns to zero and on [`stop`](Self::stop).
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AutoScroll {
    velocity: i32,
    frame: Option<FrameHandle>,
}

impl AutoScroll {
    /// A stopped loop.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            velocity: 0,
            frame: None,
        }
    }

    /// Current velocity in units per frame.
    #[must_use]
    pub const fn velocity(&self) -> i32 {
        self.velocity
    }

    /// The pending frame, if the loop is running.
    #[must_use]
    pub const fn handle(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// Sets a new velocity, starting or cancelling the loop as needed.
    ///
    /// Scrolling itself only happens in [`on_frame`](Self::on_frame).
    pub fn update<S: Surface + ?Sized>(&mut self, surface: &mut S, velocity: i32) {
        self.velocity = velocity;
        if velocity == 0 {
            self.cancel(surface);
        } else if self.frame.is_none() {
            self.frame = Some(surface.request_frame());
        }
    }

    /// Runs one frame. Returns `false` for a handle this loop no longer owns.
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S, handle: FrameHandle) -> bool {
        if self.frame != Some(handle) {
            trace!(?handle, "ignoring stale scroll frame");
            return false;
        }
        self.frame = None;
        if self.velocity != 0 {
            surface.scroll_by(f64::from(self.velocity));
            self.frame = Some(surface.request_frame());
        }
        true
    }

    /// Zeroes the velocity and cancels any pending frame.
    pub fn stop<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        self.velocity = 0;
        self.cancel(surface);
    }

    fn cancel<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(handle) = self.frame.take() {
            surface.cancel_frame(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::RecordingSurface;

    fn speed(y: f64) -> i32 {
        scroll_speed(y, 1000.0, &ScrollConfig::default())
    }

    #[test]
    fn speed_at_known_points() {
        assert_eq!(speed(50.0), -11);
        assert_eq!(speed(0.0), -15);
        assert_eq!(speed(-40.0), -15);
        assert_eq!(speed(200.0), 0);
        assert_eq!(speed(500.0), 0);
        assert_eq!(speed(800.0), 0);
        assert_eq!(speed(900.0), 7);
        assert_eq!(speed(1000.0), 15);
        assert_eq!(speed(1200.0), 15);
    }

    #[test]
    fn zero_zone_never_scrolls() {
        let cfg = ScrollConfig {
            edge_zone: 0.0,
            max_speed: 15.0,
        };
        assert_eq!(scroll_speed(0.0, 1000.0, &cfg), 0);
    }

    #[test]
    fn loop_runs_only_while_moving() {
        let mut surface = RecordingSurface::board(1000.0);
        let mut scroll = AutoScroll::new();

        scroll.update(&mut surface, 0);
        assert_eq!(scroll.handle(), None);
        assert_eq!(surface.pending_frames(), 0);

        scroll.update(&mut surface, 10);
        assert!(scroll.handle().is_some());
        assert!(surface.scroll_y().abs() < f64::EPSILON);

        // a second update keeps the single pending frame
        let first = scroll.handle();
        scroll.update(&mut surface, 12);
        assert_eq!(scroll.handle(), first);
        assert_eq!(surface.pending_frames(), 1);

        for handle in surface.fire_frames() {
            assert!(scroll.on_frame(&mut surface, handle));
        }
        assert!((surface.scroll_y() - 12.0).abs() < f64::EPSILON);
        assert_eq!(surface.pending_frames(), 1);

        scroll.update(&mut surface, 0);
        assert_eq!(scroll.handle(), None);
        assert_eq!(surface.pending_frames(), 0);
    }

    #[test]
    fn stale_frames_are_ignored() {
        let mut surface = RecordingSurface::board(1000.0);
        let mut scroll = AutoScroll::new();
        scroll.update(&mut surface, -5);
        let fired = surface.fire_frames();
        scroll.stop(&mut surface);
        for handle in fired {
            assert!(!scroll.on_frame(&mut surface, handle));
        }
        assert_eq!(surface.pending_frames(), 0);
        assert_eq!(scroll.velocity(), 0);
    }
}
