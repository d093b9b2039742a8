//! Long-press recognition for touch drags.
//!
//! A touch only becomes a drag after it has been held still for the dwell
//! time. Anything else during the dwell (lifting, sliding, a second finger)
//! means the user was tapping or scrolling.

use std::time::{Duration, Instant};

use super::geometry::Point;
use super::surface::CardRef;

/// Thresholds of the long-press gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Hold time before the drag starts (default: 250ms).
    pub dwell: Duration,
    /// Movement tolerated during the dwell, in surface units (default: 10).
    pub jitter: f64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_millis(250),
            jitter: 10.0,
        }
    }
}

/// Why an armed gate gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateCancel {
    /// Finger lifted before the dwell elapsed (a tap).
    Released,
    /// Finger slid past the jitter threshold (a scroll).
    Moved,
    /// A second finger landed (ambiguous gesture).
    SecondTouch,
}

impl std::fmt::Display for GateCancel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Released => write!(f, "released"),
            Self::Moved => write!(f, "moved"),
            Self::SecondTouch => write!(f, "second touch"),
        }
    }
}

/// An armed long-press timer for one card.
#[derive(Debug, Clone, PartialEq)]
pub struct LongPressGate {
    card: CardRef,
    origin: Point,
    last: Point,
    deadline: Instant,
    jitter: f64,
}

impl LongPressGate {
    /// Arms the gate for a touch that landed on `card` at `origin`.
    #[must_use]
    pub fn arm(card: CardRef, origin: Point, now: Instant, config: GateConfig) -> Self {
        Self {
            card,
            origin,
            last: origin,
            deadline: now + config.dwell,
            jitter: config.jitter,
        }
    }

    /// The card being pressed.
    #[must_use]
    pub const fn card(&self) -> &CardRef {
        &self.card
    }

    /// When the dwell elapses.
    #[must_use]
    pub const fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Records movement during the dwell.
    ///
    /// # Errors
    ///
    /// Returns [`GateCancel::Moved`] once the finger strays further than the
    /// jitter threshold from where it landed.
    pub fn on_move(&mut self, at: Point) -> Result<(), GateCancel> {
        if at.distance(self.origin) > self.jitter {
            return Err(GateCancel::Moved);
        }
        self.last = at;
        Ok(())
    }

    /// The finger lifted before the dwell elapsed.
    #[must_use]
    pub fn on_release(self) -> GateCancel {
        GateCancel::Released
    }

    /// Another finger landed during the dwell.
    #[must_use]
    pub fn on_second_touch(self) -> GateCancel {
        GateCancel::SecondTouch
    }

    /// Whether the dwell has elapsed at `now`.
    #[must_use]
    pub fn poll(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Card and latest pointer position, for starting the drag.
    #[must_use]
    pub fn into_parts(self) -> (CardRef, Point) {
        (self.card, self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;

    fn gate(now: Instant) -> LongPressGate {
        LongPressGate::arm(
            CardRef::new(TaskId::new("t"), 3),
            Point::new(100.0, 100.0),
            now,
            GateConfig::default(),
        )
    }

    #[test]
    fn expires_after_dwell() {
        let t0 = Instant::now();
        let g = gate(t0);
        assert!(!g.poll(t0 + Duration::from_millis(100)));
        assert!(!g.poll(t0 + Duration::from_millis(249)));
        assert!(g.poll(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn small_moves_are_tolerated() {
        let mut g = gate(Instant::now());
        assert!(g.on_move(Point::new(106.0, 108.0)).is_ok());
        assert_eq!(g.on_move(Point::new(100.0, 111.0)), Err(GateCancel::Moved));
        let (card, at) = g.into_parts();
        assert_eq!(card.index, 3);
        assert_eq!(at, Point::new(106.0, 108.0));
    }

    #[test]
    fn cancel_reasons() {
        let t0 = Instant::now();
        assert_eq!(gate(t0).on_release(), GateCancel::Released);
        assert_eq!(gate(t0).on_second_touch(), GateCancel::SecondTouch);
    }
}
