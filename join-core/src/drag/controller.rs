//! The drag state machine.
//!
//! ```text
//! Idle ──touch──▶ Arming ──dwell──▶ Dragging ──release──▶ Committing ──▶ Idle
//!   │                │                  ▲ │
//!   └──dragstart─────┼──────────────────┘ └──move──▶ Dragging
//!                    └──cancel──▶ Idle
//! ```
//!
//! The controller owns the only [`DragSession`]. Every path out of
//! `Dragging` goes through the commit steps, so no proxy, highlight or scroll
//! frame survives the drag.

use std::time::Instant;

use tracing::debug;

use super::DragConfig;
use super::commit::{self, DropOutcome};
use super::gate::LongPressGate;
use super::geometry::Point;
use super::pointer::{ActivationMode, CommitTarget, DragSignal, PointerInput, PointerNormalizer};
use super::session::DragSession;
use super::surface::{CardRef, FrameHandle, Surface};
use crate::task::TaskStatus;

/// Where the controller is.
#[derive(Debug, Default, PartialEq)]
pub enum Phase {
    /// No gesture.
    #[default]
    Idle,
    /// A touch is being held; not yet a drag.
    Arming(LongPressGate),
    /// A card is being dragged.
    Dragging(DragSession),
    /// A release is being processed.
    Committing,
}

impl Phase {
    /// Short state name for logs and status lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Arming(_) => "arming",
            Self::Dragging(_) => "dragging",
            Self::Committing => "committing",
        }
    }
}

/// Drives one drag at a time against a [`Surface`].
#[derive(Debug)]
pub struct DragController {
    config: DragConfig,
    phase: Phase,
    normalizer: PointerNormalizer,
}

impl DragController {
    /// An idle controller.
    #[must_use]
    pub fn new(config: DragConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            normalizer: PointerNormalizer::new(),
        }
    }

    /// Thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &DragConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The active session, while dragging.
    #[must_use]
    pub const fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// Whether no gesture is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// When an armed gate will expire, so hosts can schedule [`tick`](Self::tick).
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        match &self.phase {
            Phase::Arming(gate) => Some(gate.deadline()),
            _ => None,
        }
    }

    /// Feeds one raw input. Returns the outcome when the input ended a drag.
    pub fn handle<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        input: PointerInput,
        now: Instant,
    ) -> Option<DropOutcome> {
        let signal = self.normalizer.normalize(input)?;
        // a dwell that ran out between ticks counts before this input
        self.tick(surface, now);
        match signal {
            DragSignal::Press { card, at, mode } => {
                match mode {
                    ActivationMode::Native => self.begin_native(surface, card, at),
                    ActivationMode::Touch => self.begin_touch(surface, card, at, now),
                }
                None
            }
            DragSignal::Move { at } => {
                self.on_move(surface, at);
                None
            }
            DragSignal::Release { target } => self.release(surface, target),
            DragSignal::Abort => self.abort(surface),
        }
    }

    /// Starts a native drag immediately.
    pub fn begin_native<S: Surface + ?Sized>(&mut self, surface: &mut S, card: CardRef, at: Point) {
        self.reset(surface);
        debug!(task = %card.task_id, index = card.index, "native drag started");
        self.phase = Phase::Dragging(DragSession::start(surface, card, ActivationMode::Native, at));
    }

    /// Arms the long-press gate for a touch on `card`.
    pub fn begin_touch<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        card: CardRef,
        at: Point,
        now: Instant,
    ) {
        self.reset(surface);
        debug!(task = %card.task_id, index = card.index, "long press armed");
        self.phase = Phase::Arming(LongPressGate::arm(card, at, now, self.config.gate));
    }

    /// Promotes an armed gate whose dwell has elapsed. Returns `true` if a
    /// drag started.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S, now: Instant) -> bool {
        if !matches!(&self.phase, Phase::Arming(gate) if gate.poll(now)) {
            return false;
        }
        let Phase::Arming(gate) = std::mem::take(&mut self.phase) else {
            return false;
        };
        let (card, at) = gate.into_parts();
        debug!(task = %card.task_id, index = card.index, "touch drag started");
        if !surface.vibrate(self.config.haptic) {
            debug!("haptic feedback unavailable");
        }
        self.phase = Phase::Dragging(DragSession::start(surface, card, ActivationMode::Touch, at));
        true
    }

    /// Runs a scheduled auto-scroll frame. Stale handles are ignored.
    pub fn on_frame<S: Surface + ?Sized>(&mut self, surface: &mut S, handle: FrameHandle) -> bool {
        match &mut self.phase {
            Phase::Dragging(session) => session.scroll.on_frame(surface, handle),
            _ => false,
        }
    }

    /// Drops the dragged card on `target`, or nowhere.
    ///
    /// Returns `None` when no drag was in progress.
    pub fn commit<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        target: Option<TaskStatus>,
    ) -> Option<DropOutcome> {
        self.release(surface, CommitTarget::Explicit(target))
    }

    /// Abandons any gesture. Returns [`DropOutcome::Cancelled`] if a drag was
    /// torn down.
    pub fn reset<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<DropOutcome> {
        match std::mem::take(&mut self.phase) {
            Phase::Dragging(session) => Some(commit::teardown(surface, session)),
            Phase::Arming(gate) => {
                debug!(task = %gate.card().task_id, "long press abandoned");
                None
            }
            Phase::Idle | Phase::Committing => None,
        }
    }

    fn on_move<S: Surface + ?Sized>(&mut self, surface: &mut S, at: Point) {
        match &mut self.phase {
            Phase::Dragging(session) => session.track(surface, at, &self.config.scroll),
            Phase::Arming(gate) => {
                if let Err(reason) = gate.on_move(at) {
                    debug!(%reason, "long press cancelled");
                    self.phase = Phase::Idle;
                }
            }
            Phase::Idle | Phase::Committing => {}
        }
    }

    fn release<S: Surface + ?Sized>(&mut self, surface: &mut S, target: CommitTarget) -> Option<DropOutcome> {
        match std::mem::replace(&mut self.phase, Phase::Committing) {
            Phase::Dragging(session) => {
                let outcome = commit::finish(surface, session, target);
                self.phase = Phase::Idle;
                Some(outcome)
            }
            Phase::Arming(gate) => {
                debug!(reason = %gate.on_release(), "long press cancelled");
                self.phase = Phase::Idle;
                None
            }
            Phase::Idle | Phase::Committing => {
                self.phase = Phase::Idle;
                None
            }
        }
    }

    fn abort<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Option<DropOutcome> {
        match std::mem::take(&mut self.phase) {
            Phase::Arming(gate) if self.normalizer.is_suppressed() => {
                debug!(reason = %gate.on_second_touch(), "long press cancelled");
                None
            }
            Phase::Arming(gate) => {
                debug!(task = %gate.card().task_id, "touch cancelled during long press");
                None
            }
            Phase::Dragging(session) => Some(commit::teardown(surface, session)),
            Phase::Idle | Phase::Committing => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::drag::{RecordingSurface, TOUCH_ORIGINAL_CLASS};
    use crate::task::TaskId;

    fn setup() -> (DragController, RecordingSurface, CardRef) {
        let card = CardRef::new(TaskId::new("t1"), 2);
        let surface = RecordingSurface::board(1000.0).with_card(&card, TaskStatus::Todo, 0);
        (DragController::new(DragConfig::default()), surface, card)
    }

    #[test]
    fn native_drag_moves_task() {
        let (mut ctl, mut surface, card) = setup();
        let now = Instant::now();
        let start = surface.card_rect(&card).unwrap().center();
        ctl.handle(&mut surface, PointerInput::DragStart { card, at: start }, now);
        assert_eq!(ctl.phase().name(), "dragging");

        let over = surface.column_center(TaskStatus::Done).unwrap();
        ctl.handle(&mut surface, PointerInput::DragOver { at: over }, now);
        assert_eq!(ctl.session().unwrap().hovered(), Some(TaskStatus::Done));

        let outcome = ctl.handle(
            &mut surface,
            PointerInput::Drop {
                target: Some(TaskStatus::Done),
            },
            now,
        );
        let change = outcome.unwrap().change().cloned().unwrap();
        assert_eq!(change.status, TaskStatus::Done);
        assert_eq!(change.index, 2);
        assert!(ctl.is_idle());

        // the trailing dragend finds nothing to do
        assert_eq!(ctl.handle(&mut surface, PointerInput::DragEnd, now), None);
    }

    #[test]
    fn moves_during_dwell_within_jitter_keep_arming() {
        let (mut ctl, mut surface, card) = setup();
        let t0 = Instant::now();
        let at = surface.card_rect(&card).unwrap().center();
        ctl.handle(&mut surface, PointerInput::TouchStart { card, at, touches: 1 }, t0);
        ctl.handle(
            &mut surface,
            PointerInput::TouchMove {
                at: Point::new(at.x + 3.0, at.y),
                touches: 1,
            },
            t0 + Duration::from_millis(50),
        );
        assert_eq!(ctl.phase().name(), "arming");
        assert!(ctl.tick(&mut surface, t0 + Duration::from_millis(250)));
        assert_eq!(surface.vibrations(), 1);
    }

    #[test]
    fn scroll_during_dwell_cancels() {
        let (mut ctl, mut surface, card) = setup();
        let t0 = Instant::now();
        let at = surface.card_rect(&card).unwrap().center();
        ctl.handle(&mut surface, PointerInput::TouchStart { card, at, touches: 1 }, t0);
        ctl.handle(
            &mut surface,
            PointerInput::TouchMove {
                at: Point::new(at.x, at.y + 40.0),
                touches: 1,
            },
            t0 + Duration::from_millis(60),
        );
        assert!(ctl.is_idle());
        assert!(!ctl.tick(&mut surface, t0 + Duration::from_millis(300)));
        assert_eq!(surface.live_proxies(), 0);
    }

    #[test]
    fn second_touch_cancels_arming() {
        let (mut ctl, mut surface, card) = setup();
        let t0 = Instant::now();
        let at = surface.card_rect(&card).unwrap().center();
        ctl.handle(
            &mut surface,
            PointerInput::TouchStart {
                card: card.clone(),
                at,
                touches: 1,
            },
            t0,
        );
        ctl.handle(&mut surface, PointerInput::TouchStart { card, at, touches: 2 }, t0);
        assert!(ctl.is_idle());
        assert!(!ctl.tick(&mut surface, t0 + Duration::from_secs(1)));
    }

    #[test]
    fn multi_touch_during_drag_tears_down() {
        let (mut ctl, mut surface, card) = setup();
        let t0 = Instant::now();
        let at = surface.card_rect(&card).unwrap().center();
        ctl.handle(
            &mut surface,
            PointerInput::TouchStart {
                card: card.clone(),
                at,
                touches: 1,
            },
            t0,
        );
        ctl.tick(&mut surface, t0 + Duration::from_millis(250));
        ctl.handle(
            &mut surface,
            PointerInput::TouchMove {
                at: Point::new(at.x, 20.0),
                touches: 1,
            },
            t0 + Duration::from_millis(300),
        );
        assert_ne!(ctl.session().unwrap().velocity(), 0);

        let outcome = ctl.handle(
            &mut surface,
            PointerInput::TouchMove {
                at: Point::new(at.x, 20.0),
                touches: 2,
            },
            t0 + Duration::from_millis(320),
        );
        assert_eq!(outcome, Some(DropOutcome::Cancelled));
        assert!(ctl.is_idle());
        assert_eq!(surface.live_proxies(), 0);
        assert_eq!(surface.pending_frames(), 0);
        assert!(!surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
    }

    #[test]
    fn reset_while_idle_is_harmless() {
        let (mut ctl, mut surface, _) = setup();
        assert_eq!(ctl.reset(&mut surface), None);
        assert_eq!(ctl.commit(&mut surface, Some(TaskStatus::Done)), None);
        assert!(surface.ops().is_empty());
    }
}
