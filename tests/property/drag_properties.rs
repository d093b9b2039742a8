//! Property tests for the drag engine.
//!
//! 1. Auto-scroll speed is monotone in edge depth and hits its bounds exactly.
//! 2. At most one column is highlighted, and it is the one under the pointer.
//! 3. Resolving the same point twice mutates nothing the second time.
//! 4. However a drag ends, no proxy, highlight, card class or frame survives.

use std::time::{Duration, Instant};

use join_core::drag::{
    CardRef, DRAGGED_CLASS, DragConfig, DragController, DropZoneResolver, Point, PointerInput,
    RecordingSurface, ScrollConfig, Surface, TOUCH_ORIGINAL_CLASS, scroll_speed,
};
use join_core::task::{TaskId, TaskStatus};
use proptest::prelude::*;

const VIEWPORT: f64 = 1000.0;

#[derive(Debug, Clone)]
enum Step {
    Move(f64, f64),
    Frame,
    Wait(u64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (-50.0..1100.0f64, -50.0..1100.0f64).prop_map(|(x, y)| Step::Move(x, y)),
        2 => Just(Step::Frame),
        1 => (0u64..400).prop_map(Step::Wait),
    ]
}

#[derive(Debug, Clone)]
enum Ending {
    TouchEnd,
    Commit(Option<TaskStatus>),
    Reset,
    SecondTouch,
    TouchCancel,
}

fn arb_status() -> impl Strategy<Value = Option<TaskStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(TaskStatus::Todo)),
        Just(Some(TaskStatus::InProgress)),
        Just(Some(TaskStatus::AwaitFeedback)),
        Just(Some(TaskStatus::Done)),
    ]
}

fn arb_ending() -> impl Strategy<Value = Ending> {
    prop_oneof![
        Just(Ending::TouchEnd),
        arb_status().prop_map(Ending::Commit),
        Just(Ending::Reset),
        Just(Ending::SecondTouch),
        Just(Ending::TouchCancel),
    ]
}

fn setup() -> (DragController, RecordingSurface, CardRef) {
    let card = CardRef::new(TaskId::new("task-1"), 0);
    let surface = RecordingSurface::board(VIEWPORT).with_card(&card, TaskStatus::Todo, 0);
    (DragController::new(DragConfig::default()), surface, card)
}

/// Plays `steps` after a touch on the card; returns the clock.
fn play(
    ctl: &mut DragController,
    surface: &mut RecordingSurface,
    card: &CardRef,
    steps: &[Step],
    mut check: impl FnMut(&DragController, &RecordingSurface, Point),
) -> Instant {
    let mut now = Instant::now();
    let start = surface.card_rect(card).map_or(Point::new(150.0, 170.0), |r| r.center());
    ctl.handle(
        surface,
        PointerInput::TouchStart {
            card: card.clone(),
            at: start,
            touches: 1,
        },
        now,
    );
    for step in steps {
        match step {
            Step::Move(x, y) => {
                let at = Point::new(*x, *y);
                ctl.handle(surface, PointerInput::TouchMove { at, touches: 1 }, now);
                check(ctl, surface, at);
            }
            Step::Frame => {
                for handle in surface.fire_frames() {
                    ctl.on_frame(surface, handle);
                }
            }
            Step::Wait(ms) => {
                now += Duration::from_millis(*ms);
                ctl.tick(surface, now);
            }
        }
    }
    now
}

proptest! {
    #[test]
    fn speed_is_monotone_near_top(a in 0.0..=200.0f64, b in 0.0..=200.0f64) {
        let cfg = ScrollConfig::default();
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let s_near = scroll_speed(near, VIEWPORT, &cfg);
        let s_far = scroll_speed(far, VIEWPORT, &cfg);
        prop_assert!(s_near <= 0 && s_far <= 0);
        prop_assert!(s_near.abs() >= s_far.abs());
    }

    #[test]
    fn speed_is_monotone_near_bottom(a in 0.0..=200.0f64, b in 0.0..=200.0f64) {
        let cfg = ScrollConfig::default();
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let s_near = scroll_speed(VIEWPORT - near, VIEWPORT, &cfg);
        let s_far = scroll_speed(VIEWPORT - far, VIEWPORT, &cfg);
        prop_assert!(s_near >= 0 && s_far >= 0);
        prop_assert!(s_near >= s_far);
    }

    #[test]
    fn speed_is_zero_outside_zones(y in 200.0..=800.0f64) {
        prop_assert_eq!(scroll_speed(y, VIEWPORT, &ScrollConfig::default()), 0);
    }

    #[test]
    fn at_most_one_highlight_matching_hit_test(
        steps in prop::collection::vec(arb_step(), 1..40),
    ) {
        let (mut ctl, mut surface, card) = setup();
        let mut steps = steps;
        steps.insert(0, Step::Wait(250));
        play(&mut ctl, &mut surface, &card, &steps, |ctl, surface, at| {
            let lit = surface.highlighted_columns();
            assert!(lit.len() <= 1);
            if let Some(session) = ctl.session() {
                assert_eq!(lit.first().copied(), session.hovered());
                assert_eq!(session.hovered(), surface.column_under(at));
            } else {
                assert!(lit.is_empty());
            }
        });
    }

    #[test]
    fn resolving_twice_is_idempotent(x in -50.0..1100.0f64, y in -50.0..1100.0f64) {
        let mut surface = RecordingSurface::board(VIEWPORT);
        let mut resolver = DropZoneResolver::new();
        let at = Point::new(x, y);
        resolver.resolve(&mut surface, at, None);
        let before = surface.class_mutations();
        resolver.resolve(&mut surface, at, None);
        prop_assert_eq!(surface.class_mutations(), before);
    }

    #[test]
    fn nothing_survives_the_end_of_a_drag(
        steps in prop::collection::vec(arb_step(), 0..40),
        ending in arb_ending(),
    ) {
        let (mut ctl, mut surface, card) = setup();
        let now = play(&mut ctl, &mut surface, &card, &steps, |_, _, _| {});
        match ending {
            Ending::TouchEnd => {
                ctl.handle(&mut surface, PointerInput::TouchEnd { remaining: 0 }, now);
            }
            Ending::Commit(target) => {
                ctl.commit(&mut surface, target);
            }
            Ending::Reset => {
                ctl.reset(&mut surface);
            }
            Ending::SecondTouch => {
                let at = Point::new(10.0, 10.0);
                ctl.handle(&mut surface, PointerInput::TouchMove { at, touches: 2 }, now);
            }
            Ending::TouchCancel => {
                ctl.handle(&mut surface, PointerInput::TouchCancel, now);
            }
        }
        prop_assert!(ctl.is_idle());
        prop_assert_eq!(surface.live_proxies(), 0);
        prop_assert_eq!(surface.pending_frames(), 0);
        prop_assert!(surface.highlighted_columns().is_empty());
        prop_assert!(!surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
        prop_assert!(!surface.card_has_class(&card.task_id, DRAGGED_CLASS));
    }
}
