//! End-to-end drag scenarios against the in-memory surface.
//!
//! Covers the long-press dwell, tap rejection, drops on and off columns,
//! edge auto-scroll and the no-leak guarantees after commit.

use std::time::{Duration, Instant};

use join_core::drag::{
    ActivationMode, CardRef, DragConfig, DragController, DropOutcome, Point, PointerInput,
    RecordingSurface, Surface, SurfaceOp, TOUCH_ORIGINAL_CLASS, scroll_speed,
};
use join_core::task::{TaskId, TaskStatus};

fn board() -> (DragController, RecordingSurface, CardRef) {
    let card = CardRef::new(TaskId::new("-Ntask"), 5);
    let surface = RecordingSurface::board(1000.0).with_card(&card, TaskStatus::Todo, 0);
    (DragController::new(DragConfig::default()), surface, card)
}

fn touch_start(card: &CardRef, at: Point) -> PointerInput {
    PointerInput::TouchStart {
        card: card.clone(),
        at,
        touches: 1,
    }
}

fn touch_move(at: Point) -> PointerInput {
    PointerInput::TouchMove { at, touches: 1 }
}

/// Holds a touch on the card until the drag starts.
fn long_press(ctl: &mut DragController, surface: &mut RecordingSurface, card: &CardRef) -> Instant {
    let t0 = Instant::now();
    let at = surface.card_rect(card).unwrap().center();
    ctl.handle(surface, touch_start(card, at), t0);
    let t1 = t0 + Duration::from_millis(250);
    assert!(ctl.tick(surface, t1));
    t1
}

#[test]
fn hold_250ms_starts_drag_with_card_sized_proxy() {
    let (mut ctl, mut surface, card) = board();
    let card_box = surface.card_rect(&card).unwrap();

    long_press(&mut ctl, &mut surface, &card);

    let session = ctl.session().expect("dragging");
    assert_eq!(session.mode(), ActivationMode::Touch);
    assert_eq!(session.card(), &card);
    let proxy = session.proxy().id().expect("touch proxy");
    let proxy_box = surface.proxy_rect(proxy).unwrap();
    assert!((proxy_box.width - card_box.width).abs() < f64::EPSILON);
    assert!((proxy_box.height - card_box.height).abs() < f64::EPSILON);
    assert_eq!(proxy_box, card_box);
    assert!(surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
    assert_eq!(surface.vibrations(), 1);
}

#[test]
fn release_after_100ms_is_a_tap() {
    let (mut ctl, mut surface, card) = board();
    let t0 = Instant::now();
    let at = surface.card_rect(&card).unwrap().center();
    ctl.handle(&mut surface, touch_start(&card, at), t0);
    let outcome = ctl.handle(
        &mut surface,
        PointerInput::TouchEnd { remaining: 0 },
        t0 + Duration::from_millis(100),
    );
    assert_eq!(outcome, None);
    assert!(ctl.is_idle());
    assert!(!ctl.tick(&mut surface, t0 + Duration::from_millis(400)));
    assert!(surface.ops().iter().all(|op| !matches!(op, SurfaceOp::CloneCard(..))));
    assert_eq!(surface.live_proxies(), 0);
}

#[test]
fn missing_haptics_do_not_block_drag() {
    let card = CardRef::new(TaskId::new("t"), 0);
    let mut surface = RecordingSurface::board(1000.0)
        .with_card(&card, TaskStatus::Todo, 0)
        .with_haptics(false);
    let mut ctl = DragController::new(DragConfig::default());
    long_press(&mut ctl, &mut surface, &card);
    assert!(ctl.session().is_some());
    assert_eq!(surface.vibrations(), 0);
}

#[test]
fn release_over_done_moves_task_once() {
    let (mut ctl, mut surface, card) = board();
    let t = long_press(&mut ctl, &mut surface, &card);

    let done = surface.column_center(TaskStatus::Done).unwrap();
    ctl.handle(&mut surface, touch_move(done), t);
    assert_eq!(surface.highlighted_columns(), vec![TaskStatus::Done]);

    let outcome = ctl
        .handle(&mut surface, PointerInput::TouchEnd { remaining: 0 }, t)
        .expect("drag ended");
    let DropOutcome::Moved(change) = outcome else {
        panic!("expected a move, got {outcome:?}");
    };
    assert_eq!(change.task_id, card.task_id);
    assert_eq!(change.index, 5);
    assert_eq!(change.status, TaskStatus::Done);
    assert_eq!(change.path(), "tasks/-Ntask/statusTask");
    assert_eq!(change.body(), serde_json::json!("done"));

    assert!(ctl.is_idle());
    assert!(ctl.session().is_none());
    assert_eq!(surface.live_proxies(), 0);
    assert_eq!(surface.pending_frames(), 0);
    assert!(surface.highlighted_columns().is_empty());
}

#[test]
fn release_outside_columns_is_noop() {
    let (mut ctl, mut surface, card) = board();
    let t = long_press(&mut ctl, &mut surface, &card);
    ctl.handle(&mut surface, touch_move(Point::new(1100.0, 500.0)), t);
    let outcome = ctl.handle(&mut surface, PointerInput::TouchEnd { remaining: 0 }, t);
    assert_eq!(outcome, Some(DropOutcome::NoTarget));
    assert!(ctl.is_idle());
    assert_eq!(surface.live_proxies(), 0);
}

#[test]
fn top_edge_speed_is_minus_eleven() {
    let cfg = DragConfig::default();
    assert_eq!(scroll_speed(50.0, 1000.0, &cfg.scroll), -11);
}

#[test]
fn edge_scroll_runs_until_pointer_leaves_zone() {
    let (mut ctl, mut surface, card) = board();
    let t = long_press(&mut ctl, &mut surface, &card);
    let x = surface.column_center(TaskStatus::InProgress).unwrap().x;

    // push the board down first so there is room to scroll up
    ctl.handle(&mut surface, touch_move(Point::new(x, 990.0)), t);
    assert_eq!(ctl.session().unwrap().velocity(), 14);
    for _ in 0..5 {
        for handle in surface.fire_frames() {
            ctl.on_frame(&mut surface, handle);
        }
    }
    assert!((surface.scroll_y() - 70.0).abs() < f64::EPSILON);

    ctl.handle(&mut surface, touch_move(Point::new(x, 50.0)), t);
    assert_eq!(ctl.session().unwrap().velocity(), -11);
    for handle in surface.fire_frames() {
        ctl.on_frame(&mut surface, handle);
    }
    assert!((surface.scroll_y() - 59.0).abs() < f64::EPSILON);

    ctl.handle(&mut surface, touch_move(Point::new(x, 500.0)), t);
    assert_eq!(ctl.session().unwrap().velocity(), 0);
    assert_eq!(ctl.session().unwrap().frame(), None);
    assert_eq!(surface.pending_frames(), 0);

    ctl.commit(&mut surface, None);
    assert_eq!(surface.pending_frames(), 0);
}

#[test]
fn commit_mid_scroll_cancels_frame() {
    let (mut ctl, mut surface, card) = board();
    let t = long_press(&mut ctl, &mut surface, &card);
    ctl.handle(&mut surface, touch_move(Point::new(150.0, 960.0)), t);
    assert_eq!(surface.pending_frames(), 1);

    let outcome = ctl.commit(&mut surface, Some(TaskStatus::InProgress));
    assert!(matches!(outcome, Some(DropOutcome::Moved(_))));
    assert_eq!(surface.pending_frames(), 0);
    assert_eq!(surface.live_proxies(), 0);
    assert!(!surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
}

#[test]
fn native_drag_skips_arming() {
    let (mut ctl, mut surface, card) = board();
    let now = Instant::now();
    ctl.handle(
        &mut surface,
        PointerInput::DragStart {
            card: card.clone(),
            at: Point::new(150.0, 170.0),
        },
        now,
    );
    assert_eq!(ctl.session().unwrap().mode(), ActivationMode::Native);
    assert_eq!(surface.live_proxies(), 0);

    let over = surface.column_center(TaskStatus::AwaitFeedback).unwrap();
    ctl.handle(
        &mut surface,
        PointerInput::DragOver {
            at: over,
        },
        now,
    );
    let outcome = ctl.handle(&mut surface, PointerInput::DragEnd, now);
    assert_eq!(outcome, Some(DropOutcome::NoTarget));
    assert!(surface.highlighted_columns().is_empty());
}

#[test]
fn new_drag_replaces_unfinished_one() {
    let (mut ctl, mut surface, card) = board();
    long_press(&mut ctl, &mut surface, &card);
    ctl.begin_native(&mut surface, card.clone(), Point::new(0.0, 0.0));
    assert_eq!(surface.live_proxies(), 0);
    assert_eq!(ctl.session().unwrap().mode(), ActivationMode::Native);
}
