//! In-memory [`Surface`] for headless hosts and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::task::{TaskId, TaskStatus};

use super::geometry::{Point, Rect};
use super::surface::{CardRef, FrameHandle, HIGHLIGHT_CLASS, ProxyId, Surface};

/// One effect applied to a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// [`Surface::add_card_class`].
    AddCardClass(TaskId, &'static str),
    /// [`Surface::remove_card_class`].
    RemoveCardClass(TaskId, &'static str),
    /// [`Surface::clone_card`].
    CloneCard(TaskId, ProxyId, Rect),
    /// [`Surface::place_proxy`].
    PlaceProxy(ProxyId, Rect),
    /// [`Surface::remove_proxy`].
    RemoveProxy(ProxyId),
    /// [`Surface::set_proxy_hit_testable`].
    ProxyHitTest(ProxyId, bool),
    /// [`Surface::add_column_class`].
    AddColumnClass(TaskStatus, &'static str),
    /// [`Surface::remove_column_class`].
    RemoveColumnClass(TaskStatus, &'static str),
    /// [`Surface::scroll_by`].
    ScrollBy(f64),
    /// [`Surface::request_frame`].
    RequestFrame(FrameHandle),
    /// [`Surface::cancel_frame`].
    CancelFrame(FrameHandle),
    /// [`Surface::vibrate`].
    Vibrate(Duration),
}

#[derive(Debug, Clone, Copy)]
struct ProxyState {
    rect: Rect,
    hit_testable: bool,
}

/// A board laid out in memory that records every effect.
///
/// Columns and cards are placed in document coordinates; the surface
/// converts to viewport coordinates with its scroll offset, the way a
/// browser reports bounding boxes.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    viewport_height: f64,
    document_height: f64,
    scroll_y: f64,
    haptics: bool,
    columns: Vec<(TaskStatus, Rect)>,
    cards: BTreeMap<TaskId, Rect>,
    card_classes: BTreeMap<TaskId, BTreeSet<&'static str>>,
    column_classes: BTreeMap<TaskStatus, BTreeSet<&'static str>>,
    proxies: BTreeMap<ProxyId, ProxyState>,
    pending: BTreeSet<FrameHandle>,
    next_id: u64,
    vibrations: usize,
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// Width of a column.
    pub const COLUMN_WIDTH: f64 = 240.0;
    /// Horizontal distance between column left edges.
    pub const COLUMN_PITCH: f64 = 260.0;
    /// Top of every column in the document.
    pub const COLUMN_TOP: f64 = 100.0;
    /// Height of every column.
    pub const COLUMN_HEIGHT: f64 = 1800.0;
    /// Height of a card.
    pub const CARD_HEIGHT: f64 = 120.0;

    /// An empty surface with no columns.
    #[must_use]
    pub const fn new(viewport_height: f64, document_height: f64) -> Self {
        Self {
            viewport_height,
            document_height,
            scroll_y: 0.0,
            haptics: true,
            columns: Vec::new(),
            cards: BTreeMap::new(),
            card_classes: BTreeMap::new(),
            column_classes: BTreeMap::new(),
            proxies: BTreeMap::new(),
            pending: BTreeSet::new(),
            next_id: 1,
            vibrations: 0,
            ops: Vec::new(),
        }
    }

    /// The four status columns side by side, 2000 units tall.
    #[must_use]
    pub fn board(viewport_height: f64) -> Self {
        let mut surface = Self::new(viewport_height, Self::COLUMN_TOP * 2.0 + Self::COLUMN_HEIGHT);
        for (i, status) in TaskStatus::ALL.into_iter().enumerate() {
            let left = 20.0 + Self::COLUMN_PITCH * f64::from(u32::try_from(i).unwrap_or(0));
            surface.columns.push((
                status,
                Rect::new(left, Self::COLUMN_TOP, Self::COLUMN_WIDTH, Self::COLUMN_HEIGHT),
            ));
        }
        surface
    }

    /// Adds a column at a document position.
    #[must_use]
    pub fn with_column(mut self, status: TaskStatus, rect: Rect) -> Self {
        self.columns.retain(|(s, _)| *s != status);
        self.columns.push((status, rect));
        self
    }

    /// Places a card in `column`, `slot` cards from the top.
    #[must_use]
    pub fn with_card(mut self, card: &CardRef, column: TaskStatus, slot: usize) -> Self {
        if let Some(col) = self.column_rect(column) {
            let offset = (Self::CARD_HEIGHT + 10.0) * f64::from(u32::try_from(slot).unwrap_or(0));
            let rect = Rect::new(
                col.left + 10.0,
                col.top + 10.0 + offset,
                col.width - 20.0,
                Self::CARD_HEIGHT,
            );
            self.cards.insert(card.task_id.clone(), rect);
        }
        self
    }

    /// Turns haptic support on or off.
    #[must_use]
    pub const fn with_haptics(mut self, supported: bool) -> Self {
        self.haptics = supported;
        self
    }

    /// Document box of a column.
    #[must_use]
    pub fn column_rect(&self, status: TaskStatus) -> Option<Rect> {
        self.columns.iter().find(|(s, _)| *s == status).map(|(_, r)| *r)
    }

    /// A viewport point inside `status`'s column at mid-viewport height,
    /// or `None` if the column was never laid out.
    #[must_use]
    pub fn column_center(&self, status: TaskStatus) -> Option<Point> {
        self.column_rect(status)
            .map(|rect| Point::new(rect.center().x, self.viewport_height / 2.0))
    }

    /// Column under a viewport point, ignoring proxies.
    #[must_use]
    pub fn column_under(&self, at: Point) -> Option<TaskStatus> {
        let doc = Point::new(at.x, at.y + self.scroll_y);
        self.columns.iter().find(|(_, r)| r.contains(doc)).map(|(s, _)| *s)
    }

    /// Every effect so far, in order.
    #[must_use]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Returns and forgets the recorded effects.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of class additions and removals on cards and columns.
    #[must_use]
    pub fn class_mutations(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| {
                matches!(
                    op,
                    SurfaceOp::AddCardClass(..)
                        | SurfaceOp::RemoveCardClass(..)
                        | SurfaceOp::AddColumnClass(..)
                        | SurfaceOp::RemoveColumnClass(..)
                )
            })
            .count()
    }

    /// Columns currently carrying the highlight class.
    #[must_use]
    pub fn highlighted_columns(&self) -> Vec<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .filter(|s| self.column_classes.get(s).is_some_and(|c| c.contains(HIGHLIGHT_CLASS)))
            .collect()
    }

    /// Whether a card carries `class`.
    #[must_use]
    pub fn card_has_class(&self, task: &TaskId, class: &str) -> bool {
        self.card_classes.get(task).is_some_and(|c| c.contains(class))
    }

    /// Proxies not yet removed.
    #[must_use]
    pub fn live_proxies(&self) -> usize {
        self.proxies.len()
    }

    /// Where a proxy sits.
    #[must_use]
    pub fn proxy_rect(&self, proxy: ProxyId) -> Option<Rect> {
        self.proxies.get(&proxy).map(|p| p.rect)
    }

    /// Whether point lookups can hit a proxy.
    #[must_use]
    pub fn proxy_hit_testable(&self, proxy: ProxyId) -> bool {
        self.proxies.get(&proxy).is_some_and(|p| p.hit_testable)
    }

    /// Frames requested and neither fired nor cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Fires every pending frame. The caller passes each handle back to
    /// whoever requested it.
    pub fn fire_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Current vertical scroll offset.
    #[must_use]
    pub const fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Haptic pulses actually delivered.
    #[must_use]
    pub const fn vibrations(&self) -> usize {
        self.vibrations
    }

    fn next(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Surface for RecordingSurface {
    fn card_rect(&self, card: &CardRef) -> Option<Rect> {
        self.cards.get(&card.task_id).map(|r| r.shifted_y(-self.scroll_y))
    }

    fn add_card_class(&mut self, card: &CardRef, class: &'static str) {
        self.card_classes.entry(card.task_id.clone()).or_default().insert(class);
        self.ops.push(SurfaceOp::AddCardClass(card.task_id.clone(), class));
    }

    fn remove_card_class(&mut self, card: &CardRef, class: &'static str) {
        if let Some(classes) = self.card_classes.get_mut(&card.task_id) {
            classes.remove(class);
        }
        self.ops.push(SurfaceOp::RemoveCardClass(card.task_id.clone(), class));
    }

    fn clone_card(&mut self, card: &CardRef, rect: Rect) -> ProxyId {
        let id = ProxyId(self.next());
        self.proxies.insert(
            id,
            ProxyState {
                rect,
                hit_testable: true,
            },
        );
        self.ops.push(SurfaceOp::CloneCard(card.task_id.clone(), id, rect));
        id
    }

    fn place_proxy(&mut self, proxy: ProxyId, rect: Rect) {
        if let Some(state) = self.proxies.get_mut(&proxy) {
            state.rect = rect;
        }
        self.ops.push(SurfaceOp::PlaceProxy(proxy, rect));
    }

    fn remove_proxy(&mut self, proxy: ProxyId) {
        self.proxies.remove(&proxy);
        self.ops.push(SurfaceOp::RemoveProxy(proxy));
    }

    fn set_proxy_hit_testable(&mut self, proxy: ProxyId, enabled: bool) {
        if let Some(state) = self.proxies.get_mut(&proxy) {
            state.hit_testable = enabled;
        }
        self.ops.push(SurfaceOp::ProxyHitTest(proxy, enabled));
    }

    fn column_at(&self, at: Point) -> Option<TaskStatus> {
        if self.proxies.values().any(|p| p.hit_testable && p.rect.contains(at)) {
            return None;
        }
        self.column_under(at)
    }

    fn add_column_class(&mut self, column: TaskStatus, class: &'static str) {
        self.column_classes.entry(column).or_default().insert(class);
        self.ops.push(SurfaceOp::AddColumnClass(column, class));
    }

    fn remove_column_class(&mut self, column: TaskStatus, class: &'static str) {
        if let Some(classes) = self.column_classes.get_mut(&column) {
            classes.remove(class);
        }
        self.ops.push(SurfaceOp::RemoveColumnClass(column, class));
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_by(&mut self, dy: f64) {
        let max = (self.document_height - self.viewport_height).max(0.0);
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, max);
        self.ops.push(SurfaceOp::ScrollBy(dy));
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next());
        self.pending.insert(handle);
        self.ops.push(SurfaceOp::RequestFrame(handle));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
        self.ops.push(SurfaceOp::CancelFrame(handle));
    }

    fn vibrate(&mut self, pulse: Duration) -> bool {
        self.ops.push(SurfaceOp::Vibrate(pulse));
        if self.haptics {
            self.vibrations += 1;
        }
        self.haptics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_layout_hit_tests() {
        let surface = RecordingSurface::board(1000.0);
        for status in TaskStatus::ALL {
            assert_eq!(surface.column_at(surface.column_center(status).unwrap()), Some(status));
        }
        assert_eq!(surface.column_at(Point::new(5.0, 500.0)), None);
        assert_eq!(surface.column_at(Point::new(300.0, 50.0)), None);
    }

    #[test]
    fn missing_column_has_no_center() {
        let surface = RecordingSurface::new(1000.0, 2000.0)
            .with_column(TaskStatus::Todo, Rect::new(0.0, 0.0, 100.0, 500.0));
        assert_eq!(surface.column_center(TaskStatus::Todo), Some(Point::new(50.0, 500.0)));
        assert_eq!(surface.column_center(TaskStatus::Done), None);
    }

    #[test]
    fn scrolling_shifts_boxes() {
        let card = CardRef::new(TaskId::new("t"), 0);
        let mut surface = RecordingSurface::board(1000.0).with_card(&card, TaskStatus::Todo, 1);
        let before = surface.card_rect(&card).unwrap();
        surface.scroll_by(30.0);
        let after = surface.card_rect(&card).unwrap();
        assert!((before.top - after.top - 30.0).abs() < f64::EPSILON);

        surface.scroll_by(-500.0);
        assert!(surface.scroll_y().abs() < f64::EPSILON);
    }

    #[test]
    fn missing_haptics_report_false() {
        let mut surface = RecordingSurface::board(1000.0).with_haptics(false);
        assert!(!surface.vibrate(Duration::from_millis(50)));
        assert_eq!(surface.vibrations(), 0);
    }
}
