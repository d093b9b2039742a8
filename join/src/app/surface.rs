//! The board as the drag engine sees it in a terminal.
//!
//! Terminal cells are mapped to surface units at a fixed size per cell, so
//! the engine's thresholds (jitter, edge zone, scroll speed) keep their
//! proportions. Columns and cards are laid out in document coordinates and
//! shifted by the scroll offset, which is always a whole number of rows.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use join_core::board::Board;
use join_core::drag::{CardRef, FrameHandle, HIGHLIGHT_CLASS, Point, ProxyId, Rect, Surface};
use join_core::task::{TaskId, TaskStatus};
use ratatui::layout::Rect as CellRect;

/// Surface units per terminal column.
pub const CELL_WIDTH: f64 = 16.0;

/// Surface units per terminal row.
pub const CELL_HEIGHT: f64 = 32.0;

/// Rows a card occupies, borders included.
pub const CARD_ROWS: u16 = 6;

const CARD_GAP: u16 = 1;
const HEADER_ROWS: u16 = 1;

#[derive(Debug, Clone)]
struct CardSlot {
    card: CardRef,
    rect: Rect,
}

#[derive(Debug, Clone, Copy)]
struct Proxy {
    id: ProxyId,
    rect: Rect,
    hit_testable: bool,
}

/// The last laid-out board and every effect the drag engine applied to it.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    area: CellRect,
    document_height: f64,
    scroll_y: f64,
    columns: Vec<(TaskStatus, Rect)>,
    cards: BTreeMap<TaskId, CardSlot>,
    card_classes: BTreeMap<TaskId, BTreeSet<&'static str>>,
    column_classes: BTreeMap<TaskStatus, BTreeSet<&'static str>>,
    proxy: Option<Proxy>,
    pending: BTreeSet<FrameHandle>,
    next_id: u64,
}

#[allow(clippy::cast_possible_truncation)]
fn to_cells(units: f64, per_cell: f64) -> i32 {
    (units / per_cell).round() as i32
}

impl TerminalSurface {
    /// An empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the four columns side by side in `area` and stacks the cards
    /// of `board` in them. Classes, proxy and pending frames survive.
    pub fn layout(&mut self, area: CellRect, board: &Board) {
        self.area = area;
        self.columns.clear();
        self.cards.clear();

        let width = area.width / 4;
        let mut tallest = 0u16;
        for (i, status) in (0u16..).zip(TaskStatus::ALL) {
            let x = area.x + i * width;
            let w = if i == 3 { area.width - 3 * width } else { width };
            let cards = board.column(status);
            for (slot, card) in (0u16..).zip(cards) {
                let row = HEADER_ROWS + slot * (CARD_ROWS + CARD_GAP);
                let rect = Rect::new(
                    f64::from(x + 1) * CELL_WIDTH,
                    f64::from(row) * CELL_HEIGHT,
                    f64::from(w.saturating_sub(2)) * CELL_WIDTH,
                    f64::from(CARD_ROWS) * CELL_HEIGHT,
                );
                self.cards.insert(
                    card.id.clone(),
                    CardSlot {
                        card: card.card_ref(),
                        rect,
                    },
                );
            }
            let count = u16::try_from(cards.len()).unwrap_or(u16::MAX);
            tallest = tallest.max(count);
            let column = Rect::new(f64::from(x) * CELL_WIDTH, 0.0, f64::from(w) * CELL_WIDTH, 0.0);
            self.columns.push((status, column));
        }

        let content_rows = HEADER_ROWS + tallest.saturating_mul(CARD_ROWS + CARD_GAP) + 1;
        self.document_height = f64::from(content_rows.max(area.height)) * CELL_HEIGHT;
        for (_, rect) in &mut self.columns {
            rect.height = self.document_height;
        }
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll());
    }

    /// The terminal region the board occupies.
    #[must_use]
    pub const fn area(&self) -> CellRect {
        self.area
    }

    fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height()).max(0.0)
    }

    /// Scroll offset snapped to whole rows, as drawn.
    #[must_use]
    pub fn scroll_offset(&self) -> f64 {
        (self.scroll_y / CELL_HEIGHT).floor() * CELL_HEIGHT
    }

    /// Surface point at the centre of a terminal cell.
    #[must_use]
    pub fn point_at(&self, column: u16, row: u16) -> Point {
        Point::new(
            (f64::from(column) + 0.5) * CELL_WIDTH,
            (f64::from(row) - f64::from(self.area.y) + 0.5) * CELL_HEIGHT,
        )
    }

    /// Card under a viewport point, ignoring the proxy.
    #[must_use]
    pub fn card_at(&self, at: Point) -> Option<CardRef> {
        let doc = Point::new(at.x, at.y + self.scroll_offset());
        self.cards
            .values()
            .find(|slot| slot.rect.contains(doc))
            .map(|slot| slot.card.clone())
    }

    /// Column under a viewport point, ignoring the proxy.
    #[must_use]
    pub fn column_under(&self, at: Point) -> Option<TaskStatus> {
        let doc = Point::new(at.x, at.y + self.scroll_offset());
        self.columns.iter().find(|(_, r)| r.contains(doc)).map(|(s, _)| *s)
    }

    /// Whether a card carries `class`.
    #[must_use]
    pub fn card_has_class(&self, task: &TaskId, class: &str) -> bool {
        self.card_classes.get(task).is_some_and(|c| c.contains(class))
    }

    /// The highlighted column, if any.
    #[must_use]
    pub fn highlighted(&self) -> Option<TaskStatus> {
        TaskStatus::ALL
            .into_iter()
            .find(|s| self.column_classes.get(s).is_some_and(|c| c.contains(HIGHLIGHT_CLASS)))
    }

    /// Terminal cells of a column, spanning the whole board height.
    #[must_use]
    pub fn column_cells(&self, status: TaskStatus) -> Option<CellRect> {
        let (_, rect) = self.columns.iter().find(|(s, _)| *s == status)?;
        let x = u16::try_from(to_cells(rect.left, CELL_WIDTH)).ok()?;
        let w = u16::try_from(to_cells(rect.width, CELL_WIDTH)).ok()?;
        Some(CellRect::new(x, self.area.y, w, self.area.height))
    }

    /// Visible terminal cells of a card, clipped to the board.
    #[must_use]
    pub fn card_cells(&self, task: &TaskId) -> Option<CellRect> {
        let slot = self.cards.get(task)?;
        self.clip(slot.rect.shifted_y(-self.scroll_offset()))
    }

    /// Visible terminal cells of the floating proxy.
    #[must_use]
    pub fn proxy_cells(&self) -> Option<CellRect> {
        self.clip(self.proxy?.rect)
    }

    /// Whether a proxy is floating.
    #[must_use]
    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Frames requested and neither fired nor cancelled.
    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Hands out every pending frame; the caller passes each back to the
    /// drag controller.
    pub fn take_frames(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    fn clip(&self, rect: Rect) -> Option<CellRect> {
        let left = i32::from(self.area.x).max(to_cells(rect.left, CELL_WIDTH));
        let right = i32::from(self.area.right()).min(to_cells(rect.right(), CELL_WIDTH));
        let top = i32::from(self.area.y) + to_cells(rect.top, CELL_HEIGHT);
        let bottom = top + to_cells(rect.height, CELL_HEIGHT);
        let top_clipped = top.max(i32::from(self.area.y));
        let bottom_clipped = bottom.min(i32::from(self.area.bottom()));
        if right <= left || bottom_clipped <= top_clipped {
            return None;
        }
        Some(CellRect::new(
            u16::try_from(left).ok()?,
            u16::try_from(top_clipped).ok()?,
            u16::try_from(right - left).ok()?,
            u16::try_from(bottom_clipped - top_clipped).ok()?,
        ))
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl Surface for TerminalSurface {
    fn card_rect(&self, card: &CardRef) -> Option<Rect> {
        self.cards
            .get(&card.task_id)
            .map(|slot| slot.rect.shifted_y(-self.scroll_offset()))
    }

    fn add_card_class(&mut self, card: &CardRef, class: &'static str) {
        self.card_classes.entry(card.task_id.clone()).or_default().insert(class);
    }

    fn remove_card_class(&mut self, card: &CardRef, class: &'static str) {
        if let Some(classes) = self.card_classes.get_mut(&card.task_id) {
            classes.remove(class);
        }
    }

    fn clone_card(&mut self, _card: &CardRef, rect: Rect) -> ProxyId {
        let id = ProxyId(self.next());
        self.proxy = Some(Proxy {
            id,
            rect,
            hit_testable: true,
        });
        id
    }

    fn place_proxy(&mut self, proxy: ProxyId, rect: Rect) {
        if let Some(p) = self.proxy.as_mut().filter(|p| p.id == proxy) {
            p.rect = rect;
        }
    }

    fn remove_proxy(&mut self, proxy: ProxyId) {
        if self.proxy.is_some_and(|p| p.id == proxy) {
            self.proxy = None;
        }
    }

    fn set_proxy_hit_testable(&mut self, proxy: ProxyId, enabled: bool) {
        if let Some(p) = self.proxy.as_mut().filter(|p| p.id == proxy) {
            p.hit_testable = enabled;
        }
    }

    fn column_at(&self, at: Point) -> Option<TaskStatus> {
        if self.proxy.is_some_and(|p| p.hit_testable && p.rect.contains(at)) {
            return None;
        }
        self.column_under(at)
    }

    fn add_column_class(&mut self, column: TaskStatus, class: &'static str) {
        self.column_classes.entry(column).or_default().insert(class);
    }

    fn remove_column_class(&mut self, column: TaskStatus, class: &'static str) {
        if let Some(classes) = self.column_classes.get_mut(&column) {
            classes.remove(class);
        }
    }

    fn viewport_height(&self) -> f64 {
        f64::from(self.area.height) * CELL_HEIGHT
    }

    fn scroll_by(&mut self, dy: f64) {
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, self.max_scroll());
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next());
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }

    fn vibrate(&mut self, _pulse: Duration) -> bool {
        false
    }
}
