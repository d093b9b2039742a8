//! Application state and event handling.
//!
//! The app is the drag engine's host: it owns the [`DragController`] and the
//! [`TerminalSurface`], turns crossterm input into [`PointerInput`], and
//! hands finished drops to the board worker as [`BoardCommand`]s. The drag
//! session is always torn down before the command leaves.

mod surface;

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use join_core::board::{Board, Card, known_contacts};
use join_core::contact::ContactId;
use join_core::drag::{DragController, DropOutcome, Point, PointerInput, Rect, Surface};
use join_core::summary::Summary;
use join_core::task::{TaskId, TaskStatus};
use join_core::user::ActiveUser;
use ratatui::layout::Rect as CellRect;

pub use surface::{CARD_ROWS, CELL_HEIGHT, CELL_WIDTH, TerminalSurface};

use crate::board::BoardSnapshot;
use crate::config::{ClientConfig, PointerMode};
use crate::worker::{BoardCommand, BoardEvent};

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: f64 = 3.0;

/// Shown when the board could not be refetched after a drop.
const STALE_NOTICE: &str = "Board may be out of date, press r to reload";

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Last board received from the store.
    pub snapshot: BoardSnapshot,
    /// The board as shown, after the search filter.
    pub view: Board,
    /// Shown instead of cards when a search matched nothing.
    pub search_message: Option<&'static str>,
    /// Current search text.
    pub query: String,
    /// Whether keys go to the search box.
    pub searching: bool,
    /// Contacts that still exist, for assignee badges.
    pub known: BTreeSet<ContactId>,
    /// Counters for the header.
    pub summary: Summary,
    /// Card with the keyboard cursor.
    pub selected: Option<TaskId>,
    /// Who is logged in.
    pub user: Option<ActiveUser>,
    /// Last notice for the status bar.
    pub status_message: Option<String>,
    /// A reload is in flight.
    pub loading: bool,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Assignee badges drawn before `+N`.
    pub max_visible_assignees: usize,
    /// The board as the drag engine sees it.
    pub surface: TerminalSurface,
    controller: DragController,
    pointer_mode: PointerMode,
    frame_interval: Duration,
    last_frame: Option<Instant>,
    screen: CellRect,
}

impl App {
    /// An empty board configured from `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            snapshot: BoardSnapshot::default(),
            view: Board::default(),
            search_message: None,
            query: String::new(),
            searching: false,
            known: BTreeSet::new(),
            summary: Summary::default(),
            selected: None,
            user: None,
            status_message: None,
            loading: true,
            should_quit: false,
            max_visible_assignees: config.max_visible_assignees,
            surface: TerminalSurface::new(),
            controller: DragController::new(config.drag),
            pointer_mode: config.pointer_mode,
            frame_interval: config.frame_interval,
            last_frame: None,
            screen: CellRect::default(),
        }
    }

    /// Sets the logged-in user shown in the header.
    #[must_use]
    pub fn with_user(mut self, user: Option<ActiveUser>) -> Self {
        self.user = user;
        self
    }

    /// How mouse presses start a drag.
    #[must_use]
    pub const fn pointer_mode(&self) -> PointerMode {
        self.pointer_mode
    }

    /// Card being dragged and the column under it.
    #[must_use]
    pub fn dragging(&self) -> Option<(&TaskId, Option<TaskStatus>)> {
        self.controller
            .session()
            .map(|session| (&session.card().task_id, session.hovered()))
    }

    /// Whether a press is being held before it turns into a drag.
    #[must_use]
    pub const fn is_arming(&self) -> bool {
        matches!(self.controller.phase(), join_core::drag::Phase::Arming(_))
    }

    /// When the held press turns into a drag, so the event loop can wake up.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.controller.deadline()
    }

    /// Adopts a new terminal size.
    pub fn resize(&mut self, screen: CellRect) {
        if screen != self.screen {
            self.screen = screen;
            self.relayout();
        }
    }

    /// Applies one message from the board worker.
    pub fn apply_event(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Loaded(snapshot) => self.set_snapshot(*snapshot),
            BoardEvent::Moved { task_id, status } => {
                let title = self
                    .snapshot
                    .board
                    .card(&task_id)
                    .map_or_else(|| task_id.to_string(), |card| card.task.title.clone());
                self.status_message = Some(format!("Moved \"{title}\" to {}", status.title()));
            }
            BoardEvent::Stale => {
                self.loading = false;
                self.status_message = Some(STALE_NOTICE.to_string());
            }
            BoardEvent::Error(message) => {
                self.loading = false;
                self.status_message = Some(message);
            }
        }
    }

    fn set_snapshot(&mut self, snapshot: BoardSnapshot) {
        self.summary = Summary::compute(&snapshot.tasks, chrono::Local::now().date_naive());
        self.known = known_contacts(&snapshot.contacts);
        self.snapshot = snapshot;
        self.loading = false;
        self.refilter();
    }

    fn refilter(&mut self) {
        let filtered = self.snapshot.board.filter(&self.query);
        self.view = filtered.board;
        self.search_message = filtered.message;
        if self.selected.as_ref().is_none_or(|id| self.view.card(id).is_none()) {
            self.selected = self.view.cards().next().map(|card| card.id.clone());
        }
        self.relayout();
    }

    fn relayout(&mut self) {
        self.surface.layout(crate::ui::board_area(self.screen), &self.view);
    }

    /// Promotes a held press whose dwell elapsed and runs due scroll frames.
    pub fn tick(&mut self, now: Instant) {
        if self.controller.tick(&mut self.surface, now) {
            self.status_message = Some("Drag the card onto a column".to_string());
        }
        let due = self
            .last_frame
            .is_none_or(|last| now.saturating_duration_since(last) >= self.frame_interval);
        if due && self.surface.pending_frames() > 0 {
            for handle in self.surface.take_frames() {
                self.controller.on_frame(&mut self.surface, handle);
            }
            self.last_frame = Some(now);
        }
    }

    /// Handle a key event. Returns a command when the store must be asked.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<BoardCommand> {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.should_quit = true;
            return None;
        }
        if key.code == KeyCode::Esc {
            self.escape();
            return None;
        }
        if self.searching {
            self.handle_search_key(key);
            return None;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('r') => {
                self.loading = true;
                return Some(BoardCommand::Reload);
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_vertical(false),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_vertical(true),
            KeyCode::Left | KeyCode::Char('h') if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.move_cursor_horizontal(false);
            }
            KeyCode::Right | KeyCode::Char('l') if !key.modifiers.contains(KeyModifiers::SHIFT) => {
                self.move_cursor_horizontal(true);
            }
            KeyCode::Char('<' | 'H') | KeyCode::Left => return self.move_selected(TaskStatus::previous),
            KeyCode::Char('>' | 'L') | KeyCode::Right => return self.move_selected(TaskStatus::next),
            _ => {}
        }
        None
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => {
                self.query.pop();
                self.refilter();
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    /// Cancels a drag, then a search, then quits.
    fn escape(&mut self) {
        if self.controller.session().is_some() || self.is_arming() {
            if self.controller.reset(&mut self.surface).is_some() {
                self.status_message = Some("Drag cancelled".to_string());
            }
        } else if self.searching || !self.query.is_empty() {
            self.searching = false;
            self.query.clear();
            self.refilter();
        } else {
            self.should_quit = true;
        }
    }

    fn selected_card(&self) -> Option<&Card> {
        self.view.card(self.selected.as_ref()?)
    }

    fn move_cursor_vertical(&mut self, down: bool) {
        let Some(card) = self.selected_card() else {
            self.selected = self.view.cards().next().map(|c| c.id.clone());
            return;
        };
        let column = self.view.column(card.task.status);
        let Some(pos) = column.iter().position(|c| c.id == card.id) else {
            return;
        };
        let next = if down { pos + 1 } else { pos.saturating_sub(1) };
        if let Some(target) = column.get(next) {
            self.selected = Some(target.id.clone());
        }
    }

    fn move_cursor_horizontal(&mut self, right: bool) {
        let Some(card) = self.selected_card() else {
            self.selected = self.view.cards().next().map(|c| c.id.clone());
            return;
        };
        let status = card.task.status;
        let row = self
            .view
            .column(status)
            .iter()
            .position(|c| c.id == card.id)
            .unwrap_or(0);
        let step = if right { TaskStatus::next } else { TaskStatus::previous };
        let mut target = step(status);
        while let Some(column) = target {
            let cards = self.view.column(column);
            if let Some(last) = cards.len().checked_sub(1) {
                self.selected = Some(cards[row.min(last)].id.clone());
                return;
            }
            target = step(column);
        }
    }

    /// Moves the selected card one column over through the same commit path
    /// a mouse drop takes.
    fn move_selected(&mut self, step: fn(TaskStatus) -> Option<TaskStatus>) -> Option<BoardCommand> {
        let card = self.selected_card()?;
        let target = step(card.task.status)?;
        let card_ref = card.card_ref();
        let at = self
            .surface
            .card_rect(&card_ref)
            .map_or(Point::new(0.0, 0.0), Rect::center);
        self.controller.begin_native(&mut self.surface, card_ref, at);
        let outcome = self.controller.commit(&mut self.surface, Some(target));
        self.finish_drag(outcome)
    }

    /// Handle a mouse event. Returns a command when a drop needs writing.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, now: Instant) -> Option<BoardCommand> {
        let at = self.surface.point_at(mouse.column, mouse.row);
        let idle = self.controller.is_idle();

        let inputs = match (self.pointer_mode, mouse.kind) {
            (_, MouseEventKind::ScrollUp) if idle => {
                self.surface.scroll_by(-WHEEL_ROWS * CELL_HEIGHT);
                return None;
            }
            (_, MouseEventKind::ScrollDown) if idle => {
                self.surface.scroll_by(WHEEL_ROWS * CELL_HEIGHT);
                return None;
            }
            (PointerMode::Touch, MouseEventKind::Down(MouseButton::Left)) => {
                let card = self.surface.card_at(at)?;
                self.selected = Some(card.task_id.clone());
                vec![PointerInput::TouchStart { card, at, touches: 1 }]
            }
            (PointerMode::Touch, MouseEventKind::Drag(MouseButton::Left)) => {
                vec![PointerInput::TouchMove { at, touches: 1 }]
            }
            (PointerMode::Touch, MouseEventKind::Up(MouseButton::Left)) => {
                vec![PointerInput::TouchEnd { remaining: 0 }]
            }
            // a second button while the first is held is a second finger
            (PointerMode::Touch, MouseEventKind::Down(MouseButton::Right)) if !idle => {
                vec![PointerInput::TouchMove { at, touches: 2 }]
            }
            (PointerMode::Native, MouseEventKind::Down(MouseButton::Left)) => {
                let card = self.surface.card_at(at)?;
                self.selected = Some(card.task_id.clone());
                vec![PointerInput::DragStart { card, at }]
            }
            (PointerMode::Native, MouseEventKind::Drag(MouseButton::Left)) => {
                vec![PointerInput::DragOver { at }]
            }
            (PointerMode::Native, MouseEventKind::Up(MouseButton::Left)) => {
                let target = self.surface.column_at(at);
                vec![PointerInput::Drop { target }, PointerInput::DragEnd]
            }
            (PointerMode::Native, MouseEventKind::Down(MouseButton::Right)) if !idle => {
                let outcome = self.controller.reset(&mut self.surface);
                return self.finish_drag(outcome);
            }
            _ => return None,
        };

        let mut command = None;
        for input in inputs {
            let outcome = self.controller.handle(&mut self.surface, input, now);
            command = command.or_else(|| self.finish_drag(outcome));
        }
        command
    }

    fn finish_drag(&mut self, outcome: Option<DropOutcome>) -> Option<BoardCommand> {
        match outcome? {
            DropOutcome::Moved(change) => {
                self.status_message = Some(format!("Moving to {}...", change.status.title()));
                Some(BoardCommand::ApplyDrop(DropOutcome::Moved(change)))
            }
            DropOutcome::NoTarget => None,
            DropOutcome::Cancelled => {
                self.status_message = Some("Drag cancelled".to_string());
                None
            }
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}
