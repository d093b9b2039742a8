//! The host seam of the drag engine.
//!
//! A [`Surface`] is whatever draws the board: a browser document, a
//! terminal layout, or the in-memory [`RecordingSurface`](super::RecordingSurface)
//! used by tests. The engine never touches anything else.

use std::time::Duration;

use crate::task::{TaskId, TaskStatus};

use super::geometry::{Point, Rect};

/// Marks the column under the pointer.
pub const HIGHLIGHT_CLASS: &str = "drag_area_highlight";

/// Marks the original card during a native drag.
pub const DRAGGED_CLASS: &str = "dragged_task_visual";

/// Marks the original card while its touch proxy floats.
pub const TOUCH_ORIGINAL_CLASS: &str = "mobile_drag_active_original";

/// Carried by the floating proxy itself.
pub const PROXY_CLASS: &str = "mobile_drag_clone";

/// Which card is being dragged.
///
/// Hosts associate one of these with every rendered card so a drag never has
/// to recover the task from element attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CardRef {
    /// Store key of the task.
    pub task_id: TaskId,
    /// Position of the task in the flat list the board was built from.
    pub index: usize,
}

impl CardRef {
    /// Creates a card reference.
    #[must_use]
    pub const fn new(task_id: TaskId, index: usize) -> Self {
        Self { task_id, index }
    }
}

/// A floating proxy created by [`Surface::clone_card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(pub u64);

/// A pending per-frame callback created by [`Surface::request_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub u64);

/// Everything the drag engine reads from or does to the board display.
///
/// Coordinates are viewport-relative. All methods are infallible: a host that
/// cannot perform an effect skips it.
pub trait Surface {
    /// Rendered box of a card, if it is on screen.
    fn card_rect(&self, card: &CardRef) -> Option<Rect>;

    /// Adds a style class to a card.
    fn add_card_class(&mut self, card: &CardRef, class: &'static str);

    /// Removes a style class from a card.
    fn remove_card_class(&mut self, card: &CardRef, class: &'static str);

    /// Copies a card onto the top layer at `rect` and returns the copy.
    fn clone_card(&mut self, card: &CardRef, rect: Rect) -> ProxyId;

    /// Moves a proxy.
    fn place_proxy(&mut self, proxy: ProxyId, rect: Rect);

    /// Removes a proxy. Unknown ids are ignored.
    fn remove_proxy(&mut self, proxy: ProxyId);

    /// Toggles whether point lookups can hit the proxy.
    fn set_proxy_hit_testable(&mut self, proxy: ProxyId, enabled: bool);

    /// Column whose container is the topmost element under `at`.
    ///
    /// A hit-testable proxy over `at` shadows the column beneath it.
    fn column_at(&self, at: Point) -> Option<TaskStatus>;

    /// Adds a style class to a column container.
    fn add_column_class(&mut self, column: TaskStatus, class: &'static str);

    /// Removes a style class from a column container.
    fn remove_column_class(&mut self, column: TaskStatus, class: &'static str);

    /// Visible height of the scrolling area.
    fn viewport_height(&self) -> f64;

    /// Scrolls the board vertically.
    fn scroll_by(&mut self, dy: f64);

    /// Schedules one callback before the next repaint.
    fn request_frame(&mut self) -> FrameHandle;

    /// Drops a scheduled callback. Unknown or fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Best-effort haptic pulse. Returns `false` when unsupported.
    fn vibrate(&mut self, pulse: Duration) -> bool;
}

/// Makes the proxy invisible to hit-testing for exactly one lookup.
///
/// Hit-testing is restored when the shield goes out of scope.
pub(crate) struct HitTestShield<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
    proxy: Option<ProxyId>,
}

impl<'a, S: Surface + ?Sized> HitTestShield<'a, S> {
    pub(crate) fn raise(surface: &'a mut S, proxy: Option<ProxyId>) -> Self {
        if let Some(id) = proxy {
            surface.set_proxy_hit_testable(id, false);
        }
        Self { surface, proxy }
    }

    pub(crate) fn column_at(&self, at: Point) -> Option<TaskStatus> {
        self.surface.column_at(at)
    }
}

impl<S: Surface + ?Sized> Drop for HitTestShield<'_, S> {
    fn drop(&mut self) {
        if let Some(id) = self.proxy {
            self.surface.set_proxy_hit_testable(id, true);
        }
    }
}
