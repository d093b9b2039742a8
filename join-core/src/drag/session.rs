//! State of the one drag in progress.

use super::geometry::Point;
use super::pointer::ActivationMode;
use super::proxy::VisualProxy;
use super::resolver::DropZoneResolver;
use super::scroll::{AutoScroll, ScrollConfig, scroll_speed};
use super::surface::{CardRef, FrameHandle, Surface};
use crate::task::TaskStatus;

/// Everything a drag owns between start and commit.
///
/// Only [`DragController`](super::DragController) creates and ends sessions.
#[derive(Debug, PartialEq)]
pub struct DragSession {
    mode: ActivationMode,
    pointer: Point,
    pub(crate) proxy: VisualProxy,
    pub(crate) resolver: DropZoneResolver,
    pub(crate) scroll: AutoScroll,
}

impl DragSession {
    pub(crate) fn start<S: Surface + ?Sized>(
        surface: &mut S,
        card: CardRef,
        mode: ActivationMode,
        at: Point,
    ) -> Self {
        Self {
            mode,
            pointer: at,
            proxy: VisualProxy::attach(surface, card, mode),
            resolver: DropZoneResolver::new(),
            scroll: AutoScroll::new(),
        }
    }

    /// Applies one pointer move: proxy position, then hover, then velocity.
    pub(crate) fn track<S: Surface + ?Sized>(&mut self, surface: &mut S, at: Point, scroll: &ScrollConfig) {
        self.pointer = at;
        self.proxy.follow(surface, at);
        self.resolver.resolve(surface, at, self.proxy.id());
        let velocity = scroll_speed(at.y, surface.viewport_height(), scroll);
        self.scroll.update(surface, velocity);
    }

    /// The card being dragged.
    #[must_use]
    pub const fn card(&self) -> &CardRef {
        self.proxy.card()
    }

    /// Native or touch.
    #[must_use]
    pub const fn mode(&self) -> ActivationMode {
        self.mode
    }

    /// Last pointer position.
    #[must_use]
    pub const fn pointer(&self) -> Point {
        self.pointer
    }

    /// Column under the pointer.
    #[must_use]
    pub const fn hovered(&self) -> Option<TaskStatus> {
        self.resolver.hovered()
    }

    /// Current auto-scroll velocity.
    #[must_use]
    pub const fn velocity(&self) -> i32 {
        self.scroll.velocity()
    }

    /// Pending auto-scroll frame.
    #[must_use]
    pub const fn frame(&self) -> Option<FrameHandle> {
        self.scroll.handle()
    }

    /// Visual state of the dragged card.
    #[must_use]
    pub const fn proxy(&self) -> &VisualProxy {
        &self.proxy
    }
}
