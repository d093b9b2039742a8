//! The floating copy of a card that follows a touch drag.

use tracing::debug;

use super::geometry::{Point, Rect};
use super::pointer::ActivationMode;
use super::surface::{CardRef, DRAGGED_CLASS, ProxyId, Surface, TOUCH_ORIGINAL_CLASS};

/// Visual state of the dragged card.
///
/// Native drags only mark the original card; the platform draws the ghost.
/// Touch drags also float a clone of the card's box above the board.
#[derive(Debug, PartialEq)]
pub struct VisualProxy {
    card: CardRef,
    class: &'static str,
    clone: Option<(ProxyId, Rect)>,
    attached: bool,
}

impl VisualProxy {
    /// Marks `card` as dragged and, for touch, floats a clone over it.
    pub fn attach<S: Surface + ?Sized>(surface: &mut S, card: CardRef, mode: ActivationMode) -> Self {
        let (class, clone) = match mode {
            ActivationMode::Native => (DRAGGED_CLASS, None),
            ActivationMode::Touch => {
                let clone = surface.card_rect(&card).map(|rect| {
                    let id = surface.clone_card(&card, rect);
                    debug!(task = %card.task_id, ?id, "proxy attached");
                    (id, rect)
                });
                (TOUCH_ORIGINAL_CLASS, clone)
            }
        };
        surface.add_card_class(&card, class);
        Self {
            card,
            class,
            clone,
            attached: true,
        }
    }

    /// Re-centres the clone on the pointer. No-op for native drags.
    pub fn follow<S: Surface + ?Sized>(&mut self, surface: &mut S, at: Point) {
        if !self.attached {
            return;
        }
        if let Some((id, rect)) = &mut self.clone {
            *rect = rect.centered_on(at);
            surface.place_proxy(*id, *rect);
        }
    }

    /// Removes the clone and the card class. Safe to call more than once.
    pub fn detach<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if !self.attached {
            return;
        }
        self.attached = false;
        if let Some((id, _)) = self.clone.take() {
            surface.remove_proxy(id);
            debug!(task = %self.card.task_id, ?id, "proxy detached");
        }
        surface.remove_card_class(&self.card, self.class);
    }

    /// The card being dragged.
    #[must_use]
    pub const fn card(&self) -> &CardRef {
        &self.card
    }

    /// The floating clone, while attached.
    #[must_use]
    pub fn id(&self) -> Option<ProxyId> {
        self.clone.map(|(id, _)| id)
    }

    /// Where the clone currently sits.
    #[must_use]
    pub fn rect(&self) -> Option<Rect> {
        self.clone.map(|(_, rect)| rect)
    }

    /// Whether [`detach`](Self::detach) has not run yet.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::RecordingSurface;
    use crate::task::{TaskId, TaskStatus};

    fn setup() -> (RecordingSurface, CardRef) {
        let card = CardRef::new(TaskId::new("t1"), 0);
        let surface = RecordingSurface::board(1000.0).with_card(&card, TaskStatus::Todo, 0);
        (surface, card)
    }

    #[test]
    fn touch_clone_matches_card_box() {
        let (mut surface, card) = setup();
        let rect = surface.card_rect(&card).unwrap();
        let proxy = VisualProxy::attach(&mut surface, card.clone(), ActivationMode::Touch);
        assert_eq!(proxy.rect(), Some(rect));
        assert_eq!(surface.live_proxies(), 1);
        assert!(surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
    }

    #[test]
    fn follow_recentres() {
        let (mut surface, card) = setup();
        let mut proxy = VisualProxy::attach(&mut surface, card, ActivationMode::Touch);
        proxy.follow(&mut surface, Point::new(400.0, 400.0));
        let rect = proxy.rect().unwrap();
        assert_eq!(rect.center(), Point::new(400.0, 400.0));
        assert_eq!(surface.proxy_rect(proxy.id().unwrap()), Some(rect));
    }

    #[test]
    fn detach_is_idempotent() {
        let (mut surface, card) = setup();
        let mut proxy = VisualProxy::attach(&mut surface, card.clone(), ActivationMode::Touch);
        proxy.detach(&mut surface);
        let ops = surface.ops().len();
        proxy.detach(&mut surface);
        assert_eq!(surface.ops().len(), ops);
        assert_eq!(surface.live_proxies(), 0);
        assert!(!surface.card_has_class(&card.task_id, TOUCH_ORIGINAL_CLASS));
    }

    #[test]
    fn native_only_marks_card() {
        let (mut surface, card) = setup();
        let mut proxy = VisualProxy::attach(&mut surface, card.clone(), ActivationMode::Native);
        assert_eq!(proxy.id(), None);
        assert_eq!(surface.live_proxies(), 0);
        assert!(surface.card_has_class(&card.task_id, DRAGGED_CLASS));
        proxy.detach(&mut surface);
        assert!(!surface.card_has_class(&card.task_id, DRAGGED_CLASS));
    }
}
