//! Finds the column under the pointer and keeps its highlight in sync.

use tracing::trace;

use crate::task::TaskStatus;

use super::geometry::Point;
use super::surface::{HIGHLIGHT_CLASS, HitTestShield, ProxyId, Surface};

/// Tracks the hovered column.
///
/// The hovered column is always the one highlighted column; both change
/// together and only when the target actually changes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DropZoneResolver {
    hovered: Option<TaskStatus>,
}

impl DropZoneResolver {
    /// A resolver hovering nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self { hovered: None }
    }

    /// Column currently hovered.
    #[must_use]
    pub const fn hovered(&self) -> Option<TaskStatus> {
        self.hovered
    }

    /// Hit-tests `at` with `proxy` hidden from the lookup and moves the
    /// highlight if the target changed.
    pub fn resolve<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        at: Point,
        proxy: Option<ProxyId>,
    ) -> Option<TaskStatus> {
        let target = HitTestShield::raise(surface, proxy).column_at(at);
        self.hover(surface, target);
        target
    }

    /// Removes the highlight from every column and forgets the hover.
    pub fn clear<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        for column in TaskStatus::ALL {
            surface.remove_column_class(column, HIGHLIGHT_CLASS);
        }
        self.hovered = None;
    }

    fn hover<S: Surface + ?Sized>(&mut self, surface: &mut S, target: Option<TaskStatus>) {
        if target == self.hovered {
            return;
        }
        trace!(from = ?self.hovered, to = ?target, "hover changed");
        if let Some(previous) = self.hovered {
            surface.remove_column_class(previous, HIGHLIGHT_CLASS);
        }
        if let Some(next) = target {
            surface.add_column_class(next, HIGHLIGHT_CLASS);
        }
        self.hovered = target;
    }
}
