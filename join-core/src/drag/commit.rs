//! Ending a drag.

use serde_json::Value;
use tracing::debug;

use crate::task::{TaskId, TaskStatus};

use super::pointer::CommitTarget;
use super::session::DragSession;
use super::surface::Surface;

/// The one write a successful drop asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Task to move.
    pub task_id: TaskId,
    /// Its position in the list the board was built from.
    pub index: usize,
    /// Column it was dropped on.
    pub status: TaskStatus,
}

impl StatusChange {
    /// Store path of the status field.
    #[must_use]
    pub fn path(&self) -> String {
        format!("tasks/{}/statusTask", self.task_id)
    }

    /// Body of the `PUT`: the status as a bare JSON string.
    #[must_use]
    pub fn body(&self) -> Value {
        Value::String(self.status.as_str().to_owned())
    }
}

/// How a drag ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// Released over a column; the host writes the change and reloads.
    Moved(StatusChange),
    /// Released outside every column.
    NoTarget,
    /// Aborted before release.
    Cancelled,
}

impl DropOutcome {
    /// The write to issue, if any.
    #[must_use]
    pub const fn change(&self) -> Option<&StatusChange> {
        match self {
            Self::Moved(change) => Some(change),
            Self::NoTarget | Self::Cancelled => None,
        }
    }
}

/// Releases the drag. The session is consumed, so nothing of it outlives
/// this call.
pub(crate) fn finish<S: Surface + ?Sized>(
    surface: &mut S,
    session: DragSession,
    target: CommitTarget,
) -> DropOutcome {
    let target = match target {
        CommitTarget::Hovered => session.hovered(),
        CommitTarget::Explicit(column) => column,
    };
    let card = session.card().clone();
    release_visuals(surface, session);
    match target {
        Some(status) => {
            debug!(task = %card.task_id, %status, "drop on column");
            DropOutcome::Moved(StatusChange {
                task_id: card.task_id,
                index: card.index,
                status,
            })
        }
        None => {
            debug!(task = %card.task_id, "drop outside columns");
            DropOutcome::NoTarget
        }
    }
}

/// Aborts the drag without a write.
pub(crate) fn teardown<S: Surface + ?Sized>(surface: &mut S, session: DragSession) -> DropOutcome {
    debug!(task = %session.card().task_id, "drag cancelled");
    release_visuals(surface, session);
    DropOutcome::Cancelled
}

fn release_visuals<S: Surface + ?Sized>(surface: &mut S, mut session: DragSession) {
    session.scroll.stop(surface);
    session.proxy.detach(surface);
    session.resolver.clear(surface);
}
