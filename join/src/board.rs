//! Loading the board and writing the result of a drop.

use std::sync::Arc;

use join_core::board::Board;
use join_core::contact::ContactEntry;
use join_core::drag::DropOutcome;
use join_core::task::TaskEntry;

use crate::contacts::{ContactError, ContactRepository};
use crate::store::{DocumentStore, StoreError};
use crate::tasks::{TaskError, TaskRepository};

/// Whether the board reload after a drop waits for the status write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Reload even when the write failed; the failure is only logged.
    #[default]
    #[value(name = "reload_always")]
    ReloadAlways,
    /// Reload only after the write succeeded; a failure is reported.
    #[value(name = "confirm_write")]
    ConfirmWrite,
}

/// Errors from loading or updating the board.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Reading or writing tasks failed.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Reading contacts failed.
    #[error(transparent)]
    Contact(#[from] ContactError),

    /// A raw store request failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything the board view needs, fetched together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardSnapshot {
    /// Tasks in store order.
    pub tasks: Vec<TaskEntry>,
    /// Contacts sorted by name.
    pub contacts: Vec<ContactEntry>,
    /// Tasks grouped into columns.
    pub board: Board,
}

impl BoardSnapshot {
    /// Builds the columns for `tasks`.
    #[must_use]
    pub fn new(tasks: Vec<TaskEntry>, contacts: Vec<ContactEntry>) -> Self {
        let board = Board::from_tasks(&tasks);
        Self { tasks, contacts, board }
    }
}

/// What writing a drop achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropReport {
    /// The status write reached the store.
    pub written: bool,
    /// The board after the write, unless reloading failed.
    pub snapshot: Option<BoardSnapshot>,
}

/// Board reads and drop writes.
#[derive(Debug)]
pub struct BoardService<S> {
    store: Arc<S>,
    tasks: TaskRepository<S>,
    contacts: ContactRepository<S>,
    policy: CommitPolicy,
}

impl<S: DocumentStore> BoardService<S> {
    /// Service over `store`.
    pub fn new(store: Arc<S>, policy: CommitPolicy) -> Self {
        Self {
            tasks: TaskRepository::new(Arc::clone(&store)),
            contacts: ContactRepository::new(Arc::clone(&store)),
            store,
            policy,
        }
    }

    /// The policy drops are written with.
    #[must_use]
    pub const fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// Fetches tasks and contacts and unassigns contacts that were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] if either collection cannot be read.
    pub async fn load(&self) -> Result<BoardSnapshot, BoardError> {
        let mut tasks = self.tasks.list().await?;
        let contacts = self.contacts.list().await?;

        for (task_id, contact_id) in self.tasks.prune_dangling_assignees(&tasks, &contacts).await {
            if let Some(entry) = tasks.iter_mut().find(|e| e.id == task_id) {
                entry.task.assignees.remove(&contact_id);
            }
        }

        tracing::debug!(tasks = tasks.len(), contacts = contacts.len(), "board loaded");
        Ok(BoardSnapshot::new(tasks, contacts))
    }

    /// Writes the status change a drop asked for and reloads.
    ///
    /// Returns `Ok(None)` when the drop changed nothing; no request is made.
    /// A reload that fails after the write is logged and leaves
    /// [`DropReport::snapshot`] empty.
    ///
    /// # Errors
    ///
    /// Under [`CommitPolicy::ConfirmWrite`] a failed write is returned and
    /// no reload happens. Under [`CommitPolicy::ReloadAlways`] nothing is.
    pub async fn apply_drop(&self, outcome: &DropOutcome) -> Result<Option<DropReport>, BoardError> {
        let Some(change) = outcome.change() else {
            return Ok(None);
        };

        let written = match self.store.put(&change.path(), &change.body()).await {
            Ok(()) => {
                tracing::info!(task = %change.task_id, status = %change.status.as_str(), "task moved");
                true
            }
            Err(e) => match self.policy {
                CommitPolicy::ReloadAlways => {
                    tracing::warn!(task = %change.task_id, error = %e, "status write failed, reloading anyway");
                    false
                }
                CommitPolicy::ConfirmWrite => {
                    tracing::warn!(task = %change.task_id, error = %e, "status write failed");
                    return Err(e.into());
                }
            },
        };

        let snapshot = match self.load().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(task = %change.task_id, error = %e, "reload after drop failed, board is stale");
                None
            }
        };

        Ok(Some(DropReport { written, snapshot }))
    }
}
