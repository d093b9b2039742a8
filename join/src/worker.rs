//! Background worker bridging the TUI loop with the async store.
//!
//! The TUI thread never awaits. It sends [`BoardCommand`]s and drains
//! [`BoardEvent`]s on every tick of its poll loop.
//!
//! ```text
//! TUI (main thread)  ←── BoardEvent ───  worker task
//!                     ─── BoardCommand →
//! ```

use std::sync::Arc;

use join_core::drag::DropOutcome;
use join_core::task::{TaskId, TaskStatus};
use tokio::sync::mpsc;

use crate::board::{BoardService, BoardSnapshot};
use crate::store::DocumentStore;

/// Default capacity of both channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Requests from the TUI.
#[derive(Debug)]
pub enum BoardCommand {
    /// Fetch tasks and contacts again.
    Reload,
    /// Write what a drop asked for, then reload.
    ApplyDrop(DropOutcome),
    /// Stop the worker.
    Shutdown,
}

/// Results for the TUI.
#[derive(Debug)]
pub enum BoardEvent {
    /// A fresh board arrived.
    Loaded(Box<BoardSnapshot>),
    /// A dropped card's status write reached the store.
    Moved {
        /// The task.
        task_id: TaskId,
        /// Its new column.
        status: TaskStatus,
    },
    /// The board could not be refetched after a drop and may be out of date.
    Stale,
    /// A request failed; the board shown is stale.
    Error(String),
}

/// Spawns the worker on the current runtime and returns its channel ends.
pub fn spawn_worker<S>(
    service: BoardService<S>,
    capacity: usize,
) -> (mpsc::Sender<BoardCommand>, mpsc::Receiver<BoardEvent>)
where
    S: DocumentStore + 'static,
{
    let (cmd_tx, cmd_rx) = mpsc::channel(capacity);
    let (evt_tx, evt_rx) = mpsc::channel(capacity);
    tokio::spawn(command_handler(Arc::new(service), cmd_rx, evt_tx));
    (cmd_tx, evt_rx)
}

async fn command_handler<S: DocumentStore>(
    service: Arc<BoardService<S>>,
    mut cmd_rx: mpsc::Receiver<BoardCommand>,
    evt_tx: mpsc::Sender<BoardEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let events = match cmd {
            BoardCommand::Reload => vec![match service.load().await {
                Ok(snapshot) => BoardEvent::Loaded(Box::new(snapshot)),
                Err(e) => {
                    tracing::warn!(error = %e, "board reload failed");
                    BoardEvent::Error(format!("Reload failed: {e}"))
                }
            }],
            BoardCommand::ApplyDrop(outcome) => apply(&service, &outcome).await,
            BoardCommand::Shutdown => {
                tracing::info!("board worker shutting down");
                break;
            }
        };

        for event in events {
            if evt_tx.send(event).await.is_err() {
                // TUI dropped; exit.
                return;
            }
        }
    }
}

async fn apply<S: DocumentStore>(service: &BoardService<S>, outcome: &DropOutcome) -> Vec<BoardEvent> {
    match service.apply_drop(outcome).await {
        Ok(None) => Vec::new(),
        Ok(Some(report)) => {
            let mut events = Vec::with_capacity(2);
            if report.written
                && let Some(change) = outcome.change()
            {
                events.push(BoardEvent::Moved {
                    task_id: change.task_id.clone(),
                    status: change.status,
                });
            }
            events.push(report.snapshot.map_or(BoardEvent::Stale, |s| BoardEvent::Loaded(Box::new(s))));
            events
        }
        Err(e) => vec![BoardEvent::Error(format!("Move failed: {e}"))],
    }
}

#[cfg(test)]
mod tests {
    use join_core::drag::StatusChange;
    use serde_json::json;

    use super::*;
    use crate::board::CommitPolicy;
    use crate::store::MemoryStore;

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_data(json!({
            "tasks": { "t1": { "title": "A", "dueDate": "2026-03-03", "category": "User Story", "statusTask": "todo" } }
        })))
    }

    fn moved() -> DropOutcome {
        DropOutcome::Moved(StatusChange {
            task_id: TaskId::new("t1"),
            index: 0,
            status: TaskStatus::Done,
        })
    }

    #[tokio::test]
    async fn reload_emits_snapshot() {
        let (tx, mut rx) = spawn_worker(BoardService::new(store(), CommitPolicy::default()), 8);
        tx.send(BoardCommand::Reload).await.unwrap();
        let Some(BoardEvent::Loaded(snapshot)) = rx.recv().await else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.tasks.len(), 1);
        tx.send(BoardCommand::Shutdown).await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn drop_emits_moved_then_loaded() {
        let store = store();
        let (tx, mut rx) = spawn_worker(BoardService::new(Arc::clone(&store), CommitPolicy::default()), 8);
        tx.send(BoardCommand::ApplyDrop(moved())).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(BoardEvent::Moved { status: TaskStatus::Done, .. })
        ));
        let Some(BoardEvent::Loaded(snapshot)) = rx.recv().await else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.board.column(TaskStatus::Done).len(), 1);
        assert_eq!(store.root()["tasks"]["t1"]["statusTask"], "done");
    }

    #[tokio::test]
    async fn confirmed_failure_is_reported() {
        let store = store();
        store.fail_writes(true);
        let (tx, mut rx) = spawn_worker(BoardService::new(store, CommitPolicy::ConfirmWrite), 8);
        tx.send(BoardCommand::ApplyDrop(moved())).await.unwrap();
        assert!(matches!(rx.recv().await, Some(BoardEvent::Error(_))));
    }

    #[tokio::test]
    async fn failed_write_reloads_without_claiming_a_move() {
        let store = store();
        store.fail_writes(true);
        let (tx, mut rx) = spawn_worker(BoardService::new(Arc::clone(&store), CommitPolicy::default()), 8);
        tx.send(BoardCommand::ApplyDrop(moved())).await.unwrap();

        let Some(BoardEvent::Loaded(snapshot)) = rx.recv().await else {
            panic!("expected only a fresh board");
        };
        assert_eq!(snapshot.board.column(TaskStatus::Todo).len(), 1);
        assert_eq!(store.root()["tasks"]["t1"]["statusTask"], "todo");

        tx.send(BoardCommand::Shutdown).await.unwrap();
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn failed_reload_after_write_reports_move_and_staleness() {
        let store = store();
        store.fail_reads(true);
        let (tx, mut rx) = spawn_worker(BoardService::new(Arc::clone(&store), CommitPolicy::default()), 8);
        tx.send(BoardCommand::ApplyDrop(moved())).await.unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(BoardEvent::Moved { status: TaskStatus::Done, .. })
        ));
        assert!(matches!(rx.recv().await, Some(BoardEvent::Stale)));
        assert_eq!(store.root()["tasks"]["t1"]["statusTask"], "done");
    }

    #[tokio::test]
    async fn no_target_emits_nothing() {
        let (tx, mut rx) = spawn_worker(BoardService::new(store(), CommitPolicy::default()), 8);
        tx.send(BoardCommand::ApplyDrop(DropOutcome::NoTarget)).await.unwrap();
        tx.send(BoardCommand::Reload).await.unwrap();
        assert!(matches!(rx.recv().await, Some(BoardEvent::Loaded(_))));
    }
}
