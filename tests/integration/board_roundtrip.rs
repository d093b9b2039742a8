//! Board loading and drop writes against a real store server.
//!
//! Each test starts `join-store` on an ephemeral port, points an
//! [`HttpStore`] at it and drives the board the way the TUI worker does.

use std::sync::Arc;
use std::time::Duration;

use join::board::{BoardService, CommitPolicy};
use join::store::{DocumentStore, HttpStore};
use join::worker::{BoardCommand, BoardEvent, spawn_worker};
use join_core::contact::ContactId;
use join_core::drag::{DropOutcome, StatusChange};
use join_core::task::{TaskId, TaskStatus};
use join_store::server::{StoreState, start_server_with_state};
use join_store::tree::DocumentTree;
use serde_json::{Value, json};

fn seed() -> Value {
    json!({
        "contacts": {
            "c1": { "name": "Anton Mayer", "eMail": "anton@mail.de", "phoneNumber": "+49 1111 111", "color": "#FF7A00", "initial": "AM" }
        },
        "tasks": {
            "t1": {
                "title": "Kochwelt page",
                "description": "Build start page",
                "dueDate": "2026-05-10",
                "category": "User Story",
                "priority": { "name": "urgent", "color": "red" },
                "assignees": {
                    "c1": { "assigneeName": "Anton Mayer", "assigneeInitial": "AM", "assigneeColor": "#FF7A00" },
                    "deleted": { "assigneeName": "Old Friend", "assigneeInitial": "OF", "assigneeColor": "#000000" }
                },
                "statusTask": "todo"
            },
            "t2": {
                "title": "HTML base template",
                "dueDate": "2026-06-01",
                "category": "Technical Task",
                "statusTask": "awaitFeedback"
            }
        }
    })
}

async fn start(seed: Value) -> (Arc<StoreState>, Arc<HttpStore>) {
    let state = Arc::new(StoreState::with_config(
        1024 * 1024,
        DocumentTree::from_value(seed),
    ));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::clone(&state))
        .await
        .unwrap();
    let store = HttpStore::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    (state, Arc::new(store))
}

fn moved(id: &str, status: TaskStatus) -> DropOutcome {
    DropOutcome::Moved(StatusChange {
        task_id: TaskId::new(id),
        index: 0,
        status,
    })
}

#[tokio::test]
async fn load_groups_tasks_and_prunes_deleted_contacts() {
    let (state, store) = start(seed()).await;
    let service = BoardService::new(store, CommitPolicy::default());

    let snapshot = service.load().await.unwrap();
    assert_eq!(snapshot.board.column(TaskStatus::Todo).len(), 1);
    assert_eq!(snapshot.board.column(TaskStatus::AwaitFeedback).len(), 1);
    assert_eq!(snapshot.contacts.len(), 1);

    let card = &snapshot.board.column(TaskStatus::Todo)[0];
    assert!(card.task.assignees.contains_key(&ContactId::new("c1")));
    assert!(!card.task.assignees.contains_key(&ContactId::new("deleted")));

    let db = state.snapshot().await;
    assert!(db["tasks"]["t1"]["assignees"].get("deleted").is_none());
    assert!(db["tasks"]["t1"]["assignees"].get("c1").is_some());
}

#[tokio::test]
async fn drop_writes_only_the_status_field() {
    let (state, store) = start(seed()).await;
    let service = BoardService::new(store, CommitPolicy::ConfirmWrite);

    let report = service
        .apply_drop(&moved("t2", TaskStatus::Done))
        .await
        .unwrap()
        .unwrap();
    assert!(report.written);
    let snapshot = report.snapshot.unwrap();
    assert_eq!(snapshot.board.column(TaskStatus::Done).len(), 1);
    assert!(snapshot.board.column(TaskStatus::AwaitFeedback).is_empty());

    let db = state.snapshot().await;
    assert_eq!(db["tasks"]["t2"]["statusTask"], "done");
    assert_eq!(db["tasks"]["t2"]["title"], "HTML base template");
}

#[tokio::test]
async fn drop_without_target_touches_nothing() {
    let (state, store) = start(seed()).await;
    let service = BoardService::new(store, CommitPolicy::default());
    let before = state.snapshot().await;

    assert!(service.apply_drop(&DropOutcome::NoTarget).await.unwrap().is_none());
    assert_eq!(state.snapshot().await, before);
}

#[tokio::test]
async fn worker_reports_move_and_fresh_board() {
    let (_state, store) = start(seed()).await;
    let (tx, mut rx) = spawn_worker(BoardService::new(store, CommitPolicy::default()), 8);

    tx.send(BoardCommand::ApplyDrop(moved("t1", TaskStatus::InProgress)))
        .await
        .unwrap();
    let Some(BoardEvent::Moved { task_id, status }) = rx.recv().await else {
        panic!("expected a move event");
    };
    assert_eq!(task_id, TaskId::new("t1"));
    assert_eq!(status, TaskStatus::InProgress);
    let Some(BoardEvent::Loaded(snapshot)) = rx.recv().await else {
        panic!("expected a snapshot");
    };
    assert_eq!(snapshot.board.column(TaskStatus::InProgress).len(), 1);

    tx.send(BoardCommand::Shutdown).await.unwrap();
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn unreachable_store_is_reported_by_the_worker() {
    // Port 9 (discard) is not served here.
    let store = Arc::new(HttpStore::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap());
    let (tx, mut rx) = spawn_worker(BoardService::new(store, CommitPolicy::default()), 8);
    tx.send(BoardCommand::Reload).await.unwrap();
    let Some(BoardEvent::Error(message)) = rx.recv().await else {
        panic!("expected an error event");
    };
    assert!(message.starts_with("Reload failed"));
}

#[tokio::test]
async fn raw_store_calls_roundtrip_over_http() {
    let (_state, store) = start(json!({})).await;
    let key = store.post("tasks", &json!({ "title": "x" })).await.unwrap();
    store
        .patch(&format!("tasks/{key}"), &json!({ "statusTask": "done" }))
        .await
        .unwrap();
    let task = store.get(&format!("tasks/{key}")).await.unwrap();
    assert_eq!(task, json!({ "title": "x", "statusTask": "done" }));

    store.delete(&format!("tasks/{key}")).await.unwrap();
    assert_eq!(store.get(&format!("tasks/{key}")).await.unwrap(), Value::Null);
}
