//! Batch subcommands against a real store server.

use std::sync::Arc;
use std::time::Duration;

use join::commands::{CommandError, Runner};
use join::config::{Command, ContactCommand, TaskCommand};
use join::session::SessionStore;
use join::store::HttpStore;
use join_store::server::{StoreState, start_server_with_state};
use join_store::tree::DocumentTree;
use serde_json::{Value, json};

struct Harness {
    state: Arc<StoreState>,
    runner: Runner<HttpStore>,
    session: SessionStore,
    _dir: tempfile::TempDir,
}

async fn harness(seed: Value) -> Harness {
    let state = Arc::new(StoreState::with_config(1024 * 1024, DocumentTree::from_value(seed)));
    let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::clone(&state))
        .await
        .unwrap();
    let store = HttpStore::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    Harness {
        state,
        runner: Runner::new(Arc::new(store), SessionStore::new(path.clone())),
        session: SessionStore::new(path),
        _dir: dir,
    }
}

async fn run(h: &Harness, command: Command) -> Result<String, CommandError> {
    let mut out = Vec::new();
    h.runner.run(command, &mut out).await?;
    Ok(String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn signup_creates_account_contact_and_session() {
    let h = harness(json!({})).await;
    let out = run(
        &h,
        Command::Signup {
            name: "Sofia Müller".into(),
            email: "sofia@mueller.de".into(),
            password: "secret".into(),
            confirm: "secret".into(),
            accept_policy: true,
        },
    )
    .await
    .unwrap();
    assert!(out.contains("Welcome, Sofia Müller"));

    let db = h.state.snapshot().await;
    let users = db["user"].as_object().unwrap();
    assert_eq!(users.len(), 1);
    let contacts = db["contacts"].as_object().unwrap();
    let contact = contacts.values().next().unwrap();
    assert_eq!(contact["eMail"], "sofia@mueller.de");
    assert_eq!(contact["initial"], "SM");

    let session = h.session.load().unwrap();
    assert_eq!(session.active_user.unwrap().initials, "SM");
    assert!(session.show_mobile_greeting);
    assert!(h.session.take_greeting().unwrap());
    assert!(!h.session.take_greeting().unwrap());
}

#[tokio::test]
async fn second_signup_with_same_email_is_refused() {
    let h = harness(json!({
        "user": { "u1": { "name": "Sofia", "eMail": "sofia@mueller.de", "password": "x", "color": "#FF7A00", "initial": "S" } }
    }))
    .await;
    let err = run(
        &h,
        Command::Signup {
            name: "Other Sofia".into(),
            email: "sofia@mueller.de".into(),
            password: "pw".into(),
            confirm: "pw".into(),
            accept_policy: true,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CommandError::Auth(_)));
    assert_eq!(h.state.snapshot().await["user"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn renaming_a_contact_rewrites_its_assignments() {
    let h = harness(json!({
        "contacts": {
            "c1": { "name": "Anton Mayer", "eMail": "anton@mail.de", "phoneNumber": "+49 1111 111", "color": "#FF7A00", "initial": "AM" }
        },
        "tasks": {
            "t1": {
                "title": "Kochwelt page",
                "dueDate": "2026-05-10",
                "category": "User Story",
                "assignees": { "c1": { "assigneeName": "Anton Mayer", "assigneeInitial": "AM", "assigneeColor": "#FF7A00" } },
                "statusTask": "todo"
            }
        }
    }))
    .await;

    let out = run(
        &h,
        Command::Contact(ContactCommand::Edit {
            id: "c1".into(),
            name: Some("Anton Berger".into()),
            email: None,
            phone: None,
        }),
    )
    .await
    .unwrap();
    assert!(out.contains("Renamed in 1 task(s)"));

    let db = h.state.snapshot().await;
    assert_eq!(db["contacts"]["c1"]["initial"], "AB");
    assert_eq!(db["tasks"]["t1"]["assignees"]["c1"]["assigneeName"], "Anton Berger");
    assert_eq!(db["tasks"]["t1"]["assignees"]["c1"]["assigneeInitial"], "AB");
}

#[tokio::test]
async fn added_task_shows_up_in_list_and_summary() {
    let h = harness(json!({})).await;
    run(
        &h,
        Command::Task(TaskCommand::Add {
            title: "Release notes".into(),
            description: "Summarise the sprint".into(),
            due: "2027-01-15".into(),
            priority: "urgent".into(),
            category: "Technical Task".into(),
            status: "inProgress".into(),
            subtasks: vec!["Collect".into(), "Write".into()],
            assignees: Vec::new(),
        }),
    )
    .await
    .unwrap();

    let list = run(&h, Command::Task(TaskCommand::List { query: Some("sprint".into()) }))
        .await
        .unwrap();
    assert!(list.contains("In Progress (1)"));
    assert!(list.contains("Release notes"));
    assert!(list.contains("0/2 Subtasks"));

    let summary = run(&h, Command::Summary).await.unwrap();
    assert!(summary.contains("Tasks in Board: 1"));
    assert!(summary.contains("Upcoming Deadline: 2027-01-15"));
}

#[tokio::test]
async fn invalid_due_date_is_rejected_before_writing() {
    let h = harness(json!({})).await;
    let err = run(
        &h,
        Command::Task(TaskCommand::Add {
            title: "Too late".into(),
            description: String::new(),
            due: "2031-01-01".into(),
            priority: "low".into(),
            category: "User Story".into(),
            status: "todo".into(),
            subtasks: Vec::new(),
            assignees: Vec::new(),
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CommandError::Task(_)));
    assert!(h.state.snapshot().await.get("tasks").is_none());
}

#[tokio::test]
async fn editing_a_task_keeps_column_and_ticked_subtasks() {
    let h = harness(json!({
        "contacts": {
            "c1": { "name": "Anton Mayer", "eMail": "anton@mail.de", "phoneNumber": "", "color": "#FF7A00", "initial": "AM" },
            "c2": { "name": "Carla Braun", "eMail": "carla@mail.de", "phoneNumber": "", "color": "#1FD7C1", "initial": "CB" }
        },
        "tasks": {
            "t1": {
                "title": "Contact form",
                "description": "",
                "dueDate": "2026-09-01",
                "priority": { "name": "medium", "color": "orange" },
                "assignees": { "c1": { "assigneeName": "Anton Mayer", "assigneeInitial": "AM", "assigneeColor": "#FF7A00" } },
                "category": "User Story",
                "subtasks": {
                    "s1": { "text": "Fields", "done": true },
                    "s2": { "text": "Validation", "done": false }
                },
                "statusTask": "awaitFeedback"
            }
        }
    }))
    .await;

    run(
        &h,
        Command::Task(TaskCommand::Edit {
            id: "t1".into(),
            title: Some("Contact form v2".into()),
            description: Some("With imprint link".into()),
            due: None,
            priority: Some("urgent".into()),
            subtasks: vec!["Fields".into(), "Imprint link".into()],
            assignees: vec!["c2".into()],
        }),
    )
    .await
    .unwrap();

    let db = h.state.snapshot().await;
    let task = &db["tasks"]["t1"];
    assert_eq!(task["title"], "Contact form v2");
    assert_eq!(task["description"], "With imprint link");
    assert_eq!(task["dueDate"], "2026-09-01");
    assert_eq!(task["priority"]["name"], "urgent");
    assert_eq!(task["statusTask"], "awaitFeedback");
    assert_eq!(task["category"], "User Story");
    assert_eq!(task["subtasks"]["s1"], json!({ "text": "Fields", "done": true }));
    assert!(task["subtasks"].get("s2").is_none());
    assert_eq!(task["subtasks"].as_object().unwrap().len(), 2);
    assert!(task["assignees"].get("c1").is_none());
    assert_eq!(task["assignees"]["c2"]["assigneeInitial"], "CB");
}
