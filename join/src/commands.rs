//! Non-interactive subcommands.
//!
//! Each command talks to the store once, prints a short report to `out` and
//! returns. The board itself is interactive and handled by the binary.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use chrono::Timelike;
use join_core::board::Board;
use join_core::contact::{ContactDraft, ContactId, group_by_letter};
use join_core::summary::Summary;
use join_core::task::{Assignee, Priority, TaskDraft, TaskId, TaskStatus};
use join_core::user::{SignUpForm, greeting};

use crate::auth::{AuthError, AuthService};
use crate::config::{Command, ContactCommand, TaskCommand};
use crate::contacts::{ContactError, ContactRepository};
use crate::session::{SessionError, SessionStore};
use crate::store::DocumentStore;
use crate::tasks::{TaskError, TaskRepository};

/// Errors from running a subcommand.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// A task operation failed.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// A contact operation failed.
    #[error(transparent)]
    Contact(#[from] ContactError),

    /// Signing up or logging in failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The session file could not be used.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Writing the report failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument could not be understood.
    #[error("{0}")]
    Usage(String),
}

/// Runs subcommands against one store and session file.
#[derive(Debug)]
pub struct Runner<S> {
    store: Arc<S>,
    tasks: TaskRepository<S>,
    contacts: ContactRepository<S>,
    session: SessionStore,
}

impl<S: DocumentStore> Runner<S> {
    /// Runner over `store`, remembering logins in `session`.
    pub fn new(store: Arc<S>, session: SessionStore) -> Self {
        Self {
            tasks: TaskRepository::new(Arc::clone(&store)),
            contacts: ContactRepository::new(Arc::clone(&store)),
            store,
            session,
        }
    }

    /// Runs `command`, writing its report to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if an argument is invalid, a store request
    /// fails, or the session file cannot be used.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> Result<(), CommandError> {
        match command {
            Command::Board => Err(CommandError::Usage(
                "the board needs an interactive terminal".to_string(),
            )),
            Command::Summary => self.summary(out).await,
            Command::Task(cmd) => self.task(cmd, out).await,
            Command::Contact(cmd) => self.contact(cmd, out).await,
            Command::Signup {
                name,
                email,
                password,
                confirm,
                accept_policy,
            } => {
                let form = SignUpForm {
                    name,
                    email,
                    password,
                    confirm,
                    accepted_policy: accept_policy,
                };
                let user = AuthService::new(Arc::clone(&self.store)).sign_up(form).await?;
                writeln!(out, "You signed up successfully. Welcome, {}!", user.name)?;
                self.session.log_in(user)?;
                Ok(())
            }
            Command::Login { email, password } => {
                let user = AuthService::new(Arc::clone(&self.store))
                    .login(&email, &password)
                    .await?;
                writeln!(out, "Logged in as {}", user.name)?;
                self.session.log_in(user)?;
                Ok(())
            }
            Command::Guest => {
                let user = AuthService::new(Arc::clone(&self.store)).guest();
                writeln!(out, "Logged in as guest")?;
                self.session.log_in(user)?;
                Ok(())
            }
            Command::Logout => {
                self.session.clear()?;
                writeln!(out, "Logged out")?;
                Ok(())
            }
            Command::Whoami => self.whoami(out),
        }
    }

    async fn summary<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        let tasks = self.tasks.list().await?;
        let summary = Summary::compute(&tasks, chrono::Local::now().date_naive());
        writeln!(out, "Tasks in Board: {}", summary.total)?;
        for status in TaskStatus::ALL {
            writeln!(out, "{:<16}{}", status.title(), summary.count(status))?;
        }
        writeln!(out, "{:<16}{}", "Urgent", summary.urgent)?;
        writeln!(out, "Upcoming Deadline: {}", summary.deadline_label())?;
        Ok(())
    }

    async fn task<W: Write>(&self, command: TaskCommand, out: &mut W) -> Result<(), CommandError> {
        match command {
            TaskCommand::List { query } => {
                let tasks = self.tasks.list().await?;
                let filtered = Board::from_tasks(&tasks).filter(query.as_deref().unwrap_or_default());
                if let Some(message) = filtered.message {
                    writeln!(out, "{message}")?;
                    return Ok(());
                }
                for status in TaskStatus::ALL {
                    let cards = filtered.board.column(status);
                    writeln!(out, "{} ({})", status.title(), cards.len())?;
                    if cards.is_empty() {
                        writeln!(out, "  {}", status.empty_message())?;
                    }
                    for card in cards {
                        let task = &card.task;
                        let priority = task.priority_or_default().label();
                        write!(out, "  [{}] {} | due {} | {priority}", card.id, task.title, task.due_date)?;
                        if task.progress().total > 0 {
                            write!(out, " | {}", task.progress())?;
                        }
                        writeln!(out)?;
                    }
                }
                Ok(())
            }
            TaskCommand::Add {
                title,
                description,
                due,
                priority,
                category,
                status,
                subtasks,
                assignees,
            } => {
                let mut draft = TaskDraft::for_column(parse_status(&status)?);
                draft.title = title;
                draft.description = description;
                draft.due_date = due;
                draft.priority = priority.parse::<Priority>().map_err(CommandError::Usage)?;
                draft.category = Some(category).filter(|c| !c.trim().is_empty());
                draft.subtasks = subtasks;
                draft.assignees = self.assignees(assignees).await?;
                let id = self.tasks.create(draft).await?;
                writeln!(out, "Task added to board: {id}")?;
                Ok(())
            }
            TaskCommand::Edit {
                id,
                title,
                description,
                due,
                priority,
                subtasks,
                assignees,
            } => {
                let id = TaskId::new(id);
                let current = self.tasks.get(&id).await?;
                let mut draft = TaskDraft::from_task(&current);
                if let Some(title) = title {
                    draft.title = title;
                }
                if let Some(description) = description {
                    draft.description = description;
                }
                if let Some(due) = due {
                    draft.due_date = due;
                }
                if let Some(priority) = priority {
                    draft.priority = priority.parse::<Priority>().map_err(CommandError::Usage)?;
                }
                if !subtasks.is_empty() {
                    draft.subtasks = subtasks;
                }
                if !assignees.is_empty() {
                    draft.assignees = self.assignees(assignees).await?;
                }
                let task = self.tasks.replace(&id, draft).await?;
                writeln!(out, "Saved task {id}: {}", task.title)?;
                Ok(())
            }
            TaskCommand::Move { id, status } => {
                let status = parse_status(&status)?;
                let id = TaskId::new(id);
                // Unknown ids must not create half a task.
                self.tasks.get(&id).await?;
                self.tasks.set_status(&id, status).await?;
                writeln!(out, "Moved {id} to {}", status.title())?;
                Ok(())
            }
            TaskCommand::Delete { id } => {
                let id = TaskId::new(id);
                self.tasks.delete(&id).await?;
                writeln!(out, "Deleted task {id}")?;
                Ok(())
            }
            TaskCommand::ToggleSubtask { id, subtask } => {
                let done = self.tasks.toggle_subtask(&TaskId::new(id), &subtask).await?;
                let state = if done { "done" } else { "open" };
                writeln!(out, "Subtask {subtask} is now {state}")?;
                Ok(())
            }
        }
    }

    /// Looks up each contact id and builds its assignee badge.
    async fn assignees(&self, ids: Vec<String>) -> Result<BTreeMap<ContactId, Assignee>, CommandError> {
        let mut assignees = BTreeMap::new();
        for id in ids {
            let id = ContactId::new(id);
            let contact = self.contacts.get(&id).await?;
            assignees.insert(id, contact.as_assignee());
        }
        Ok(assignees)
    }

    async fn contact<W: Write>(&self, command: ContactCommand, out: &mut W) -> Result<(), CommandError> {
        match command {
            ContactCommand::List => {
                let contacts = self.contacts.list().await?;
                for (letter, group) in group_by_letter(&contacts) {
                    writeln!(out, "{letter}")?;
                    for entry in group {
                        let c = &entry.contact;
                        writeln!(out, "  [{}] {} ({}) {} {}", entry.id, c.name, c.initial, c.email, c.phone)?;
                    }
                }
                Ok(())
            }
            ContactCommand::Add { name, email, phone } => {
                let entry = self.contacts.create(ContactDraft { name, email, phone }).await?;
                writeln!(out, "Contact successfully created: {} [{}]", entry.contact.name, entry.id)?;
                Ok(())
            }
            ContactCommand::Edit {
                id,
                name,
                email,
                phone,
            } => {
                let id = ContactId::new(id);
                let current = self.contacts.get(&id).await?;
                let draft = ContactDraft {
                    name: name.unwrap_or(current.name),
                    email: email.unwrap_or(current.email),
                    phone: phone.unwrap_or(current.phone),
                };
                let update = self.contacts.update(&id, draft).await?;
                writeln!(out, "Contact updated: {}", update.updated.name)?;
                if update.tasks_renamed > 0 {
                    writeln!(out, "Renamed in {} task(s)", update.tasks_renamed)?;
                }
                if self.session.follow_rename(
                    &update.previous.email,
                    &update.updated.name,
                    &update.updated.email,
                )? {
                    writeln!(out, "Logged-in user renamed to {}", update.updated.name)?;
                }
                Ok(())
            }
            ContactCommand::Delete { id } => {
                let id = ContactId::new(id);
                self.contacts.delete(&id).await?;
                writeln!(out, "Contact deleted: {id}")?;
                Ok(())
            }
        }
    }

    fn whoami<W: Write>(&self, out: &mut W) -> Result<(), CommandError> {
        let Some(user) = self.session.load()?.active_user else {
            writeln!(out, "Not logged in")?;
            return Ok(());
        };
        let (salutation, name) = greeting(&user, chrono::Local::now().hour());
        match name {
            Some(name) => writeln!(out, "{salutation} {name}")?,
            None => writeln!(out, "{salutation}")?,
        }
        writeln!(out, "[{}] {}", user.initials, user.email)?;
        Ok(())
    }
}

fn parse_status(raw: &str) -> Result<TaskStatus, CommandError> {
    raw.parse().map_err(CommandError::Usage)
}
