//! Task records in the store under `tasks/<id>`.

use std::sync::Arc;

use join_core::ValidationError;
use join_core::board::Board;
use join_core::contact::{ContactEntry, ContactId, initials};
use join_core::task::{Task, TaskDraft, TaskEntry, TaskId, TaskStatus};
use serde_json::{Value, json};

use crate::store::{DocumentStore, StoreError, decode_collection};

const COLLECTION: &str = "tasks";

/// Errors from task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// The store request failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The draft did not validate.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// No task has this id.
    #[error("no task with id {0}")]
    NotFound(TaskId),

    /// The task has no subtask with this id.
    #[error("task {task} has no subtask {subtask}")]
    SubtaskNotFound {
        /// Task id.
        task: TaskId,
        /// Subtask id.
        subtask: String,
    },
}

/// Reads and writes tasks.
#[derive(Debug)]
pub struct TaskRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for TaskRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn task_path(id: &TaskId) -> String {
    format!("{COLLECTION}/{id}")
}

fn assignee_path(task: &TaskId, contact: &ContactId) -> String {
    format!("{COLLECTION}/{task}/assignees/{contact}")
}

impl<S: DocumentStore> TaskRepository<S> {
    /// Repository over `store`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// All tasks in store order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the read fails.
    pub async fn list(&self) -> Result<Vec<TaskEntry>, TaskError> {
        let value = self.store.get(COLLECTION).await?;
        Ok(decode_collection::<Task>(COLLECTION, value)?
            .into_iter()
            .map(|(key, task)| TaskEntry {
                id: TaskId::new(key),
                task,
            })
            .collect())
    }

    /// One task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for unknown ids.
    pub async fn get(&self, id: &TaskId) -> Result<Task, TaskError> {
        let value = self.store.get(&task_path(id)).await?;
        if value.is_null() {
            return Err(TaskError::NotFound(id.clone()));
        }
        Ok(serde_json::from_value(value).map_err(StoreError::from)?)
    }

    /// Validates `draft` and stores it as a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Invalid`] before any request if the draft is
    /// incomplete.
    pub async fn create(&self, draft: TaskDraft) -> Result<TaskId, TaskError> {
        let task = draft.into_task()?;
        let body = serde_json::to_value(&task).map_err(StoreError::from)?;
        let key = self.store.post(COLLECTION, &body).await?;
        tracing::info!(task = %key, status = %task.status, "task created");
        Ok(TaskId::new(key))
    }

    /// Saves an edit form over a stored task with one PUT.
    ///
    /// Column, category and unchanged checklist entries carry over from the
    /// stored record. Returns the task as written.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for unknown ids and
    /// [`TaskError::Invalid`] if the draft is incomplete; nothing is written
    /// in either case.
    pub async fn replace(&self, id: &TaskId, draft: TaskDraft) -> Result<Task, TaskError> {
        let task = self.get(id).await?.edited(draft)?;
        let body = serde_json::to_value(&task).map_err(StoreError::from)?;
        self.store.put(&task_path(id), &body).await?;
        tracing::info!(task = %id, "task replaced");
        Ok(task)
    }

    /// Moves a task to another column.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the write fails.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), TaskError> {
        let path = format!("{}/statusTask", task_path(id));
        self.store.put(&path, &json!(status.as_str())).await?;
        tracing::debug!(task = %id, %status, "status written");
        Ok(())
    }

    /// Ticks or unticks a checklist entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the write fails.
    pub async fn set_subtask_done(
        &self,
        id: &TaskId,
        subtask: &str,
        done: bool,
    ) -> Result<(), TaskError> {
        let path = format!("{}/subtasks/{subtask}/done", task_path(id));
        self.store.put(&path, &Value::Bool(done)).await?;
        Ok(())
    }

    /// Flips a checklist entry and returns its new state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] or [`TaskError::SubtaskNotFound`] for
    /// unknown ids.
    pub async fn toggle_subtask(&self, id: &TaskId, subtask: &str) -> Result<bool, TaskError> {
        let task = self.get(id).await?;
        let Some(entry) = task.subtasks.get(subtask) else {
            return Err(TaskError::SubtaskNotFound {
                task: id.clone(),
                subtask: subtask.to_string(),
            });
        };
        let done = !entry.done;
        self.set_subtask_done(id, subtask, done).await?;
        Ok(done)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the delete fails.
    pub async fn delete(&self, id: &TaskId) -> Result<(), TaskError> {
        self.store.delete(&task_path(id)).await?;
        tracing::info!(task = %id, "task deleted");
        Ok(())
    }

    /// Unassigns one contact from one task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the delete fails.
    pub async fn remove_assignee(&self, task: &TaskId, contact: &ContactId) -> Result<(), TaskError> {
        self.store.delete(&assignee_path(task, contact)).await?;
        Ok(())
    }

    /// Unassigns contacts that no longer exist. Returns the pairs removed.
    ///
    /// Failures are logged and skipped; the next load retries them.
    pub async fn prune_dangling_assignees(
        &self,
        tasks: &[TaskEntry],
        contacts: &[ContactEntry],
    ) -> Vec<(TaskId, ContactId)> {
        let mut pruned = Vec::new();
        for (task, contact) in Board::from_tasks(tasks).dangling_assignees(contacts) {
            match self.remove_assignee(&task, &contact).await {
                Ok(()) => {
                    tracing::debug!(%task, %contact, "pruned dangling assignee");
                    pruned.push((task, contact));
                }
                Err(e) => tracing::warn!(%task, %contact, error = %e, "could not prune assignee"),
            }
        }
        pruned
    }

    /// Ids of the tasks `contact` is assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] if the read fails.
    pub async fn tasks_with_assignee(&self, contact: &ContactId) -> Result<Vec<TaskId>, TaskError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|entry| entry.task.assignees.contains_key(contact))
            .map(|entry| entry.id)
            .collect())
    }

    /// Rewrites the assignee snapshot of `contact` in every task after a
    /// rename. Returns how many tasks were updated.
    ///
    /// A failed task is logged and skipped so the others still get the new
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Store`] only if the task list cannot be read.
    pub async fn rename_assignee(&self, contact: &ContactId, name: &str) -> Result<usize, TaskError> {
        let body = json!({
            "assigneeName": name,
            "assigneeInitial": initials(name),
        });
        let mut updated = 0;
        for task in self.tasks_with_assignee(contact).await? {
            match self.store.patch(&assignee_path(&task, contact), &body).await {
                Ok(()) => updated += 1,
                Err(e) => tracing::warn!(%task, %contact, error = %e, "could not rename assignee"),
            }
        }
        Ok(updated)
    }
}
