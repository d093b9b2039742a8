//! Task records as they are stored under `tasks/<id>`.
//!
//! The stored shape keeps the field names the board has always written
//! (`dueDate`, `statusTask`, `assigneeName`, ...) so existing data reads back
//! unchanged. Empty collections may be stored as `""`; see [`crate::lenient`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::contact::ContactId;
use crate::error::ValidationError;

/// Earliest due date accepted by the task form.
pub const MIN_DUE_DATE: &str = "2026-01-01";

/// Latest due date accepted by the task form.
pub const MAX_DUE_DATE: &str = "2030-12-31";

/// Store key of a task (the key the store generated on `POST`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps a store key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a path segment.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four board columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Waiting for someone else.
    AwaitFeedback,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Columns in board order, left to right.
    pub const ALL: [Self; 4] = [Self::Todo, Self::InProgress, Self::AwaitFeedback, Self::Done];

    /// The wire value written to `statusTask`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inProgress",
            Self::AwaitFeedback => "awaitFeedback",
            Self::Done => "done",
        }
    }

    /// Column heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::AwaitFeedback => "Await Feedback",
            Self::Done => "Done",
        }
    }

    /// Placeholder shown in an empty column.
    #[must_use]
    pub fn empty_message(self) -> String {
        format!("No tasks in {}", self.title())
    }

    /// Position of the column in [`Self::ALL`].
    #[must_use]
    pub const fn column(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::AwaitFeedback => 2,
            Self::Done => 3,
        }
    }

    /// Column to the right, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::AwaitFeedback),
            Self::AwaitFeedback => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Column to the left, if any.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Todo => None,
            Self::InProgress => Some(Self::Todo),
            Self::AwaitFeedback => Some(Self::InProgress),
            Self::Done => Some(Self::AwaitFeedback),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "inProgress" | "in-progress" | "in_progress" => Ok(Self::InProgress),
            "awaitFeedback" | "await-feedback" | "await_feedback" => Ok(Self::AwaitFeedback),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// Task priority. Stored as `{ "name": "urgent", "color": "red" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PriorityRecord", into = "PriorityRecord")]
pub enum Priority {
    /// Due soon, shown in the summary.
    Urgent,
    /// The form's preselected priority.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl Priority {
    /// Lowercase name as stored.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Display colour as stored.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Urgent => "red",
            Self::Medium => "yellow",
            Self::Low => "green",
        }
    }

    /// Capitalised label for detail views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PriorityRecord {
    name: String,
    #[serde(default)]
    color: String,
}

impl TryFrom<PriorityRecord> for Priority {
    type Error = String;

    fn try_from(record: PriorityRecord) -> Result<Self, Self::Error> {
        record.name.parse()
    }
}

impl From<Priority> for PriorityRecord {
    fn from(priority: Priority) -> Self {
        Self {
            name: priority.name().to_owned(),
            color: priority.color().to_owned(),
        }
    }
}

/// One checklist entry of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    /// Entry text.
    pub text: String,
    /// Whether the entry is ticked.
    #[serde(default)]
    pub done: bool,
}

/// Snapshot of a contact assigned to a task.
///
/// Copied from the contact at assignment time; renaming a contact rewrites
/// these snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    /// Contact name.
    pub assignee_name: String,
    /// Contact initials.
    pub assignee_initial: String,
    /// Badge colour.
    pub assignee_color: String,
}

/// A task as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Card heading.
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub title: String,
    /// Free text under the heading.
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub description: String,
    /// `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub due_date: String,
    /// `None` when the record was written without one.
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Assigned contacts keyed by contact id.
    #[serde(default, deserialize_with = "crate::lenient::map_or_blank")]
    pub assignees: BTreeMap<ContactId, Assignee>,
    /// Free-form label, usually "Technical Task" or "User Story".
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub category: String,
    /// Checklist keyed by subtask id.
    #[serde(default, deserialize_with = "crate::lenient::map_or_blank")]
    pub subtasks: BTreeMap<String, Subtask>,
    /// Board column.
    #[serde(rename = "statusTask")]
    pub status: TaskStatus,
}

impl Task {
    /// Parsed due date, if the stored string is a calendar date.
    #[must_use]
    pub fn due(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d").ok()
    }

    /// Priority with the form default applied.
    #[must_use]
    pub fn priority_or_default(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    /// Checklist progress.
    #[must_use]
    pub fn progress(&self) -> SubtaskProgress {
        SubtaskProgress {
            done: self.subtasks.values().filter(|s| s.done).count(),
            total: self.subtasks.len(),
        }
    }

    /// Colour of the category label.
    #[must_use]
    pub fn category_color(&self) -> &'static str {
        category_color(&self.category)
    }

    /// Case-insensitive match of `needle` against title and description.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// A task together with its store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// Store key.
    pub id: TaskId,
    /// Stored record.
    pub task: Task,
}

/// Label colour for a task category.
#[must_use]
pub fn category_color(category: &str) -> &'static str {
    match category {
        "Technical Task" => "#0038FF",
        "User Story" => "#1FD7C1",
        _ => "#ff5eb3",
    }
}

/// Ticked vs total checklist entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtaskProgress {
    /// Ticked entries.
    pub done: usize,
    /// All entries.
    pub total: usize,
}

impl SubtaskProgress {
    /// Whole-number percentage, rounded half up. Zero when there are no entries.
    #[must_use]
    pub fn percent(self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let scaled = (self.done * 200 + self.total) / (self.total * 2);
        u8::try_from(scaled.min(100)).unwrap_or(100)
    }

    /// The bar is only drawn once something is ticked.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        self.done > 0
    }
}

impl std::fmt::Display for SubtaskProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} Subtasks", self.done, self.total)
    }
}

/// Task form contents before they are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Required.
    pub title: String,
    /// Optional.
    pub description: String,
    /// Required, `YYYY-MM-DD` inside the accepted window.
    pub due_date: String,
    /// Defaults to medium.
    pub priority: Priority,
    /// Required.
    pub category: Option<String>,
    /// Assigned contacts.
    pub assignees: BTreeMap<ContactId, Assignee>,
    /// Checklist texts; ids are generated on [`Self::into_task`].
    pub subtasks: Vec<String>,
    /// Column the form was opened from.
    pub status: TaskStatus,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self::for_column(TaskStatus::Todo)
    }
}

impl TaskDraft {
    /// Empty draft opened from the "+" button of `status`'s column.
    #[must_use]
    pub fn for_column(status: TaskStatus) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            priority: Priority::Medium,
            category: None,
            assignees: BTreeMap::new(),
            subtasks: Vec::new(),
            status,
        }
    }

    /// Draft prefilled from a stored task, as the edit form opens it.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date.clone(),
            priority: task.priority_or_default(),
            category: Some(task.category.clone()).filter(|c| !c.is_empty()),
            assignees: task.assignees.clone(),
            subtasks: task.subtasks.values().map(|s| s.text.clone()).collect(),
            status: task.status,
        }
    }

    /// Every failing field, in form order.
    #[must_use]
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push(ValidationError::TitleEmpty);
        }
        if let Err(e) = validate_due_date(&self.due_date) {
            problems.push(e);
        }
        if self.category.as_deref().is_none_or(|c| c.trim().is_empty()) {
            problems.push(ValidationError::CategoryMissing);
        }
        problems
    }

    /// First failing field, if any.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] reported by [`Self::problems`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.problems().into_iter().next().map_or(Ok(()), Err)
    }

    /// Validates and builds the stored record.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the draft is incomplete.
    pub fn into_task(self) -> Result<Task, ValidationError> {
        self.validate()?;
        let subtasks = self
            .subtasks
            .into_iter()
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty())
            .map(|text| (Uuid::now_v7().to_string(), Subtask { text, done: false }))
            .collect();
        Ok(Task {
            title: self.title.trim().to_owned(),
            description: self.description,
            due_date: self.due_date,
            priority: Some(self.priority),
            assignees: self.assignees,
            category: self.category.unwrap_or_default(),
            subtasks,
            status: self.status,
        })
    }
}

impl Task {
    /// Applies an edit form to this task.
    ///
    /// Column and category stay as stored. Checklist entries whose text is
    /// unchanged keep their id and done flag; new texts get fresh ids.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the edited fields are incomplete.
    pub fn edited(&self, mut draft: TaskDraft) -> Result<Self, ValidationError> {
        draft.status = self.status;
        if !self.category.is_empty() {
            draft.category = Some(self.category.clone());
        }
        let texts = std::mem::take(&mut draft.subtasks);
        let mut edited = draft.into_task()?;

        let mut unused: Vec<(&String, &Subtask)> = self.subtasks.iter().collect();
        for text in texts.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            if let Some(pos) = unused.iter().position(|(_, s)| s.text == text) {
                let (id, subtask) = unused.remove(pos);
                edited.subtasks.insert(id.clone(), subtask.clone());
            } else {
                edited.subtasks.insert(
                    Uuid::now_v7().to_string(),
                    Subtask {
                        text: text.to_owned(),
                        done: false,
                    },
                );
            }
        }
        Ok(edited)
    }
}

/// Checks a due date against the accepted window.
///
/// # Errors
///
/// Returns [`ValidationError::DueDateMissing`], [`ValidationError::DueDateInvalid`]
/// or [`ValidationError::DueDateOutOfRange`].
pub fn validate_due_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::DueDateMissing);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ValidationError::DueDateInvalid(raw.to_owned()))?;
    let out_of_range = || ValidationError::DueDateOutOfRange {
        min: MIN_DUE_DATE.to_owned(),
        max: MAX_DUE_DATE.to_owned(),
    };
    let min = NaiveDate::parse_from_str(MIN_DUE_DATE, "%Y-%m-%d").map_err(|_| out_of_range())?;
    let max = NaiveDate::parse_from_str(MAX_DUE_DATE, "%Y-%m-%d").map_err(|_| out_of_range())?;
    if date < min || date > max {
        return Err(out_of_range());
    }
    Ok(date)
}
