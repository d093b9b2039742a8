//! Counters for the summary page.

use chrono::NaiveDate;

use crate::task::{Priority, TaskEntry, TaskStatus};

/// Shown when no urgent task is due today or later.
pub const NO_URGENT_TASK: &str = "No Urgent Task available";

/// Task counts and the next urgent deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Tasks on the board.
    pub total: usize,
    /// Tasks per column, in [`TaskStatus::ALL`] order.
    pub per_status: [usize; 4],
    /// Tasks with urgent priority.
    pub urgent: usize,
    /// Earliest urgent due date on or after `today`.
    pub next_urgent: Option<NaiveDate>,
}

impl Summary {
    /// Counts `tasks` as of `today`.
    #[must_use]
    pub fn compute(tasks: &[TaskEntry], today: NaiveDate) -> Self {
        let mut summary = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for entry in tasks {
            summary.per_status[entry.task.status.column()] += 1;
            if entry.task.priority != Some(Priority::Urgent) {
                continue;
            }
            summary.urgent += 1;
            if let Some(due) = entry.task.due().filter(|due| *due >= today) {
                summary.next_urgent = Some(summary.next_urgent.map_or(due, |next| next.min(due)));
            }
        }
        summary
    }

    /// Count for one column.
    #[must_use]
    pub const fn count(&self, status: TaskStatus) -> usize {
        self.per_status[status.column()]
    }

    /// Upcoming deadline as `YYYY-MM-DD`, or [`NO_URGENT_TASK`].
    #[must_use]
    pub fn deadline_label(&self) -> String {
        self.next_urgent
            .map_or_else(|| NO_URGENT_TASK.to_owned(), |d| d.format("%Y-%m-%d").to_string())
    }
}
