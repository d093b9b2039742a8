//! Groups tasks into the four board columns.

use std::collections::BTreeSet;

use crate::contact::{ContactEntry, ContactId};
use crate::drag::CardRef;
use crate::task::{Assignee, Task, TaskEntry, TaskId, TaskStatus};

/// Badges drawn on a card before the `+N` counter takes over.
pub const MAX_VISIBLE_ASSIGNEES: usize = 2;

/// Shown when a non-empty search matches no task.
pub const NO_RESULTS: &str = "No results found";

/// A task placed on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Store key.
    pub id: TaskId,
    /// Position in the flat task list the board was built from.
    pub index: usize,
    /// The task itself.
    pub task: Task,
}

impl Card {
    /// Identity handed to the drag engine.
    #[must_use]
    pub fn card_ref(&self) -> CardRef {
        CardRef::new(self.id.clone(), self.index)
    }

    /// Assignee badges for this card, skipping contacts that no longer exist.
    #[must_use]
    pub fn badges<'a>(&'a self, known: &BTreeSet<ContactId>, max_visible: usize) -> AssigneeBadges<'a> {
        let (live, dangling): (Vec<_>, Vec<_>) =
            self.task.assignees.iter().partition(|(id, _)| known.contains(*id));
        let overflow = live.len().saturating_sub(max_visible);
        AssigneeBadges {
            visible: live.into_iter().take(max_visible).map(|(_, a)| a).collect(),
            overflow,
            dangling: dangling.into_iter().map(|(id, _)| id.clone()).collect(),
        }
    }
}

/// What the assignee row of a card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssigneeBadges<'a> {
    /// Badges drawn in full.
    pub visible: Vec<&'a Assignee>,
    /// Count behind the `+N` badge; zero hides it.
    pub overflow: usize,
    /// Assignees whose contact was deleted; the client prunes these.
    pub dangling: Vec<ContactId>,
}

/// Tasks grouped by status, each column in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: [Vec<Card>; 4],
}

impl Board {
    /// Builds the board from the flat task list.
    #[must_use]
    pub fn from_tasks(entries: &[TaskEntry]) -> Self {
        let mut board = Self::default();
        for (index, entry) in entries.iter().enumerate() {
            board.columns[entry.task.status.column()].push(Card {
                id: entry.id.clone(),
                index,
                task: entry.task.clone(),
            });
        }
        board
    }

    /// Cards of one column.
    #[must_use]
    pub fn column(&self, status: TaskStatus) -> &[Card] {
        &self.columns[status.column()]
    }

    /// All cards, column by column.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.columns.iter().flatten()
    }

    /// Looks a card up by key.
    #[must_use]
    pub fn card(&self, id: &TaskId) -> Option<&Card> {
        self.cards().find(|card| &card.id == id)
    }

    /// Number of cards on the board.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Whether no column has a card.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(Vec::is_empty)
    }

    /// Keeps cards whose title or description contains `query`.
    ///
    /// An empty or whitespace query returns the whole board.
    #[must_use]
    pub fn filter(&self, query: &str) -> Filtered {
        let query = query.trim();
        if query.is_empty() {
            return Filtered {
                board: self.clone(),
                message: None,
            };
        }
        let mut board = Self::default();
        for (column, cards) in board.columns.iter_mut().zip(&self.columns) {
            column.extend(cards.iter().filter(|card| card.task.matches(query)).cloned());
        }
        let message = board.is_empty().then_some(NO_RESULTS);
        Filtered { board, message }
    }

    /// `(task, contact)` pairs whose contact no longer exists.
    #[must_use]
    pub fn dangling_assignees(&self, contacts: &[ContactEntry]) -> Vec<(TaskId, ContactId)> {
        let known = known_contacts(contacts);
        self.cards()
            .flat_map(|card| {
                card.task
                    .assignees
                    .keys()
                    .filter(|id| !known.contains(*id))
                    .map(|id| (card.id.clone(), id.clone()))
            })
            .collect()
    }
}

/// A search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filtered {
    /// The matching cards.
    pub board: Board,
    /// [`NO_RESULTS`] when a search matched nothing.
    pub message: Option<&'static str>,
}

/// Keys of the given contacts.
#[must_use]
pub fn known_contacts(contacts: &[ContactEntry]) -> BTreeSet<ContactId> {
    contacts.iter().map(|c| c.id.clone()).collect()
}
