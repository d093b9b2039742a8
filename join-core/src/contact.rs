//! Address-book entries stored under `contacts/<id>`.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::Assignee;

/// Badge colours handed out to new contacts and users.
pub const PALETTE: [&str; 15] = [
    "#ff7a00", "#ff5eb3", "#5848e6", "#9327ff", "#00bee8", "#1fd7c1", "#c37fed", "#4eefac",
    "#fc71ff", "#ffc800", "#0038ff", "#7Ae229", "#ffdc2f", "#ff3d00", "#ffa800",
];

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

#[allow(clippy::expect_used)]
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\s()-]{5,}$").expect("static phone pattern"));

/// Store key of a contact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
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

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A contact as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name.
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[serde(rename = "eMail", default)]
    pub email: String,
    /// Phone number as entered.
    #[serde(rename = "phoneNumber", default)]
    pub phone: String,
    /// Badge colour.
    #[serde(default)]
    pub color: String,
    /// Initials shown in the badge.
    #[serde(default)]
    pub initial: String,
}

impl Contact {
    /// Snapshot written into a task's `assignees` map.
    #[must_use]
    pub fn as_assignee(&self) -> Assignee {
        Assignee {
            assignee_name: self.name.clone(),
            assignee_initial: self.initial.clone(),
            assignee_color: self.color.clone(),
        }
    }

    /// Uppercased first letter of the first name, used as the list group.
    #[must_use]
    pub fn group_letter(&self) -> char {
        self.name
            .split_whitespace()
            .next()
            .and_then(|first| first.chars().next())
            .map_or('#', |c| c.to_uppercase().next().unwrap_or(c))
    }
}

/// A contact together with its store key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactEntry {
    /// Store key.
    pub id: ContactId,
    /// Stored record.
    pub contact: Contact,
}

/// Add/edit contact form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
}

impl ContactDraft {
    /// Every failing field, in form order.
    #[must_use]
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(ValidationError::NameEmpty);
        }
        let email = self.email.trim();
        if !EMAIL.is_match(email) {
            problems.push(ValidationError::EmailInvalid(email.to_owned()));
        }
        let phone = self.phone.trim();
        if !PHONE.is_match(phone) {
            problems.push(ValidationError::PhoneInvalid(phone.to_owned()));
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

    /// Validates and builds a record with the given badge colour.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if a field is invalid.
    pub fn into_contact(self, color: impl Into<String>) -> Result<Contact, ValidationError> {
        self.validate()?;
        let name = self.name.trim().to_owned();
        Ok(Contact {
            initial: initials(&name),
            name,
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            color: color.into(),
        })
    }
}

/// First letter of every word, uppercased: "Anja von Schulz" gives "AVS".
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Picks a palette colour at random.
#[must_use]
pub fn random_color() -> &'static str {
    let index = rand::rng().random_range(0..PALETTE.len());
    PALETTE[index]
}

/// Sorts by name, case-insensitively.
pub fn sort_by_name(entries: &mut [ContactEntry]) {
    entries.sort_by(|a, b| {
        a.contact
            .name
            .to_lowercase()
            .cmp(&b.contact.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Groups sorted entries under their first-name letter, preserving order.
#[must_use]
pub fn group_by_letter(entries: &[ContactEntry]) -> Vec<(char, Vec<&ContactEntry>)> {
    let mut groups: Vec<(char, Vec<&ContactEntry>)> = Vec::new();
    for entry in entries {
        let letter = entry.contact.group_letter();
        match groups.last_mut() {
            Some((last, members)) if *last == letter => members.push(entry),
            _ => groups.push((letter, vec![entry])),
        }
    }
    groups
}
