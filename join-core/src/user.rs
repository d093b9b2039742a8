//! Registered users and the logged-in session record.
//!
//! Credentials are stored and compared as plain text. There is no hashing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contact::{Contact, initials};
use crate::error::ValidationError;

#[allow(clippy::expect_used)]
static SIGNUP_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[a-zA-Z]{2,}$").expect("static sign-up email pattern")
});

/// A user record as stored under `user/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(rename = "eMail", default)]
    pub email: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
    /// Badge colour.
    #[serde(default)]
    pub color: String,
    /// Initials of every name word.
    #[serde(default)]
    pub initial: String,
}

impl UserRecord {
    /// Exact match on email and password.
    #[must_use]
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// The contact created alongside the account.
    #[must_use]
    pub fn as_contact(&self) -> Contact {
        Contact {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: String::new(),
            color: self.color.clone(),
            initial: self.initial.clone(),
        }
    }
}

/// Who is logged in on this machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Navbar initials.
    pub initials: String,
    /// Badge colour; guests have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl ActiveUser {
    /// The shared guest identity.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            name: "Guest".to_owned(),
            email: "guest@guest.com".to_owned(),
            initials: "G".to_owned(),
            color: None,
        }
    }

    /// Session record after a successful login.
    #[must_use]
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            initials: session_initials(&record.name),
            color: Some(record.color.clone()).filter(|c| !c.is_empty()),
        }
    }

    /// Whether this is the guest identity.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        self.email == "guest@guest.com"
    }

    /// Whether `contact` is this user's own address-book entry.
    #[must_use]
    pub fn owns(&self, contact: &Contact) -> bool {
        contact.email == self.email && contact.name == self.name
    }
}

/// Navbar initials: first letter of the first and second word only.
#[must_use]
pub fn session_initials(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Sign-up form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Repeated password.
    pub confirm: String,
    /// Privacy policy checkbox.
    pub accepted_policy: bool,
}

impl SignUpForm {
    /// Every failing field, in form order.
    #[must_use]
    pub fn problems(&self) -> Vec<ValidationError> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push(ValidationError::NameEmpty);
        }
        if !SIGNUP_EMAIL.is_match(&self.email) {
            problems.push(ValidationError::EmailInvalid(self.email.clone()));
        }
        if self.password.is_empty() {
            problems.push(ValidationError::PasswordEmpty);
        } else if self.password != self.confirm {
            problems.push(ValidationError::PasswordMismatch);
        }
        if !self.accepted_policy {
            problems.push(ValidationError::PolicyNotAccepted);
        }
        problems
    }

    /// Validates and builds the stored record.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] if the form is incomplete.
    pub fn into_record(self, color: impl Into<String>) -> Result<UserRecord, ValidationError> {
        if let Some(first) = self.problems().into_iter().next() {
            return Err(first);
        }
        let name = self.name.trim().to_owned();
        Ok(UserRecord {
            initial: initials(&name),
            name,
            email: self.email,
            password: self.password,
            color: color.into(),
        })
    }
}

/// Time-of-day salutation for a local hour in `0..24`.
#[must_use]
pub const fn salutation(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// Summary greeting: `"Good morning!"` for guests, `"Good morning,"` followed
/// by the name otherwise.
#[must_use]
pub fn greeting(user: &ActiveUser, hour: u32) -> (String, Option<String>) {
    let salutation = salutation(hour);
    if user.is_guest() {
        (format!("{salutation}!"), None)
    } else {
        (format!("{salutation},"), Some(user.name.clone()))
    }
}
