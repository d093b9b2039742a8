//! Validation failures for drafts entered through the add/edit forms.

use thiserror::Error;

/// A form field that failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Task title is empty after trimming.
    #[error("title is required")]
    TitleEmpty,
    /// No due date was given.
    #[error("due date is required")]
    DueDateMissing,
    /// The due date is not a `YYYY-MM-DD` calendar date.
    #[error("due date is not a valid date: {0}")]
    DueDateInvalid(String),
    /// The due date lies outside the accepted window.
    #[error("date must be between {min} and {max}")]
    DueDateOutOfRange {
        /// Earliest accepted date.
        min: String,
        /// Latest accepted date.
        max: String,
    },
    /// No task category was selected.
    #[error("task category is required")]
    CategoryMissing,
    /// Contact or user name is empty.
    #[error("name is required")]
    NameEmpty,
    /// The email address does not look like one.
    #[error("invalid email address: {0}")]
    EmailInvalid(String),
    /// The phone number contains unexpected characters or is too short.
    #[error("invalid phone number: {0}")]
    PhoneInvalid(String),
    /// Sign-up password is empty.
    #[error("password is required")]
    PasswordEmpty,
    /// Password and confirmation differ.
    #[error("your passwords don't match")]
    PasswordMismatch,
    /// The privacy policy checkbox was not ticked.
    #[error("the privacy policy must be accepted")]
    PolicyNotAccepted,
}
