//! Domain model of the Join board: tasks, contacts, users, the board
//! grouping and summary, and the drag-and-drop engine.
//!
//! Nothing in this crate performs I/O.

pub mod board;
pub mod contact;
pub mod drag;
pub mod error;
mod lenient;
pub mod summary;
pub mod task;
pub mod user;

pub use error::ValidationError;
