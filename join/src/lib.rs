//! `Join` client: kanban board, address book and accounts over a JSON
//! document store, with a terminal board you can drag cards across.

pub mod app;
pub mod auth;
pub mod board;
pub mod commands;
pub mod config;
pub mod contacts;
pub mod session;
pub mod store;
pub mod tasks;
pub mod ui;
pub mod worker;
