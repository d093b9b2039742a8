//! Local JSON document store for Join.
//!
//! Serves one in-memory JSON tree over HTTP. Nodes are addressed by
//! `/<path>.json` and read or written with `GET`, `POST`, `PUT`, `PATCH` and
//! `DELETE`, the same surface the board client talks to in production.

pub mod config;
pub mod server;
pub mod tree;
