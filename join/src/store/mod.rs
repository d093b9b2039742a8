//! Access to the JSON document store.
//!
//! Defines the [`DocumentStore`] trait every repository is written against.
//! Implementations:
//! - [`http::HttpStore`] talks to a store server over HTTP (`<base>/<path>.json`)
//! - [`memory::MemoryStore`] keeps the tree in process and records every
//!   request, for tests and offline use

pub mod http;
pub mod memory;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use http::HttpStore;
pub use memory::{MemoryStore, Method, RecordedRequest};

/// Errors from talking to the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The base URL could not be parsed or joined with a path.
    #[error("invalid store url: {0}")]
    Url(#[from] url::ParseError),

    /// The request did not complete.
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status} for {path}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Document path of the request.
        path: String,
        /// Response body, usually `{"error": ..}`.
        message: String,
    },

    /// A response body did not have the expected shape.
    #[error("unexpected store response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The in-process store was told to refuse writes.
    #[error("store unavailable")]
    Unavailable,
}

/// A path-addressed JSON tree.
///
/// Paths are `/`-separated without the `.json` suffix; the empty path is the
/// root. Reading a missing node yields `null` and writing `null` deletes.
pub trait DocumentStore: Send + Sync {
    /// Reads the node at `path`.
    fn get(&self, path: &str) -> impl std::future::Future<Output = Result<Value, StoreError>> + Send;

    /// Adds `body` under a new generated key below `path` and returns the key.
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<String, StoreError>> + Send;

    /// Replaces the node at `path`.
    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Writes the fields of the object `body` below `path`.
    fn patch(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes the node at `path`.
    fn delete(&self, path: &str) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Decodes a keyed collection such as `tasks` or `contacts` into
/// `(key, record)` pairs in key order.
///
/// `null` is an empty collection. Entries that do not decode are skipped
/// with a warning so one broken record does not hide the rest.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if `value` is neither `null` nor an object.
pub fn decode_collection<T: DeserializeOwned>(
    collection: &str,
    value: Value,
) -> Result<Vec<(String, T)>, StoreError> {
    let entries: Option<serde_json::Map<String, Value>> = serde_json::from_value(value)?;
    let mut decoded = Vec::new();
    for (key, raw) in entries.unwrap_or_default() {
        match serde_json::from_value(raw) {
            Ok(record) => decoded.push((key, record)),
            Err(e) => tracing::warn!(collection, %key, error = %e, "skipping malformed record"),
        }
    }
    decoded.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(decoded)
}
