//! In-process document store.
//!
//! Uses the same tree as the `join-store` server, so paths, key generation
//! and null-deletes behave identically. Every request is recorded, and
//! writes can be made to fail, which is what the repository and board tests
//! rely on.

use std::sync::atomic::{AtomicBool, Ordering};

use join_store::tree::{DocPath, DocumentTree, TreeError};
use parking_lot::Mutex;
use serde_json::Value;

use super::{DocumentStore, StoreError};

/// HTTP verb of a recorded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read.
    Get,
    /// Append under a generated key.
    Post,
    /// Replace.
    Put,
    /// Merge.
    Patch,
    /// Remove.
    Delete,
}

/// One request the store received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Verb.
    pub method: Method,
    /// Document path, without `.json`.
    pub path: String,
    /// Request body for writes.
    pub body: Option<Value>,
}

/// A [`DocumentStore`] that lives in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: Mutex<DocumentTree>,
    requests: Mutex<Vec<RecordedRequest>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding `root`.
    #[must_use]
    pub fn with_data(root: Value) -> Self {
        Self {
            tree: Mutex::new(DocumentTree::from_value(root)),
            ..Self::default()
        }
    }

    /// Makes every later write fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every later read fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the whole tree.
    #[must_use]
    pub fn root(&self) -> Value {
        self.tree.lock().root().clone()
    }

    /// Every request so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests with `method`.
    #[must_use]
    pub fn count(&self, method: Method) -> usize {
        self.requests.lock().iter().filter(|r| r.method == method).count()
    }

    /// Forgets recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    fn record(&self, method: Method, path: &str, body: Option<&Value>) {
        self.requests.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
    }

    fn writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

fn parse(path: &str) -> Result<DocPath, StoreError> {
    DocPath::parse(path).map_err(|e| StoreError::Status {
        status: 400,
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn rejected(path: &str, e: &TreeError) -> StoreError {
    StoreError::Status {
        status: 400,
        path: path.to_string(),
        message: e.to_string(),
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Value, StoreError> {
        self.record(Method::Get, path, None);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        let doc = parse(path)?;
        Ok(self.tree.lock().get(&doc))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String, StoreError> {
        self.record(Method::Post, path, Some(body));
        self.writable()?;
        let doc = parse(path)?;
        self.tree
            .lock()
            .post(&doc, body.clone())
            .map_err(|e| rejected(path, &e))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<(), StoreError> {
        self.record(Method::Put, path, Some(body));
        self.writable()?;
        let doc = parse(path)?;
        self.tree.lock().put(&doc, body.clone());
        Ok(())
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<(), StoreError> {
        self.record(Method::Patch, path, Some(body));
        self.writable()?;
        let doc = parse(path)?;
        self.tree
            .lock()
            .patch(&doc, body.clone())
            .map_err(|e| rejected(path, &e))
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.record(Method::Delete, path, None);
        self.writable()?;
        let doc = parse(path)?;
        self.tree.lock().delete(&doc);
        Ok(())
    }
}
