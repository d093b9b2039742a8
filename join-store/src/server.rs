//! HTTP front of the document store: shared state, request handlers and
//! server startup.
//!
//! Every route is `/{*path}` where the path ends in `.json`; `/.json` names
//! the root. Bodies are JSON and responses are JSON. Malformed paths or
//! bodies get `400` with `{ "error": ".." }`, oversized bodies get `413`.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use tokio::sync::RwLock;

use crate::tree::{DocPath, DocumentTree, PathError, TreeError};

/// Default maximum request body in bytes (1 MiB).
const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Suffix every document URL carries.
const JSON_SUFFIX: &str = ".json";

/// Shared server state: the tree and the body limit.
pub struct StoreState {
    tree: RwLock<DocumentTree>,
    max_body_size: usize,
}

impl Default for StoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreState {
    /// An empty store with the default body limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_MAX_BODY_SIZE, DocumentTree::new())
    }

    /// A store holding `tree` with a custom body limit.
    #[must_use]
    pub fn with_config(max_body_size: usize, tree: DocumentTree) -> Self {
        Self {
            tree: RwLock::new(tree),
            max_body_size,
        }
    }

    /// Copy of the whole database.
    pub async fn snapshot(&self) -> Value {
        self.tree.read().await.root().clone()
    }

    /// Largest accepted request body in bytes.
    #[must_use]
    pub const fn max_body_size(&self) -> usize {
        self.max_body_size
    }
}

/// Request failures, all answered with `400`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The URL did not end in `.json`.
    #[error("path must end in .json")]
    MissingSuffix,

    /// The path or a patch key was malformed, or a patch body was not an
    /// object.
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The body was not valid JSON.
    #[error("invalid JSON body: {0}")]
    Body(#[from] serde_json::Error),
}

impl From<PathError> for ApiError {
    fn from(e: PathError) -> Self {
        Self::Tree(TreeError::Path(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejecting request");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

/// Strips `.json` from a captured route path and parses the rest.
fn doc_path(raw: &str) -> Result<DocPath, ApiError> {
    let stem = raw.strip_suffix(JSON_SUFFIX).ok_or(ApiError::MissingSuffix)?;
    Ok(DocPath::parse(stem)?)
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

async fn get_node(
    State(state): State<Arc<StoreState>>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = doc_path(&raw)?;
    let value = state.tree.read().await.get(&path);
    tracing::debug!(%path, "get");
    Ok(Json(value))
}

async fn post_node(
    State(state): State<Arc<StoreState>>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let path = doc_path(&raw)?;
    let value = parse_body(&body)?;
    let key = state.tree.write().await.post(&path, value)?;
    tracing::debug!(%path, %key, "post");
    Ok(Json(json!({ "name": key })))
}

async fn put_node(
    State(state): State<Arc<StoreState>>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let path = doc_path(&raw)?;
    let value = parse_body(&body)?;
    state.tree.write().await.put(&path, value.clone());
    tracing::debug!(%path, "put");
    Ok(Json(value))
}

async fn patch_node(
    State(state): State<Arc<StoreState>>,
    Path(raw): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let path = doc_path(&raw)?;
    let value = parse_body(&body)?;
    state.tree.write().await.patch(&path, value.clone())?;
    tracing::debug!(%path, "patch");
    Ok(Json(value))
}

async fn delete_node(
    State(state): State<Arc<StoreState>>,
    Path(raw): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let path = doc_path(&raw)?;
    state.tree.write().await.delete(&path);
    tracing::debug!(%path, "delete");
    Ok(Json(Value::Null))
}

/// Builds the router over `state`.
pub fn router(state: Arc<StoreState>) -> axum::Router {
    let limit = state.max_body_size;
    axum::Router::new()
        .route(
            "/{*path}",
            axum::routing::get(get_node)
                .post(post_node)
                .put(put_node)
                .patch(patch_node)
                .delete(delete_node),
        )
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Starts an empty store on `addr` and returns the bound address and a join
/// handle.
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    start_server_with_state(addr, Arc::new(StoreState::new())).await
}

/// Starts the store with a pre-built [`StoreState`], for example one seeded
/// from a file or sized from [`crate::config::StoreConfig`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state(
    addr: &str,
    state: Arc<StoreState>,
) -> Result<
    (std::net::SocketAddr, tokio::task::JoinHandle<()>),
    Box<dyn std::error::Error + Send + Sync>,
> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "document store server error");
        }
    });

    Ok((bound_addr, handle))
}

/// Starts an empty store on `127.0.0.1:0` for tests.
#[cfg(test)]
pub async fn start_test_server() -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
    start_server("127.0.0.1:0")
        .await
        .expect("failed to start test server")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(addr: std::net::SocketAddr, path: &str) -> String {
        format!("http://{addr}/{path}")
    }

    #[tokio::test]
    async fn missing_node_reads_null() {
        let (addr, _handle) = start_test_server().await;
        let body: Value = reqwest::get(url(addr, "tasks.json"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn post_then_get_root() {
        let (addr, _handle) = start_test_server().await;
        let client = reqwest::Client::new();
        let created: Value = client
            .post(url(addr, "contacts.json"))
            .json(&json!({ "name": "Anton Mayer" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let key = created["name"].as_str().unwrap().to_owned();

        let root: Value = client
            .get(url(addr, ".json"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(root["contacts"][&key]["name"], "Anton Mayer");
    }

    #[tokio::test]
    async fn put_status_then_delete() {
        let (addr, _handle) = start_test_server().await;
        let client = reqwest::Client::new();
        let status = url(addr, "tasks/t1/statusTask.json");

        let echoed: Value = client
            .put(&status)
            .json(&json!("done"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(echoed, json!("done"));

        let resp = client.delete(&status).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let tasks: Value = client
            .get(url(addr, "tasks.json"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(tasks, Value::Null);
    }

    #[tokio::test]
    async fn patch_merges_fields() {
        let state = Arc::new(StoreState::with_config(
            DEFAULT_MAX_BODY_SIZE,
            DocumentTree::from_value(json!({
                "contacts": { "c1": { "name": "Anton", "eMail": "a@b.de" } }
            })),
        ));
        let (addr, _handle) = start_server_with_state("127.0.0.1:0", Arc::clone(&state))
            .await
            .unwrap();

        let resp = reqwest::Client::new()
            .patch(url(addr, "contacts/c1.json"))
            .json(&json!({ "name": "Anton Mayer" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            state.snapshot().await,
            json!({ "contacts": { "c1": { "name": "Anton Mayer", "eMail": "a@b.de" } } })
        );
    }

    #[tokio::test]
    async fn rejects_bad_paths_and_bodies() {
        let (addr, _handle) = start_test_server().await;
        let client = reqwest::Client::new();

        let no_suffix = client.get(url(addr, "tasks")).send().await.unwrap();
        assert_eq!(no_suffix.status(), StatusCode::BAD_REQUEST);

        let bad_segment = client.get(url(addr, "ta$ks.json")).send().await.unwrap();
        assert_eq!(bad_segment.status(), StatusCode::BAD_REQUEST);

        let bad_body = client
            .put(url(addr, "tasks.json"))
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(bad_body.status(), StatusCode::BAD_REQUEST);
        let err: Value = bad_body.json().await.unwrap();
        assert!(err["error"].as_str().unwrap().contains("invalid JSON"));

        let patch_scalar = client
            .patch(url(addr, "tasks.json"))
            .json(&json!(5))
            .send()
            .await
            .unwrap();
        assert_eq!(patch_scalar.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let state = Arc::new(StoreState::with_config(16, DocumentTree::new()));
        let (addr, _handle) = start_server_with_state("127.0.0.1:0", state).await.unwrap();
        let resp = reqwest::Client::new()
            .put(url(addr, "tasks.json"))
            .json(&json!({ "title": "a title well past sixteen bytes" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
