//! Document store over HTTP.

use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

use super::{DocumentStore, StoreError};

/// Talks to a store that serves `<base>/<path>.json`.
#[derive(Debug, Clone)]
pub struct HttpStore {
    base: Url,
    client: Client,
}

impl HttpStore {
    /// Creates a client for the store at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Url`] for an unparsable base URL and
    /// [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, StoreError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, client })
    }

    /// Base URL with a trailing slash.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Full URL of a document path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Url`] if the path cannot be joined.
    pub fn url(&self, path: &str) -> Result<Url, StoreError> {
        Ok(self.base.join(&format!("{}.json", path.trim_matches('/')))?)
    }

    async fn check(path: &str, response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(StoreError::Status {
            status: status.as_u16(),
            path: path.to_string(),
            message,
        })
    }
}

impl DocumentStore for HttpStore {
    async fn get(&self, path: &str) -> Result<Value, StoreError> {
        let response = self.client.get(self.url(path)?).send().await?;
        let response = Self::check(path, response).await?;
        Ok(response.json().await?)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String, StoreError> {
        let response = self.client.post(self.url(path)?).json(body).send().await?;
        let response = Self::check(path, response).await?;
        let created: Value = response.json().await?;
        match created.get("name").and_then(Value::as_str) {
            Some(key) => Ok(key.to_string()),
            None => Err(StoreError::Status {
                status: 200,
                path: path.to_string(),
                message: format!("no generated key in {created}"),
            }),
        }
    }

    async fn put(&self, path: &str, body: &Value) -> Result<(), StoreError> {
        let response = self.client.put(self.url(path)?).json(body).send().await?;
        Self::check(path, response).await?;
        Ok(())
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<(), StoreError> {
        let response = self.client.patch(self.url(path)?).json(body).send().await?;
        Self::check(path, response).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self.client.delete(self.url(path)?).send().await?;
        Self::check(path, response).await?;
        Ok(())
    }
}
