//! Backend client for the search API.
//!
//! Uses reqwest to POST the query as JSON and hands back the untyped answer.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::content::ContentError;

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!(
    "llamasearch/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/cladam/llamasearch)"
);

/// Path of the search endpoint below the backend URL
const SEARCH_PATH: &str = "api/search";

/// Banner text for any non-2xx answer
pub const FETCH_FAILED: &str = "Failed to fetch data.";

/// Banner text when an error carries no message of its own
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Failed to fetch data.")]
    Status(StatusCode),
    #[error("{0}")]
    Decode(String),
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl SearchError {
    /// The single line shown to the user in the error banner
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Anything that can answer a search query with a raw JSON payload.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Value, SearchError>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

/// The HTTP search API at `{base}/api/search`.
///
/// No cookie store is configured, so no credentials travel with requests.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: Url,
}

impl HttpBackend {
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: create_client()?,
            endpoint: search_endpoint(base),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Create a configured HTTP client for the backend
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Append the search path, keeping any path prefix on the base URL
fn search_endpoint(mut base: Url) -> Url {
    let prefix = base.path().trim_end_matches('/').to_string();
    base.set_path(&format!("{}/{}", prefix, SEARCH_PATH));
    base
}

#[async_trait]
impl SearchBackend for HttpBackend {
    async fn search(&self, query: &str) -> Result<Value, SearchError> {
        tracing::info!(endpoint = %self.endpoint, "dispatching search");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&SearchRequest { query })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "backend returned non-success status");
            return Err(SearchError::Status(status));
        }

        let body = response.text().await?;
        let data: Value =
            serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        tracing::debug!(payload = %data, "backend response");

        Ok(data)
    }
}
