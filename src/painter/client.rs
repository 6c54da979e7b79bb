//! HTTP client for the snapshot server

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, info};

use crate::config::PainterConfig;
use crate::errors::{PlaceError, Result};

/// Where a painter reads its snapshots from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Records that should be on the canvas
    async fn fetch_desired(&self) -> Result<Vec<String>>;

    /// Records currently on the canvas; `None` when nobody keeps one
    async fn fetch_canvas(&self) -> Result<Option<Vec<String>>>;
}

/// Reads the desired image and the live canvas from the server
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    client: Client,
    base_url: String,
}

impl SnapshotClient {
    /// Create a new client
    pub fn new(config: &PainterConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&format!("rplace-painter/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|e| PlaceError::config(format!("Invalid user agent: {e}")))?,
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| PlaceError::network(format!("Failed to create HTTP client: {e}")))?;

        info!("Snapshot client initialized with base URL: {}", config.url);

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Underlying HTTP client, shared with the HTTP submitter
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str) -> Result<Response> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| PlaceError::network(format!("Request failed: {e}")))
    }

    /// Check status and decode a JSON array of records
    async fn handle_response(response: Response) -> Result<Vec<String>> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PlaceError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(PlaceError::network(format!(
                "Server returned {status}: {text}"
            )));
        }

        serde_json::from_str(&text)
            .map_err(|e| PlaceError::network(format!("Failed to parse snapshot: {e}")))
    }
}

#[async_trait]
impl SnapshotSource for SnapshotClient {
    /// `GET /data`
    async fn fetch_desired(&self) -> Result<Vec<String>> {
        let url = format!("{}/data", self.base_url);
        debug!("Fetching desired snapshot from {}", url);
        let response = self.get(&url).await?;
        Self::handle_response(response).await
    }

    /// `GET /canvas`; a 404 means the server keeps no canvas
    async fn fetch_canvas(&self) -> Result<Option<Vec<String>>> {
        let url = format!("{}/canvas", self.base_url);
        debug!("Fetching live canvas from {}", url);
        let response = self.get(&url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::handle_response(response).await.map(Some)
    }
}
