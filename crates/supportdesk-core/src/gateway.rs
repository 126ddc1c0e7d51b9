use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analytics::AnalyticsReport;
use crate::error::{GatewayError, GatewayResult};
use crate::model::{FeedbackKind, IngestResponse, QueryResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

/// Thin client for the question-answering backend.
///
/// Every call is a single request: no retries, no timeout, no caching.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
}

impl Gateway {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the knowledge base a question (`POST /query`)
    pub async fn query(&self, query: &str) -> GatewayResult<QueryResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GatewayError::EmptyQuery);
        }

        tracing::debug!(query, "sending query");
        let response = self
            .client
            .post(self.url("/query"))
            .json(&QueryRequest { query })
            .send()
            .await?;

        let parsed: QueryResponse = decode(response).await?;
        tracing::info!(
            citations = parsed.context.len(),
            cached = parsed.cached,
            "query answered"
        );
        Ok(parsed)
    }

    /// Upload a document from disk (`POST /ingest`, multipart field `file`)
    pub async fn ingest(&self, path: &Path) -> GatewayResult<IngestResponse> {
        let bytes = tokio::fs::read(path).await.map_err(|source| GatewayError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        self.ingest_bytes(&filename, bytes).await
    }

    /// Upload an in-memory document under the given file name
    pub async fn ingest_bytes(&self, filename: &str, bytes: Vec<u8>) -> GatewayResult<IngestResponse> {
        tracing::debug!(filename, size = bytes.len(), "uploading document");
        let part = Part::bytes(bytes).file_name(filename.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/ingest"))
            .multipart(form)
            .send()
            .await?;

        let parsed: IngestResponse = decode(response).await?;
        tracing::info!(filename, chunks = parsed.chunks_count, "document ingested");
        Ok(parsed)
    }

    /// Record a helpful / not-helpful vote.
    ///
    /// The backend has no feedback endpoint yet, so this only logs.
    pub async fn send_feedback(
        &self,
        message_id: &str,
        kind: FeedbackKind,
        reason: Option<&str>,
    ) -> GatewayResult<()> {
        tracing::info!(
            message_id,
            kind = kind.as_str(),
            reason = reason.unwrap_or(""),
            "feedback recorded"
        );
        Ok(())
    }

    /// `true` only when `GET /health` answers 2xx. Never fails.
    pub async fn health_check(&self) -> bool {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                if !healthy {
                    tracing::debug!(status = %response.status(), "health check not ok");
                }
                healthy
            }
            Err(e) => {
                tracing::debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Fetch the admin dashboard report (`GET /analytics`)
    pub async fn fetch_analytics(&self) -> GatewayResult<AnalyticsReport> {
        let response = self.client.get(self.url("/analytics")).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, "backend returned an error status");
        return Err(GatewayError::Status { status, body });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
}
