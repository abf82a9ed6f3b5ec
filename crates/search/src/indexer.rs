//! Background task draining the search queue into Elasticsearch.

use std::time::Duration;

use teamup_core::types::DbId;
use tokio::sync::mpsc;

use crate::sink::SinkMessage;

/// HTTP request timeout for a single index upsert.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Elasticsearch connection settings.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the cluster (default: `http://localhost:9200`).
    pub base_url: String,
    /// Index receiving project documents (default: `projects`).
    pub project_index: String,
}

impl SearchConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `ELASTICSEARCH_URL`    | `http://localhost:9200` |
    /// | `SEARCH_PROJECT_INDEX` | `projects`              |
    pub fn from_env() -> Self {
        let base_url = std::env::var("ELASTICSEARCH_URL")
            .unwrap_or_else(|_| "http://localhost:9200".into());
        let project_index =
            std::env::var("SEARCH_PROJECT_INDEX").unwrap_or_else(|_| "projects".into());
        Self {
            base_url,
            project_index,
        }
    }
}

/// Error type for index upserts.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The cluster returned a non-2xx status code.
    #[error("Search cluster returned HTTP {0}")]
    HttpStatus(u16),
}

/// Drains [`SinkMessage`]s and upserts documents by id.
///
/// Upserts use `_update` with `doc_as_upsert`, so re-publishing the same
/// project is idempotent and ordering gaps self-heal on the next publish.
/// Failures are logged and the message dropped; they never propagate back
/// into the workflow that committed the mutation.
pub struct SearchIndexer {
    client: reqwest::Client,
    config: SearchConfig,
}

impl SearchIndexer {
    pub fn new(config: SearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Run the drain loop until the queue's senders are all dropped.
    pub async fn run(self, mut receiver: mpsc::Receiver<SinkMessage>) {
        while let Some(message) = receiver.recv().await {
            match message {
                SinkMessage::UpsertProject { id, doc } => {
                    if let Err(e) = self.upsert_project(id, &doc).await {
                        tracing::error!(project_id = id, error = %e, "Search upsert failed");
                    }
                }
            }
        }
        tracing::info!("Search queue closed, indexer shutting down");
    }

    /// Upsert one project document.
    async fn upsert_project(&self, id: DbId, doc: &serde_json::Value) -> Result<(), IndexError> {
        let url = format!(
            "{}/{}/_update/{id}",
            self.config.base_url, self.config.project_index
        );
        let body = serde_json::json!({
            "doc": doc,
            "doc_as_upsert": true,
        });

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(IndexError::HttpStatus(response.status().as_u16()));
        }

        tracing::debug!(project_id = id, "Project document upserted");
        Ok(())
    }
}
