//! Bounded publish queue feeding the search indexer.

use serde::Serialize;
use teamup_core::types::DbId;
use tokio::sync::mpsc;

/// Default queue capacity. When the indexer falls this far behind, further
/// snapshots are dropped (each upsert is a full document, so the next
/// successful publish supersedes anything lost).
pub const DEFAULT_CAPACITY: usize = 1024;

/// A unit of work for the indexer.
#[derive(Debug, Clone)]
pub enum SinkMessage {
    /// Upsert the full project document under the given id.
    UpsertProject { id: DbId, doc: serde_json::Value },
}

/// Producer handle for the search queue.
///
/// Publishing never blocks and never fails the caller: serialization
/// problems and a full or closed queue are logged and swallowed.
#[derive(Clone)]
pub struct SearchPublisher {
    tx: mpsc::Sender<SinkMessage>,
}

impl SearchPublisher {
    /// Queue a project snapshot for indexing.
    pub fn publish_project<T: Serialize>(&self, id: DbId, snapshot: &T) {
        let doc = match serde_json::to_value(snapshot) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(project_id = id, error = %e, "Failed to serialize search document");
                return;
            }
        };

        match self.tx.try_send(SinkMessage::UpsertProject { id, doc }) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(project_id = id, "Search queue full, dropping snapshot");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::warn!(project_id = id, "Search indexer stopped, dropping snapshot");
            }
        }
    }
}

/// Create a bounded publish queue, returning the producer handle and the
/// receiver to hand to [`SearchIndexer::run`](crate::SearchIndexer::run).
pub fn channel(capacity: usize) -> (SearchPublisher, mpsc::Receiver<SinkMessage>) {
    let (tx, rx) = mpsc::channel(capacity);
    (SearchPublisher { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_delivers_document() {
        let (publisher, mut rx) = channel(4);
        publisher.publish_project(7, &json!({"title": "Teamup"}));

        let SinkMessage::UpsertProject { id, doc } = rx.recv().await.unwrap();
        assert_eq!(id, 7);
        assert_eq!(doc["title"], "Teamup");
    }

    #[tokio::test]
    async fn test_full_queue_drops_without_panicking() {
        let (publisher, mut rx) = channel(1);
        publisher.publish_project(1, &json!({}));
        publisher.publish_project(2, &json!({}));

        let SinkMessage::UpsertProject { id, .. } = rx.recv().await.unwrap();
        assert_eq!(id, 1);
        assert!(rx.try_recv().is_err(), "second snapshot should be dropped");
    }

    #[tokio::test]
    async fn test_closed_queue_is_silent() {
        let (publisher, rx) = channel(1);
        drop(rx);
        // Must not panic or error.
        publisher.publish_project(1, &json!({}));
    }
}
