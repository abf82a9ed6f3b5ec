//! Teamup search sink.
//!
//! Every successful project mutation publishes a snapshot document so the
//! search index stays current. Publishing is fire-and-forget with respect to
//! the workflow: the snapshot goes onto a bounded in-process queue and a
//! background task drains it into Elasticsearch.
//!
//! - [`SearchPublisher`] — cheaply-cloneable producer handle.
//! - [`SearchIndexer`] — long-lived drain task doing idempotent upserts.

pub mod indexer;
pub mod sink;

pub use indexer::{SearchConfig, SearchIndexer};
pub use sink::{channel, SearchPublisher, SinkMessage};
