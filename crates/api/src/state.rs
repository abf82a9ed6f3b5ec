use std::sync::Arc;

use teamup_cloud::ImageStore;
use teamup_search::SearchPublisher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: teamup_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Fire-and-forget handle onto the search index queue.
    pub search: SearchPublisher,
    /// Picture storage backend.
    pub images: Arc<dyn ImageStore>,
}
