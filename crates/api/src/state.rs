use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mailer::Mailer;
use crate::storage::ObjectStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: atelier_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Object storage backend for deliverable files.
    pub object_store: Arc<dyn ObjectStore>,
    /// Outbound mail (password resets).
    pub mailer: Arc<Mailer>,
}
