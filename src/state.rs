//! Shared application state for all routes.

use crate::config::ResolvedModel;
use sqlx::AnyPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: AnyPool,
    /// Resolved once at startup; handlers look resources up by path segment.
    pub model: Arc<ResolvedModel>,
}

impl AppState {
    pub fn new(pool: AnyPool, model: ResolvedModel) -> Self {
        AppState {
            pool,
            model: Arc::new(model),
        }
    }
}
