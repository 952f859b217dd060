//! Resource CRUD routes. Parameterized paths so one set of handlers serves every
//! declared resource; each path is routed with and without a trailing slash.

use crate::handlers::{create, delete as delete_handler, list, read, replace, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn resource_routes(state: AppState) -> Router {
    let collection = get(list).post(create);
    let item = get(read).patch(update).put(replace).delete(delete_handler);
    Router::new()
        .route("/:path_segment", collection.clone())
        .route("/:path_segment/", collection)
        .route("/:path_segment/:id", item.clone())
        .route("/:path_segment/:id/", item)
        .with_state(state)
}
