//! Router assembly: common routes at the root, resource routes under the API prefix.

pub mod common;
pub mod resource;

pub use common::common_routes;
pub use resource::resource_routes;

use crate::config::Settings;
use crate::state::AppState;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Full application router with request tracing and a request body size limit.
pub fn app_router(settings: &Settings, state: AppState) -> Router {
    let api = resource_routes(state.clone());
    let router = Router::new().merge(common_routes(state));
    let router = if settings.api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&settings.api_prefix, api)
    };
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes)),
    )
}
