use std::sync::Arc;

use axum::{middleware, routing::get, Router};

pub mod config;
pub mod directives;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod sampler;
pub mod systemd_client;

#[cfg(test)]
pub(crate) mod testing;

use metrics::SampleStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SampleStore>,
}

impl AppState {
    pub fn new(store: Arc<SampleStore>) -> Self {
        Self { store }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/samples", get(http::handlers::samples))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
