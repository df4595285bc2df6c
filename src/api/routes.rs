//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::api::handlers;
use crate::middleware::rate_limit::RateLimitLayer;
use crate::AppState;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let storage = &state.settings.storage;
    let limits = &state.settings.rate_limit;

    let process = post(handlers::process_image);
    let process = if limits.enabled {
        process.layer(RateLimitLayer::new(
            limits.requests_per_second,
            limits.burst_size,
        ))
    } else {
        process
    };

    let upload = post(handlers::upload).layer(DefaultBodyLimit::max(storage.max_upload_bytes));

    Router::new()
        .route("/", get(handlers::index))
        .route("/upload", upload)
        .route("/edit/:image_filename", get(handlers::edit))
        .route("/process_image", process)
        .nest_service(
            "/static/uploads",
            ServeDir::new(state.pipeline.uploads().root()),
        )
        .nest_service(
            "/static/outputs",
            ServeDir::new(state.pipeline.outputs().root()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
