//! Axum router wiring.
//!
//! The legacy paths (`/upload`, `/confirm`, `/{code}/list`) share handlers
//! with the current ones. Image links have three segments so that no customer
//! code can be shadowed by them.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::{app_state::AppState, handlers, ops};

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.cfg().server.max_body_bytes;

    Router::new()
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .route("/readings", post(handlers::submit_reading))
        .route("/readings/confirm", patch(handlers::confirm_reading))
        .route("/readings/images/:image_id", get(handlers::get_image))
        .route("/:customer_code/readings", get(handlers::list_readings))
        .route("/upload", post(handlers::submit_reading))
        .route("/confirm", patch(handlers::confirm_reading))
        .route("/:customer_code/list", get(handlers::list_readings))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
