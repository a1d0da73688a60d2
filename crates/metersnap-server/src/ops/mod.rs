//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let registry = state.registry();
    let gauges = [
        ("metersnap_readings_stored", registry.len() as u64),
        ("metersnap_customers_stored", registry.customer_count() as u64),
        ("metersnap_images_stored", state.images().len() as u64),
    ];
    let body = state.metrics().render(&gauges);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
