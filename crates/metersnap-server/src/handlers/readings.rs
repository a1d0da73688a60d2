use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use metersnap_core::error::MeterError;
use metersnap_core::protocol::{
    ConfirmRequest, ConfirmResponse, ListQuery, ListResponse, SubmitRequest, SubmitResponse,
};

use crate::app_state::AppState;
use crate::error::ApiError;

fn bad_body(e: JsonRejection) -> MeterError {
    MeterError::InvalidInput(e.body_text())
}

/// `POST /readings`
pub async fn submit_reading(
    State(app): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let Json(req) = payload.map_err(bad_body)?;
    let reading = app.readings().submit(req).await?;
    Ok(Json(SubmitResponse::from(&reading)))
}

/// `PATCH /readings/confirm`
pub async fn confirm_reading(
    State(app): State<AppState>,
    payload: Result<Json<ConfirmRequest>, JsonRejection>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let Json(req) = payload.map_err(bad_body)?;
    app.readings().confirm(req)?;
    Ok(Json(ConfirmResponse { success: true }))
}

/// `GET /{customerCode}/readings?kind=`
pub async fn list_readings(
    State(app): State<AppState>,
    Path(customer_code): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) = query.map_err(|e| MeterError::InvalidKind(e.body_text()))?;
    let readings = app.readings().list(&customer_code, &query)?;
    Ok(Json(ListResponse {
        customer_code,
        readings,
    }))
}
