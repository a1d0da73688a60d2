//! HTTP mapping of `MeterError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use metersnap_core::error::{ClientCode, MeterError};
use metersnap_core::protocol::ErrorBody;

/// Handler error: a `MeterError` rendered as `{error_code, error_description}`.
#[derive(Debug)]
pub struct ApiError(pub MeterError);

impl From<MeterError> for ApiError {
    fn from(e: MeterError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::InvalidData | ClientCode::InvalidType => StatusCode::BAD_REQUEST,
        ClientCode::MeasureNotFound | ClientCode::MeasuresNotFound => StatusCode::NOT_FOUND,
        ClientCode::DoubleReport | ClientCode::ConfirmationDuplicate => StatusCode::CONFLICT,
        ClientCode::UpstreamFailure | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        if code == ClientCode::Internal {
            tracing::error!(error = %self.0, "internal error");
        } else {
            tracing::debug!(error = %self.0, code = code.as_str(), "request rejected");
        }
        (status_for(code), Json(ErrorBody::from(&self.0))).into_response()
    }
}
