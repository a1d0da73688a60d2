//! Shared error type across metersnap crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Request body or parameters failed validation.
    InvalidData,
    /// Unknown measurement kind in a list filter.
    InvalidType,
    /// A reading for this customer/kind/month already exists.
    DoubleReport,
    /// No reading with the given id.
    MeasureNotFound,
    /// No readings matched a listing.
    MeasuresNotFound,
    /// The reading was confirmed before.
    ConfirmationDuplicate,
    /// The vision provider could not produce a reading.
    UpstreamFailure,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::InvalidData => "INVALID_DATA",
            ClientCode::InvalidType => "INVALID_TYPE",
            ClientCode::DoubleReport => "DOUBLE_REPORT",
            ClientCode::MeasureNotFound => "MEASURE_NOT_FOUND",
            ClientCode::MeasuresNotFound => "MEASURES_NOT_FOUND",
            ClientCode::ConfirmationDuplicate => "CONFIRMATION_DUPLICATE",
            ClientCode::UpstreamFailure => "UPSTREAM_FAILURE",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// Fixed human-readable description sent next to the code.
    /// Error payloads (upstream detail included) stay in logs.
    pub fn description(self) -> &'static str {
        match self {
            ClientCode::InvalidData => "request data is invalid",
            ClientCode::InvalidType => "measurement type not allowed",
            ClientCode::DoubleReport => "reading for this month already submitted",
            ClientCode::MeasureNotFound => "reading not found",
            ClientCode::MeasuresNotFound => "no readings found",
            ClientCode::ConfirmationDuplicate => "reading already confirmed",
            ClientCode::UpstreamFailure => "could not extract a reading from the image",
            ClientCode::Internal => "internal error",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MeterError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum MeterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid kind: {0}")]
    InvalidKind(String),
    #[error("duplicate submission")]
    DuplicateSubmission,
    #[error("reading not found")]
    ReadingNotFound,
    #[error("no readings found")]
    NoReadings,
    #[error("reading already confirmed")]
    AlreadyConfirmed,
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MeterError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            MeterError::InvalidInput(_) => ClientCode::InvalidData,
            MeterError::InvalidKind(_) => ClientCode::InvalidType,
            MeterError::DuplicateSubmission => ClientCode::DoubleReport,
            MeterError::ReadingNotFound => ClientCode::MeasureNotFound,
            MeterError::NoReadings => ClientCode::MeasuresNotFound,
            MeterError::AlreadyConfirmed => ClientCode::ConfirmationDuplicate,
            MeterError::Upstream(_) => ClientCode::UpstreamFailure,
            MeterError::Internal(_) => ClientCode::Internal,
        }
    }
}
