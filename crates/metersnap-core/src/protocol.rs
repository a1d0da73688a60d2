//! JSON wire contracts for the HTTP surface.
//!
//! Request fields are all optional at the serde level so that a missing field
//! is reported as `INVALID_DATA` by validation instead of a framework
//! rejection. The snake_case names of the legacy API are accepted as aliases.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MeterError, Result};
use crate::model::{MeasureKind, NewReading, Reading};

/// `POST /readings`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub image: Option<String>,
    #[serde(alias = "customer_code")]
    pub customer_code: Option<String>,
    #[serde(alias = "measure_datetime")]
    pub timestamp: Option<String>,
    #[serde(alias = "measure_type")]
    pub kind: Option<String>,
}

impl SubmitRequest {
    pub fn validate(self) -> Result<NewReading> {
        NewReading::validate(self.customer_code, self.kind, self.timestamp, self.image)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub image_ref: String,
    pub value: f64,
    pub id: Uuid,
}

impl From<&Reading> for SubmitResponse {
    fn from(r: &Reading) -> Self {
        Self {
            image_ref: r.image_ref.clone(),
            value: r.value,
            id: r.id,
        }
    }
}

/// `PATCH /readings/confirm`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    #[serde(alias = "measure_uuid")]
    pub reading_id: Option<String>,
    #[serde(alias = "confirmed_value")]
    pub confirmed_value: Option<f64>,
}

/// A confirm request that passed validation.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub reading_id: String,
    pub value: f64,
}

impl ConfirmRequest {
    pub fn validate(self) -> Result<Confirmation> {
        let reading_id = self
            .reading_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| MeterError::InvalidInput("readingId is required".into()))?;
        let value = self
            .confirmed_value
            .ok_or_else(|| MeterError::InvalidInput("confirmedValue is required".into()))?;
        if !value.is_finite() {
            return Err(MeterError::InvalidInput("confirmedValue must be finite".into()));
        }
        Ok(Confirmation { reading_id, value })
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub success: bool,
}

/// `GET /{customerCode}/readings?kind=`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(alias = "measure_type")]
    pub kind: Option<String>,
}

impl ListQuery {
    /// Normalized filter. An empty `kind=` means no filter.
    pub fn kind_filter(&self) -> Result<Option<MeasureKind>> {
        match self.kind.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(k) => MeasureKind::parse_filter(k).map(Some),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub customer_code: String,
    pub readings: Vec<Reading>,
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
    pub error_description: String,
}

impl From<&MeterError> for ErrorBody {
    fn from(e: &MeterError) -> Self {
        let code = e.client_code();
        Self {
            error_code: code.as_str().to_string(),
            error_description: code.description().to_string(),
        }
    }
}
