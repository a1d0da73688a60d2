//! Reading model: measurement kinds, timestamps and the duplicate window.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MeterError, Result};

/// What the meter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasureKind {
    Water,
    Gas,
}

impl MeasureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MeasureKind::Water => "WATER",
            MeasureKind::Gas => "GAS",
        }
    }

    /// Strict parse used on submission: only the exact literals are accepted.
    pub fn parse_exact(s: &str) -> Result<Self> {
        match s {
            "WATER" => Ok(MeasureKind::Water),
            "GAS" => Ok(MeasureKind::Gas),
            other => Err(MeterError::InvalidInput(format!("unknown kind: {other}"))),
        }
    }

    /// Lenient parse used by list filters (`water`, `Gas`, ...).
    pub fn parse_filter(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "WATER" => Ok(MeasureKind::Water),
            "GAS" => Ok(MeasureKind::Gas),
            _ => Err(MeterError::InvalidKind(s.to_string())),
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar year+month a reading belongs to (the duplicate window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(ts: &DateTime<FixedOffset>) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, `...-03:00`), a naive date-time
/// (`2024-05-01T10:00:00`, read as UTC) and a bare date (`2024-05-01`, UTC
/// midnight). The offset as written is preserved, so the month of
/// `2024-05-31T23:00:00-03:00` is May, same as its `YYYY-MM` prefix.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>> {
    let s = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }
    Err(MeterError::InvalidInput(format!("timestamp is not ISO-8601: {raw}")))
}

/// One recorded meter measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: Uuid,
    #[serde(skip)]
    pub customer_code: String,
    pub kind: MeasureKind,
    /// Timestamp exactly as the caller sent it.
    pub timestamp: String,
    #[serde(skip)]
    pub month: MonthKey,
    pub confirmed: bool,
    pub image_ref: String,
    pub value: f64,
    /// When the reading was recorded by this service.
    pub created_at: DateTime<Utc>,
}

impl Reading {
    /// Same kind and same month as the given window.
    pub fn collides_with(&self, kind: MeasureKind, month: MonthKey) -> bool {
        self.kind == kind && self.month == month
    }
}

/// A validated submission, ready for the vision call.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub customer_code: String,
    pub kind: MeasureKind,
    pub timestamp: String,
    pub observed_at: DateTime<FixedOffset>,
    pub image: String,
}

impl NewReading {
    /// Validate raw submission fields. Fails fast before any registry access.
    pub fn validate(
        customer_code: Option<String>,
        kind: Option<String>,
        timestamp: Option<String>,
        image: Option<String>,
    ) -> Result<Self> {
        let customer_code = customer_code
            .filter(|c| !c.is_empty())
            .ok_or_else(|| MeterError::InvalidInput("customerCode is required".into()))?;
        let kind = kind
            .ok_or_else(|| MeterError::InvalidInput("kind is required".into()))
            .and_then(|k| MeasureKind::parse_exact(&k))?;
        let timestamp = timestamp
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MeterError::InvalidInput("timestamp is required".into()))?;
        let observed_at = parse_timestamp(&timestamp)?;
        let image = image
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| MeterError::InvalidInput("image is required".into()))?;

        Ok(Self {
            customer_code,
            kind,
            timestamp,
            observed_at,
            image,
        })
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(&self.observed_at)
    }
}
