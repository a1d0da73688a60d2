use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::{MeterError, Result};
use crate::model::{MeasureKind, NewReading, Reading};

/// Measurement registry:
/// - `customer_code -> [Reading]` (insertion order)
/// - `reading_id -> customer_code`
///
/// A customer's sequence is only ever touched while holding its map entry, so
/// the duplicate check and the append happen under one guard.
#[derive(Default)]
pub struct MeasurementRegistry {
    readings: DashMap<String, Vec<Reading>>,
    id_index: DashMap<Uuid, String>,
}

impl MeasurementRegistry {
    pub fn new() -> Self {
        Self {
            readings: DashMap::new(),
            id_index: DashMap::new(),
        }
    }

    /// Read-only duplicate check, run before the vision call.
    /// `commit` repeats it atomically.
    pub fn ensure_available(&self, new: &NewReading) -> Result<()> {
        let month = new.month();
        let taken = self
            .readings
            .get(&new.customer_code)
            .map(|list| list.iter().any(|r| r.collides_with(new.kind, month)))
            .unwrap_or(false);
        if taken {
            return Err(MeterError::DuplicateSubmission);
        }
        Ok(())
    }

    /// Record a reading once the vision call produced `image_ref` and `value`.
    pub fn commit(&self, new: NewReading, image_ref: String, value: f64) -> Result<Reading> {
        let month = new.month();
        let mut list = self.readings.entry(new.customer_code.clone()).or_default();
        if list.iter().any(|r| r.collides_with(new.kind, month)) {
            return Err(MeterError::DuplicateSubmission);
        }

        let mut id = Uuid::new_v4();
        while self.id_index.contains_key(&id) {
            id = Uuid::new_v4();
        }

        let reading = Reading {
            id,
            customer_code: new.customer_code,
            kind: new.kind,
            timestamp: new.timestamp,
            month,
            confirmed: false,
            image_ref,
            value,
            created_at: Utc::now(),
        };
        list.push(reading.clone());
        drop(list);

        self.id_index.insert(reading.id, reading.customer_code.clone());
        tracing::debug!(
            customer = %reading.customer_code,
            kind = %reading.kind,
            month = %month,
            reading_id = %reading.id,
            "reading committed"
        );
        Ok(reading)
    }

    /// Confirm a reading, storing `value` as its final value.
    /// Ids that are not UUIDs cannot exist and report `ReadingNotFound`.
    pub fn confirm(&self, reading_id: &str, value: f64) -> Result<Reading> {
        let id = Uuid::parse_str(reading_id.trim()).map_err(|_| MeterError::ReadingNotFound)?;
        let customer = self
            .id_index
            .get(&id)
            .map(|c| c.value().clone())
            .ok_or(MeterError::ReadingNotFound)?;

        let mut list = self
            .readings
            .get_mut(&customer)
            .ok_or(MeterError::ReadingNotFound)?;
        let reading = list
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(MeterError::ReadingNotFound)?;

        if reading.confirmed {
            return Err(MeterError::AlreadyConfirmed);
        }
        reading.confirmed = true;
        reading.value = value;
        Ok(reading.clone())
    }

    /// Readings of one customer in submission order, optionally by kind.
    pub fn list(&self, customer_code: &str, kind: Option<MeasureKind>) -> Result<Vec<Reading>> {
        let out: Vec<Reading> = self
            .readings
            .get(customer_code)
            .map(|list| {
                list.iter()
                    .filter(|r| kind.map_or(true, |k| r.kind == k))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if out.is_empty() {
            return Err(MeterError::NoReadings);
        }
        Ok(out)
    }

    pub fn get(&self, reading_id: Uuid) -> Option<Reading> {
        let customer = self.id_index.get(&reading_id)?.value().clone();
        let list = self.readings.get(&customer)?;
        list.iter().find(|r| r.id == reading_id).cloned()
    }

    /// Total number of readings across customers.
    pub fn len(&self) -> usize {
        self.id_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_index.is_empty()
    }

    pub fn customer_count(&self) -> usize {
        self.readings.len()
    }
}
