use std::sync::Arc;
use std::time::{Duration, Instant};

use metersnap_core::error::{MeterError, Result};
use metersnap_core::model::{MeasureKind, Reading};
use metersnap_core::protocol::{ConfirmRequest, ListQuery, SubmitRequest};
use metersnap_core::registry::MeasurementRegistry;

use crate::obs::MeterMetrics;
use crate::vision::{VisionAdapter, VisionError, VisionReading};

/// submit / confirm / list on top of the registry and the vision adapter.
pub struct ReadingService {
    registry: Arc<MeasurementRegistry>,
    vision: Arc<dyn VisionAdapter>,
    vision_timeout: Duration,
    metrics: Arc<MeterMetrics>,
}

fn outcome<T>(res: &Result<T>) -> &'static str {
    match res {
        Ok(_) => "ok",
        Err(e) => e.client_code().as_str(),
    }
}

impl ReadingService {
    pub fn new(
        registry: Arc<MeasurementRegistry>,
        vision: Arc<dyn VisionAdapter>,
        vision_timeout: Duration,
        metrics: Arc<MeterMetrics>,
    ) -> Self {
        Self {
            registry,
            vision,
            vision_timeout,
            metrics,
        }
    }

    pub async fn submit(&self, req: SubmitRequest) -> Result<Reading> {
        let kind = req
            .kind
            .as_deref()
            .and_then(|k| MeasureKind::parse_exact(k).ok())
            .map_or("invalid", MeasureKind::as_str);

        let res = self.submit_inner(req).await;
        self.metrics
            .submissions
            .inc(&[("kind", kind), ("outcome", outcome(&res))]);
        res
    }

    async fn submit_inner(&self, req: SubmitRequest) -> Result<Reading> {
        let new = req.validate()?;
        self.registry.ensure_available(&new)?;

        let vision = self.read_image(&new.image).await.map_err(|e| {
            tracing::warn!(
                provider = self.vision.provider(),
                customer = %new.customer_code,
                kind = %new.kind,
                error = %e,
                "vision call failed"
            );
            MeterError::Upstream(e.to_string())
        })?;

        let customer = new.customer_code.clone();
        let reading = self.registry.commit(new, vision.image_ref, vision.value)?;
        tracing::info!(
            customer = %customer,
            kind = %reading.kind,
            reading_id = %reading.id,
            value = reading.value,
            "reading recorded"
        );
        Ok(reading)
    }

    async fn read_image(&self, image: &str) -> std::result::Result<VisionReading, VisionError> {
        let started = Instant::now();
        let res = tokio::time::timeout(self.vision_timeout, self.vision.fetch_reading(image)).await;
        self.metrics
            .vision_duration
            .observe(&[("provider", self.vision.provider())], started.elapsed());

        let reading = res.map_err(|_| VisionError::Timeout(self.vision_timeout))??;
        if !reading.value.is_finite() {
            return Err(VisionError::Malformed(format!("non-finite value {}", reading.value)));
        }
        Ok(reading)
    }

    pub fn confirm(&self, req: ConfirmRequest) -> Result<Reading> {
        let res = req
            .validate()
            .and_then(|c| self.registry.confirm(&c.reading_id, c.value));
        self.metrics.confirmations.inc(&[("outcome", outcome(&res))]);

        if let Ok(r) = &res {
            tracing::info!(customer = %r.customer_code, reading_id = %r.id, value = r.value, "reading confirmed");
        }
        res
    }

    pub fn list(&self, customer_code: &str, query: &ListQuery) -> Result<Vec<Reading>> {
        let res = query
            .kind_filter()
            .and_then(|kind| self.registry.list(customer_code, kind));
        self.metrics.listings.inc(&[("outcome", outcome(&res))]);
        res
    }
}
