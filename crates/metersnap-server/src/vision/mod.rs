//! Vision adapters: image payload -> (image link, numeric reading).
//!
//! The registry only sees the `VisionAdapter` capability. Every provider
//! failure is a `VisionError`, which the reading service collapses into
//! `MeterError::Upstream` after logging it.

pub mod gemini;
pub mod images;
pub mod stub;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use metersnap_core::error::{MeterError, Result};

use crate::config::{MeterConfig, VisionProvider};

pub use gemini::GeminiVision;
pub use images::ImageStore;
pub use stub::StubVision;

/// What a provider extracted from one photograph.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionReading {
    pub image_ref: String,
    pub value: f64,
}

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("image payload unusable: {0}")]
    InvalidImage(String),
    #[error("credential unavailable: {0}")]
    Credential(String),
    #[error("provider rejected credential (status {0})")]
    Unauthorized(u16),
    #[error("network: {0}")]
    Network(String),
    #[error("provider returned status {0}: {1}")]
    Status(u16, String),
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait VisionAdapter: Send + Sync {
    /// Short provider name used in logs and metric labels.
    fn provider(&self) -> &'static str;

    async fn fetch_reading(&self, image: &str) -> std::result::Result<VisionReading, VisionError>;
}

/// Build the adapter selected by `vision.provider`.
pub fn build(cfg: &MeterConfig, images: Arc<ImageStore>) -> Result<Arc<dyn VisionAdapter>> {
    let timeout = Duration::from_millis(cfg.vision.timeout_ms);
    match cfg.vision.provider {
        VisionProvider::Gemini => {
            let adapter = GeminiVision::new(
                &cfg.vision.gemini,
                timeout,
                &cfg.server.public_base_url,
                images,
            )
            .map_err(|e| MeterError::Internal(format!("gemini adapter init failed: {e}")))?;
            Ok(Arc::new(adapter))
        }
        VisionProvider::Stub => {
            tracing::warn!("vision provider is 'stub': readings get a fixed value");
            Ok(Arc::new(StubVision::new(
                cfg.vision.stub.value,
                cfg.vision.stub.image_url.clone(),
            )))
        }
    }
}
