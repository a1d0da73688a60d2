//! Shared application state for the metersnap server.

use std::sync::Arc;
use std::time::Duration;

use metersnap_core::error::Result;
use metersnap_core::registry::MeasurementRegistry;

use crate::config::MeterConfig;
use crate::obs::MeterMetrics;
use crate::services::ReadingService;
use crate::vision::{self, ImageStore, VisionAdapter};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    readings: Arc<ReadingService>,
}

struct AppStateInner {
    cfg: MeterConfig,
    registry: Arc<MeasurementRegistry>,
    images: Arc<ImageStore>,
    metrics: Arc<MeterMetrics>,
}

impl AppState {
    /// Build state with the vision adapter selected by config.
    /// Returns Result so main can report a bad credential setup without panicking.
    pub fn new(cfg: MeterConfig) -> Result<Self> {
        let images = Arc::new(ImageStore::new());
        let vision = vision::build(&cfg, Arc::clone(&images))?;
        Ok(Self::assemble(cfg, images, vision))
    }

    /// Build state around a caller-supplied adapter.
    pub fn with_vision(cfg: MeterConfig, vision: Arc<dyn VisionAdapter>) -> Self {
        Self::assemble(cfg, Arc::new(ImageStore::new()), vision)
    }

    /// Like `with_vision`, sharing an image store the adapter writes to.
    pub fn with_vision_and_images(
        cfg: MeterConfig,
        images: Arc<ImageStore>,
        vision: Arc<dyn VisionAdapter>,
    ) -> Self {
        Self::assemble(cfg, images, vision)
    }

    fn assemble(cfg: MeterConfig, images: Arc<ImageStore>, vision: Arc<dyn VisionAdapter>) -> Self {
        let registry = Arc::new(MeasurementRegistry::new());
        let metrics = Arc::new(MeterMetrics::default());
        let readings = ReadingService::new(
            Arc::clone(&registry),
            vision,
            Duration::from_millis(cfg.vision.timeout_ms),
            Arc::clone(&metrics),
        );

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                images,
                metrics,
            }),
            readings: Arc::new(readings),
        }
    }

    pub fn cfg(&self) -> &MeterConfig {
        &self.inner.cfg
    }

    pub fn readings(&self) -> Arc<ReadingService> {
        Arc::clone(&self.readings)
    }

    pub fn registry(&self) -> &MeasurementRegistry {
        &self.inner.registry
    }

    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    pub fn metrics(&self) -> &MeterMetrics {
        &self.inner.metrics
    }
}
