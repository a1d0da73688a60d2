use async_trait::async_trait;

use super::{VisionAdapter, VisionError, VisionReading};

/// Fixed-answer adapter for local runs and tests.
#[derive(Debug, Clone)]
pub struct StubVision {
    value: f64,
    image_url: String,
}

impl StubVision {
    pub fn new(value: f64, image_url: impl Into<String>) -> Self {
        Self {
            value,
            image_url: image_url.into(),
        }
    }
}

#[async_trait]
impl VisionAdapter for StubVision {
    fn provider(&self) -> &'static str {
        "stub"
    }

    async fn fetch_reading(&self, _image: &str) -> Result<VisionReading, VisionError> {
        Ok(VisionReading {
            image_ref: self.image_url.clone(),
            value: self.value,
        })
    }
}
