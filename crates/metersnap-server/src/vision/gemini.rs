//! Gemini `generateContent` client.
//!
//! The photograph travels inline (base64) next to a text prompt; the first
//! number in the model's answer is the reading. Accepted images are kept in
//! the `ImageStore` and linked as `{public_base_url}/readings/images/{id}`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GeminiSection;

use super::images::{ImageStore, StoredImage};
use super::{VisionAdapter, VisionError, VisionReading};

const USER_AGENT: &str = concat!("metersnap/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Cap on provider error text carried into logs.
const MAX_ERROR_TEXT: usize = 256;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    Text(&'a str),
    InlineData(InlineData),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn answer_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join(" ");
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct GeminiVision {
    http: reqwest::Client,
    url: String,
    api_key: String,
    prompt: String,
    public_base_url: String,
    images: Arc<ImageStore>,
}

impl GeminiVision {
    /// Build the client, reading the API key from `cfg.api_key_env`.
    pub fn new(
        cfg: &GeminiSection,
        timeout: Duration,
        public_base_url: &str,
        images: Arc<ImageStore>,
    ) -> Result<Self, VisionError> {
        let api_key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| VisionError::Credential(format!("{} is not set", cfg.api_key_env)))?;
        Self::with_api_key(cfg, api_key, timeout, public_base_url, images)
    }

    pub fn with_api_key(
        cfg: &GeminiSection,
        api_key: String,
        timeout: Duration,
        public_base_url: &str,
        images: Arc<ImageStore>,
    ) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                cfg.endpoint.trim_end_matches('/'),
                cfg.model
            ),
            api_key,
            prompt: cfg.prompt.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            images,
        })
    }

    async fn ask(&self, image: &StoredImage) -> Result<String, VisionError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(&self.prompt),
                    Part::InlineData(InlineData {
                        mime_type: image.mime,
                        data: image.to_base64(),
                    }),
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        let response = self
            .http
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VisionError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(VisionError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_TEXT {
                let cut = (0..=MAX_ERROR_TEXT).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
                text.truncate(cut);
            }
            return Err(VisionError::Status(status.as_u16(), text));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VisionError::Malformed(e.to_string()))?;
        parsed
            .answer_text()
            .ok_or_else(|| VisionError::Malformed("no text candidate".into()))
    }
}

#[async_trait]
impl VisionAdapter for GeminiVision {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    async fn fetch_reading(&self, image: &str) -> Result<VisionReading, VisionError> {
        let image = StoredImage::decode(image)?;
        let answer = self.ask(&image).await?;
        let value = extract_number(&answer)
            .ok_or_else(|| VisionError::Malformed(format!("no number in answer: {answer:?}")))?;

        tracing::debug!(mime = image.mime, bytes = image.bytes.len(), value, "gemini reading extracted");

        let id = self.images.put(image);
        Ok(VisionReading {
            image_ref: format!("{}/readings/images/{id}", self.public_base_url),
            value,
        })
    }
}

/// First decimal number in `text`. Accepts `,` as decimal separator
/// (`00123,45` -> 123.45); thousands separators are not supported.
pub fn extract_number(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let negative = text[..start].ends_with('-');
    let rest = &text[start..];

    let mut digits = String::new();
    let mut seen_sep = false;
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if (c == '.' || c == ',') && !seen_sep {
            match chars.peek() {
                Some(n) if n.is_ascii_digit() => {
                    seen_sep = true;
                    digits.push('.');
                }
                _ => break,
            }
        } else {
            break;
        }
    }

    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
