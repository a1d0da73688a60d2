use std::net::SocketAddr;

use serde::Deserialize;
use metersnap_core::error::{MeterError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub vision: VisionSection,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            vision: VisionSection::default(),
        }
    }
}

impl MeterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(MeterError::InvalidInput(format!(
                "unsupported config version: {}",
                self.version
            )));
        }
        self.server.validate()?;
        self.vision.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Prefix of the image links handed out in `imageRef`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            public_base_url: default_public_base_url(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(self.public_base_url.starts_with("http://") || self.public_base_url.starts_with("https://")) {
            return Err(MeterError::InvalidInput(
                "server.public_base_url must be an http(s) URL".into(),
            ));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(MeterError::InvalidInput(
                "server.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|_| {
            MeterError::InvalidInput(format!(
                "server.listen must be a valid SocketAddr: {}",
                self.listen
            ))
        })
    }

    /// Replace the port of `listen`, keeping its host.
    pub fn override_port(&mut self, port: &str) -> Result<()> {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| MeterError::InvalidInput(format!("PORT must be a port number: {port}")))?;
        let mut addr = self.listen_addr()?;
        addr.set_port(port);
        self.listen = addr.to_string();
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_public_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionProvider {
    Gemini,
    Stub,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisionSection {
    #[serde(default = "default_provider")]
    pub provider: VisionProvider,

    /// Upper bound for one vision call, including auth and image upload.
    #[serde(default = "default_vision_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub gemini: GeminiSection,

    #[serde(default)]
    pub stub: StubSection,
}

impl Default for VisionSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            timeout_ms: default_vision_timeout_ms(),
            gemini: GeminiSection::default(),
            stub: StubSection::default(),
        }
    }
}

impl VisionSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=120000).contains(&self.timeout_ms) {
            return Err(MeterError::InvalidInput(
                "vision.timeout_ms must be between 1000 and 120000".into(),
            ));
        }
        if self.provider == VisionProvider::Gemini {
            self.gemini.validate()?;
        }
        Ok(())
    }
}

fn default_provider() -> VisionProvider {
    VisionProvider::Stub
}
fn default_vision_timeout_ms() -> u64 {
    15000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiSection {
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Name of the env var holding the API key (never the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            model: default_gemini_model(),
            api_key_env: default_api_key_env(),
            prompt: default_prompt(),
        }
    }
}

impl GeminiSection {
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() || self.model.trim().is_empty() {
            return Err(MeterError::InvalidInput(
                "vision.gemini.endpoint and vision.gemini.model must not be empty".into(),
            ));
        }
        if self.api_key_env.trim().is_empty() {
            return Err(MeterError::InvalidInput(
                "vision.gemini.api_key_env must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_gemini_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_prompt() -> String {
    "This is a photo of a water or gas meter. Reply with only the numeric reading shown on the register, digits only, using '.' as decimal separator.".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StubSection {
    #[serde(default = "default_stub_value")]
    pub value: f64,

    #[serde(default = "default_stub_image_url")]
    pub image_url: String,
}

impl Default for StubSection {
    fn default() -> Self {
        Self {
            value: default_stub_value(),
            image_url: default_stub_image_url(),
        }
    }
}

fn default_stub_value() -> f64 {
    123.0
}
fn default_stub_image_url() -> String {
    "https://example.com/image".into()
}
