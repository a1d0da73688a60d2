//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use metersnap_core::error::{MeterError, Result};

pub use schema::{GeminiSection, MeterConfig, ServerSection, StubSection, VisionProvider, VisionSection};

/// Env var naming the config file.
pub const CONFIG_PATH_ENV: &str = "METERSNAP_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "metersnap.yaml";

pub fn load_from_file(path: &str) -> Result<MeterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeterError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<MeterConfig> {
    let cfg: MeterConfig = serde_yaml::from_str(s)
        .map_err(|e| MeterError::InvalidInput(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the process config.
///
/// Reads `$METERSNAP_CONFIG` (default `metersnap.yaml`). A missing default
/// file falls back to built-in defaults; a missing explicitly named file is an
/// error. `PORT` overrides the listen port.
pub fn load() -> Result<MeterConfig> {
    let explicit = std::env::var(CONFIG_PATH_ENV).ok();
    let path = explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

    let mut cfg = match fs::read_to_string(path) {
        Ok(s) => load_from_str(&s)?,
        Err(e) if e.kind() == ErrorKind::NotFound && explicit.is_none() => {
            tracing::warn!(path, "config file not found, using defaults");
            MeterConfig::default()
        }
        Err(e) => {
            return Err(MeterError::Internal(format!("read config failed ({path}): {e}")));
        }
    };

    if let Ok(port) = std::env::var("PORT") {
        cfg.server.override_port(&port)?;
    }
    cfg.validate()?;
    Ok(cfg)
}
