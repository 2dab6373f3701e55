//! Configuration structures for the expense form and receipt pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SpendError;

/// Environment variable that injects the backend base URL.
pub const API_BASE_ENV: &str = "SPENDSCAN_API_BASE";

/// Main configuration for spendscan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendConfig {
    /// Backend configuration.
    pub api: ApiConfig,

    /// Image preparation configuration.
    pub image: ImageConfig,

    /// Receipt extraction configuration.
    pub extraction: ExtractionConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL prefixed to every endpoint.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Photo downscaling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Maximum output width in pixels.
    pub max_width: u32,

    /// Lossy encoding quality in (0.0, 1.0].
    pub quality: f32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            quality: 0.8,
        }
    }
}

/// Receipt field extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Description used when the receipt has no usable line.
    pub default_description: String,

    /// Maximum description length in characters.
    pub description_max_chars: usize,

    /// How many leading lines are searched for a merchant name.
    pub merchant_scan_lines: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_description: "Receipt expense".to_string(),
            description_max_chars: 50,
            merchant_scan_lines: 5,
        }
    }
}

impl SpendConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply `SPENDSCAN_API_BASE` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var(API_BASE_ENV) {
            if !base.trim().is_empty() {
                self.api.base_url = base.trim().to_string();
            }
        }
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), SpendError> {
        if self.api.base_url.trim().is_empty() {
            return Err(SpendError::Config("api.base_url must not be empty".into()));
        }
        if self.image.max_width == 0 {
            return Err(SpendError::Config("image.max_width must be positive".into()));
        }
        if !(self.image.quality > 0.0 && self.image.quality <= 1.0) {
            return Err(SpendError::Config(format!(
                "image.quality must be in (0, 1], got {}",
                self.image.quality
            )));
        }
        if self.extraction.description_max_chars == 0 {
            return Err(SpendError::Config(
                "extraction.description_max_chars must be positive".into(),
            ));
        }
        Ok(())
    }
}
