pub mod add;
pub mod config;
pub mod extract;
pub mod list;
pub mod prepare;
pub mod scan;
pub mod suggest;

use std::path::Path;

use spendscan_core::models::config::SpendConfig;
use tracing::debug;

/// Global options shared by every command.
#[derive(Clone, Copy)]
pub struct Settings<'a> {
    pub config_path: Option<&'a str>,
    pub api_base: Option<&'a str>,
}

impl Settings<'_> {
    /// Load configuration: explicit file, else the default file if present,
    /// else defaults. The environment and `--api-base` override the base URL.
    pub fn load_config(&self) -> anyhow::Result<SpendConfig> {
        let config = match self.config_path {
            Some(path) => SpendConfig::from_file(Path::new(path))?,
            None => {
                let default_path = config::default_config_path();
                if default_path.exists() {
                    debug!("Loading config from {}", default_path.display());
                    SpendConfig::from_file(&default_path)?
                } else {
                    SpendConfig::default()
                }
            }
        };

        let mut config = config.with_env_overrides();
        if let Some(base) = self.api_base {
            config.api.base_url = base.to_string();
        }
        config.validate()?;
        Ok(config)
    }
}
