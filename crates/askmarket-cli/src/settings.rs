//! CLI Configuration
//!
//! Layers, lowest precedence first: built-in defaults, `askmarket.toml` in
//! the working directory, an explicit `--config` file, then `ASKMARKET__*`
//! environment variables (for example `ASKMARKET__MARKET__STANDARD_FEE`).

use askmarket_core::MarketConfig;
use serde::{Deserialize, Serialize};

/// Everything the binary needs to start
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Marketplace parameters
    #[serde(default)]
    pub market: MarketConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Settings {
    /// Load settings from files and environment
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("askmarket").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ASKMARKET")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.market.validate()?;
        Ok(settings)
    }
}
