//! Runner settings: defaults, overridden by `RUSTY_QA_*` environment
//! variables (a `.env` file is loaded first by `main`).

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
    pub report_format: ReportFormat,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(Config::builder().add_source(Environment::with_prefix("RUSTY_QA")))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        builder
            .set_default("database_url", "sqlite::memory:")?
            .set_default("log_level", "info")?
            .set_default("report_format", "text")?
            .build()?
            .try_deserialize()
    }
}
