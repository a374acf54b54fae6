//! Configuration management for the reservation assistant
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`BBQ_ASSISTANT__` prefix, `__` separator)
//!
//! The city/outlet catalog is built in and can be replaced by a YAML file
//! named in `booking.catalog_path`.

pub mod catalog;
pub mod constants;
pub mod settings;

pub use catalog::{CityCatalog, CityEntry, OutletEntry};
pub use settings::{
    load_settings, load_settings_from, AuthConfig, BookingConfig, CallsConfig, KnowledgeBaseConfig,
    ObservabilityConfig, ReferenceStrategy, RestartPolicy, RetellConfig, RuntimeEnvironment,
    ServerConfig, SessionConfig, Settings, WebhookConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Sources were read but hold values that fail validation
    pub fn is_invalid(&self) -> bool {
        matches!(self, ConfigError::InvalidValue { .. } | ConfigError::MissingField(_))
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
