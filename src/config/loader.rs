//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ApolloConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ApolloConfig, ConfigError> {
    parse_config_with(content, |_| {})
}

/// Parse TOML text, apply `overrides`, then validate the merged result.
pub fn parse_config_with<F>(content: &str, overrides: F) -> Result<ApolloConfig, ConfigError>
where
    F: FnOnce(&mut ApolloConfig),
{
    let mut config: ApolloConfig = toml::from_str(content)?;
    overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ApolloConfig, ConfigError> {
    load_config_with(path, |_| {})
}

/// Load a TOML file, apply `overrides` (e.g. CLI flags), then validate.
pub fn load_config_with<F>(path: &Path, overrides: F) -> Result<ApolloConfig, ConfigError>
where
    F: FnOnce(&mut ApolloConfig),
{
    let content = fs::read_to_string(path)?;
    parse_config_with(&content, overrides)
}
