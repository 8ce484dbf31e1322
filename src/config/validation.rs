//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the server url and client identity
//! - Validate value ranges (timeouts > 0, backoff base <= max)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ApolloConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::{ApolloConfig, ClientConfig, WatchConfig};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("config_server_url must not be empty")]
    EmptyServerUrl,

    #[error("config_server_url '{0}' is not an http(s) url")]
    InvalidServerUrl(String),

    #[error("app_id must not be empty")]
    EmptyAppId,

    #[error("cluster must not be empty")]
    EmptyCluster,

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("watch namespace names must not be empty")]
    EmptyNamespace,

    #[error("base_delay_ms ({base_ms}) exceeds max_delay_ms ({max_ms})")]
    BackoffRange { base_ms: u64, max_ms: u64 },
}

/// Validate the full configuration.
pub fn validate_config(config: &ApolloConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = client_errors(&config.client);
    errors.extend(watch_errors(&config.watch));
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate only the client identity; used when building a client directly.
pub fn validate_client(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let errors = client_errors(config);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn client_errors(config: &ClientConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.config_server_url.trim().is_empty() {
        errors.push(ValidationError::EmptyServerUrl);
    } else {
        let valid = Url::parse(&config.config_server_url)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidServerUrl(
                config.config_server_url.clone(),
            ));
        }
    }

    if config.app_id.trim().is_empty() {
        errors.push(ValidationError::EmptyAppId);
    }
    if config.cluster.trim().is_empty() {
        errors.push(ValidationError::EmptyCluster);
    }
    if config.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    errors
}

fn watch_errors(config: &WatchConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.namespaces.iter().any(|ns| ns.name.trim().is_empty()) {
        errors.push(ValidationError::EmptyNamespace);
    }
    if config.base_delay_ms > config.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base_ms: config.base_delay_ms,
            max_ms: config.max_delay_ms,
        });
    }

    errors
}
