//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::client::types::NamespaceType;

/// Root configuration for the client and the CLI.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApolloConfig {
    /// Server location and client identity.
    pub client: ClientConfig,

    /// Long-poll watch loop settings.
    pub watch: WatchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server location and client identity.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Config service base url (e.g., "http://localhost:8080").
    pub config_server_url: String,

    /// Application id.
    pub app_id: String,

    /// Cluster name.
    pub cluster: String,

    /// Client ip, used by the server for gray releases.
    pub ip: Option<String>,

    /// Access key secret. Enables request signing when set.
    pub secret: Option<String>,

    /// Per-request timeout in seconds. Must exceed the server's long-poll hold.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            config_server_url: "http://localhost:8080".to_string(),
            app_id: String::new(),
            cluster: "default".to_string(),
            ip: None,
            secret: None,
            timeout_secs: 90,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("config_server_url", &self.config_server_url)
            .field("app_id", &self.app_id)
            .field("cluster", &self.cluster)
            .field("ip", &self.ip)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// A namespace to watch.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Namespace name (e.g., "application").
    pub name: String,

    /// Namespace format.
    #[serde(rename = "type", default)]
    pub namespace_type: NamespaceType,
}

/// Long-poll watch loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Namespaces polled by the watcher.
    pub namespaces: Vec<NamespaceConfig>,

    /// Base delay for exponential backoff after a failed poll, in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,

    /// Minimum pause between two successful polls, in milliseconds.
    pub min_interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            namespaces: vec![NamespaceConfig {
                name: "application".to_string(),
                namespace_type: NamespaceType::Properties,
            }],
            base_delay_ms: 1000,
            max_delay_ms: 60_000,
            min_interval_ms: 1000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
