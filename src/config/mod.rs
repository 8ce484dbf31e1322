//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ApolloConfig (validated, immutable)
//!     → ClientConfig handed to ApolloClient, WatchConfig to the watcher
//! ```
//!
//! # Design Decisions
//! - Client identity is immutable once a client is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with, parse_config, parse_config_with, ConfigError};
pub use schema::{ApolloConfig, ClientConfig, NamespaceConfig, ObservabilityConfig, WatchConfig};
pub use validation::{validate_client, validate_config, ValidationError};
