//! Client library for Apollo-style remote configuration services.
//!
//! Reads namespaced key/value configuration over HTTP, signs requests with
//! the HMAC-SHA1 access-key scheme when a secret is configured, caches
//! namespaces locally and keeps them fresh through long-poll notifications.

pub mod auth;
pub mod client;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use client::{ApolloClient, ApolloError, ApolloResult, Endpoint, NamespaceType, NotificationWatcher};
pub use config::{ApolloConfig, ClientConfig, WatchConfig};
pub use lifecycle::Shutdown;
