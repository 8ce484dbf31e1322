//! Apollo config service client.
//!
//! # Data Flow
//! ```text
//! get(key)
//!     → cache.rs (snapshot present?) ──yes──▶ value or default
//!     → no: update → reader.rs (GET configfiles/json | configs, signed)
//!     → whole snapshot swapped into the cache
//!
//! watcher.rs loop
//!     → notifications.rs (GET notifications/v2, long poll)
//!     → 304: nothing; 200: update(Uncached) + record notification id
//! ```
//!
//! # Design Decisions
//! - Endpoint choice (`Endpoint`) and cache bypass (`get_uncached`) are separate
//! - Cache entries are replaced whole, never merged
//! - Single calls never retry; the watcher owns retry/backoff

pub mod cache;
pub mod notifications;
pub mod reader;
pub mod types;
pub mod watcher;

pub use cache::ConfigCache;
pub use notifications::NotificationState;
pub use reader::ApolloClient;
pub use types::{
    ApolloError, ApolloResult, ConfigEnvelope, Configurations, Endpoint, NamespaceType,
    Notification, NotificationMessages, UNKNOWN_NOTIFICATION_ID,
};
pub use watcher::NotificationWatcher;
