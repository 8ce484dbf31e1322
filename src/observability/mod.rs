//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! reader / cache / notifications / watcher
//!     → tracing events (structured fields: namespace, endpoint, status)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs a fmt subscriber for the CLI
//!     → embedding applications install their own subscriber/recorder
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber or recorder itself
//! - Secrets never appear in log fields

pub mod logging;
pub mod metrics;
