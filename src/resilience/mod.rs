//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Long-poll failure in the watcher:
//!     → backoff.rs (exponential delay with jitter, capped)
//!     → sleep, then poll again
//! Long-poll success:
//!     → backoff resets
//! ```
//!
//! # Design Decisions
//! - Single operations never retry; retrying is a loop concern
//! - Jittered backoff prevents thundering herd against the config service

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
