//! Lifecycle management for long-running watchers.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed watcher leaves its poll/backoff wait → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
