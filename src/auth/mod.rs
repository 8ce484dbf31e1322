//! Request authentication.
//!
//! # Data Flow
//! ```text
//! request url (origin + path + query)
//!     → path + query only
//!     → signer.rs (HMAC-SHA1 over "<millis>\n<path+query>")
//!     → Authorization / Timestamp headers
//! ```
//!
//! # Design Decisions
//! - Anonymous mode when no secret is configured: no headers at all
//! - Timestamp taken fresh per request, shared by both headers

pub mod signer;

pub use signer::{auth_headers, auth_headers_at, signature, AuthHeaders};
