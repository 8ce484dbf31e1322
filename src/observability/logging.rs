//! Structured logging setup for binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber.
///
/// `RUST_LOG` wins over `level`; `level` applies to this crate only.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_directive(level: &str) -> String {
    format!("apollo_client={},apollo_cli={}", level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_parses() {
        let directive = default_directive("debug");
        assert_eq!(directive, "apollo_client=debug,apollo_cli=debug");
        assert!(EnvFilter::try_new(&directive).is_ok());
    }
}
