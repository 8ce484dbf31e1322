//! Long-poll watch loop.
//!
//! Wraps `poll_and_refresh_many` the way a caller should: poll again right
//! after each answer, back off with jitter after failures, stop on shutdown.

use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::sleep;

use crate::client::reader::ApolloClient;
use crate::client::types::{NamespaceType, Notification};
use crate::config::schema::WatchConfig;
use crate::resilience::backoff::Backoff;

/// Service that keeps a client's cache fresh for a set of namespaces.
pub struct NotificationWatcher {
    client: ApolloClient,
    namespaces: Vec<(String, NamespaceType)>,
    config: WatchConfig,
    changes: Option<mpsc::UnboundedSender<Notification>>,
}

impl NotificationWatcher {
    /// Create a watcher for the namespaces listed in `config`.
    pub fn new(client: ApolloClient, config: WatchConfig) -> Self {
        let namespaces = config
            .namespaces
            .iter()
            .map(|ns| (ns.name.clone(), ns.namespace_type))
            .collect();
        Self {
            client,
            namespaces,
            config,
            changes: None,
        }
    }

    /// Forward every applied change notice to `tx`.
    pub fn with_changes(mut self, tx: mpsc::UnboundedSender<Notification>) -> Self {
        self.changes = Some(tx);
        self
    }

    /// Run the loop until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if self.namespaces.is_empty() {
            tracing::info!("No namespaces to watch");
            return;
        }

        let namespaces: Vec<(&str, NamespaceType)> = self
            .namespaces
            .iter()
            .map(|(name, ty)| (name.as_str(), *ty))
            .collect();
        let mut backoff = Backoff::new(self.config.base_delay_ms, self.config.max_delay_ms);
        let min_interval = Duration::from_millis(self.config.min_interval_ms);

        tracing::info!(
            app_id = %self.client.config().app_id,
            namespaces = ?self.namespaces,
            "Starting notification watcher"
        );

        loop {
            let result = tokio::select! {
                _ = shutdown.recv() => break,
                result = self.client.poll_and_refresh_many(&namespaces) => result,
            };

            let pause = match result {
                Ok(applied) => {
                    backoff.reset();
                    if let Some(tx) = &self.changes {
                        for notice in applied {
                            let _ = tx.send(notice);
                        }
                    }
                    min_interval
                }
                Err(e) => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        error = %e,
                        attempt = backoff.attempt(),
                        retry_in_ms = delay.as_millis() as u64,
                        "Notification poll failed"
                    );
                    delay
                }
            };

            tokio::select! {
                _ = shutdown.recv() => break,
                _ = sleep(pause) => {}
            }
        }

        tracing::info!("Notification watcher stopped");
    }
}
