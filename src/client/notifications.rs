//! Long-poll change notifications.
//!
//! # State Transitions (per namespace)
//! ```text
//! UNKNOWN (id = -1) → OBSERVED (id = N): on a change notice whose refresh succeeded
//! OBSERVED (N) → OBSERVED (M): same
//! ```
//!
//! A 304 or an empty notice list leaves cache and ids untouched. Retrying is
//! the caller's job; see `watcher.rs`.

use dashmap::DashMap;
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::client::reader::ApolloClient;
use crate::client::types::{
    ApolloError, ApolloResult, Endpoint, NamespaceType, Notification, NotificationRequest,
    UNKNOWN_NOTIFICATION_ID,
};
use crate::observability::metrics;

/// Last observed notification id per wire namespace name.
#[derive(Clone, Default)]
pub struct NotificationState {
    inner: Arc<DashMap<String, i64>>,
}

impl NotificationState {
    pub fn get(&self, wire_namespace: &str) -> i64 {
        self.inner
            .get(wire_namespace)
            .map(|r| *r.value())
            .unwrap_or(UNKNOWN_NOTIFICATION_ID)
    }

    pub fn record(&self, wire_namespace: &str, notification_id: i64) {
        self.inner.insert(wire_namespace.to_string(), notification_id);
    }

    /// Copy of all observed ids.
    pub fn snapshot(&self) -> HashMap<String, i64> {
        self.inner
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect()
    }
}

impl ApolloClient {
    /// Last observed notification id for a namespace, or `-1`.
    pub fn notification_id(&self, namespace: &str, namespace_type: NamespaceType) -> i64 {
        self.notifications.get(&namespace_type.wire_namespace(namespace))
    }

    /// All observed notification ids, keyed by wire namespace name.
    pub fn notification_ids(&self) -> HashMap<String, i64> {
        self.notifications.snapshot()
    }

    /// Long-poll one namespace and refresh it if the server reports a change.
    ///
    /// Every notice in a 200 response triggers an authoritative (uncached)
    /// refresh of `namespace`, after which its id is recorded. Returns the
    /// applied notices; empty on 304.
    pub async fn poll_and_refresh(
        &self,
        namespace: &str,
        namespace_type: NamespaceType,
    ) -> ApolloResult<Vec<Notification>> {
        let wire = namespace_type.wire_namespace(namespace);
        let notices = self.read_notifications(&[wire.as_str()]).await?;

        for notice in &notices {
            self.update(namespace, namespace_type, Endpoint::Uncached).await?;
            self.notifications.record(&wire, notice.notification_id);
            tracing::info!(
                namespace = %wire,
                notification_id = notice.notification_id,
                "Namespace changed"
            );
        }
        Ok(notices)
    }

    /// Long-poll several namespaces in one request.
    ///
    /// Only namespaces named in the response are refreshed; notices for
    /// namespaces not in `namespaces` are ignored.
    pub async fn poll_and_refresh_many(
        &self,
        namespaces: &[(&str, NamespaceType)],
    ) -> ApolloResult<Vec<Notification>> {
        let wires: Vec<String> = namespaces
            .iter()
            .map(|(name, ty)| ty.wire_namespace(name))
            .collect();
        let wire_refs: Vec<&str> = wires.iter().map(String::as_str).collect();
        let notices = self.read_notifications(&wire_refs).await?;

        let mut applied = Vec::with_capacity(notices.len());
        for notice in notices {
            let matched = namespaces
                .iter()
                .zip(&wires)
                .find(|((name, ty), wire)| {
                    notice.namespace_name == **wire
                        || notice.namespace_name == ty.cache_key(name)
                });
            let Some(((name, ty), wire)) = matched else {
                tracing::debug!(
                    namespace = %notice.namespace_name,
                    "Ignoring notice for unwatched namespace"
                );
                continue;
            };

            self.update(name, *ty, Endpoint::Uncached).await?;
            self.notifications.record(wire, notice.notification_id);
            tracing::info!(
                namespace = %wire,
                notification_id = notice.notification_id,
                "Namespace changed"
            );
            applied.push(notice);
        }
        Ok(applied)
    }

    /// One long-poll request. 304 maps to an empty list.
    async fn read_notifications(&self, wire_namespaces: &[&str]) -> ApolloResult<Vec<Notification>> {
        let request: Vec<NotificationRequest<'_>> = wire_namespaces
            .iter()
            .map(|&ns| NotificationRequest {
                namespace_name: ns,
                notification_id: self.notifications.get(ns),
            })
            .collect();
        let encoded = encode_query_json(&request)?;

        let config = self.config();
        let mut url = self.endpoint_url(["notifications", "v2"])?;
        url.query_pairs_mut()
            .append_pair("appId", &config.app_id)
            .append_pair("cluster", &config.cluster)
            .append_pair("notifications", &encoded);

        let (status, body) = self.send_get(url, "notifications").await?;
        match status {
            StatusCode::NOT_MODIFIED => {
                metrics::record_poll("not_modified");
                Ok(Vec::new())
            }
            StatusCode::OK => {
                let notices: Vec<Notification> = serde_json::from_str(&body)?;
                metrics::record_poll(if notices.is_empty() { "empty" } else { "changed" });
                Ok(notices)
            }
            other => {
                metrics::record_poll("error");
                Err(ApolloError::Request {
                    status: other.as_u16(),
                    body,
                })
            }
        }
    }
}

/// JSON text for a query parameter; failures are request-side, not decode errors.
fn encode_query_json<T: Serialize + ?Sized>(value: &T) -> ApolloResult<String> {
    serde_json::to_string(value).map_err(ApolloError::Encode)
}
