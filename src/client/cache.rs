//! Local configuration cache.
//!
//! Each entry is an immutable snapshot behind an `Arc`. Refreshing a
//! namespace swaps in a new snapshot with a single insert, so readers see
//! either the old mapping or the new one, never a mix.

use dashmap::DashMap;
use std::sync::Arc;

use crate::client::reader::ApolloClient;
use crate::client::types::{ApolloResult, Configurations, Endpoint, NamespaceType};
use crate::observability::metrics;

/// A thread-safe map from `"<namespace>.<type>"` to the last fetched snapshot.
#[derive(Clone, Default)]
pub struct ConfigCache {
    inner: Arc<DashMap<String, Arc<Configurations>>>,
}

impl ConfigCache {
    /// Replace the whole entry for a namespace.
    pub fn replace(&self, namespace: &str, namespace_type: NamespaceType, configs: Configurations) {
        self.inner
            .insert(namespace_type.cache_key(namespace), Arc::new(configs));
    }

    /// Current snapshot for a namespace, if it has been populated.
    pub fn snapshot(&self, namespace: &str, namespace_type: NamespaceType) -> Option<Arc<Configurations>> {
        self.inner
            .get(&namespace_type.cache_key(namespace))
            .map(|r| Arc::clone(r.value()))
    }

    pub fn contains(&self, namespace: &str, namespace_type: NamespaceType) -> bool {
        self.inner.contains_key(&namespace_type.cache_key(namespace))
    }

    /// Number of cached namespaces.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ApolloClient {
    /// Fetch a namespace from `endpoint` and replace its cache entry.
    ///
    /// On failure the previous entry is left untouched.
    pub async fn update(
        &self,
        namespace: &str,
        namespace_type: NamespaceType,
        endpoint: Endpoint,
    ) -> ApolloResult<()> {
        let configs = self.read(namespace, namespace_type, endpoint).await?;
        tracing::info!(
            namespace,
            namespace_type = %namespace_type,
            endpoint = endpoint.label(),
            keys = configs.len(),
            "Namespace cache refreshed"
        );
        self.cache.replace(namespace, namespace_type, configs);
        metrics::record_refresh(namespace);
        Ok(())
    }

    /// Look up `key`, populating the namespace from `endpoint` on first use.
    ///
    /// Returns `default` when the key is absent.
    pub async fn get(
        &self,
        key: &str,
        default: &str,
        namespace: &str,
        namespace_type: NamespaceType,
        endpoint: Endpoint,
    ) -> ApolloResult<String> {
        let snapshot = match self.cache.snapshot(namespace, namespace_type) {
            Some(snapshot) => snapshot,
            None => {
                self.update(namespace, namespace_type, endpoint).await?;
                // A concurrent reader cannot remove entries, so this is populated.
                self.cache
                    .snapshot(namespace, namespace_type)
                    .unwrap_or_default()
            }
        };
        Ok(lookup(&snapshot, key, default))
    }

    /// Look up `key` with a live uncached read, bypassing the local cache.
    ///
    /// The cache is neither read nor written.
    pub async fn get_uncached(
        &self,
        key: &str,
        default: &str,
        namespace: &str,
        namespace_type: NamespaceType,
    ) -> ApolloResult<String> {
        let configs = self.read(namespace, namespace_type, Endpoint::Uncached).await?;
        Ok(lookup(&configs, key, default))
    }

    /// Current cached snapshot for a namespace, without any network call.
    pub fn cached(&self, namespace: &str, namespace_type: NamespaceType) -> Option<Arc<Configurations>> {
        self.cache.snapshot(namespace, namespace_type)
    }
}

fn lookup(configs: &Configurations, key: &str, default: &str) -> String {
    configs
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}
