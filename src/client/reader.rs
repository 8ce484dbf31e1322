//! Namespace reads against the cached and uncached endpoints.
//!
//! # Responsibilities
//! - Build endpoint urls from the client identity
//! - Sign each request over its exact path and query
//! - Map non-success statuses to typed errors and decode JSON bodies

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use url::{Position, Url};

use crate::auth::signer;
use crate::client::cache::ConfigCache;
use crate::client::notifications::NotificationState;
use crate::client::types::{
    ApolloError, ApolloResult, ConfigEnvelope, Configurations, Endpoint, NamespaceType,
};
use crate::config::schema::ClientConfig;
use crate::config::validation::validate_client;
use crate::observability::metrics;

/// Client for one application/cluster on an Apollo config service.
///
/// Cloning is cheap; clones share the HTTP pool, the local cache and the
/// notification state.
#[derive(Clone)]
pub struct ApolloClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    base_url: Url,
    pub(crate) cache: ConfigCache,
    pub(crate) notifications: NotificationState,
}

impl ApolloClient {
    /// Create a new client.
    ///
    /// Fails if the configuration is invalid; no request is made.
    pub fn new(config: ClientConfig) -> ApolloResult<Self> {
        validate_client(&config).map_err(ApolloError::InvalidConfig)?;

        let base_url = Url::parse(&config.config_server_url)
            .map_err(|e| ApolloError::Url(format!("{}: {}", config.config_server_url, e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        tracing::debug!(
            config_server_url = %config.config_server_url,
            app_id = %config.app_id,
            cluster = %config.cluster,
            signed = config.secret.is_some(),
            "Apollo client initialized"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
            base_url,
            cache: ConfigCache::default(),
            notifications: NotificationState::default(),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Read a namespace from the cache-backed endpoint.
    ///
    /// Suited to frequent polling; results may lag a release by up to a second.
    pub async fn read_with_cache(
        &self,
        namespace: &str,
        namespace_type: NamespaceType,
    ) -> ApolloResult<Configurations> {
        let body = self.read_raw(Endpoint::Cached, namespace, namespace_type).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Read a namespace straight from the database, with release metadata.
    pub async fn read_without_cache(
        &self,
        namespace: &str,
        namespace_type: NamespaceType,
    ) -> ApolloResult<ConfigEnvelope> {
        let body = self.read_raw(Endpoint::Uncached, namespace, namespace_type).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Read a namespace's key/value mapping from the chosen endpoint.
    pub async fn read(
        &self,
        namespace: &str,
        namespace_type: NamespaceType,
        endpoint: Endpoint,
    ) -> ApolloResult<Configurations> {
        match endpoint {
            Endpoint::Cached => self.read_with_cache(namespace, namespace_type).await,
            Endpoint::Uncached => Ok(self
                .read_without_cache(namespace, namespace_type)
                .await?
                .configurations),
        }
    }

    async fn read_raw(
        &self,
        endpoint: Endpoint,
        namespace: &str,
        namespace_type: NamespaceType,
    ) -> ApolloResult<String> {
        let url = self.namespace_url(endpoint, &namespace_type.wire_namespace(namespace))?;
        let (status, body) = self.send_get(url, endpoint.label()).await?;
        if status != StatusCode::OK {
            return Err(ApolloError::Request {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// `<server>/<api_path>/<app_id>/<cluster>/<wire_namespace>[?ip=..]`
    pub(crate) fn namespace_url(&self, endpoint: Endpoint, wire_namespace: &str) -> ApolloResult<Url> {
        let mut url = self.endpoint_url(endpoint.api_path().split('/'))?;
        url.path_segments_mut()
            .map_err(|_| ApolloError::Url(self.config.config_server_url.clone()))?
            .push(&self.config.app_id)
            .push(&self.config.cluster)
            .push(wire_namespace);
        if let Some(ip) = &self.config.ip {
            url.query_pairs_mut().append_pair("ip", ip);
        }
        Ok(url)
    }

    /// Server url extended with `segments`, ignoring any trailing slash.
    pub(crate) fn endpoint_url<'a>(
        &self,
        segments: impl IntoIterator<Item = &'a str>,
    ) -> ApolloResult<Url> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| ApolloError::Url(self.config.config_server_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a signed GET and return the status and body text.
    pub(crate) async fn send_get(
        &self,
        url: Url,
        endpoint: &'static str,
    ) -> ApolloResult<(StatusCode, String)> {
        let uri = url[Position::BeforePath..].to_string();

        let mut headers = HeaderMap::new();
        if let Some(auth) = signer::auth_headers(
            &self.config.app_id,
            self.config.secret.as_deref(),
            &uri,
        ) {
            auth.apply(&mut headers)?;
        }

        let response = match self.http.get(url).headers(headers).send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_transport_error(endpoint);
                tracing::debug!(endpoint, uri = %uri, error = %e, "Apollo request failed");
                return Err(e.into());
            }
        };
        let status = response.status();
        let body = response.text().await?;

        metrics::record_request(endpoint, status.as_u16());
        tracing::debug!(endpoint, uri = %uri, status = status.as_u16(), "Apollo request completed");

        Ok((status, body))
    }
}

impl std::fmt::Debug for ApolloClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApolloClient")
            .field("config", &self.config)
            .field("cached_namespaces", &self.cache.len())
            .finish()
    }
}
