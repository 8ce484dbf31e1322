//! Namespace types, wire payloads and error definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::validation::ValidationError;

/// One namespace's resolved key/value settings.
pub type Configurations = HashMap<String, String>;

/// Notification id used before the server has reported one.
pub const UNKNOWN_NOTIFICATION_ID: i64 = -1;

/// Namespace format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceType {
    #[default]
    Properties,
    Xml,
    Json,
    Yml,
    Yaml,
    Txt,
}

impl NamespaceType {
    pub const ALL: [NamespaceType; 6] = [
        NamespaceType::Properties,
        NamespaceType::Xml,
        NamespaceType::Json,
        NamespaceType::Yml,
        NamespaceType::Yaml,
        NamespaceType::Txt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceType::Properties => "properties",
            NamespaceType::Xml => "xml",
            NamespaceType::Json => "json",
            NamespaceType::Yml => "yml",
            NamespaceType::Yaml => "yaml",
            NamespaceType::Txt => "txt",
        }
    }

    /// Namespace name as sent to the server.
    ///
    /// `properties` is implicit; every other format is appended as a suffix.
    pub fn wire_namespace(&self, namespace: &str) -> String {
        match self {
            NamespaceType::Properties => namespace.to_string(),
            other => format!("{}.{}", namespace, other.as_str()),
        }
    }

    /// Local cache key, always suffixed.
    pub fn cache_key(&self, namespace: &str) -> String {
        format!("{}.{}", namespace, self.as_str())
    }
}

impl fmt::Display for NamespaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known namespace format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown namespace type '{0}' (expected one of properties, xml, json, yml, yaml, txt)")]
pub struct ParseNamespaceTypeError(pub String);

impl FromStr for NamespaceType {
    type Err = ParseNamespaceTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamespaceType::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseNamespaceTypeError(s.to_string()))
    }
}

/// Which server read path to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// `configfiles/json`: served from the server cache, may lag up to a second.
    #[default]
    Cached,
    /// `configs`: read from the database, pairs with notifications.
    Uncached,
}

impl Endpoint {
    pub fn api_path(&self) -> &'static str {
        match self {
            Endpoint::Cached => "configfiles/json",
            Endpoint::Uncached => "configs",
        }
    }

    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Cached => "configfiles",
            Endpoint::Uncached => "configs",
        }
    }
}

/// Body of the uncached (`configs`) endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigEnvelope {
    pub app_id: String,
    pub cluster: String,
    pub namespace_name: String,
    pub configurations: Configurations,
    pub release_key: String,
}

/// One entry of the `notifications` query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest<'a> {
    pub namespace_name: &'a str,
    pub notification_id: i64,
}

/// A change notice returned by the long-poll endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub namespace_name: String,
    pub notification_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<NotificationMessages>,
}

/// Per-release details attached to a notice, keyed by `app+cluster+namespace`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NotificationMessages {
    #[serde(default)]
    pub details: HashMap<String, i64>,
}

/// Errors that can occur while talking to the config service.
#[derive(Debug, Error)]
pub enum ApolloError {
    /// The server answered with a status outside the endpoint's success set.
    #[error("request failed: status_code={status}, text={body}")]
    Request { status: u16, body: String },

    /// A success response carried a body that is not the expected JSON.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// An outgoing request parameter could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(serde_json::Error),

    /// Connection, timeout or other transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request url could not be built.
    #[error("invalid url: {0}")]
    Url(String),

    /// A signed header value is not a valid HTTP header.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// The client configuration failed validation.
    #[error("invalid client configuration: {0:?}")]
    InvalidConfig(Vec<ValidationError>),
}

impl ApolloError {
    /// HTTP status for `Request` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApolloError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type ApolloResult<T> = Result<T, ApolloError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_namespace() {
        assert_eq!(NamespaceType::Properties.wire_namespace("application"), "application");
        for ty in NamespaceType::ALL.into_iter().skip(1) {
            assert_eq!(
                ty.wire_namespace("application"),
                format!("application.{}", ty.as_str())
            );
        }
        assert_eq!(NamespaceType::Yaml.wire_namespace("db"), "db.yaml");
    }

    #[test]
    fn test_cache_key_always_suffixed() {
        assert_eq!(NamespaceType::Properties.cache_key("application"), "application.properties");
        assert_eq!(NamespaceType::Json.cache_key("application"), "application.json");
    }

    #[test]
    fn test_parse_namespace_type() {
        assert_eq!("json".parse::<NamespaceType>().unwrap(), NamespaceType::Json);
        assert_eq!("YAML".parse::<NamespaceType>().unwrap(), NamespaceType::Yaml);
        assert_eq!(" txt ".parse::<NamespaceType>().unwrap(), NamespaceType::Txt);
        let err = "ini".parse::<NamespaceType>().unwrap_err();
        assert!(err.to_string().contains("ini"));
        for ty in NamespaceType::ALL {
            assert_eq!(ty.to_string().parse::<NamespaceType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Cached.api_path(), "configfiles/json");
        assert_eq!(Endpoint::Uncached.api_path(), "configs");
    }

    #[test]
    fn test_envelope_decode() {
        let body = r#"{
            "appId": "app1",
            "cluster": "default",
            "namespaceName": "application",
            "configurations": {"timeout": "30"},
            "releaseKey": "r1"
        }"#;
        let envelope: ConfigEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.release_key, "r1");
        assert_eq!(envelope.configurations.get("timeout").map(String::as_str), Some("30"));
    }

    #[test]
    fn test_notification_decode() {
        let body = r#"[{
            "namespaceName": "application",
            "notificationId": 17135,
            "messages": {"details": {"app1+default+application": 17135}}
        }]"#;
        let notices: Vec<Notification> = serde_json::from_str(body).unwrap();
        assert_eq!(notices[0].notification_id, 17135);
        let details = &notices[0].messages.as_ref().unwrap().details;
        assert_eq!(details["app1+default+application"], 17135);

        let bare: Notification =
            serde_json::from_str(r#"{"namespaceName":"a","notificationId":3}"#).unwrap();
        assert!(bare.messages.is_none());
    }

    #[test]
    fn test_notification_request_shape() {
        let request = [NotificationRequest {
            namespace_name: "application",
            notification_id: UNKNOWN_NOTIFICATION_ID,
        }];
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"[{"namespaceName":"application","notificationId":-1}]"#
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApolloError::Request {
            status: 404,
            body: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "request failed: status_code=404, text=not found");
        assert_eq!(err.status(), Some(404));
    }
}
