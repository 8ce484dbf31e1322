//! Shared utilities for integration tests: a programmable mock config service.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use apollo_client::ClientConfig;

/// What the mock saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub timestamp: Option<String>,
}

#[allow(dead_code)]
impl RecordedRequest {
    /// Path plus query, exactly as the client signed it.
    pub fn uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Decoded query parameters.
    pub fn params(&self) -> HashMap<String, String> {
        self.query
            .as_deref()
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default()
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
}

/// Handle to a running mock config service.
pub struct MockApollo {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[allow(dead_code)]
impl MockApollo {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }

    /// Client config pointing at this mock.
    pub fn client_config(&self, app_id: &str) -> ClientConfig {
        ClientConfig {
            config_server_url: self.url.clone(),
            app_id: app_id.to_string(),
            timeout_secs: 5,
            ..ClientConfig::default()
        }
    }
}

/// Start a mock config service on an ephemeral port.
///
/// `f` maps each request to a status code and body.
pub async fn start_mock_apollo<F>(f: F) -> MockApollo
where
    F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        requests: requests.clone(),
        responder: Arc::new(f),
    };
    let app = Router::new().fallback(handle).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockApollo {
        url: format!("http://{}", addr),
        requests,
    }
}

async fn handle(State(state): State<MockState>, request: Request) -> Response {
    let header = |name: &str| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        authorization: header("authorization"),
        timestamp: header("timestamp"),
    };
    state.requests.lock().unwrap().push(recorded.clone());

    let (status, body) = (state.responder)(&recorded);
    (StatusCode::from_u16(status).unwrap(), body).into_response()
}

/// Body of the uncached endpoint.
#[allow(dead_code)]
pub fn envelope(namespace: &str, release_key: &str, pairs: &[(&str, &str)]) -> String {
    let configurations: HashMap<&str, &str> = pairs.iter().copied().collect();
    serde_json::json!({
        "appId": "app1",
        "cluster": "default",
        "namespaceName": namespace,
        "configurations": configurations,
        "releaseKey": release_key,
    })
    .to_string()
}
