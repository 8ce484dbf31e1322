//! Watch loop: recovery after failures and shutdown.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

use apollo_client::config::{NamespaceConfig, WatchConfig};
use apollo_client::{ApolloClient, NamespaceType, NotificationWatcher, Shutdown};

mod common;

use common::{envelope, start_mock_apollo};

fn fast_watch() -> WatchConfig {
    WatchConfig {
        namespaces: vec![NamespaceConfig {
            name: "application".into(),
            namespace_type: NamespaceType::Properties,
        }],
        base_delay_ms: 10,
        max_delay_ms: 50,
        min_interval_ms: 10,
    }
}

#[tokio::test]
async fn test_watcher_recovers_and_delivers_change() {
    let polls = Arc::new(AtomicU32::new(0));
    let counter = polls.clone();
    let mock = start_mock_apollo(move |req| {
        if req.path != "/notifications/v2" {
            return (200, envelope("application", "r2", &[("feature", "on")]));
        }
        match counter.fetch_add(1, Ordering::SeqCst) {
            0 | 1 => (502, "bad gateway".into()),
            2 => (
                200,
                r#"[{"namespaceName":"application","notificationId":5}]"#.into(),
            ),
            _ => (304, String::new()),
        }
    })
    .await;
    let client = ApolloClient::new(mock.client_config("app1")).unwrap();

    let shutdown = Shutdown::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = NotificationWatcher::new(client.clone(), fast_watch()).with_changes(tx);
    let handle = tokio::spawn(watcher.run(shutdown.subscribe()));

    let notice = timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("change within timeout")
        .expect("channel open");
    assert_eq!(notice.notification_id, 5);
    assert_eq!(client.notification_id("application", NamespaceType::Properties), 5);
    let snapshot = client.cached("application", NamespaceType::Properties).unwrap();
    assert_eq!(snapshot.get("feature").map(String::as_str), Some("on"));
    assert!(polls.load(Ordering::SeqCst) >= 3);

    shutdown.trigger();
    timeout(Duration::from_secs(5), handle)
        .await
        .expect("watcher stops")
        .unwrap();
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_watcher_stops_during_backoff() {
    let mock = start_mock_apollo(|_| (500, "down".into())).await;
    let client = ApolloClient::new(mock.client_config("app1")).unwrap();

    let mut watch = fast_watch();
    watch.base_delay_ms = 60_000;
    watch.max_delay_ms = 60_000;

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(NotificationWatcher::new(client, watch).run(shutdown.subscribe()));

    // Let the first poll fail so the loop is parked in its backoff sleep.
    for _ in 0..100 {
        if mock.count("/notifications/v2") > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(mock.count("/notifications/v2"), 1);

    shutdown.trigger();
    timeout(Duration::from_secs(2), handle)
        .await
        .expect("watcher stops promptly")
        .unwrap();
    assert_eq!(mock.count("/notifications/v2"), 1);
}

#[tokio::test]
async fn test_watcher_without_namespaces_returns() {
    let mock = start_mock_apollo(|_| (304, String::new())).await;
    let client = ApolloClient::new(mock.client_config("app1")).unwrap();
    let mut watch = fast_watch();
    watch.namespaces.clear();

    let shutdown = Shutdown::new();
    timeout(
        Duration::from_secs(1),
        NotificationWatcher::new(client, watch).run(shutdown.subscribe()),
    )
    .await
    .expect("returns immediately");
    assert!(mock.requests().is_empty());
}
