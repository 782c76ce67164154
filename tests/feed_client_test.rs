use chrono::{TimeZone, Utc};
use spotsync::clock::FixedClock;
use spotsync::config::FeedConfig;
use spotsync::error::{Result, SpotSyncError};
use spotsync::feed::{FeedClient, PriceFeed};
use spotsync::persistence::FilePriceStore;
use spotsync::reconciler::{AbortReason, PriceReconciler, RunOutcome};
use spotsync::store::{PriceStore, StoredPriceRecord};
use spotsync::time_window::fetch_window;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned HTTP response and hand back the request head
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });
    (format!("http://{}", addr), handle)
}

/// Accept connections and never answer them
async fn serve_silently() -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (format!("http://{}", addr), handle)
}

fn client_with_timeout(base_url: String, timeout_secs: u64) -> FeedClient {
    FeedClient::new(&FeedConfig {
        base_url,
        price_list_key: "1047".to_string(),
        timeout_secs,
    })
    .unwrap()
}

fn client(base_url: String) -> FeedClient {
    client_with_timeout(base_url, 5)
}

/// Store that only counts the calls it receives
struct CountingStore {
    inner: FilePriceStore,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl PriceStore for CountingStore {
    async fn find_by_date(&self, key: &str) -> Result<Option<StoredPriceRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_date(key).await
    }

    async fn save(&self, record: &mut StoredPriceRecord) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record).await
    }
}

fn window() -> spotsync::time_window::FetchWindow {
    fetch_window(Utc.with_ymd_and_hms(2024, 2, 25, 9, 30, 0).unwrap())
}

#[tokio::test]
async fn fetch_sends_window_and_decodes_series() {
    let (base, server) = serve_once(
        "200 OK",
        r#"{"error":false,"series":[
            {"startDate":"2024-02-25T00:00","value":3.1,"unit":"c/kWh"},
            {"startDate":"2024-02-25T01:00","value":2.9,"unit":"c/kWh"}
        ]}"#,
    )
    .await;

    let points = client(base).fetch(&window()).await.unwrap();
    let request = server.await.unwrap();

    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("GET /spot-price-anonymous?"));
    assert!(request_line.contains("priceListKey=1047"));
    assert!(request_line.contains("from=2024-02-25T00%3A00%3A00"));
    assert!(request_line.contains("to=2024-02-26T23%3A59%3A59"));

    assert_eq!(points.len(), 2);
    assert_eq!(
        points[1].start_date,
        Utc.with_ymd_and_hms(2024, 2, 25, 1, 0, 0).unwrap()
    );
    assert_eq!(points[1].value, 2.9);
}

#[tokio::test]
async fn error_flag_is_feed_reported() {
    let (base, server) = serve_once("200 OK", r#"{"error":true,"series":[]}"#).await;
    let err = client(base).fetch(&window()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, SpotSyncError::FeedReported { .. }));
}

#[tokio::test]
async fn non_success_status_is_network_error() {
    let (base, server) = serve_once("503 Service Unavailable", "{}").await;
    let err = client(base).fetch(&window()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, SpotSyncError::Network { .. }));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let (base, server) = serve_once("200 OK", "not json").await;
    let err = client(base).fetch(&window()).await.unwrap_err();
    server.await.unwrap();
    assert!(matches!(err, SpotSyncError::Decode { .. }));
}

#[tokio::test]
async fn unreachable_feed_is_fetch_error() {
    // bind then drop to get a port nobody listens on
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(format!("http://{}", addr))
        .fetch(&window())
        .await
        .unwrap_err();
    assert!(err.is_fetch_error());
}

#[tokio::test]
async fn silent_feed_times_out() {
    let (base, server) = serve_silently().await;
    let started = Instant::now();
    let err = client_with_timeout(base, 1)
        .fetch(&window())
        .await
        .unwrap_err();
    server.abort();

    assert!(matches!(err, SpotSyncError::Timeout { .. }), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn timeout_aborts_run_without_store_calls() {
    let (base, server) = serve_silently().await;
    let store = Arc::new(CountingStore {
        inner: FilePriceStore::in_memory(),
        calls: AtomicUsize::new(0),
    });
    let reconciler = PriceReconciler::new(
        Arc::new(client_with_timeout(base, 1)),
        store.clone(),
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 2, 25, 9, 30, 0).unwrap(),
        )),
    );

    let report = reconciler.run().await;
    server.abort();

    match &report.outcome {
        RunOutcome::Aborted(AbortReason::FetchFailed(message)) => {
            assert!(message.starts_with("Timeout error"), "got {message}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    assert!(store.inner.is_empty().await);
}

#[test]
fn endpoint_url_trims_trailing_slash() {
    let c = client("https://web.fortum.fi/api/v2/".to_string());
    assert_eq!(
        c.endpoint_url(),
        "https://web.fortum.fi/api/v2/spot-price-anonymous"
    );
}

#[test]
fn zero_timeout_is_rejected() {
    let cfg = FeedConfig {
        timeout_secs: 0,
        ..FeedConfig::default()
    };
    assert!(matches!(
        FeedClient::new(&cfg),
        Err(SpotSyncError::Validation { .. })
    ));
}
