//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use qrmagic::config::QrMagicConfig;

/// Bytes returned by the mock label endpoint.
pub const MOCK_PDF: &[u8] = b"%PDF-1.4\n% mock label sheet\n%%EOF\n";

/// What the mock scan endpoint knows about one image.
#[derive(Debug, Clone)]
pub struct CannedScan {
    pub qrcodes: Option<Vec<String>>,
    pub datetime: String,
}

/// State shared between the mock server and the test.
#[derive(Debug, Default)]
pub struct MockState {
    /// Responses by filename. Unknown filenames get a 500.
    pub scans: HashMap<String, CannedScan>,
    /// Filenames answered with 400.
    pub rejected: Vec<String>,
    /// Time each scan request is held before answering.
    pub delay: Duration,
    /// Answer this many scan requests with 503 before behaving normally.
    pub fail_first: AtomicUsize,
    pub scan_hits: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    /// Server-side start and end of every scan request.
    pub intervals: Mutex<Vec<(Instant, Instant)>>,
    pub label_requests: Mutex<Vec<Value>>,
    /// `x-request-id` of every scan request, in arrival order.
    pub request_ids: Mutex<Vec<String>>,
}

impl MockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan(mut self, filename: &str, qrcodes: &[&str], datetime: &str) -> Self {
        self.scans.insert(
            filename.to_string(),
            CannedScan {
                qrcodes: (!qrcodes.is_empty()).then(|| qrcodes.iter().map(|c| c.to_string()).collect()),
                datetime: datetime.to_string(),
            },
        );
        self
    }

    pub fn with_rejected(mut self, filename: &str) -> Self {
        self.rejected.push(filename.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Largest number of recorded requests that overlapped in time.
    pub fn max_overlap(&self) -> usize {
        let intervals = self.intervals.lock().unwrap();
        let mut events: Vec<(Instant, i32)> = intervals
            .iter()
            .flat_map(|(start, end)| [(*start, 1), (*end, -1)])
            .collect();
        // Ends sort before starts at the same instant.
        events.sort();

        let mut current = 0;
        let mut peak = 0;
        for (_, delta) in events {
            current += delta;
            peak = peak.max(current);
        }
        peak as usize
    }
}

async fn scan_image(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let start = Instant::now();
    if let Some(id) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        state.request_ids.lock().unwrap().push(id.to_string());
    }
    state.scan_hits.fetch_add(1, Ordering::SeqCst);
    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(now, Ordering::SeqCst);

    tokio::time::sleep(state.delay).await;

    let filename = body["filename"].as_str().unwrap_or_default().to_string();
    let content_ok = body["content"]
        .as_str()
        .is_some_and(|c| c.starts_with("data:") && c.contains(";base64,"));

    let retry_budget = state.fail_first.load(Ordering::SeqCst);
    let response = if retry_budget > 0 {
        state.fail_first.fetch_sub(1, Ordering::SeqCst);
        (StatusCode::SERVICE_UNAVAILABLE, "busy").into_response()
    } else if !content_ok || state.rejected.contains(&filename) {
        (StatusCode::BAD_REQUEST, "bad image").into_response()
    } else if let Some(scan) = state.scans.get(&filename) {
        let body = json!({
            "filename": filename,
            "qrcodes": scan.qrcodes,
            "datetime": scan.datetime,
            "camera": "Mock Camera",
            "lat": -35.27,
            "lng": 149.158,
            "alt": null,
            "midsize": format!("data:image/jpeg;base64,{filename}"),
        });
        (StatusCode::CREATED, Json(body)).into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "cannot read image").into_response()
    };

    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    state.intervals.lock().unwrap().push((start, Instant::now()));
    response
}

async fn label_pdf(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.label_requests.lock().unwrap().push(body);
    ([(header::CONTENT_TYPE, "application/pdf")], MOCK_PDF).into_response()
}

/// Start the mock API on an ephemeral port.
pub async fn start_mock_api(state: MockState) -> (SocketAddr, Arc<MockState>) {
    let state = Arc::new(state);
    let app = Router::new()
        .route("/api/scan-image", post(scan_image))
        .route("/api/label-pdf", post(label_pdf))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state)
}

/// Client configuration pointing at a mock API, with retries off.
pub fn config_for(addr: SocketAddr, max_in_flight: usize) -> QrMagicConfig {
    let mut config = QrMagicConfig::default();
    config.api.base_url = format!("http://{addr}");
    config.throttle.max_in_flight = max_in_flight;
    config.retries.enabled = false;
    config
}

/// Write small placeholder images into `dir`.
pub fn write_images(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"\xFF\xD8\xFF\xE0 not really a jpeg").unwrap();
            path
        })
        .collect()
}
