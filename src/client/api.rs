//! HTTP client for the scan and label endpoints.
//!
//! # Responsibilities
//! - Build request bodies (base64 data URLs for images)
//! - Hold a throttle slot for every attempt, body read included
//! - Retry transient failures with backoff
//! - Tag every logical request with one `x-request-id`

use std::path::Path;
use std::time::{Duration, Instant};

use base64::Engine;
use serde::Serialize;
use url::Url;
use uuid::Uuid;

use crate::client::types::{LabelPdfRequest, ScanRequest, ScanResponse};
use crate::client::X_REQUEST_ID;
use crate::config::QrMagicConfig;
use crate::error::{QrMagicError, QrResult};
use crate::observability::metrics;
use crate::resilience::{is_retryable, RetryPolicy};
use crate::throttle::RequestThrottle;

/// Longest slice of an error body kept in [`QrMagicError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Client for a qrmagic API server.
#[derive(Debug, Clone)]
pub struct QrMagicClient {
    http: reqwest::Client,
    scan_url: Url,
    labels_url: Url,
    throttle: RequestThrottle,
    retry: RetryPolicy,
}

impl QrMagicClient {
    /// Create a client with its own throttle sized from the configuration.
    pub fn new(config: &QrMagicConfig) -> QrResult<Self> {
        Self::with_throttle(config, RequestThrottle::new(config.throttle.max_in_flight))
    }

    /// Create a client sharing an existing throttle.
    pub fn with_throttle(config: &QrMagicConfig, throttle: RequestThrottle) -> QrResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;

        let scan_url = config.api.scan_url()?;
        let labels_url = config.api.labels_url()?;

        tracing::debug!(
            scan_url = %scan_url,
            labels_url = %labels_url,
            max_in_flight = throttle.max_in_flight(),
            max_attempts = config.retries.max_attempts,
            "API client configured"
        );

        Ok(Self {
            http,
            scan_url,
            labels_url,
            throttle,
            retry: RetryPolicy::from(&config.retries),
        })
    }

    /// The throttle every request of this client goes through.
    pub fn throttle(&self) -> &RequestThrottle {
        &self.throttle
    }

    /// Send one image to the scanning endpoint.
    pub async fn scan_image(&self, filename: &str, bytes: &[u8]) -> QrResult<ScanResponse> {
        let request = ScanRequest {
            filename: filename.to_string(),
            content: to_data_url(filename, bytes),
        };
        let body = self.post_with_retry("scan-image", &self.scan_url, &request).await?;
        let mut response: ScanResponse = serde_json::from_slice(&body)?;
        if response.filename.is_empty() {
            response.filename = filename.to_string();
        }

        tracing::debug!(
            filename = %filename,
            qrcodes = ?response.qrcodes,
            datetime = ?response.datetime,
            "Image scanned"
        );
        Ok(response)
    }

    /// Read an image from disk and scan it under its file name.
    pub async fn scan_file(&self, path: &Path) -> QrResult<ScanResponse> {
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.scan_image(&filename, &bytes).await
    }

    /// Ask the server to render a label PDF; returns the PDF bytes.
    pub async fn generate_labels(&self, request: &LabelPdfRequest) -> QrResult<Vec<u8>> {
        let pdf = self.post_with_retry("label-pdf", &self.labels_url, request).await?;
        tracing::info!(
            label_type = %request.label_type(),
            layout = %request.layout(),
            bytes = pdf.len(),
            "Label PDF received"
        );
        Ok(pdf)
    }

    /// POST `body` as JSON, retrying transient failures. Returns the response body.
    async fn post_with_retry<B: Serialize>(
        &self,
        endpoint: &'static str,
        url: &Url,
        body: &B,
    ) -> QrResult<Vec<u8>> {
        let request_id = Uuid::new_v4().to_string();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let start = Instant::now();

            let outcome = self
                .throttle
                .run(async {
                    let response = self
                        .http
                        .post(url.clone())
                        .header(X_REQUEST_ID, request_id.as_str())
                        .json(body)
                        .send()
                        .await?;
                    let status = response.status();
                    let bytes = response.bytes().await?;
                    Ok::<_, reqwest::Error>((status, bytes))
                })
                .await;

            match outcome {
                Ok((status, bytes)) if status.is_success() => {
                    metrics::record_request(endpoint, status.as_u16(), start);
                    return Ok(bytes.to_vec());
                }
                Ok((status, bytes)) => {
                    metrics::record_request(endpoint, status.as_u16(), start);
                    if self.retry.allows_retry(attempt) && is_retryable(Some(status), false) {
                        let backoff = self.retry.delay_for(attempt);
                        tracing::info!(
                            request_id = %request_id,
                            endpoint,
                            attempt,
                            status = %status,
                            delay = ?backoff,
                            "Retrying request"
                        );
                        metrics::record_retry(endpoint);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    let mut text = String::from_utf8_lossy(&bytes).into_owned();
                    if text.len() > MAX_ERROR_BODY {
                        let mut cut = MAX_ERROR_BODY;
                        while !text.is_char_boundary(cut) {
                            cut -= 1;
                        }
                        text.truncate(cut);
                    }
                    return Err(QrMagicError::Status {
                        endpoint: endpoint.to_string(),
                        status: status.as_u16(),
                        body: text,
                    });
                }
                Err(e) => {
                    metrics::record_request(endpoint, 0, start);
                    let transport = !e.is_builder() && !e.is_decode();
                    if self.retry.allows_retry(attempt) && is_retryable(None, transport) {
                        let backoff = self.retry.delay_for(attempt);
                        tracing::info!(
                            request_id = %request_id,
                            endpoint,
                            attempt,
                            error = %e,
                            delay = ?backoff,
                            "Retrying after network error"
                        );
                        metrics::record_retry(endpoint);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }
                    tracing::error!(request_id = %request_id, endpoint, attempt, error = %e, "Request failed");
                    return Err(e.into());
                }
            }
        }
    }
}

/// MIME type guessed from a file name's extension.
pub fn mime_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" | "heif" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Encode image bytes as a base64 data URL.
pub fn to_data_url(filename: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_for(filename), encoded)
}
