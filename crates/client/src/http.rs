//! HTTP transport implementation.
//!
//! Talks to the chat backend's REST surface:
//! - `POST /api/v1/sessions` — create a backend session
//! - `POST /api/v1/chat/stream` — streamed chat (SSE)
//! - `POST /api/v1/chat` — one-shot chat
//! - `GET /health` — reachability probe

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use toolstream_core::error::TransportError;
use toolstream_core::transport::{FrameReceiver, StreamRequest, Transport};

use crate::decoder::FrameDecoder;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// HTTP transport over the chat backend's REST API.
pub struct HttpTransport {
    name: String,
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport against the default local backend.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a transport against a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport with an explicit request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            name: "http".into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// The configured base URL (trailing slash trimmed).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_body(session_id: &str, request: &StreamRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "session_id": session_id,
            "message": request.message,
            "domain": request.domain,
            "mode": request.mode,
        });

        if let Some(ref image) = request.image_path {
            body["image_path"] = serde_json::json!(image);
        }
        if let Some(ref workspace) = request.workspace_path {
            body["workspace_path"] = serde_json::json!(workspace);
        }
        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(request.tools);
        }

        body
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status().as_u16();
        if status == 200 {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status, body = %body, "Chat backend returned an error");
        Err(TransportError::ApiError {
            status_code: status,
            message: body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_session(
        &self,
        title: Option<String>,
    ) -> Result<String, TransportError> {
        let url = format!("{}/api/v1/sessions", self.base_url);
        debug!(url = %url, "Creating backend session");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        body["session_id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                TransportError::SessionCreation("response missing session_id".into())
            })
    }

    async fn open_stream(
        &self,
        session_id: &str,
        request: StreamRequest,
        cancel: CancellationToken,
    ) -> Result<FrameReceiver, TransportError> {
        let url = format!("{}/api/v1/chat/stream", self.base_url);
        let body = Self::chat_body(session_id, &request);

        debug!(url = %url, session_id, "Opening chat stream");

        let response = self
            .client
            .post(&url)
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let (tx, rx) = tokio::sync::mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut decoder = FrameDecoder::new();

            loop {
                let chunk_result = tokio::select! {
                    _ = cancel.cancelled() => {
                        // Dropping the byte stream aborts the request.
                        debug!("Chat stream cancelled, aborting request");
                        return;
                    }
                    chunk = byte_stream.next() => chunk,
                };

                let Some(chunk_result) = chunk_result else {
                    // End of input. A dangling decoder buffer is tolerated.
                    return;
                };

                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx
                            .send(Err(TransportError::StreamInterrupted(e.to_string())))
                            .await;
                        return;
                    }
                };

                for frame in decoder.push(&String::from_utf8_lossy(&bytes)) {
                    let terminal = frame.is_terminal();
                    if tx.send(Ok(frame)).await.is_err() {
                        return;
                    }
                    if terminal {
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_message(
        &self,
        session_id: &str,
        request: StreamRequest,
    ) -> Result<String, TransportError> {
        let url = format!("{}/api/v1/chat", self.base_url);
        let body = Self::chat_body(session_id, &request);

        debug!(url = %url, session_id, "Sending one-shot chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        body["response"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| TransportError::InvalidResponse("response missing text".into()))
    }

    async fn health_check(&self) -> Result<bool, TransportError> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}
