//! Transport trait — the abstraction over the chat backend.
//!
//! A Transport knows how to create backend sessions and open a streamed
//! chat request that yields decoded `StreamFrame`s. The HTTP implementation
//! lives in `toolstream-client`; tests use scripted in-process transports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::capability::CapabilityDefinition;
use crate::error::TransportError;
use crate::frame::StreamFrame;

/// Parameters for one streamed chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRequest {
    /// The message to send (the user's text, or a constructed follow-up).
    pub message: String,

    /// Domain tag, passed through opaquely (e.g. "general").
    pub domain: String,

    /// Mode tag, passed through opaquely (e.g. "consult").
    pub mode: String,

    /// Optional image reference for the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,

    /// Optional workspace reference for the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<String>,

    /// Capabilities advertised to the model for this request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<CapabilityDefinition>,
}

impl StreamRequest {
    /// A request with default domain/mode tags and no attachments.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            domain: "general".into(),
            mode: "consult".into(),
            image_path: None,
            workspace_path: None,
            tools: Vec::new(),
        }
    }
}

/// The result channel of an open stream: decoded frames in arrival order,
/// or a transport-level failure. The channel closing without a terminal
/// frame means the underlying stream ended; that is not an error.
pub type FrameReceiver =
    tokio::sync::mpsc::Receiver<std::result::Result<StreamFrame, TransportError>>;

/// The core Transport trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// A human-readable name for this transport (e.g., "http").
    fn name(&self) -> &str;

    /// Create a fresh backend session, optionally titled.
    /// Returns an opaque backend session identifier.
    async fn create_session(
        &self,
        title: Option<String>,
    ) -> std::result::Result<String, TransportError>;

    /// Open a streamed chat request against an existing backend session.
    ///
    /// Cancelling `cancel` aborts the in-flight request; the receiver then
    /// closes without a terminal frame.
    async fn open_stream(
        &self,
        session_id: &str,
        request: StreamRequest,
        cancel: CancellationToken,
    ) -> std::result::Result<FrameReceiver, TransportError>;

    /// One-shot, non-streaming send. Returns the complete response text.
    async fn send_message(
        &self,
        session_id: &str,
        request: StreamRequest,
    ) -> std::result::Result<String, TransportError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, TransportError> {
        Ok(true)
    }
}
