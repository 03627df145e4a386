//! Chat client facade — transport plus session mapping.
//!
//! Callers address conversations by external id; the client resolves the
//! backend session lazily through its `SessionMap` and forwards to the
//! transport.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use toolstream_core::error::TransportError;
use toolstream_core::transport::{FrameReceiver, StreamRequest, Transport};

use crate::session::SessionMap;

const DEFAULT_SESSION_TITLE: &str = "Toolstream Chat Session";

/// A chat backend client keyed by external conversation ids.
pub struct ChatClient {
    transport: Arc<dyn Transport>,
    sessions: SessionMap,
    session_title: String,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            sessions: SessionMap::new(),
            session_title: DEFAULT_SESSION_TITLE.into(),
        }
    }

    /// Set the display title used when creating backend sessions.
    pub fn with_session_title(mut self, title: impl Into<String>) -> Self {
        self.session_title = title.into();
        self
    }

    /// The session map (exposed for inspection).
    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    /// Open a streamed chat request for an external conversation id.
    pub async fn stream_chat(
        &self,
        external_id: &str,
        request: StreamRequest,
        cancel: CancellationToken,
    ) -> Result<FrameReceiver, TransportError> {
        let backend_id = self
            .sessions
            .resolve(external_id, self.transport.as_ref(), Some(self.session_title.as_str()))
            .await?;
        self.transport.open_stream(&backend_id, request, cancel).await
    }

    /// One-shot, non-streaming send for an external conversation id.
    pub async fn send(
        &self,
        external_id: &str,
        request: StreamRequest,
    ) -> Result<String, TransportError> {
        let backend_id = self
            .sessions
            .resolve(external_id, self.transport.as_ref(), Some(self.session_title.as_str()))
            .await?;
        self.transport.send_message(&backend_id, request).await
    }

    /// Probe backend reachability.
    pub async fn health_check(&self) -> Result<bool, TransportError> {
        self.transport.health_check().await
    }
}
