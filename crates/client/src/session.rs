//! Session mapping — external conversation ids to backend session ids.
//!
//! The backend hands out opaque session identifiers; callers address
//! conversations by their own external ids. One external id maps to at most
//! one backend session for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use toolstream_core::error::TransportError;
use toolstream_core::transport::Transport;

/// Process-wide map of `external id → backend session id`.
///
/// Creation is single-flight per key: concurrent first uses of the same
/// external id perform exactly one backend call and converge on the same
/// backend id. A failed creation leaves the key unpopulated so a later
/// caller may retry.
#[derive(Default)]
pub struct SessionMap {
    inner: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve an external id to its backend session id, creating the
    /// backend session on first use.
    pub async fn resolve(
        &self,
        external_id: &str,
        transport: &dyn Transport,
        title: Option<&str>,
    ) -> Result<String, TransportError> {
        let cell = {
            let mut map = self.inner.lock().await;
            map.entry(external_id.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let backend_id = cell
            .get_or_try_init(|| async {
                debug!(external_id, "Creating backend session");
                transport.create_session(title.map(str::to_string)).await
            })
            .await?;

        Ok(backend_id.clone())
    }

    /// The backend id already mapped for an external id, if any.
    pub async fn get(&self, external_id: &str) -> Option<String> {
        let map = self.inner.lock().await;
        map.get(external_id).and_then(|cell| cell.get().cloned())
    }

    /// Number of external ids with a resolved backend session.
    pub async fn len(&self) -> usize {
        let map = self.inner.lock().await;
        map.values().filter(|cell| cell.get().is_some()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
