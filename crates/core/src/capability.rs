//! Capability traits — the abstraction over dynamically discovered tools.
//!
//! Capabilities are grouped under providers. A provider advertises a set of
//! named capabilities and must reach a ready state before any of them can be
//! invoked. The dispatcher in `toolstream-agent` enumerates providers on
//! every dispatch, so the set may change at runtime.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;

use crate::error::CapabilityError;

/// Lifecycle state of a capability provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderState {
    /// Ready to serve invocations.
    Running,
    /// Startup handshake in progress.
    Starting,
    /// Not started.
    Stopped,
    /// Startup failed with a reason.
    Failed(String),
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Starting => write!(f, "starting"),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// A capability definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    /// The capability name.
    pub name: String,

    /// Description of what the capability does.
    pub description: String,

    /// JSON Schema describing the capability's input.
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// A single named, invocable operation.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The unique name of this capability (e.g., "multiply").
    fn name(&self) -> &str;

    /// A description of what this capability does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this capability's input.
    fn input_schema(&self) -> serde_json::Value;

    /// Invoke the capability with the given arguments.
    ///
    /// The returned value is the capability's raw structured response;
    /// interpretation (e.g. extracting textual content parts) is the
    /// caller's concern.
    async fn invoke(
        &self,
        arguments: serde_json::Value,
        cancel: CancellationToken,
    ) -> std::result::Result<serde_json::Value, CapabilityError>;

    /// Convert this capability into a definition for advertising.
    fn to_definition(&self) -> CapabilityDefinition {
        CapabilityDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// A provider groups capabilities behind a readiness gate.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    /// A stable identifier for this provider (e.g., "arithmetic").
    fn id(&self) -> &str;

    /// The currently advertised capabilities. May change between calls.
    fn capabilities(&self) -> Vec<Arc<dyn Capability>>;

    /// Drive the provider to a ready state and report the state reached.
    ///
    /// May be slow (a startup handshake) and may fail. A provider must
    /// report `Running` before any of its capabilities is invoked.
    async fn ensure_ready(&self) -> std::result::Result<ProviderState, CapabilityError>;
}

/// A registry of capability providers.
///
/// The agent loop uses this to:
/// 1. Get capability definitions to advertise to the model
/// 2. Enumerate providers when dispatching a tool call
///
/// The provider set is mutable at runtime; dispatch re-enumerates it every
/// time rather than caching lookups.
#[derive(Default)]
pub struct CapabilityRegistry {
    providers: RwLock<Vec<Arc<dyn CapabilityProvider>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self {
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Register a provider. Providers are enumerated in registration order;
    /// the first capability whose name matches a call wins.
    pub fn register(&self, provider: Arc<dyn CapabilityProvider>) {
        self.providers
            .write()
            .expect("capability registry lock poisoned")
            .push(provider);
    }

    /// Snapshot of the current provider set.
    pub fn providers(&self) -> Vec<Arc<dyn CapabilityProvider>> {
        self.providers
            .read()
            .expect("capability registry lock poisoned")
            .clone()
    }

    /// All currently advertised capability definitions, across providers.
    pub fn definitions(&self) -> Vec<CapabilityDefinition> {
        self.providers()
            .iter()
            .flat_map(|p| p.capabilities())
            .map(|c| c.to_definition())
            .collect()
    }
}
