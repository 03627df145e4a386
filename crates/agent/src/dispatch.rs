//! Capability dispatch — locating and invoking tools across providers.
//!
//! The dispatcher re-enumerates the registry's providers on every call, so
//! a provider set that changes at runtime is always seen fresh. Every call
//! is isolated: a failure becomes a failure result, never a propagated
//! fault, and never suppresses later calls in the same batch.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use toolstream_core::capability::{CapabilityRegistry, ProviderState};
use toolstream_core::error::CapabilityError;
use toolstream_core::{ExecutionResult, ToolCall};

/// Dispatches tool calls against a capability registry.
pub struct CapabilityDispatcher {
    registry: Arc<CapabilityRegistry>,
}

impl CapabilityDispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self { registry }
    }

    /// Execute one call. Always returns a result record; lookup misses,
    /// readiness failures, and invocation errors all become failures.
    pub async fn execute(&self, call: &ToolCall) -> ExecutionResult {
        debug!(tool = %call.name, "Executing tool call");

        for provider in self.registry.providers() {
            let Some(capability) = provider
                .capabilities()
                .into_iter()
                .find(|c| c.name() == call.name)
            else {
                continue;
            };

            // First match wins; provider enumeration order is the tie-break.
            debug!(tool = %call.name, provider = provider.id(), "Found capability");

            match provider.ensure_ready().await {
                Ok(ProviderState::Running) => {}
                Ok(state) => {
                    let err = CapabilityError::ProviderNotReady {
                        provider: provider.id().to_string(),
                        state: state.to_string(),
                    };
                    warn!(tool = %call.name, %err, "Provider not ready");
                    return ExecutionResult::failure(&call.name, err.to_string());
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Provider readiness check failed");
                    return ExecutionResult::failure(&call.name, e.to_string());
                }
            }

            // Invocations run to completion; cancellation is honored between
            // rounds, never mid-invocation.
            return match capability
                .invoke(call.arguments.clone(), CancellationToken::new())
                .await
            {
                Ok(value) => {
                    debug!(tool = %call.name, "Tool executed successfully");
                    ExecutionResult::ok(&call.name, value)
                }
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "Tool execution failed");
                    ExecutionResult::failure(&call.name, e.to_string())
                }
            };
        }

        let err = CapabilityError::NotFound(call.name.clone());
        warn!(tool = %call.name, "{err}");
        ExecutionResult::failure(&call.name, err.to_string())
    }

    /// Execute a batch strictly sequentially, results in call order.
    pub async fn execute_all(&self, calls: &[ToolCall]) -> Vec<ExecutionResult> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            results.push(self.execute(call).await);
        }
        results
    }
}
