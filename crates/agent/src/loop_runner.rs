//! The agent loop — streaming, tool execution, and follow-up rounds.
//!
//! One call to [`AgentLoop::run`] drives a full turn:
//!
//! 1. **Stream** the current message and forward content fragments as they
//!    arrive, accumulating the full response text
//! 2. **If the text embeds tool calls**: extract them, dispatch the batch,
//!    build a follow-up message carrying the results, loop back to step 1
//! 3. **If not** (or the iteration cap is hit): the accumulated text is the
//!    final answer
//!
//! The iteration cap is the sole guarantee against a model that keeps
//! re-issuing tool calls. Cancellation is cooperative: it aborts the active
//! stream, but a round's tool executions run to completion first.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use toolstream_client::ChatClient;
use toolstream_core::capability::CapabilityRegistry;
use toolstream_core::error::TransportError;
use toolstream_core::{Error, ExecutionResult, StreamFrame, StreamRequest, ToolCall};

use crate::dispatch::CapabilityDispatcher;
use crate::event::{ProgressEvent, StopReason};
use crate::extract;

/// Default bound on tool-execution rounds per turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// One top-level chat turn.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    /// Caller-facing conversation id (mapped to a backend session lazily).
    pub external_id: String,

    /// The user's message.
    pub message: String,

    /// Optional image reference forwarded to the backend.
    pub image_path: Option<String>,

    /// Optional workspace reference forwarded to the backend.
    pub workspace_path: Option<String>,
}

impl TurnRequest {
    pub fn new(external_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            message: message.into(),
            image_path: None,
            workspace_path: None,
        }
    }
}

/// The terminal record of one turn.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The accumulated text of the last round.
    pub text: String,

    /// How many tool-execution rounds ran.
    pub iterations: u32,

    /// Why the loop stopped. Transport failures are the `Err` branch of
    /// [`AgentLoop::run`] instead.
    pub reason: StopReason,
}

/// The agent loop orchestrator.
pub struct AgentLoop {
    client: Arc<ChatClient>,
    registry: Arc<CapabilityRegistry>,
    dispatcher: CapabilityDispatcher,
    max_iterations: u32,
    domain: String,
    mode: String,
}

impl AgentLoop {
    pub fn new(client: Arc<ChatClient>, registry: Arc<CapabilityRegistry>) -> Self {
        let dispatcher = CapabilityDispatcher::new(registry.clone());
        Self {
            client,
            registry,
            dispatcher,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            domain: "general".into(),
            mode: "consult".into(),
        }
    }

    /// Set the maximum number of tool-execution rounds.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the domain tag sent with every request.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the mode tag sent with every request.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Run one turn to a terminal state.
    ///
    /// Content fragments and status lines are pushed to `progress` as the
    /// turn advances; a `Done` event closes the sequence on every Ok path.
    /// Transport failures (including in-band error sentinels) are returned
    /// as `Err` with the reason.
    pub async fn run(
        &self,
        turn: TurnRequest,
        progress: mpsc::Sender<ProgressEvent>,
        cancel: CancellationToken,
    ) -> Result<LoopOutcome, Error> {
        info!(
            external_id = %turn.external_id,
            max_iterations = self.max_iterations,
            "Starting agent turn"
        );

        let tools = self.registry.definitions();
        let mut current_message = turn.message.clone();
        let mut iterations: u32 = 0;

        loop {
            let request = StreamRequest {
                message: current_message.clone(),
                domain: self.domain.clone(),
                mode: self.mode.clone(),
                image_path: turn.image_path.clone(),
                workspace_path: turn.workspace_path.clone(),
                tools: tools.clone(),
            };

            // ── Streaming ──
            let mut rx = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(self.finish(StopReason::Cancelled, String::new(), iterations, &progress).await);
                }
                opened = self.client.stream_chat(&turn.external_id, request, cancel.clone()) => opened?,
            };

            let mut accumulated = String::new();
            loop {
                // Biased so a cancellation racing a closing stream is
                // always observed as a cancellation.
                let frame = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Cancellation observed mid-stream");
                        return Ok(self
                            .finish(StopReason::Cancelled, accumulated, iterations, &progress)
                            .await);
                    }
                    frame = rx.recv() => frame,
                };

                match frame {
                    // Stream ended (with or without a completion sentinel).
                    None => break,
                    Some(Ok(StreamFrame::Done)) => break,
                    Some(Ok(StreamFrame::Content { text })) => {
                        accumulated.push_str(&text);
                        let _ = progress.send(ProgressEvent::Content { text }).await;
                    }
                    Some(Ok(StreamFrame::Error { message })) => {
                        return Err(TransportError::Upstream(message).into());
                    }
                    Some(Err(e)) => return Err(e.into()),
                }
            }

            // ── Completion checks ──
            if !extract::has_any_call(&accumulated) {
                info!(iterations, "No tool calls — final answer");
                return Ok(self
                    .finish(StopReason::Completed, accumulated, iterations, &progress)
                    .await);
            }

            if iterations >= self.max_iterations {
                warn!(
                    max_iterations = self.max_iterations,
                    "Max iterations reached, stopping tool execution loop"
                );
                return Ok(self
                    .finish(StopReason::IterationCapReached, accumulated, iterations, &progress)
                    .await);
            }

            // ── Executing ──
            let calls = extract::extract_calls(&accumulated);
            if calls.is_empty() {
                // The probe matched but nothing parsed; nothing to execute.
                return Ok(self
                    .finish(StopReason::Completed, accumulated, iterations, &progress)
                    .await);
            }

            iterations += 1;
            info!(
                iteration = iterations,
                count = calls.len(),
                "Tool calls detected"
            );

            let _ = progress
                .send(ProgressEvent::Status {
                    message: format!("Executing {} tool(s)...", calls.len()),
                })
                .await;

            let results = self.dispatcher.execute_all(&calls).await;

            let _ = progress
                .send(ProgressEvent::Status {
                    message: "Generating response with tool results...".into(),
                })
                .await;

            current_message = format!(
                "{}\n\n[Tool Results]\n{}\n\nBased on these results, provide a natural language answer to the user's question.",
                extract::strip_calls(&accumulated),
                format_results(&calls, &results),
            );
        }
    }

    async fn finish(
        &self,
        reason: StopReason,
        text: String,
        iterations: u32,
        progress: &mpsc::Sender<ProgressEvent>,
    ) -> LoopOutcome {
        let _ = progress
            .send(ProgressEvent::Done { reason, iterations })
            .await;
        LoopOutcome {
            text,
            iterations,
            reason,
        }
    }
}

/// Format a batch's results for the follow-up message, one line per call.
fn format_results(calls: &[ToolCall], results: &[ExecutionResult]) -> String {
    calls
        .iter()
        .zip(results)
        .map(|(call, result)| {
            let args = call.arguments.to_string();
            if result.success {
                format!("{}({args}) = {}", call.name, render_value(result.value.as_ref()))
            } else {
                format!(
                    "{}({args}) = ERROR: {}",
                    call.name,
                    result.error.as_deref().unwrap_or("unknown error")
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract the textual payload from a capability response: text content
/// items concatenated, other items (and responses with no content array)
/// rendered as raw JSON.
fn render_value(value: Option<&serde_json::Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    if let Some(content) = value.get("content").and_then(|c| c.as_array()) {
        return content
            .iter()
            .map(|item| match item.get("type").and_then(|t| t.as_str()) {
                Some("text") => item
                    .get("text")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string(),
                _ => item.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    value.to_string()
}
