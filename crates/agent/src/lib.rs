//! The tool-call loop — the heart of Toolstream.
//!
//! A turn follows a **Stream → Extract → Dispatch → Follow-up** cycle:
//!
//! 1. **Stream** the message to the chat backend, forwarding fragments live
//! 2. **Extract** embedded `tool_code {...}` invocations from the response
//! 3. **Dispatch** each call through the capability registry, sequentially
//! 4. **Follow up** with the stripped text plus a results block, and loop
//!
//! The loop continues until the model answers without tool calls, the
//! iteration cap is reached, the caller cancels, or the transport fails.

pub mod dispatch;
pub mod event;
pub mod extract;
pub mod loop_runner;

pub use dispatch::CapabilityDispatcher;
pub use event::{ProgressEvent, StopReason};
pub use extract::{extract_calls, has_any_call, strip_calls, CALL_MARKER};
pub use loop_runner::{AgentLoop, LoopOutcome, TurnRequest, DEFAULT_MAX_ITERATIONS};
