//! # Toolstream Core
//!
//! Domain types, traits, and error definitions for the Toolstream streaming
//! chat client. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem boundary is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping the HTTP transport for scripted test doubles
//! - Registering capability providers without touching the agent loop
//! - Clean dependency graph (all crates depend inward on core)

pub mod call;
pub mod capability;
pub mod error;
pub mod frame;
pub mod transport;

// Re-export key types at crate root for ergonomics
pub use call::{ExecutionResult, ToolCall};
pub use capability::{
    Capability, CapabilityDefinition, CapabilityProvider, CapabilityRegistry, ProviderState,
};
pub use error::{CapabilityError, Error, Result, TransportError};
pub use frame::StreamFrame;
pub use transport::{FrameReceiver, StreamRequest, Transport};
