//! Built-in capability providers for Toolstream.
//!
//! Capabilities give the model something to call back into: arithmetic
//! today, anything implementing `toolstream_core::CapabilityProvider`
//! tomorrow.

pub mod arithmetic;

use std::sync::Arc;
use toolstream_core::capability::CapabilityRegistry;

pub use arithmetic::{ArithmeticCapability, ArithmeticProvider};

/// Create a registry with all built-in providers registered.
pub fn default_registry() -> CapabilityRegistry {
    let registry = CapabilityRegistry::new();
    registry.register(Arc::new(ArithmeticProvider));
    registry
}
