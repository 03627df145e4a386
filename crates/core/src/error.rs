//! Error types for the Toolstream domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all Toolstream operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Transport errors ---
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    // --- Capability errors ---
    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    /// The backend pushed an in-band `[ERROR:...]` sentinel mid-stream.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Session creation failed: {0}")]
    SessionCreation(String),

    #[error("Invalid response body: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    #[error("Tool \"{0}\" not found")]
    NotFound(String),

    #[error("Provider '{provider}' failed to start: {state}")]
    ProviderNotReady { provider: String, state: String },

    #[error("Capability invocation failed: {name} — {reason}")]
    InvocationFailed { name: String, reason: String },

    #[error("Invalid capability arguments: {0}")]
    InvalidArguments(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_displays_correctly() {
        let err = Error::Transport(TransportError::ApiError {
            status_code: 404,
            message: "Session not found".into(),
        });
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Session not found"));
    }

    #[test]
    fn capability_error_displays_correctly() {
        let err = Error::Capability(CapabilityError::NotFound("multiply".into()));
        assert!(err.to_string().contains("multiply"));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn provider_not_ready_names_provider_and_state() {
        let err = CapabilityError::ProviderNotReady {
            provider: "arithmetic".into(),
            state: "stopped".into(),
        };
        let text = err.to_string();
        assert!(text.contains("arithmetic"));
        assert!(text.contains("stopped"));
    }
}
