//! Tool call and execution result value objects.
//!
//! A `ToolCall` is one invocation the model embedded in its generated text.
//! An `ExecutionResult` is the uniform record the dispatcher produces for it,
//! success or failure alike.

use serde::{Deserialize, Serialize};

/// A tool invocation extracted from model-generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the capability to invoke.
    pub name: String,

    /// Arguments as a JSON value.
    pub arguments: serde_json::Value,

    /// The exact source substring (marker through closing brace).
    /// Removing this span from the source text must leave no trace
    /// of the invocation.
    pub raw_span: String,
}

/// The outcome of executing one tool call.
///
/// Exactly one of `value` / `error` is meaningful, selected by `success`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Which tool this result is for.
    pub tool_name: String,

    /// Whether the invocation succeeded.
    pub success: bool,

    /// The capability's raw structured response, uninterpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,

    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Build a success result carrying the capability's raw response.
    pub fn ok(tool_name: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            value: Some(value),
            error: None,
        }
    }

    /// Build a failure result carrying the reason.
    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            value: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_result_carries_value() {
        let result = ExecutionResult::ok("multiply", serde_json::json!({"answer": 6}));
        assert!(result.success);
        assert_eq!(result.value.unwrap()["answer"], 6);
        assert!(result.error.is_none());
    }

    #[test]
    fn failure_result_carries_error() {
        let result = ExecutionResult::failure("multiply", "divide by zero");
        assert!(!result.success);
        assert!(result.value.is_none());
        assert_eq!(result.error.as_deref(), Some("divide by zero"));
    }

    #[test]
    fn call_serialization_roundtrip() {
        let call = ToolCall {
            name: "multiply".into(),
            arguments: serde_json::json!({"numbers": [2, 3]}),
            raw_span: r#"tool_code {"tool":"multiply","args":{"numbers":[2,3]}}"#.into(),
        };
        let json = serde_json::to_string(&call).unwrap();
        let back: ToolCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "multiply");
        assert_eq!(back.raw_span, call.raw_span);
    }
}
