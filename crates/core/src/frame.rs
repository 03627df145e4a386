//! Stream frame domain type.
//!
//! A `StreamFrame` is one decoded server-sent event from the chat backend.
//! The decoder in `toolstream-client` turns raw byte chunks into these;
//! everything downstream (the agent loop, the CLI) only ever sees frames.

use serde::{Deserialize, Serialize};

/// One decoded event from the streaming chat endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// A fragment of generated text, in arrival order.
    Content { text: String },

    /// The completion sentinel — the stream ended normally.
    Done,

    /// The in-band error sentinel with its embedded message.
    Error { message: String },
}

impl StreamFrame {
    /// True for the two sentinel variants that terminate a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_not_terminal() {
        assert!(!StreamFrame::Content { text: "hi".into() }.is_terminal());
    }

    #[test]
    fn sentinels_are_terminal() {
        assert!(StreamFrame::Done.is_terminal());
        assert!(StreamFrame::Error { message: "boom".into() }.is_terminal());
    }

    #[test]
    fn frame_serialization() {
        let frame = StreamFrame::Content { text: "hello".into() };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""type":"content""#));
        assert!(json.contains(r#""text":"hello""#));
    }
}
