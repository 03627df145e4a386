//! Chat backend transport for Toolstream.
//!
//! - `FrameDecoder` — SSE payloads out of raw byte chunks
//! - `SessionMap` — external conversation ids to backend sessions
//! - `HttpTransport` — the `toolstream_core::Transport` implementation
//! - `ChatClient` — the facade the agent loop drives

pub mod chat;
pub mod decoder;
pub mod http;
pub mod session;

pub use chat::ChatClient;
pub use decoder::FrameDecoder;
pub use http::HttpTransport;
pub use session::SessionMap;
