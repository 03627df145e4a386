//! End-to-end tests for the Toolstream agent loop.
//!
//! These drive the full pipeline — session mapping, streaming, tool-call
//! extraction, capability dispatch, follow-up construction — against a
//! scripted transport and the real arithmetic provider.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use toolstream_agent::{AgentLoop, ProgressEvent, StopReason, TurnRequest};
use toolstream_client::ChatClient;
use toolstream_core::error::TransportError;
use toolstream_core::transport::{FrameReceiver, StreamRequest, Transport};
use toolstream_core::StreamFrame;

// ── Scripted transport ───────────────────────────────────────────────────

/// Replays scripted frame sequences in order, recording every request.
struct ScriptedTransport {
    scripts: Mutex<VecDeque<Vec<StreamFrame>>>,
    sessions_created: AtomicUsize,
    requests: Mutex<Vec<StreamRequest>>,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Vec<StreamFrame>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            sessions_created: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn messages(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn create_session(&self, _title: Option<String>) -> Result<String, TransportError> {
        let n = self.sessions_created.fetch_add(1, Ordering::SeqCst);
        Ok(format!("backend-{n}"))
    }

    async fn open_stream(
        &self,
        _session_id: &str,
        request: StreamRequest,
        _cancel: CancellationToken,
    ) -> Result<FrameReceiver, TransportError> {
        self.requests.lock().unwrap().push(request);

        let frames = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport exhausted");

        let (tx, rx) = tokio::sync::mpsc::channel(16);
        tokio::spawn(async move {
            for frame in frames {
                if tx.send(Ok(frame)).await.is_err() {
                    return;
                }
            }
        });
        Ok(rx)
    }

    async fn send_message(
        &self,
        _session_id: &str,
        _request: StreamRequest,
    ) -> Result<String, TransportError> {
        unimplemented!("not used in e2e tests")
    }
}

fn content(text: &str) -> StreamFrame {
    StreamFrame::Content { text: text.into() }
}

fn agent_for(transport: Arc<ScriptedTransport>) -> AgentLoop {
    let client = Arc::new(ChatClient::new(transport));
    let registry = Arc::new(toolstream_capabilities::default_registry());
    AgentLoop::new(client, registry)
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn multiply_tool_round_trip() {
    let product = 18.7_f64 * 0.015 * 42.3;
    let final_answer = format!("18.7 * 0.015 * 42.3 = {product}");

    let transport = Arc::new(ScriptedTransport::new(vec![
        vec![
            content("I need to multiply those numbers. "),
            content(r#"tool_code {"tool":"multiply","args":{"numbers":[18.7,0.015,42.3]}}"#),
            StreamFrame::Done,
        ],
        vec![content(&final_answer), StreamFrame::Done],
    ]));
    let agent = agent_for(transport.clone());
    let (tx, mut rx) = mpsc::channel(64);

    let outcome = agent
        .run(
            TurnRequest::new("conv-1", "What is 18.7 * 0.015 * 42.3?"),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reason, StopReason::Completed);
    assert_eq!(outcome.iterations, 1);
    assert_eq!(outcome.text, final_answer);

    // The follow-up message carries the stripped text, the results block,
    // and the answer instruction.
    let messages = transport.messages();
    assert_eq!(messages.len(), 2);
    let follow_up = &messages[1];
    assert!(follow_up.starts_with("I need to multiply those numbers."));
    assert!(!follow_up.contains("tool_code"));
    assert!(follow_up.contains("[Tool Results]"));
    assert!(follow_up.contains(&format!(
        r#"multiply({{"numbers":[18.7,0.015,42.3]}}) = {product}"#
    )));
    assert!(follow_up.ends_with(
        "Based on these results, provide a natural language answer to the user's question."
    ));

    // Progress: content fragments from both rounds, two status lines, done.
    let mut fragments = Vec::new();
    let mut statuses = Vec::new();
    let mut done = None;
    while let Some(event) = rx.recv().await {
        match event {
            ProgressEvent::Content { text } => fragments.push(text),
            ProgressEvent::Status { message } => statuses.push(message),
            ProgressEvent::Done { reason, iterations } => done = Some((reason, iterations)),
        }
    }
    assert!(fragments.concat().contains("I need to multiply"));
    assert!(fragments.concat().ends_with(&final_answer));
    assert_eq!(
        statuses,
        vec![
            "Executing 1 tool(s)...".to_string(),
            "Generating response with tool results...".to_string(),
        ]
    );
    assert_eq!(done, Some((StopReason::Completed, 1)));
}

#[tokio::test]
async fn mixed_batch_reports_both_results() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        vec![
            content(concat!(
                r#"tool_code {"tool":"add","args":{"numbers":[1,2,3]}} and "#,
                r#"tool_code {"tool":"imaginary","args":{}}"#,
            )),
            StreamFrame::Done,
        ],
        vec![content("Done."), StreamFrame::Done],
    ]));
    let agent = agent_for(transport.clone());
    let (tx, _rx) = mpsc::channel(64);

    let outcome = agent
        .run(
            TurnRequest::new("conv-1", "add and also do something imaginary"),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.reason, StopReason::Completed);

    let follow_up = &transport.messages()[1];
    let add_line = follow_up
        .lines()
        .find(|l| l.starts_with("add("))
        .expect("add result line present");
    let imaginary_line = follow_up
        .lines()
        .find(|l| l.starts_with("imaginary("))
        .expect("imaginary result line present");

    assert_eq!(add_line, r#"add({"numbers":[1,2,3]}) = 6"#);
    assert_eq!(
        imaginary_line,
        r#"imaginary({}) = ERROR: Tool "imaginary" not found"#
    );

    // The failing call must not reorder results: add comes first.
    let results_block = follow_up.split("[Tool Results]").nth(1).unwrap();
    assert!(results_block.find("add(").unwrap() < results_block.find("imaginary(").unwrap());
}

#[tokio::test]
async fn interactive_turns_share_one_backend_session() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        vec![content("First answer."), StreamFrame::Done],
        vec![content("Second answer."), StreamFrame::Done],
    ]));
    let agent = agent_for(transport.clone());

    let (tx, _rx) = mpsc::channel(16);
    agent
        .run(
            TurnRequest::new("conv-1", "first"),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let (tx, _rx) = mpsc::channel(16);
    agent
        .run(
            TurnRequest::new("conv-1", "second"),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(transport.sessions_created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn advertised_tools_ride_every_request() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        vec![
            content(r#"tool_code {"tool":"sqrt","args":{"number":9}}"#),
            StreamFrame::Done,
        ],
        vec![content("3"), StreamFrame::Done],
    ]));
    let agent = agent_for(transport.clone());
    let (tx, _rx) = mpsc::channel(16);

    agent
        .run(
            TurnRequest::new("conv-1", "sqrt of nine"),
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    let requests = transport.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    for request in requests.iter() {
        let names: Vec<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"multiply"));
        assert!(names.contains(&"sqrt"));
    }
}
