//! `toolstream chat` — Interactive or single-message chat mode.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use toolstream_agent::{AgentLoop, ProgressEvent, StopReason, TurnRequest};
use toolstream_client::{ChatClient, HttpTransport};
use toolstream_config::AppConfig;

pub async fn run(
    message: Option<String>,
    domain: Option<String>,
    mode: Option<String>,
    image: Option<String>,
) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let transport = HttpTransport::with_timeout(
        &config.server_url,
        std::time::Duration::from_secs(config.request_timeout_secs),
    )?;
    let client = Arc::new(
        ChatClient::new(Arc::new(transport)).with_session_title(&config.session_title),
    );
    let registry = Arc::new(toolstream_capabilities::default_registry());

    let agent = AgentLoop::new(client, registry.clone())
        .with_max_iterations(config.max_iterations)
        .with_domain(domain.unwrap_or(config.domain))
        .with_mode(mode.unwrap_or(config.mode));

    // One external conversation id per invocation; every turn in an
    // interactive session shares the same backend session.
    let external_id = uuid::Uuid::new_v4().to_string();

    // Ctrl+C cancels the in-flight turn.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        });
    }

    if let Some(msg) = message {
        // Single message mode
        let mut turn = TurnRequest::new(&external_id, &msg);
        turn.image_path = image;
        run_turn(&agent, turn, cancel).await?;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Toolstream — Interactive Chat");
    println!();
    println!("  Server:       {}", config.server_url);
    println!(
        "  Capabilities: {}",
        registry
            .definitions()
            .iter()
            .map(|d| d.name.clone())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }
        if line == "exit" {
            break;
        }

        println!();
        let mut turn = TurnRequest::new(&external_id, &line);
        turn.image_path = image.clone();
        match run_turn(&agent, turn, cancel.clone()).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("  [Error] {e}"),
        }
        println!();

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

/// Drive one turn, printing progress as it streams. Returns true when the
/// turn was cancelled.
async fn run_turn(
    agent: &AgentLoop,
    turn: TurnRequest,
    cancel: CancellationToken,
) -> anyhow::Result<bool> {
    let (tx, mut rx) = mpsc::channel(64);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Content { text } => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                ProgressEvent::Status { message } => {
                    eprintln!();
                    eprintln!("  [{message}]");
                }
                ProgressEvent::Done { .. } => {
                    println!();
                }
            }
        }
    });

    let outcome = agent.run(turn, tx, cancel).await;
    let _ = printer.await;
    let outcome = outcome?;

    match outcome.reason {
        StopReason::IterationCapReached => {
            eprintln!(
                "  [Stopped after {} tool round(s); showing the last response]",
                outcome.iterations
            );
            Ok(false)
        }
        StopReason::Cancelled => {
            eprintln!("  [Cancelled]");
            Ok(true)
        }
        StopReason::Completed => Ok(false),
    }
}
