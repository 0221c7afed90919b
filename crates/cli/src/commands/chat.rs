//! `labassist chat`: the interactive loop.

use labassist_agent::{Input, Session, TurnOutcome, classify_input};
use std::io::Write;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::render::{sources_line, spawn_renderer};

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let assistant = super::build_assistant(&config)?;
    let documents = assistant.index().list_documents();

    println!();
    println!("🤖 Lab Assistant is ready! (Type 'exit' to quit)");
    println!("-----------------------------------------------");
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", assistant.model());
    println!("  Documents: {} loaded", documents.len());
    println!("  Tools:     {}", assistant.tools().names().join(", "));
    if documents.is_empty() {
        println!(
            "  ⚠️  No documents found under {}; answers will have no context.",
            config.documents.roots.join(", ")
        );
    }

    let mut session = Session::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("\n👉 You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = ctrl_c() => None,
        };
        // End of input or Ctrl+C
        let Some(line) = line else {
            println!();
            break;
        };

        match classify_input(&line) {
            Input::Skip => continue,
            Input::Exit => break,
            Input::Query(_) => {}
        }

        println!("🤖 Asking {}...", assistant.model());
        let (tx, renderer) = spawn_renderer();
        let turn = assistant.process_turn_with_events(&mut session, &line, Some(&tx));
        let outcome = until_interrupted(turn, ctrl_c()).await;
        drop(tx);
        let _ = renderer.await;

        let Some(outcome) = outcome else {
            println!("\n⛔ Interrupted.");
            break;
        };

        if let Some(sources) = sources_line(&outcome) {
            println!("{sources}");
        }
        if let TurnOutcome::Failed { .. } = outcome {
            println!("(Nothing was added to the conversation; try again.)");
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

/// Resolves on Ctrl+C. If the signal handler cannot be installed it never
/// resolves, so input and turns are not cut short.
async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

/// Run a turn unless `interrupt` fires first. An interrupted turn is dropped
/// before it records anything, and any running tool process is killed.
async fn until_interrupted<T>(
    turn: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Option<T> {
    tokio::select! {
        outcome = turn => Some(outcome),
        _ = interrupt => None,
    }
}
