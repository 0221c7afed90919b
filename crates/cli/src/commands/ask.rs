//! `labassist ask`: one question, one answer.

use labassist_agent::{Session, TurnOutcome};
use std::path::Path;

use super::render::{sources_line, spawn_renderer};

pub async fn run(
    config_path: Option<&Path>,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let assistant = super::build_assistant(&config)?;
    let mut session = Session::new();

    let (tx, renderer) = spawn_renderer();
    let outcome = assistant
        .process_turn_with_events(&mut session, question, Some(&tx))
        .await;
    drop(tx);
    let _ = renderer.await;

    match &outcome {
        TurnOutcome::Answered(_) => {
            if let Some(sources) = sources_line(&outcome) {
                println!("{sources}");
            }
            Ok(())
        }
        TurnOutcome::Failed { message } => Err(message.clone().into()),
        TurnOutcome::Skipped | TurnOutcome::Exit => Err("No question given".into()),
    }
}
