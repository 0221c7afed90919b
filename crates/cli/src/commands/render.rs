//! Terminal rendering of assistant events.

use labassist_agent::{AgentStreamEvent, TurnOutcome};
use std::io::Write;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

/// Start printing events for one turn. Drop the sender, then await the
/// handle, to make sure everything has been printed.
pub fn spawn_renderer() -> (UnboundedSender<AgentStreamEvent>, JoinHandle<()>) {
    let (tx, rx) = unbounded_channel();
    let handle = tokio::spawn(render(rx));
    (tx, handle)
}

async fn render(mut rx: UnboundedReceiver<AgentStreamEvent>) {
    let mut current_pass = 0;
    let mut stdout = std::io::stdout();

    while let Some(event) = rx.recv().await {
        match event {
            AgentStreamEvent::Chunk { pass, content } => {
                if pass != current_pass {
                    if current_pass == 0 {
                        println!("\nAnswer:");
                    } else {
                        println!("\n\nAnswer:");
                    }
                    current_pass = pass;
                }
                print!("{content}");
                let _ = stdout.flush();
            }
            AgentStreamEvent::ToolCall { name, argument } => {
                println!();
                if argument.is_empty() {
                    println!("🔧 Running {name}...");
                } else {
                    println!("🔧 Running {name} {argument}...");
                }
            }
            AgentStreamEvent::ToolResult { name, output, success } => {
                let icon = if success { "✅" } else { "❌" };
                let first_line = output.lines().next().unwrap_or_default();
                println!("   {icon} {name}: {first_line}");
            }
            AgentStreamEvent::Done { .. } => {
                println!();
                println!("{}", "-".repeat(40));
            }
            AgentStreamEvent::Error { message } => {
                eprintln!("❌ {message}");
            }
        }
    }
}

/// One-line summary of where an answer came from.
pub fn sources_line(outcome: &TurnOutcome) -> Option<String> {
    match outcome {
        TurnOutcome::Answered(report) if !report.sources.is_empty() => {
            let how = if report.priority { "pinned" } else { "ranked" };
            Some(format!("📚 Sources ({how}): {}", report.sources.join(", ")))
        }
        TurnOutcome::Answered(_) => Some("📚 No matching documentation".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labassist_agent::TurnReport;

    fn report(sources: &[&str], priority: bool) -> TurnOutcome {
        TurnOutcome::Answered(TurnReport {
            answer: "a".into(),
            sources: sources.iter().map(|s| s.to_string()).collect(),
            priority,
            tool_results: Vec::new(),
            passes: 1,
        })
    }

    #[test]
    fn sources_line_variants() {
        assert_eq!(
            sources_line(&report(&["infrastructure/network_map.md"], true)).unwrap(),
            "📚 Sources (pinned): infrastructure/network_map.md"
        );
        assert_eq!(
            sources_line(&report(&["a/x.md", "b/y.md"], false)).unwrap(),
            "📚 Sources (ranked): a/x.md, b/y.md"
        );
        assert!(sources_line(&report(&[], false)).unwrap().contains("No matching"));
        assert!(sources_line(&TurnOutcome::Skipped).is_none());
    }

    #[tokio::test]
    async fn renderer_finishes_when_sender_dropped() {
        let (tx, handle) = spawn_renderer();
        tx.send(AgentStreamEvent::Chunk { pass: 1, content: "hi".into() }).unwrap();
        drop(tx);
        handle.await.unwrap();
    }
}
