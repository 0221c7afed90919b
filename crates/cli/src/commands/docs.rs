//! `labassist docs`: what the assistant can read, and what a query picks.

use labassist_knowledge::{DocumentIndex, RelevanceSelector, Selection, SelectionMode};
use std::path::Path;

pub fn run(
    config_path: Option<&Path>,
    query: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let cwd = std::env::current_dir()?;
    let index = DocumentIndex::from_config(&config.documents, &cwd);
    let documents = index.list_documents();

    println!("📂 Document roots (*.{}):", index.extension());
    for root in index.roots() {
        let marker = if root.is_dir() { "✅" } else { "⚠️  missing" };
        println!("  {marker} {}", root.display());
    }
    println!();

    let selector = RelevanceSelector::from_config(&config.retrieval);

    let Some(query) = query else {
        println!("📄 {} document(s):", documents.len());
        for doc in &documents {
            println!("  - {} ({} bytes)", doc.source, doc.content.len());
        }
        println!("\n🎯 Priority rules:");
        for rule in selector.rules() {
            println!("  \"{}\" → {}", rule.keyword, rule.target);
        }
        return Ok(());
    };

    let selection = selector.select(query, &documents);
    print!("{}", describe_selection(query, &selection, selector.top_k()));
    Ok(())
}

fn describe_selection(query: &str, selection: &Selection, top_k: usize) -> String {
    let mut out = format!("🔎 Query: {query}\n");
    match &selection.mode {
        SelectionMode::Priority { keywords } => {
            out.push_str(&format!(
                "🎯 Sniper mode: matched {} (top_k ignored)\n",
                keywords.join(", ")
            ));
            for picked in &selection.documents {
                out.push_str(&format!("  - {}\n", picked.document.source));
            }
        }
        SelectionMode::Ranked if selection.is_empty() => {
            out.push_str("📉 Ranking: no document matched; the model gets no context\n");
        }
        SelectionMode::Ranked => {
            out.push_str(&format!("📊 Ranking: top {top_k} by score\n"));
            for picked in &selection.documents {
                out.push_str(&format!(
                    "  - {} (score {})\n",
                    picked.document.source, picked.score
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use labassist_knowledge::{Document, ScoredDocument};
    use std::path::PathBuf;

    fn scored(source: &str, score: usize) -> ScoredDocument {
        ScoredDocument {
            document: Document {
                path: PathBuf::from(format!("/lab/{source}")),
                name: source.rsplit('/').next().unwrap_or(source).to_string(),
                category: "infrastructure".into(),
                source: source.to_string(),
                content: String::new(),
            },
            score,
        }
    }

    #[test]
    fn describes_sniper_mode() {
        let selection = Selection {
            mode: SelectionMode::Priority {
                keywords: vec!["foster".into()],
            },
            documents: vec![scored("infrastructure/network_map.md", 0)],
        };
        let text = describe_selection("foster ip", &selection, 3);
        assert!(text.contains("Sniper mode: matched foster"));
        assert!(text.contains("infrastructure/network_map.md"));
    }

    #[test]
    fn describes_ranking_with_scores() {
        let selection = Selection {
            mode: SelectionMode::Ranked,
            documents: vec![scored("infrastructure/dns.md", 21), scored("planning/roadmap.md", 2)],
        };
        let text = describe_selection("pihole", &selection, 3);
        assert!(text.contains("top 3 by score"));
        assert!(text.contains("infrastructure/dns.md (score 21)"));
    }

    #[test]
    fn describes_empty_ranking() {
        let selection = Selection {
            mode: SelectionMode::Ranked,
            documents: vec![],
        };
        assert!(describe_selection("zzz", &selection, 3).contains("no document matched"));
    }
}
