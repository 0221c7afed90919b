//! Relevance selector: decides which documents a query gets to see.
//!
//! Two stages:
//!
//! 1. **Priority rules ("sniper mode")**: every rule whose keyword appears in
//!    the query (case-insensitive substring) forces the documents whose path
//!    contains the rule's target. If anything is forced, that set is the
//!    answer and ranking never runs, regardless of `top_k`.
//! 2. **Keyword-overlap ranking**: otherwise each document scores
//!    `10 × phrase hits + Σ keyword hits` and the best `top_k` with a
//!    non-zero score are returned.
//!
//! The phrase term compares the query and document with case, spaces and
//! hyphens removed, so "Pi-Hole" matches "pihole".

use regex_lite::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, info};

use crate::document::{ContextBundle, Document};

/// Weight of one exact-phrase hit relative to one keyword hit.
const PHRASE_WEIGHT: usize = 10;

/// Query tokenizer. regex-lite's `\w` is ASCII-only, so query tokens are
/// ASCII words: non-ASCII letters split a word or drop out of it.
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

/// Keyword → document-path override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityRule {
    /// Matched as a case-insensitive substring of the query
    pub keyword: String,
    /// Matched as a substring of each document's path
    pub target: String,
}

impl PriorityRule {
    pub fn new(keyword: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            target: target.into(),
        }
    }

    fn fires_for(&self, query_lower: &str) -> bool {
        query_lower.contains(&self.keyword.to_lowercase())
    }
}

/// How a selection was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SelectionMode {
    /// Priority rules fired; these keywords matched.
    Priority { keywords: Vec<String> },
    /// Keyword-overlap ranking.
    Ranked,
}

/// A selected document and its ranking score (0 for priority picks).
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: usize,
}

/// The outcome of selecting documents for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub mode: SelectionMode,
    pub documents: Vec<ScoredDocument>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The selected documents as a bundle, in selection order.
    pub fn into_bundle(self) -> ContextBundle {
        ContextBundle::new(self.documents.into_iter().map(|s| s.document))
    }
}

/// Selects context documents for a query.
#[derive(Debug, Clone)]
pub struct RelevanceSelector {
    rules: Vec<PriorityRule>,
    stop_words: HashSet<String>,
    top_k: usize,
}

impl RelevanceSelector {
    pub fn new(
        rules: Vec<PriorityRule>,
        stop_words: impl IntoIterator<Item = String>,
        top_k: usize,
    ) -> Self {
        Self {
            rules,
            stop_words: stop_words.into_iter().map(|w| w.to_lowercase()).collect(),
            top_k,
        }
    }

    pub fn from_config(config: &labassist_config::RetrievalConfig) -> Self {
        let rules = config
            .priority_rules
            .iter()
            .map(|r| PriorityRule::new(&r.keyword, &r.target))
            .collect();
        Self::new(rules, config.stop_words.iter().cloned(), config.top_k)
    }

    pub fn rules(&self) -> &[PriorityRule] {
        &self.rules
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Select documents for `query` from `documents` (in enumeration order).
    pub fn select(&self, query: &str, documents: &[Document]) -> Selection {
        if let Some(selection) = self.select_by_priority(query, documents) {
            return selection;
        }
        self.select_by_ranking(query, documents)
    }

    /// Stage 1. Returns `None` when no rule forces any document.
    fn select_by_priority(&self, query: &str, documents: &[Document]) -> Option<Selection> {
        let query_lower = query.to_lowercase();
        let mut keywords = Vec::new();
        let mut seen = HashSet::new();
        let mut forced = Vec::new();

        for rule in self.rules.iter().filter(|r| r.fires_for(&query_lower)) {
            keywords.push(rule.keyword.clone());
            for doc in documents.iter().filter(|d| d.path_contains(&rule.target)) {
                if seen.insert(doc.path.clone()) {
                    forced.push(ScoredDocument {
                        document: doc.clone(),
                        score: 0,
                    });
                }
            }
        }

        if forced.is_empty() {
            if !keywords.is_empty() {
                debug!(?keywords, "Priority keywords matched but no target document exists");
            }
            return None;
        }

        info!(
            ?keywords,
            documents = forced.len(),
            "Priority rules fired, skipping ranking"
        );
        Some(Selection {
            mode: SelectionMode::Priority { keywords },
            documents: forced,
        })
    }

    /// Stage 2. Documents with score 0 are dropped; ties keep input order.
    fn select_by_ranking(&self, query: &str, documents: &[Document]) -> Selection {
        let phrase = normalize(query);
        let words = self.query_words(query);

        let mut scored: Vec<ScoredDocument> = documents
            .iter()
            .map(|doc| ScoredDocument {
                score: score_document(&phrase, &words, &doc.content),
                document: doc.clone(),
            })
            .filter(|s| s.score > 0)
            .collect();

        // `sort_by` is stable, so equal scores stay in enumeration order.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.top_k);

        for s in &scored {
            debug!(source = %s.document.source, score = s.score, "Ranked document");
        }

        Selection {
            mode: SelectionMode::Ranked,
            documents: scored,
        }
    }

    /// Lower-cased word tokens of the query minus stop words, deduplicated,
    /// in first-seen order.
    pub fn query_words(&self, query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        let mut seen = HashSet::new();
        WORD_RE
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .filter(|w| !self.stop_words.contains(w))
            .filter(|w| seen.insert(w.clone()))
            .collect()
    }
}

/// Lower-case and strip spaces and hyphens.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

/// `10 × occurrences(phrase) + Σ occurrences(word)` over one document.
pub fn score_document(phrase: &str, words: &[String], content: &str) -> usize {
    let phrase_hits = if phrase.is_empty() {
        0
    } else {
        normalize(content).matches(phrase).count()
    };

    let lower = content.to_lowercase();
    let word_hits: usize = words.iter().map(|w| lower.matches(w.as_str()).count()).sum();

    PHRASE_WEIGHT * phrase_hits + word_hits
}
