//! Documents and the context bundle built from them.

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// A documentation file read from one of the configured roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Full path on disk; the document's identity
    pub path: PathBuf,

    /// File name, e.g. `network_map.md`
    pub name: String,

    /// Basename of the owning root, e.g. `infrastructure`
    pub category: String,

    /// `<category>/<path relative to root>`, used in source tags
    pub source: String,

    /// Raw text
    pub content: String,
}

impl Document {
    /// Whether the path string contains `needle` (used by priority rules).
    pub fn path_contains(&self, needle: &str) -> bool {
        self.path.to_string_lossy().contains(needle)
    }
}

/// The documents chosen for one query, in selection order.
///
/// Deduplicated by path; the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    documents: Vec<Document>,
}

impl ContextBundle {
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut seen = HashSet::new();
        let documents = documents
            .into_iter()
            .filter(|d| seen.insert(d.path.clone()))
            .collect();
        Self { documents }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Source labels of the bundled documents.
    pub fn sources(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.source.as_str()).collect()
    }

    /// Concatenate every document behind a delimiter naming its source.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for doc in &self.documents {
            out.push_str(&format!("\n--- SOURCE: {} ---\n", doc.source));
            out.push_str(&doc.content);
            out.push_str("\n--- END SOURCE ---\n");
        }
        out
    }
}
