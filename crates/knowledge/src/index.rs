//! Document index: enumerates documentation files under the configured roots.
//!
//! Documents are re-read on every call; nothing is cached between turns.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::document::Document;

/// Recursively lists documents with a given extension under a set of roots.
#[derive(Debug, Clone)]
pub struct DocumentIndex {
    roots: Vec<PathBuf>,
    extension: String,
}

impl DocumentIndex {
    /// `extension` is given without the leading dot (`"md"`).
    pub fn new(roots: Vec<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            roots,
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Build from config, resolving relative roots against `base`.
    pub fn from_config(config: &labassist_config::DocumentsConfig, base: &Path) -> Self {
        Self::new(config.resolved_roots(base), config.extension.clone())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Read every matching document.
    ///
    /// Roots are visited in configured order, files in sorted walk order.
    /// Missing roots and unreadable files are skipped; an empty result means
    /// "no context available", not an error.
    pub fn list_documents(&self) -> Vec<Document> {
        let mut documents = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                debug!(root = %root.display(), "Document root missing, skipping");
                continue;
            }

            let category = root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| root.display().to_string());

            let before = documents.len();
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(root = %root.display(), error = %e, "Failed to walk directory entry");
                        continue;
                    }
                };

                if !entry.file_type().is_file() || !self.matches_extension(entry.path()) {
                    continue;
                }

                match read_document(root, &category, entry.path()) {
                    Ok(doc) => {
                        debug!(source = %doc.source, "Found document");
                        documents.push(doc);
                    }
                    Err(e) => {
                        warn!(
                            path = %entry.path().display(),
                            error = %e,
                            "Failed to read document"
                        );
                    }
                }
            }

            debug!(
                root = %root.display(),
                count = documents.len() - before,
                "Scanned document root"
            );
        }

        info!(count = documents.len(), "Loaded documents");
        documents
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.file_name()
            .map(|n| n.to_string_lossy().ends_with(&format!(".{}", self.extension)))
            .unwrap_or(false)
    }
}

fn read_document(root: &Path, category: &str, path: &Path) -> std::io::Result<Document> {
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let relative = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    Ok(Document {
        path: path.to_path_buf(),
        name,
        category: category.to_string(),
        source: format!("{category}/{relative}"),
        content,
    })
}
