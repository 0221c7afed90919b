//! Document knowledge for labassist.
//!
//! [`DocumentIndex`] finds the documentation files on disk,
//! [`RelevanceSelector`] decides which of them a query gets to see, and
//! [`ContextBundle`] renders the chosen set as source-tagged text.

pub mod document;
pub mod index;
pub mod selector;

pub use document::{ContextBundle, Document};
pub use index::DocumentIndex;
pub use selector::{PriorityRule, RelevanceSelector, ScoredDocument, Selection, SelectionMode};
