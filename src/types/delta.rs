//! Result model for structural mutations.

use serde::{Deserialize, Serialize};

use super::edge::SequenceEdge;
use super::reading::Reading;

/// The entities created, modified and deleted by a mutation.
///
/// Returned by Duplicate and Split so the caller can update its view of
/// the graph without re-fetching the whole section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDelta {
    /// Readings created by the operation.
    pub created: Vec<Reading>,
    /// Pre-existing readings whose properties changed.
    pub modified: Vec<Reading>,
    /// Sequence edges deleted (including edges deleted and recreated
    /// elsewhere during rewiring).
    pub deleted_edges: Vec<SequenceEdge>,
}

impl GraphDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the operation changed nothing.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted_edges.is_empty()
    }
}
