//! In-memory graph store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::GraphStore;
use crate::graph::SectionGraph;
use crate::types::TraditionId;

/// Error type for in-memory store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InMemoryError {
    /// Tradition not found.
    #[error("tradition not found: {0}")]
    TraditionNotFound(TraditionId),
}

/// In-memory graph store.
///
/// Uses a BTreeMap for deterministic iteration order; commits swap whole
/// sections under a write lock, so readers never observe a half-applied
/// mutation.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    sections: RwLock<BTreeMap<TraditionId, SectionGraph>>,
}

impl InMemoryGraphStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a section, failing if the tradition is absent.
    pub async fn section(&self, tradition: &TraditionId) -> Result<SectionGraph, InMemoryError> {
        self.sections
            .read()
            .await
            .get(tradition)
            .cloned()
            .ok_or_else(|| InMemoryError::TraditionNotFound(tradition.clone()))
    }

    /// Number of stored sections.
    pub async fn num_sections(&self) -> usize {
        self.sections.read().await.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    type Error = InMemoryError;

    async fn load_section(
        &self,
        tradition: &TraditionId,
    ) -> Result<Option<SectionGraph>, Self::Error> {
        Ok(self.sections.read().await.get(tradition).cloned())
    }

    async fn commit_section(&self, graph: SectionGraph) -> Result<(), Self::Error> {
        self.sections
            .write()
            .await
            .insert(graph.tradition().clone(), graph);
        Ok(())
    }

    async fn traditions(&self) -> Result<Vec<TraditionId>, Self::Error> {
        Ok(self.sections.read().await.keys().cloned().collect())
    }
}
