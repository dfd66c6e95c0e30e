//! Graph storage backends.

pub mod memory;

use async_trait::async_trait;

use crate::graph::SectionGraph;
use crate::types::TraditionId;

/// Trait for graph storage backends.
///
/// A backend hands out whole sections and accepts whole sections back:
/// the engine mutates an owned working copy and commits it in one call,
/// so a backend that applies `commit_section` atomically gives every
/// mutation operation all-or-nothing semantics. Implementations must
/// guarantee deterministic ordering of results.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load a copy of a tradition's section graph.
    async fn load_section(&self, tradition: &TraditionId)
        -> Result<Option<SectionGraph>, Self::Error>;

    /// Replace a tradition's section graph with the given one, atomically.
    /// Inserts the section if the tradition is new.
    async fn commit_section(&self, graph: SectionGraph) -> Result<(), Self::Error>;

    /// List the stored traditions, in order.
    async fn traditions(&self) -> Result<Vec<TraditionId>, Self::Error>;
}

pub use memory::InMemoryGraphStore;
