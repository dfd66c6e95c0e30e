//! # collation-kernel
//!
//! Graph-based collation editing for textual traditions.
//!
//! The collation kernel answers one question:
//!
//! > Given a variant graph of witness readings, how can an editor
//! > **reshape it without breaking any witness's text**?
//!
//! ## Core Contract
//!
//! 1. A tradition section is a DAG of readings ranked from a start
//!    boundary to an end boundary; each sequence edge carries the
//!    witnesses that traverse it
//! 2. The structural operations come in inverse pairs: Duplicate/Merge
//!    split and rejoin variant readings across witnesses, Split/Compress
//!    divide and rejoin multi-word readings along the text
//! 3. Every mutation is atomic: preconditions and invariants are checked
//!    on an owned working copy, and only a fully valid graph is committed
//!
//! ## Architecture
//!
//! ```text
//! GraphEditor → preconditions → mutate copy → invariants::verify
//!                     ↓
//!               GraphStore (Memory)
//! ```
//!
//! ## Determinism Guarantees
//!
//! - All graph state lives in `BTreeMap`s; iteration order is canonical
//! - Reports order readings by (rank, id); witness walks visit candidate
//!   edges in edge-id order
//! - The same operation on the same graph always yields the same result

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod editor;
pub mod error;
pub mod graph;
pub mod store;
pub mod types;
pub mod walk;

// Re-exports
pub use editor::{GraphEditor, SplitOptions};
pub use error::EngineError;
pub use graph::{invariants, Direction, SectionGraph};
pub use store::{GraphStore, InMemoryGraphStore};
pub use types::{
    EdgeId, GraphDelta, LayerLabel, Reading, ReadingId, RelationClass, RelationEdge, RelationKind,
    SequenceEdge, Sigil, TraditionId, WitnessBundle, WitnessSet,
};
pub use walk::WitnessFilter;

/// Schema version for all collation kernel types.
/// Increment on breaking changes to any serialized type.
pub const COLLATION_SCHEMA_VERSION: &str = "1.0.0";
