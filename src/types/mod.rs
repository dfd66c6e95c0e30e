//! Core types for the collation kernel.

pub mod delta;
pub mod edge;
pub mod reading;
pub mod witness;

pub use delta::GraphDelta;
pub use edge::{EdgeId, RelationClass, RelationEdge, RelationKind, SequenceEdge};
pub use reading::{Reading, ReadingId, TraditionId};
pub use witness::{LayerLabel, Sigil, WitnessBundle, WitnessSet};
