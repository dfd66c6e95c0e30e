//! Edge types of the variant graph: sequence edges and relationship edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::reading::ReadingId;
use super::witness::WitnessBundle;

/// Arena-issued opaque edge identifier, stable within a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Create an EdgeId from its raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Directed edge from a lower-rank reading to a higher-rank reading,
/// carrying the witnesses that pass through it.
///
/// Implements `Ord` for deterministic ordering: (source, target, id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEdge {
    /// Edge identifier.
    pub id: EdgeId,
    /// Source reading (lower rank).
    pub source: ReadingId,
    /// Target reading (higher rank).
    pub target: ReadingId,
    /// Witnesses traversing this edge, across text layers.
    pub witnesses: WitnessBundle,
}

impl SequenceEdge {
    /// Create a sequence edge.
    pub fn new(id: EdgeId, source: ReadingId, target: ReadingId, witnesses: WitnessBundle) -> Self {
        Self {
            id,
            source,
            target,
            witnesses,
        }
    }

    /// Given one endpoint, return the other.
    pub fn other(&self, reading: ReadingId) -> Option<ReadingId> {
        if self.source == reading {
            Some(self.target)
        } else if self.target == reading {
            Some(self.source)
        } else {
            None
        }
    }

    /// Whether this edge touches the given reading.
    pub fn touches(&self, reading: ReadingId) -> bool {
        self.source == reading || self.target == reading
    }
}

impl PartialOrd for SequenceEdge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SequenceEdge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.source
            .cmp(&other.source)
            .then_with(|| self.target.cmp(&other.target))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Class of a relationship edge.
///
/// Weak (class 1) relationships permit merging their endpoints; strong
/// (class 2) relationships forbid it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationClass {
    /// Class 1: spelling, orthographic and similar variants.
    Weak,
    /// Class 2: transposition or repetition. Merge-blocking.
    Strong,
}

/// Editorial judgement connecting two readings of equivalent or related
/// content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Orthographic variant.
    Orthographic,
    /// Spelling variant.
    Spelling,
    /// Grammatical variant.
    Grammatical,
    /// Lexical variant.
    Lexical,
    /// Unclassified weak relation.
    Other,
    /// The same reading appearing at a different point in the text.
    Transposition,
    /// A scribal repetition.
    Repetition,
}

impl RelationKind {
    /// Parse a relation kind from its label.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "orthographic" => Some(Self::Orthographic),
            "spelling" => Some(Self::Spelling),
            "grammatical" => Some(Self::Grammatical),
            "lexical" => Some(Self::Lexical),
            "other" | "" => Some(Self::Other),
            "transposition" => Some(Self::Transposition),
            "repetition" => Some(Self::Repetition),
            _ => None,
        }
    }

    /// The merge class of this kind.
    pub fn class(&self) -> RelationClass {
        match self {
            Self::Transposition | Self::Repetition => RelationClass::Strong,
            _ => RelationClass::Weak,
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Orthographic => write!(f, "orthographic"),
            Self::Spelling => write!(f, "spelling"),
            Self::Grammatical => write!(f, "grammatical"),
            Self::Lexical => write!(f, "lexical"),
            Self::Other => write!(f, "other"),
            Self::Transposition => write!(f, "transposition"),
            Self::Repetition => write!(f, "repetition"),
        }
    }
}

/// Undirected edge marking two readings as variants of each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    /// Edge identifier.
    pub id: EdgeId,
    /// One endpoint.
    pub a: ReadingId,
    /// The other endpoint.
    pub b: ReadingId,
    /// Kind of relation, determining its merge class.
    pub kind: RelationKind,
}

impl RelationEdge {
    /// Create a relation edge.
    pub fn new(id: EdgeId, a: ReadingId, b: ReadingId, kind: RelationKind) -> Self {
        Self { id, a, b, kind }
    }

    /// Whether this edge connects the two given readings, in either order.
    pub fn connects(&self, x: ReadingId, y: ReadingId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Whether this edge touches the given reading.
    pub fn touches(&self, reading: ReadingId) -> bool {
        self.a == reading || self.b == reading
    }

    /// Given one endpoint, return the other.
    pub fn other(&self, reading: ReadingId) -> Option<ReadingId> {
        if self.a == reading {
            Some(self.b)
        } else if self.b == reading {
            Some(self.a)
        } else {
            None
        }
    }
}
