//! Reading and tradition identifiers, and the reading node type.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a reading node.
///
/// Wraps a UUID and implements `Ord` for deterministic ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReadingId(Uuid);

impl ReadingId {
    /// Create a ReadingId from a UUID.
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh random ReadingId.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a ReadingId from a UUID string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ReadingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ReadingId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Identifier of a tradition section: the container graph over which
/// operations run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TraditionId(String);

impl TraditionId {
    /// Create a TraditionId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TraditionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A node representing one token (or span) of text at a given rank.
///
/// Multiple readings may share a rank (parallel variants). Ordered by id
/// for deterministic serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Unique reading identifier.
    pub id: ReadingId,
    /// The token text.
    pub text: String,
    /// Position in the tradition's partial order.
    pub rank: i64,
    /// Marks the section's start boundary node.
    pub is_start: bool,
    /// Marks the section's end boundary node.
    pub is_end: bool,
    /// Marks a lacuna (physical gap) rather than a word.
    pub is_lacuna: bool,
    /// Suppress the space before this reading when rendering text.
    pub join_prior: bool,
    /// Suppress the space after this reading when rendering text.
    pub join_next: bool,
}

impl Reading {
    /// Create a plain reading with the given text and rank.
    pub fn new(id: ReadingId, text: impl Into<String>, rank: i64) -> Self {
        Self {
            id,
            text: text.into(),
            rank,
            is_start: false,
            is_end: false,
            is_lacuna: false,
            join_prior: false,
            join_next: false,
        }
    }

    /// Create the start boundary reading of a section (rank 0).
    pub fn start(id: ReadingId) -> Self {
        let mut r = Self::new(id, "#START#", 0);
        r.is_start = true;
        r
    }

    /// Create the end boundary reading of a section.
    pub fn end(id: ReadingId, rank: i64) -> Self {
        let mut r = Self::new(id, "#END#", rank);
        r.is_end = true;
        r
    }

    /// Mark this reading as a lacuna.
    pub fn with_lacuna(mut self) -> Self {
        self.is_lacuna = true;
        self
    }

    /// Set the layout join flags.
    pub fn with_joins(mut self, join_prior: bool, join_next: bool) -> Self {
        self.join_prior = join_prior;
        self.join_next = join_next;
        self
    }

    /// Whether this reading is a start or end boundary marker.
    pub fn is_boundary(&self) -> bool {
        self.is_start || self.is_end
    }

    /// Copy of this reading under a new identity. Used by Duplicate and
    /// Split, which then overwrite text and rank as needed.
    pub fn derived(&self, id: ReadingId) -> Self {
        Self { id, ..self.clone() }
    }
}

impl PartialEq for Reading {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reading {}

impl PartialOrd for Reading {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reading {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
