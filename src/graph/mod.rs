//! The section graph: an arena of readings and edges addressed by stable
//! identifiers.
//!
//! All structural state lives in `BTreeMap`s so that iteration order, and
//! therefore every derived report, is deterministic. Mutation operations
//! work on an owned copy of a `SectionGraph` and commit it back to the
//! store as a whole, which is what makes them atomic.

pub mod invariants;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{
    EdgeId, Reading, ReadingId, RelationEdge, RelationKind, SequenceEdge, TraditionId,
    WitnessBundle,
};

/// Direction of sequence-edge incidence relative to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges arriving at the reading.
    Incoming,
    /// Edges leaving the reading.
    Outgoing,
}

/// One tradition section: readings plus both edge kinds.
///
/// Every section carries a designated start and end boundary reading;
/// witness paths run from start to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionGraph {
    tradition: TraditionId,
    start: ReadingId,
    end: ReadingId,
    readings: BTreeMap<ReadingId, Reading>,
    sequence: BTreeMap<EdgeId, SequenceEdge>,
    relations: BTreeMap<EdgeId, RelationEdge>,
    next_edge_id: u64,
}

impl SectionGraph {
    /// Create a section with fresh start and end boundary readings. The
    /// end rank should exceed the rank of every reading the section will
    /// hold.
    pub fn new(tradition: TraditionId, end_rank: i64) -> Self {
        let start = Reading::start(ReadingId::generate());
        let end = Reading::end(ReadingId::generate(), end_rank);
        let (start_id, end_id) = (start.id, end.id);
        let mut readings = BTreeMap::new();
        readings.insert(start_id, start);
        readings.insert(end_id, end);
        Self {
            tradition,
            start: start_id,
            end: end_id,
            readings,
            sequence: BTreeMap::new(),
            relations: BTreeMap::new(),
            next_edge_id: 0,
        }
    }

    /// The tradition this section belongs to.
    pub fn tradition(&self) -> &TraditionId {
        &self.tradition
    }

    /// Id of the start boundary reading.
    pub fn start(&self) -> ReadingId {
        self.start
    }

    /// Id of the end boundary reading.
    pub fn end(&self) -> ReadingId {
        self.end
    }

    // ── Readings ────────────────────────────────────────────────────────

    /// Insert a reading.
    pub fn add_reading(&mut self, reading: Reading) {
        self.readings.insert(reading.id, reading);
    }

    /// Fetch a reading.
    pub fn reading(&self, id: ReadingId) -> Option<&Reading> {
        self.readings.get(&id)
    }

    /// Fetch a reading mutably.
    pub fn reading_mut(&mut self, id: ReadingId) -> Option<&mut Reading> {
        self.readings.get_mut(&id)
    }

    /// Remove a reading. The caller is responsible for detaching its
    /// edges first; dangling endpoints are caught by invariant
    /// verification before commit.
    pub fn remove_reading(&mut self, id: ReadingId) -> Option<Reading> {
        self.readings.remove(&id)
    }

    /// Whether the reading exists.
    pub fn contains_reading(&self, id: ReadingId) -> bool {
        self.readings.contains_key(&id)
    }

    /// Iterate all readings in id order.
    pub fn readings(&self) -> impl Iterator<Item = &Reading> {
        self.readings.values()
    }

    /// Number of readings, boundaries included.
    pub fn num_readings(&self) -> usize {
        self.readings.len()
    }

    // ── Sequence edges ──────────────────────────────────────────────────

    /// Connect two readings with a sequence edge carrying the given
    /// witnesses.
    ///
    /// If an edge with the same ordered endpoints already exists the
    /// bundles are unioned into it instead, maintaining the no-parallel-
    /// edges invariant.
    pub fn connect(
        &mut self,
        source: ReadingId,
        target: ReadingId,
        witnesses: WitnessBundle,
    ) -> EdgeId {
        if let Some(existing) = self
            .sequence
            .values_mut()
            .find(|e| e.source == source && e.target == target)
        {
            existing.witnesses.merge(&witnesses);
            return existing.id;
        }
        let id = self.alloc_edge_id();
        self.sequence
            .insert(id, SequenceEdge::new(id, source, target, witnesses));
        id
    }

    /// Fetch a sequence edge.
    pub fn sequence_edge(&self, id: EdgeId) -> Option<&SequenceEdge> {
        self.sequence.get(&id)
    }

    /// Fetch a sequence edge mutably.
    pub fn sequence_edge_mut(&mut self, id: EdgeId) -> Option<&mut SequenceEdge> {
        self.sequence.get_mut(&id)
    }

    /// Remove a sequence edge, returning it.
    pub fn remove_sequence_edge(&mut self, id: EdgeId) -> Option<SequenceEdge> {
        self.sequence.remove(&id)
    }

    /// The sequence edge between two readings, if any.
    pub fn sequence_between(&self, source: ReadingId, target: ReadingId) -> Option<&SequenceEdge> {
        self.sequence
            .values()
            .find(|e| e.source == source && e.target == target)
    }

    /// Iterate all sequence edges in id order.
    pub fn sequence_edges(&self) -> impl Iterator<Item = &SequenceEdge> {
        self.sequence.values()
    }

    /// Number of sequence edges.
    pub fn num_sequence_edges(&self) -> usize {
        self.sequence.len()
    }

    /// Sequence edges incident to a reading in the given direction.
    pub fn incident(
        &self,
        reading: ReadingId,
        direction: Direction,
    ) -> impl Iterator<Item = &SequenceEdge> {
        self.sequence.values().filter(move |e| match direction {
            Direction::Incoming => e.target == reading,
            Direction::Outgoing => e.source == reading,
        })
    }

    /// Outgoing sequence edges of a reading.
    pub fn outgoing(&self, reading: ReadingId) -> impl Iterator<Item = &SequenceEdge> {
        self.incident(reading, Direction::Outgoing)
    }

    /// Incoming sequence edges of a reading.
    pub fn incoming(&self, reading: ReadingId) -> impl Iterator<Item = &SequenceEdge> {
        self.incident(reading, Direction::Incoming)
    }

    // ── Relation edges ──────────────────────────────────────────────────

    /// Relate two readings. Returns the existing edge's id if the pair is
    /// already related with the same kind.
    pub fn relate(&mut self, a: ReadingId, b: ReadingId, kind: RelationKind) -> EdgeId {
        if let Some(existing) = self
            .relations
            .values()
            .find(|r| r.connects(a, b) && r.kind == kind)
        {
            return existing.id;
        }
        let id = self.alloc_edge_id();
        self.relations.insert(id, RelationEdge::new(id, a, b, kind));
        id
    }

    /// Remove a relation edge, returning it.
    pub fn remove_relation(&mut self, id: EdgeId) -> Option<RelationEdge> {
        self.relations.remove(&id)
    }

    /// Relation edges touching a reading.
    pub fn relations_of(&self, reading: ReadingId) -> impl Iterator<Item = &RelationEdge> {
        self.relations.values().filter(move |r| r.touches(reading))
    }

    /// Relation edges connecting two readings, in either order.
    pub fn relations_between(&self, a: ReadingId, b: ReadingId) -> Vec<&RelationEdge> {
        self.relations
            .values()
            .filter(|r| r.connects(a, b))
            .collect()
    }

    /// Iterate all relation edges in id order.
    pub fn relations(&self) -> impl Iterator<Item = &RelationEdge> {
        self.relations.values()
    }

    fn alloc_edge_id(&mut self) -> EdgeId {
        let id = EdgeId::new(self.next_edge_id);
        self.next_edge_id += 1;
        id
    }
}
