//! The mutation engine.
//!
//! `GraphEditor` implements the four structural operations — Duplicate,
//! Merge, Split, Compress — plus the read-only reports, against a
//! [`GraphStore`] backend.
//!
//! Every mutation follows the same shape:
//!
//! 1. load an owned working copy of the section,
//! 2. run all precondition checks against it,
//! 3. apply the edit to the copy,
//! 4. verify the global invariants (rank monotonicity, referential
//!    integrity) over the result,
//! 5. commit the copy back in one store call.
//!
//! A failure at any step discards the copy, so the stored graph is never
//! left partially mutated. The caller is responsible for serializing
//! mutations per tradition; read-only operations may run concurrently
//! with each other.

use std::sync::Arc;

use tracing::{debug, info};

use crate::analysis;
use crate::error::EngineError;
use crate::graph::{invariants, Direction, SectionGraph};
use crate::store::GraphStore;
use crate::types::{
    GraphDelta, LayerLabel, Reading, ReadingId, RelationClass, SequenceEdge, Sigil, TraditionId,
    WitnessSet,
};
use crate::walk::{self, WitnessFilter};

/// How a multi-word reading is divided by Split.
#[derive(Debug, Clone, Default)]
pub struct SplitOptions {
    /// Separator between the words; `None` or empty splits on whitespace.
    pub separator: Option<String>,
    /// Split at a fixed character index into exactly two pieces, e.g.
    /// "unto" at index 2 gives "un" and "to". Takes precedence over the
    /// separator when set.
    pub split_index: Option<usize>,
}

/// The graph-mutation engine for variant graphs.
pub struct GraphEditor<S: GraphStore> {
    store: Arc<S>,
}

impl<S: GraphStore + 'static> GraphEditor<S> {
    /// Create an editor over the given store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load(&self, tradition: &TraditionId) -> Result<SectionGraph, EngineError> {
        self.store
            .load_section(tradition)
            .await
            .map_err(EngineError::from_store)?
            .ok_or_else(|| EngineError::TraditionNotFound(tradition.clone()))
    }

    async fn commit(&self, graph: SectionGraph) -> Result<(), EngineError> {
        invariants::verify(&graph).map_err(|v| EngineError::invalid(v.to_string()))?;
        self.store
            .commit_section(graph)
            .await
            .map_err(EngineError::from_store)
    }

    fn get_reading(graph: &SectionGraph, id: ReadingId) -> Result<Reading, EngineError> {
        graph
            .reading(id)
            .cloned()
            .ok_or(EngineError::ReadingNotFound(id))
    }

    fn reject_boundary(reading: &Reading) -> Result<(), EngineError> {
        if reading.is_boundary() {
            Err(EngineError::invalid(
                "start and end readings cannot be edited",
            ))
        } else {
            Ok(())
        }
    }

    /// Union of all witnesses on a reading's incident sequence edges,
    /// across directions and layers.
    fn all_witnesses_of(graph: &SectionGraph, id: ReadingId) -> WitnessSet {
        let mut all = WitnessSet::new();
        for edge in graph.incoming(id).chain(graph.outgoing(id)) {
            all.merge(&edge.witnesses.all_sigils());
        }
        all
    }

    // ── Duplicate ───────────────────────────────────────────────────────

    /// Split each given reading into itself plus a new reading, rerouting
    /// the paths of `witnesses` through the new one. Opposite of merge.
    pub async fn duplicate(
        &self,
        tradition: &TraditionId,
        reading_ids: &[ReadingId],
        witnesses: &[Sigil],
    ) -> Result<GraphDelta, EngineError> {
        debug!(tradition = %tradition, readings = reading_ids.len(), "duplicate");
        let mut graph = self.load(tradition).await?;
        let subset = WitnessSet::from_sigils(witnesses.iter().cloned());
        let mut delta = GraphDelta::new();

        for &id in reading_ids {
            let original = Self::get_reading(&graph, id)?;
            Self::reject_boundary(&original)?;
            Self::check_can_duplicate(&graph, id, &subset)?;
            self.duplicate_one(&mut graph, &original, &subset, &mut delta);
        }

        self.commit(graph).await?;
        info!(
            tradition = %tradition,
            created = delta.created.len(),
            deleted_edges = delta.deleted_edges.len(),
            "duplicate committed"
        );
        Ok(delta)
    }

    fn check_can_duplicate(
        graph: &SectionGraph,
        id: ReadingId,
        subset: &WitnessSet,
    ) -> Result<(), EngineError> {
        if subset.is_empty() {
            return Err(EngineError::invalid(
                "the witness list has to contain at least one witness",
            ));
        }
        let all = Self::all_witnesses_of(graph, id);
        if !subset.is_subset(&all) {
            return Err(EngineError::invalid(
                "the reading has to be in the witnesses to be duplicated",
            ));
        }
        if all.len() < 2 {
            return Err(EngineError::invalid(
                "the reading has to be in at least two witnesses",
            ));
        }
        Ok(())
    }

    fn duplicate_one(
        &self,
        graph: &mut SectionGraph,
        original: &Reading,
        subset: &WitnessSet,
        delta: &mut GraphDelta,
    ) {
        let added = original.derived(ReadingId::generate());
        let added_id = added.id;
        graph.add_reading(added.clone());

        // The duplicate shares all of the original's relationships.
        let rels: Vec<_> = graph
            .relations_of(original.id)
            .map(|r| (r.other(original.id), r.kind))
            .collect();
        for (other, kind) in rels {
            if let Some(other) = other {
                graph.relate(added_id, other, kind);
            }
        }

        // Rewire incident sequence edges, both directions handled the
        // same way.
        for direction in [Direction::Incoming, Direction::Outgoing] {
            let incident: Vec<SequenceEdge> = graph
                .incident(original.id, direction)
                .cloned()
                .collect();
            for edge in incident {
                let (moving, staying) = edge.witnesses.partition(subset);
                if moving.is_empty() {
                    continue;
                }
                let (new_source, new_target) = match direction {
                    Direction::Incoming => (edge.source, added_id),
                    Direction::Outgoing => (added_id, edge.target),
                };
                if staying.is_empty() {
                    // The whole edge moves to the duplicate.
                    if let Some(removed) = graph.remove_sequence_edge(edge.id) {
                        delta.deleted_edges.push(removed.clone());
                        graph.connect(new_source, new_target, removed.witnesses);
                    }
                } else {
                    if let Some(kept) = graph.sequence_edge_mut(edge.id) {
                        kept.witnesses = staying;
                    }
                    graph.connect(new_source, new_target, moving);
                }
            }
        }

        delta.created.push(added);
    }

    // ── Merge ───────────────────────────────────────────────────────────

    /// Collapse two readings carrying the same text into one. Opposite of
    /// duplicate. Returns the surviving reading.
    pub async fn merge(
        &self,
        tradition: &TraditionId,
        staying_id: ReadingId,
        deleting_id: ReadingId,
    ) -> Result<Reading, EngineError> {
        debug!(tradition = %tradition, staying = %staying_id, deleting = %deleting_id, "merge");
        let mut graph = self.load(tradition).await?;
        let staying = Self::get_reading(&graph, staying_id)?;
        let deleting = Self::get_reading(&graph, deleting_id)?;
        Self::reject_boundary(&staying)?;
        Self::reject_boundary(&deleting)?;

        Self::check_can_merge(&graph, &staying, &deleting)?;

        // Drop the relationship(s) that licensed the merge.
        let between: Vec<_> = graph
            .relations_between(staying_id, deleting_id)
            .iter()
            .map(|r| r.id)
            .collect();
        for rel_id in between {
            graph.remove_relation(rel_id);
        }

        // Fold the deleted reading's sequence edges into the survivor.
        // `connect` unions witness bundles when the survivor already has
        // an edge to the same neighbor.
        for direction in [Direction::Incoming, Direction::Outgoing] {
            let edges: Vec<SequenceEdge> = graph
                .incident(deleting_id, direction)
                .cloned()
                .collect();
            for edge in edges {
                if let Some(removed) = graph.remove_sequence_edge(edge.id) {
                    let (source, target) = match direction {
                        Direction::Incoming => (removed.source, staying_id),
                        Direction::Outgoing => (staying_id, removed.target),
                    };
                    // A direct sequence edge between the pair would become
                    // a self-loop; it cannot survive the contraction.
                    if source == target {
                        continue;
                    }
                    graph.connect(source, target, removed.witnesses);
                }
            }
        }

        // Carry over the deleted reading's remaining relationships.
        let rels: Vec<_> = graph
            .relations_of(deleting_id)
            .map(|r| (r.id, r.other(deleting_id), r.kind))
            .collect();
        for (rel_id, other, kind) in rels {
            graph.remove_relation(rel_id);
            if let Some(other) = other {
                if other != staying_id {
                    graph.relate(staying_id, other, kind);
                }
            }
        }

        graph.remove_reading(deleting_id);

        let survivor = Self::get_reading(&graph, staying_id)?;
        self.commit(graph).await?;
        info!(tradition = %tradition, staying = %staying_id, "merge committed");
        Ok(survivor)
    }

    fn check_can_merge(
        graph: &SectionGraph,
        staying: &Reading,
        deleting: &Reading,
    ) -> Result<(), EngineError> {
        if staying.text != deleting.text {
            return Err(EngineError::invalid(
                "readings to be merged do not contain the same text",
            ));
        }
        let between = graph.relations_between(staying.id, deleting.id);
        if between.is_empty() {
            return Err(EngineError::invalid(
                "readings to be merged have to be connected with each other through a relationship",
            ));
        }
        if between
            .iter()
            .any(|r| r.kind.class() == RelationClass::Strong)
        {
            return Err(EngineError::invalid(
                "readings to be merged cannot contain class 2 relationships (transposition / repetition)",
            ));
        }
        if invariants::would_cycle_on_merge(graph, staying.id, deleting.id) {
            return Err(EngineError::invalid(
                "readings to be merged would make the graph cyclic",
            ));
        }
        Ok(())
    }

    // ── Split ───────────────────────────────────────────────────────────

    /// Break one multi-word reading into a chain of single-word readings
    /// at successive ranks. Opposite of compress.
    pub async fn split(
        &self,
        tradition: &TraditionId,
        reading_id: ReadingId,
        options: SplitOptions,
    ) -> Result<GraphDelta, EngineError> {
        debug!(tradition = %tradition, reading = %reading_id, "split");
        let mut graph = self.load(tradition).await?;
        let original = Self::get_reading(&graph, reading_id)?;
        Self::reject_boundary(&original)?;

        let pieces = Self::split_pieces(&original.text, &options)?;
        Self::check_can_split(&graph, &original, pieces.len())?;

        let mut delta = GraphDelta::new();

        // The witnesses that reach the original also traverse every
        // inserted piece.
        let mut chain_witnesses = crate::types::WitnessBundle::default();
        for edge in graph.incoming(reading_id) {
            chain_witnesses.merge(&edge.witnesses);
        }

        let outgoing: Vec<SequenceEdge> = graph.outgoing(reading_id).cloned().collect();

        // Piece 0 stays on the original reading; its trailing join flag
        // migrates to the last piece of the chain.
        let original_join_next = original.join_next;
        if let Some(r) = graph.reading_mut(reading_id) {
            r.text = pieces[0].clone();
            r.join_next = false;
            delta.modified.push(r.clone());
        }

        let mut last_id = reading_id;
        let mut last_rank = original.rank;
        for (i, piece) in pieces.iter().enumerate().skip(1) {
            let mut piece_reading = original.derived(ReadingId::generate());
            piece_reading.text = piece.clone();
            piece_reading.rank = last_rank + 1;
            piece_reading.join_prior = false;
            piece_reading.join_next = if i == pieces.len() - 1 {
                original_join_next
            } else {
                false
            };
            let piece_id = piece_reading.id;
            graph.add_reading(piece_reading.clone());
            graph.connect(last_id, piece_id, chain_witnesses.clone());
            delta.created.push(piece_reading);
            last_id = piece_id;
            last_rank += 1;
        }

        // The original's outgoing edges now leave from the last piece.
        for edge in outgoing {
            if let Some(removed) = graph.remove_sequence_edge(edge.id) {
                delta.deleted_edges.push(removed.clone());
                graph.connect(last_id, removed.target, removed.witnesses);
            }
        }

        self.commit(graph).await?;
        info!(
            tradition = %tradition,
            reading = %reading_id,
            pieces = delta.created.len() + 1,
            "split committed"
        );
        Ok(delta)
    }

    fn split_pieces(text: &str, options: &SplitOptions) -> Result<Vec<String>, EngineError> {
        if let Some(index) = options.split_index {
            let chars: Vec<char> = text.chars().collect();
            if index == 0 || index >= chars.len() {
                return Err(EngineError::invalid(
                    "the split index must fall inside the text",
                ));
            }
            let head: String = chars[..index].iter().collect();
            let tail: String = chars[index..].iter().collect();
            return Ok(vec![head, tail]);
        }
        let pieces: Vec<String> = match options.separator.as_deref() {
            None | Some("") => text.split_whitespace().map(str::to_string).collect(),
            Some(sep) => text
                .split(sep)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        };
        Ok(pieces)
    }

    fn check_can_split(
        graph: &SectionGraph,
        original: &Reading,
        num_pieces: usize,
    ) -> Result<(), EngineError> {
        if num_pieces < 2 {
            return Err(EngineError::invalid(
                "a reading to be split has to contain at least 2 words",
            ));
        }
        if graph.relations_of(original.id).next().is_some() {
            return Err(EngineError::invalid(
                "a reading to be split cannot be part of any relationship",
            ));
        }
        let has_gap = graph.outgoing(original.id).any(|edge| {
            graph
                .reading(edge.target)
                .is_some_and(|next| next.rank - original.rank >= num_pieces as i64)
        });
        if !has_gap {
            return Err(EngineError::invalid(
                "there has to be a rank-gap after a reading to be split",
            ));
        }
        Ok(())
    }

    // ── Compress ────────────────────────────────────────────────────────

    /// Merge two rank-adjacent readings into one, concatenating their
    /// texts. Opposite of split. The ids are normalized by rank, so the
    /// arguments may come in either order.
    pub async fn compress(
        &self,
        tradition: &TraditionId,
        read_id1: ReadingId,
        read_id2: ReadingId,
        join: Option<&str>,
    ) -> Result<Reading, EngineError> {
        debug!(tradition = %tradition, read1 = %read_id1, read2 = %read_id2, "compress");
        let mut graph = self.load(tradition).await?;
        let r1 = Self::get_reading(&graph, read_id1)?;
        let r2 = Self::get_reading(&graph, read_id2)?;
        Self::reject_boundary(&r1)?;
        Self::reject_boundary(&r2)?;

        // Normalize: read1 is the lower-rank reading.
        let (read1, read2) = if r1.rank <= r2.rank { (r1, r2) } else { (r2, r1) };

        Self::check_can_compress(&graph, &read1, &read2)?;

        let joined = match join {
            Some(conjunction) => format!("{}{}{}", read1.text, conjunction, read2.text),
            None => format!("{} {}", read1.text, read2.text),
        };
        let read2_join_next = read2.join_next;
        if let Some(r) = graph.reading_mut(read1.id) {
            r.text = joined;
            r.join_next = read2_join_next;
        }

        // Drop the chain link, then pull read2's remaining edges over.
        let link = graph
            .sequence_between(read1.id, read2.id)
            .map(|e| e.id)
            .ok_or_else(|| {
                EngineError::invalid("readings are not neighbors. could not compress")
            })?;
        graph.remove_sequence_edge(link);

        for direction in [Direction::Incoming, Direction::Outgoing] {
            let edges: Vec<SequenceEdge> = graph
                .incident(read2.id, direction)
                .cloned()
                .collect();
            for edge in edges {
                if let Some(removed) = graph.remove_sequence_edge(edge.id) {
                    let (source, target) = match direction {
                        Direction::Incoming => (removed.source, read1.id),
                        Direction::Outgoing => (read1.id, removed.target),
                    };
                    if source == target {
                        continue;
                    }
                    graph.connect(source, target, removed.witnesses);
                }
            }
        }

        graph.remove_reading(read2.id);

        let survivor = Self::get_reading(&graph, read1.id)?;
        self.commit(graph).await?;
        info!(tradition = %tradition, reading = %read1.id, "compress committed");
        Ok(survivor)
    }

    fn check_can_compress(
        graph: &SectionGraph,
        read1: &Reading,
        read2: &Reading,
    ) -> Result<(), EngineError> {
        if graph.sequence_between(read1.id, read2.id).is_none() {
            return Err(EngineError::invalid(
                "readings are not neighbors. could not compress",
            ));
        }
        if graph.outgoing(read2.id).next().is_none() {
            return Err(EngineError::invalid(
                "second reading is not connected. could not compress",
            ));
        }
        if graph.relations_of(read1.id).next().is_some()
            || graph.relations_of(read2.id).next().is_some()
        {
            return Err(EngineError::invalid(
                "reading has other relations. could not compress",
            ));
        }
        Ok(())
    }

    // ── Property changes ────────────────────────────────────────────────

    /// Fetch one reading.
    pub async fn reading(
        &self,
        tradition: &TraditionId,
        id: ReadingId,
    ) -> Result<Reading, EngineError> {
        let graph = self.load(tradition).await?;
        Self::get_reading(&graph, id)
    }

    /// Change a reading's text.
    pub async fn set_reading_text(
        &self,
        tradition: &TraditionId,
        id: ReadingId,
        text: impl Into<String>,
    ) -> Result<Reading, EngineError> {
        let mut graph = self.load(tradition).await?;
        let reading = Self::get_reading(&graph, id)?;
        Self::reject_boundary(&reading)?;
        if let Some(r) = graph.reading_mut(id) {
            r.text = text.into();
        }
        let updated = Self::get_reading(&graph, id)?;
        self.commit(graph).await?;
        Ok(updated)
    }

    /// All readings of the section, boundaries excluded, ordered by rank
    /// then id.
    pub async fn all_readings(
        &self,
        tradition: &TraditionId,
    ) -> Result<Vec<Reading>, EngineError> {
        let graph = self.load(tradition).await?;
        let mut readings: Vec<Reading> = graph
            .readings()
            .filter(|r| !r.is_boundary())
            .cloned()
            .collect();
        readings.sort_by_key(|r| (r.rank, r.id));
        Ok(readings)
    }

    // ── Read-only reports ───────────────────────────────────────────────

    /// Groups of readings sharing rank and text within the window.
    pub async fn identical_readings(
        &self,
        tradition: &TraditionId,
        start_rank: i64,
        end_rank: i64,
    ) -> Result<Vec<Vec<Reading>>, EngineError> {
        let graph = self.load(tradition).await?;
        Ok(analysis::identical_readings(&graph, start_rank, end_rank))
    }

    /// Groups of same-text readings not force-ordered by any path.
    pub async fn could_be_identical_readings(
        &self,
        tradition: &TraditionId,
        start_rank: i64,
        end_rank: i64,
    ) -> Result<Vec<Vec<Reading>>, EngineError> {
        let graph = self.load(tradition).await?;
        Ok(analysis::could_be_identical_readings(
            &graph, start_rank, end_rank,
        ))
    }

    /// One witness's text, rendered with the layout join flags.
    pub async fn witness_text(
        &self,
        tradition: &TraditionId,
        sigil: &Sigil,
        layers: &[LayerLabel],
        start_rank: Option<i64>,
        end_rank: Option<i64>,
    ) -> Result<String, EngineError> {
        let graph = self.load(tradition).await?;
        let filter = WitnessFilter::new(sigil.clone()).with_layers(layers.to_vec());
        walk::witness_text(&graph, &filter, start_rank, end_rank)
    }

    /// One witness's path as a list of readings.
    pub async fn witness_readings(
        &self,
        tradition: &TraditionId,
        sigil: &Sigil,
        layers: &[LayerLabel],
    ) -> Result<Vec<Reading>, EngineError> {
        let graph = self.load(tradition).await?;
        let filter = WitnessFilter::new(sigil.clone()).with_layers(layers.to_vec());
        walk::witness_readings(&graph, &filter)
    }

    /// The reading after the given one on a witness's path.
    pub async fn next_reading(
        &self,
        tradition: &TraditionId,
        sigil: &Sigil,
        id: ReadingId,
    ) -> Result<Reading, EngineError> {
        self.adjacent_reading(tradition, sigil, id, 1).await
    }

    /// The reading before the given one on a witness's path.
    pub async fn prior_reading(
        &self,
        tradition: &TraditionId,
        sigil: &Sigil,
        id: ReadingId,
    ) -> Result<Reading, EngineError> {
        self.adjacent_reading(tradition, sigil, id, -1).await
    }

    async fn adjacent_reading(
        &self,
        tradition: &TraditionId,
        sigil: &Sigil,
        id: ReadingId,
        offset: i64,
    ) -> Result<Reading, EngineError> {
        let graph = self.load(tradition).await?;
        let filter = WitnessFilter::new(sigil.clone());
        let readings = walk::witness_readings(&graph, &filter)?;
        let position = readings
            .iter()
            .position(|r| r.id == id)
            .ok_or(EngineError::ReadingNotFound(id))?;
        let neighbor = position as i64 + offset;
        if neighbor < 0 || neighbor as usize >= readings.len() {
            // Stepping past the path's ends would land on a boundary
            // marker, which is not a reading of the witness.
            return Err(EngineError::NotFound(format!(
                "this was the {} reading of witness {}",
                if offset > 0 { "last" } else { "first" },
                sigil
            )));
        }
        Ok(readings[neighbor as usize].clone())
    }
}
