//! Witness path reconstruction.
//!
//! A witness's linear text is not materialized anywhere; it is recovered
//! by walking sequence edges from the section's start reading to its end
//! reading, following only edges whose witness bundle admits the target
//! sigil. The admission test is a predicate over the edge ([`WitnessFilter`])
//! handed to a generic depth-first walk with per-path edge uniqueness.

use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::graph::SectionGraph;
use crate::types::{EdgeId, LayerLabel, Reading, ReadingId, SequenceEdge, Sigil};

/// Predicate selecting the sequence edges one witness traverses,
/// optionally on additional text layers.
#[derive(Debug, Clone)]
pub struct WitnessFilter {
    sigil: Sigil,
    layers: Vec<LayerLabel>,
}

impl WitnessFilter {
    /// Filter for a witness's base text.
    pub fn new(sigil: Sigil) -> Self {
        Self {
            sigil,
            layers: Vec::new(),
        }
    }

    /// Filter additionally admitting edges tagged for the given layers.
    pub fn with_layers(mut self, layers: Vec<LayerLabel>) -> Self {
        self.layers = layers;
        self
    }

    /// The witness this filter selects for.
    pub fn sigil(&self) -> &Sigil {
        &self.sigil
    }

    /// Whether the witness traverses the given edge.
    pub fn admits(&self, edge: &SequenceEdge) -> bool {
        edge.witnesses.admits(&self.sigil, &self.layers)
    }
}

/// Depth-first search from `from` to `to` following edges admitted by the
/// predicate, never reusing an edge within one path. Returns the readings
/// of the first complete path found, boundaries included.
pub fn find_path<F>(
    graph: &SectionGraph,
    from: ReadingId,
    to: ReadingId,
    admits: F,
) -> Option<Vec<ReadingId>>
where
    F: Fn(&SequenceEdge) -> bool,
{
    let mut path = vec![from];
    let mut used: BTreeSet<EdgeId> = BTreeSet::new();
    if dfs(graph, from, to, &admits, &mut used, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn dfs<F>(
    graph: &SectionGraph,
    current: ReadingId,
    to: ReadingId,
    admits: &F,
    used: &mut BTreeSet<EdgeId>,
    path: &mut Vec<ReadingId>,
) -> bool
where
    F: Fn(&SequenceEdge) -> bool,
{
    if current == to {
        return true;
    }
    // BTreeMap iteration makes the candidate order, and therefore the
    // chosen path, deterministic.
    let candidates: Vec<(EdgeId, ReadingId)> = graph
        .outgoing(current)
        .filter(|e| admits(e) && !used.contains(&e.id))
        .map(|e| (e.id, e.target))
        .collect();

    for (edge_id, target) in candidates {
        used.insert(edge_id);
        path.push(target);
        if dfs(graph, target, to, admits, used, path) {
            return true;
        }
        path.pop();
        used.remove(&edge_id);
    }
    false
}

/// All readings on a witness's path, start and end boundary markers
/// stripped. Fails with `Conflict` if the walk cannot reach the end
/// reading.
pub fn witness_readings(
    graph: &SectionGraph,
    filter: &WitnessFilter,
) -> Result<Vec<Reading>, EngineError> {
    let path = find_path(graph, graph.start(), graph.end(), |e| filter.admits(e)).ok_or_else(
        || {
            EngineError::Conflict(format!(
                "witness {} has no unbroken path from start to end",
                filter.sigil()
            ))
        },
    )?;

    let mut readings = Vec::with_capacity(path.len());
    for id in path {
        let reading = graph
            .reading(id)
            .ok_or(EngineError::ReadingNotFound(id))?;
        if !reading.is_boundary() {
            readings.push(reading.clone());
        }
    }
    Ok(readings)
}

/// A witness's text as a single string.
///
/// Lacuna and empty readings are omitted. Tokens are joined with single
/// spaces, except where the preceding reading carries `join_next` or the
/// current one carries `join_prior`. Optional inclusive rank bounds
/// restrict the rendered range.
pub fn witness_text(
    graph: &SectionGraph,
    filter: &WitnessFilter,
    start_rank: Option<i64>,
    end_rank: Option<i64>,
) -> Result<String, EngineError> {
    let readings = witness_readings(graph, filter)?;

    let mut out = String::new();
    let mut prev: Option<&Reading> = None;
    for reading in &readings {
        if let Some(start) = start_rank {
            if reading.rank < start {
                continue;
            }
        }
        if let Some(end) = end_rank {
            if reading.rank > end {
                continue;
            }
        }
        if reading.is_lacuna || reading.text.is_empty() {
            continue;
        }
        if let Some(p) = prev {
            if !(p.join_next || reading.join_prior) {
                out.push(' ');
            }
        }
        out.push_str(&reading.text);
        prev = Some(reading);
    }
    Ok(out)
}
