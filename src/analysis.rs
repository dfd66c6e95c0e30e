//! Identity analyzer: read-only reports over a rank window.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{invariants, SectionGraph};
use crate::types::{Reading, ReadingId};

/// Non-boundary readings with `start_rank < rank < end_rank`, sorted by
/// rank, then text, then id.
fn readings_in_window(graph: &SectionGraph, start_rank: i64, end_rank: i64) -> Vec<&Reading> {
    let mut readings: Vec<&Reading> = graph
        .readings()
        .filter(|r| !r.is_boundary() && r.rank > start_rank && r.rank < end_rank)
        .collect();
    readings.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then_with(|| a.text.cmp(&b.text))
            .then_with(|| a.id.cmp(&b.id))
    });
    readings
}

/// Groups of readings that share both rank and text: direct merge
/// candidates. Only groups of two or more are reported.
pub fn identical_readings(
    graph: &SectionGraph,
    start_rank: i64,
    end_rank: i64,
) -> Vec<Vec<Reading>> {
    let readings = readings_in_window(graph, start_rank, end_rank);

    let mut groups: Vec<Vec<Reading>> = Vec::new();
    let mut current: Vec<Reading> = Vec::new();
    for reading in readings {
        match current.last() {
            Some(prev) if prev.rank == reading.rank && prev.text == reading.text => {
                current.push(reading.clone());
            }
            _ => {
                if current.len() >= 2 {
                    groups.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
                current.push(reading.clone());
            }
        }
    }
    if current.len() >= 2 {
        groups.push(current);
    }
    groups
}

/// Groups of same-text readings at different ranks whose relative order is
/// not forced by any sequence-edge path: mergeable if the editor wishes.
///
/// A pair (A lower rank, B higher rank) qualifies when B is not reachable
/// from A through sequence edges; rank monotonicity already rules out a
/// path in the other direction. Pairs accumulate into maximal same-text
/// groups, de-duplicated by reading identity.
pub fn could_be_identical_readings(
    graph: &SectionGraph,
    start_rank: i64,
    end_rank: i64,
) -> Vec<Vec<Reading>> {
    let readings = readings_in_window(graph, start_rank, end_rank);

    let mut by_text: BTreeMap<&str, Vec<&Reading>> = BTreeMap::new();
    for reading in readings {
        by_text.entry(reading.text.as_str()).or_default().push(reading);
    }

    let mut groups: Vec<Vec<Reading>> = Vec::new();
    for same_text in by_text.values() {
        if same_text.len() < 2 {
            continue;
        }
        let mut members: BTreeSet<ReadingId> = BTreeSet::new();
        for (i, a) in same_text.iter().enumerate() {
            for b in &same_text[i + 1..] {
                if a.rank == b.rank {
                    continue;
                }
                // readings_in_window sorts by rank, so a is the lower one.
                if !invariants::reachable(graph, a.id, b.id) {
                    members.insert(a.id);
                    members.insert(b.id);
                }
            }
        }
        if members.len() >= 2 {
            let mut group: Vec<Reading> = members
                .iter()
                .filter_map(|id| graph.reading(*id).cloned())
                .collect();
            group.sort_by_key(|r| (r.rank, r.id));
            groups.push(group);
        }
    }
    groups
}
