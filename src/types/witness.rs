//! Witness labels and the witness-set algebra.
//!
//! A witness is not a stored entity: it exists only as a label (sigil)
//! inside the witness sets carried by sequence edges. All set operations
//! here are pure and deterministic (`BTreeSet` ordering).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Label identifying one physical copy of the text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Sigil(String);

impl Sigil {
    /// Create a sigil from a label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sigil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Sigil {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Label naming a text layer on a sequence edge, e.g. "a.c." for a
/// correction layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerLabel(String);

impl LayerLabel {
    /// Create a layer label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LayerLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Ordered set of witness sigils.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSet(BTreeSet<Sigil>);

impl WitnessSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set from an iterator of sigils.
    pub fn from_sigils<I, T>(sigils: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Sigil>,
    {
        Self(sigils.into_iter().map(Into::into).collect())
    }

    /// Insert a sigil.
    pub fn insert(&mut self, sigil: Sigil) {
        self.0.insert(sigil);
    }

    /// Whether the set contains the sigil.
    pub fn contains(&self, sigil: &Sigil) -> bool {
        self.0.contains(sigil)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of sigils.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate sigils in order.
    pub fn iter(&self) -> impl Iterator<Item = &Sigil> {
        self.0.iter()
    }

    /// Whether every sigil of `self` appears in `other`.
    pub fn is_subset(&self, other: &WitnessSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Union the other set into this one.
    pub fn merge(&mut self, other: &WitnessSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Partition by membership in `subset`: returns `(moving, staying)`
    /// where `moving` is the intersection with `subset` and `staying` the
    /// remainder.
    pub fn partition(&self, subset: &WitnessSet) -> (WitnessSet, WitnessSet) {
        let mut moving = BTreeSet::new();
        let mut staying = BTreeSet::new();
        for sigil in &self.0 {
            if subset.contains(sigil) {
                moving.insert(sigil.clone());
            } else {
                staying.insert(sigil.clone());
            }
        }
        (WitnessSet(moving), WitnessSet(staying))
    }
}

impl fmt::Display for WitnessSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(Sigil::as_str).collect();
        write!(f, "{}", labels.join(", "))
    }
}

/// Witnesses carried by a sequence edge, split across text layers.
///
/// The base set is the main text layer. Named layers (corrections, second
/// hands) carry their own witness sets and participate in the same algebra.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessBundle {
    /// Witnesses of the main text layer.
    pub base: WitnessSet,
    /// Per-layer witness sets, keyed by layer label.
    pub layers: BTreeMap<LayerLabel, WitnessSet>,
}

impl WitnessBundle {
    /// Create a bundle carrying only a base set.
    pub fn from_base(base: WitnessSet) -> Self {
        Self {
            base,
            layers: BTreeMap::new(),
        }
    }

    /// Create a bundle with the given sigils in the base layer.
    pub fn from_sigils<I, T>(sigils: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Sigil>,
    {
        Self::from_base(WitnessSet::from_sigils(sigils))
    }

    /// Set a named layer's witnesses.
    pub fn with_layer(mut self, layer: LayerLabel, witnesses: WitnessSet) -> Self {
        self.layers.insert(layer, witnesses);
        self
    }

    /// Whether every layer (base included) is empty.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.layers.values().all(WitnessSet::is_empty)
    }

    /// Union of all sigils across base and layers.
    pub fn all_sigils(&self) -> WitnessSet {
        let mut all = self.base.clone();
        for set in self.layers.values() {
            all.merge(set);
        }
        all
    }

    /// Whether the sigil traverses this edge on the base layer, or (if
    /// `layers` is non-empty) on any of the requested layers.
    pub fn admits(&self, sigil: &Sigil, layers: &[LayerLabel]) -> bool {
        if self.base.contains(sigil) {
            return true;
        }
        layers
            .iter()
            .any(|l| self.layers.get(l).is_some_and(|set| set.contains(sigil)))
    }

    /// Union the other bundle into this one, layer by layer.
    pub fn merge(&mut self, other: &WitnessBundle) {
        self.base.merge(&other.base);
        for (label, set) in &other.layers {
            self.layers.entry(label.clone()).or_default().merge(set);
        }
    }

    /// Partition every layer by membership in `subset`; empty layers are
    /// dropped from both halves.
    pub fn partition(&self, subset: &WitnessSet) -> (WitnessBundle, WitnessBundle) {
        let (base_moving, base_staying) = self.base.partition(subset);
        let mut moving = WitnessBundle::from_base(base_moving);
        let mut staying = WitnessBundle::from_base(base_staying);
        for (label, set) in &self.layers {
            let (m, s) = set.partition(subset);
            if !m.is_empty() {
                moving.layers.insert(label.clone(), m);
            }
            if !s.is_empty() {
                staying.layers.insert(label.clone(), s);
            }
        }
        (moving, staying)
    }
}
