//! Property tests over the witness-set algebra.
//!
//! Duplicate and merge move witnesses between edges via `partition` and
//! `merge`; these properties pin down the conservation laws those
//! operations rely on.

use proptest::prelude::*;

use collation_kernel::{Sigil, WitnessSet};

fn sigils() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[A-H]", 0..8)
}

fn witness_set(labels: Vec<String>) -> WitnessSet {
    WitnessSet::from_sigils(labels.iter().map(String::as_str))
}

proptest! {
    #[test]
    fn partition_conserves_the_set(set in sigils(), subset in sigils()) {
        let set = witness_set(set);
        let subset = witness_set(subset);

        let (mut moving, staying) = set.partition(&subset);
        prop_assert!(moving.is_subset(&subset));
        for sigil in staying.iter() {
            prop_assert!(!subset.contains(sigil));
        }

        moving.merge(&staying);
        prop_assert_eq!(moving, set);
    }

    #[test]
    fn partition_halves_are_disjoint(set in sigils(), subset in sigils()) {
        let set = witness_set(set);
        let subset = witness_set(subset);

        let (moving, staying) = set.partition(&subset);
        for sigil in moving.iter() {
            prop_assert!(!staying.contains(sigil));
        }
        prop_assert_eq!(moving.len() + staying.len(), set.len());
    }

    #[test]
    fn merge_is_commutative(a in sigils(), b in sigils()) {
        let a = witness_set(a);
        let b = witness_set(b);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn merge_is_idempotent(a in sigils()) {
        let a = witness_set(a);
        let mut doubled = a.clone();
        doubled.merge(&a);
        prop_assert_eq!(doubled, a);
    }

    #[test]
    fn subset_of_merge(a in sigils(), b in sigils()) {
        let a = witness_set(a);
        let b = witness_set(b);

        let mut union = a.clone();
        union.merge(&b);
        prop_assert!(a.is_subset(&union));
        prop_assert!(b.is_subset(&union));
    }

    #[test]
    fn contains_after_insert(labels in sigils(), extra in "[A-H]") {
        let mut set = witness_set(labels);
        let sigil = Sigil::new(extra);
        set.insert(sigil.clone());
        prop_assert!(set.contains(&sigil));
    }
}
