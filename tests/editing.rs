//! Integration tests for the collation editing engine.
//!
//! These tests validate the end-to-end editing lifecycle:
//! 1. Witness path and text extraction
//! 2. Duplicate / Merge as an inverse pair
//! 3. Split / Compress as an inverse pair
//! 4. Relationship-class merge rules
//! 5. Identity reports over rank windows
//! 6. Atomicity of rejected operations

use std::sync::Arc;

use collation_kernel::{
    GraphEditor, GraphStore, InMemoryGraphStore, LayerLabel, Reading, ReadingId, RelationKind,
    SectionGraph, Sigil, SplitOptions, TraditionId, WitnessBundle, WitnessSet,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

struct Fixture {
    editor: GraphEditor<InMemoryGraphStore>,
    tradition: TraditionId,
    ids: Vec<ReadingId>,
}

fn sigil(s: &str) -> Sigil {
    Sigil::from(s)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A three-witness fork:
///
/// ```text
///             ┌── showers(2) [A,B] ──┐
/// start ── april(1)                 sweet(3) ── end
///             └── shoures(2) [C] ────┘
/// ```
///
/// "showers" and "shoures" carry a spelling relationship.
async fn forked_fixture() -> Fixture {
    init_tracing();
    let tradition = TraditionId::from("canterbury");
    let mut g = SectionGraph::new(tradition.clone(), 10);

    let april = ReadingId::generate();
    let showers = ReadingId::generate();
    let shoures = ReadingId::generate();
    let sweet = ReadingId::generate();
    g.add_reading(Reading::new(april, "april", 1));
    g.add_reading(Reading::new(showers, "showers", 2));
    g.add_reading(Reading::new(shoures, "shoures", 2));
    g.add_reading(Reading::new(sweet, "sweet", 3));

    let all = WitnessBundle::from_sigils(["A", "B", "C"]);
    let ab = WitnessBundle::from_sigils(["A", "B"]);
    let c = WitnessBundle::from_sigils(["C"]);
    g.connect(g.start(), april, all.clone());
    g.connect(april, showers, ab.clone());
    g.connect(april, shoures, c.clone());
    g.connect(showers, sweet, ab);
    g.connect(shoures, sweet, c);
    g.connect(sweet, g.end(), all);

    g.relate(showers, shoures, RelationKind::Spelling);

    let store = InMemoryGraphStore::new();
    store.commit_section(g).await.unwrap();
    Fixture {
        editor: GraphEditor::new(Arc::new(store)),
        tradition,
        ids: vec![april, showers, shoures, sweet],
    }
}

/// Union of all witnesses over every sequence edge in the section.
async fn total_witnesses(fixture: &Fixture) -> WitnessSet {
    let graph = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    let mut all = WitnessSet::new();
    for edge in graph.sequence_edges() {
        all.merge(&edge.witnesses.all_sigils());
    }
    all
}

async fn text_of(fixture: &Fixture, witness: &str) -> String {
    fixture
        .editor
        .witness_text(&fixture.tradition, &sigil(witness), &[], None, None)
        .await
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 1: Witness Paths and Text
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_each_witness_reads_its_own_branch() {
    let fixture = forked_fixture().await;

    assert_eq!(text_of(&fixture, "A").await, "april showers sweet");
    assert_eq!(text_of(&fixture, "B").await, "april showers sweet");
    assert_eq!(text_of(&fixture, "C").await, "april shoures sweet");
}

#[tokio::test]
async fn test_witness_readings_exclude_boundaries() {
    let fixture = forked_fixture().await;

    let path = fixture
        .editor
        .witness_readings(&fixture.tradition, &sigil("C"), &[])
        .await
        .unwrap();
    assert_eq!(path.len(), 3);
    assert!(path.iter().all(|r| !r.is_boundary()));
    assert_eq!(path[1].text, "shoures");
}

#[tokio::test]
async fn test_unknown_witness_has_no_path() {
    let fixture = forked_fixture().await;

    let err = fixture
        .editor
        .witness_readings(&fixture.tradition, &sigil("Z"), &[])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no unbroken path"));
}

#[tokio::test]
async fn test_layered_witness_follows_correction() {
    let tradition = TraditionId::from("layered");
    let mut g = SectionGraph::new(tradition.clone(), 10);
    let old = ReadingId::generate();
    let olde = ReadingId::generate();
    g.add_reading(Reading::new(old, "old", 1));
    g.add_reading(Reading::new(olde, "olde", 1));

    // A's corrector switched from "olde" to "old"; the a.c. layer keeps
    // the pre-correction path alive.
    let corrected = WitnessBundle::default().with_layer(
        LayerLabel::from("a.c."),
        WitnessSet::from_sigils(["A"]),
    );
    g.connect(g.start(), olde, corrected.clone());
    g.connect(olde, g.end(), corrected);
    g.connect(g.start(), old, WitnessBundle::from_sigils(["A"]));
    g.connect(old, g.end(), WitnessBundle::from_sigils(["A"]));

    let store = InMemoryGraphStore::new();
    store.commit_section(g).await.unwrap();
    let editor = GraphEditor::new(Arc::new(store));

    let base = editor
        .witness_text(&tradition, &sigil("A"), &[], None, None)
        .await
        .unwrap();
    let layered = editor
        .witness_text(
            &tradition,
            &sigil("A"),
            &[LayerLabel::from("a.c.")],
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(base, "old");
    assert_eq!(layered, "olde");
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 2: Duplicate / Merge Inverse Pair
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_duplicate_preserves_every_witness_text() {
    let fixture = forked_fixture().await;
    let april = fixture.ids[0];

    let before_a = text_of(&fixture, "A").await;
    let before_c = text_of(&fixture, "C").await;

    fixture
        .editor
        .duplicate(&fixture.tradition, &[april], &[sigil("C")])
        .await
        .unwrap();

    assert_eq!(text_of(&fixture, "A").await, before_a);
    assert_eq!(text_of(&fixture, "C").await, before_c);
}

#[tokio::test]
async fn test_duplicate_conserves_witness_population() {
    let fixture = forked_fixture().await;
    let before = total_witnesses(&fixture).await;

    fixture
        .editor
        .duplicate(&fixture.tradition, &[fixture.ids[0]], &[sigil("B")])
        .await
        .unwrap();

    assert_eq!(total_witnesses(&fixture).await, before);
}

#[tokio::test]
async fn test_merge_undoes_duplicate() {
    let fixture = forked_fixture().await;
    let april = fixture.ids[0];

    let before = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    let readings_before = before.num_readings();

    let delta = fixture
        .editor
        .duplicate(&fixture.tradition, &[april], &[sigil("C")])
        .await
        .unwrap();
    let copy = delta.created[0].id;

    // Relate the halves back together, then merge.
    let mut g = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    g.relate(april, copy, RelationKind::Other);
    fixture.editor.store().commit_section(g).await.unwrap();

    let survivor = fixture
        .editor
        .merge(&fixture.tradition, april, copy)
        .await
        .unwrap();

    assert_eq!(survivor.id, april);
    let after = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    assert_eq!(after.num_readings(), readings_before);
    assert_eq!(text_of(&fixture, "A").await, "april showers sweet");
    assert_eq!(text_of(&fixture, "C").await, "april shoures sweet");
}

#[tokio::test]
async fn test_merge_variants_across_the_fork() {
    let fixture = forked_fixture().await;
    let (showers, shoures) = (fixture.ids[1], fixture.ids[2]);

    // Same-text precondition: align the texts first, as an editor
    // normalizing spelling would.
    fixture
        .editor
        .set_reading_text(&fixture.tradition, shoures, "showers")
        .await
        .unwrap();

    let survivor = fixture
        .editor
        .merge(&fixture.tradition, showers, shoures)
        .await
        .unwrap();
    assert_eq!(survivor.text, "showers");

    // All three witnesses now pass through the one reading.
    for w in ["A", "B", "C"] {
        assert_eq!(text_of(&fixture, w).await, "april showers sweet");
    }
}

#[tokio::test]
async fn test_merge_rejects_transposition() {
    let fixture = forked_fixture().await;
    let (showers, shoures) = (fixture.ids[1], fixture.ids[2]);

    fixture
        .editor
        .set_reading_text(&fixture.tradition, shoures, "showers")
        .await
        .unwrap();

    let mut g = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    g.relate(showers, shoures, RelationKind::Transposition);
    fixture.editor.store().commit_section(g).await.unwrap();

    let err = fixture
        .editor
        .merge(&fixture.tradition, showers, shoures)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("class 2"));
}

#[tokio::test]
async fn test_merge_rejects_cycle() {
    // april(1) -> sweet(3): merging them would orient their connecting
    // paths into a loop.
    let fixture = forked_fixture().await;
    let (april, sweet) = (fixture.ids[0], fixture.ids[3]);

    fixture
        .editor
        .set_reading_text(&fixture.tradition, sweet, "april")
        .await
        .unwrap();
    let mut g = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    g.relate(april, sweet, RelationKind::Other);
    fixture.editor.store().commit_section(g).await.unwrap();

    let err = fixture
        .editor
        .merge(&fixture.tradition, april, sweet)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cyclic"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 3: Split / Compress Inverse Pair
// ─────────────────────────────────────────────────────────────────────────────

async fn single_reading_fixture(text: &str, end_rank: i64) -> (Fixture, ReadingId) {
    let tradition = TraditionId::from("single");
    let mut g = SectionGraph::new(tradition.clone(), end_rank);
    let id = ReadingId::generate();
    g.add_reading(Reading::new(id, text, 1));
    g.connect(g.start(), id, WitnessBundle::from_sigils(["A", "B"]));
    g.connect(id, g.end(), WitnessBundle::from_sigils(["A", "B"]));
    let store = InMemoryGraphStore::new();
    store.commit_section(g).await.unwrap();
    (
        Fixture {
            editor: GraphEditor::new(Arc::new(store)),
            tradition,
            ids: vec![id],
        },
        id,
    )
}

#[tokio::test]
async fn test_split_then_compress_restores_text() {
    let (fixture, id) = single_reading_fixture("the mouse", 10).await;

    let delta = fixture
        .editor
        .split(&fixture.tradition, id, SplitOptions::default())
        .await
        .unwrap();
    assert_eq!(delta.modified[0].text, "the");
    assert_eq!(delta.created.len(), 1);
    assert_eq!(delta.created[0].text, "mouse");
    assert_eq!(text_of(&fixture, "A").await, "the mouse");

    let survivor = fixture
        .editor
        .compress(&fixture.tradition, id, delta.created[0].id, None)
        .await
        .unwrap();
    assert_eq!(survivor.text, "the mouse");
    assert_eq!(text_of(&fixture, "B").await, "the mouse");
}

#[tokio::test]
async fn test_split_and_compress_conserve_witness_population() {
    let (fixture, id) = single_reading_fixture("the mouse", 10).await;
    let before = total_witnesses(&fixture).await;

    let delta = fixture
        .editor
        .split(&fixture.tradition, id, SplitOptions::default())
        .await
        .unwrap();
    assert_eq!(total_witnesses(&fixture).await, before);

    fixture
        .editor
        .compress(&fixture.tradition, id, delta.created[0].id, None)
        .await
        .unwrap();
    assert_eq!(total_witnesses(&fixture).await, before);
}

#[tokio::test]
async fn test_split_pieces_occupy_consecutive_ranks() {
    let (fixture, id) = single_reading_fixture("when that april", 10).await;

    let delta = fixture
        .editor
        .split(&fixture.tradition, id, SplitOptions::default())
        .await
        .unwrap();
    assert_eq!(delta.created.len(), 2);
    assert_eq!(delta.created[0].rank, 2);
    assert_eq!(delta.created[1].rank, 3);
    assert_eq!(text_of(&fixture, "A").await, "when that april");
}

#[tokio::test]
async fn test_split_at_character_index() {
    let (fixture, id) = single_reading_fixture("unto", 10).await;

    let delta = fixture
        .editor
        .split(
            &fixture.tradition,
            id,
            SplitOptions {
                split_index: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(delta.modified[0].text, "un");
    assert_eq!(delta.created[0].text, "to");
}

#[tokio::test]
async fn test_split_rejects_related_reading() {
    let fixture = forked_fixture().await;
    let showers = fixture.ids[1];

    let mut g = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    if let Some(r) = g.reading_mut(showers) {
        r.text = "showers falling".to_string();
    }
    fixture.editor.store().commit_section(g).await.unwrap();

    let err = fixture
        .editor
        .split(&fixture.tradition, showers, SplitOptions::default())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("relationship"));
}

#[tokio::test]
async fn test_compress_with_explicit_join() {
    let (fixture, id) = single_reading_fixture("with out", 10).await;

    let delta = fixture
        .editor
        .split(&fixture.tradition, id, SplitOptions::default())
        .await
        .unwrap();

    let survivor = fixture
        .editor
        .compress(&fixture.tradition, id, delta.created[0].id, Some(""))
        .await
        .unwrap();
    assert_eq!(survivor.text, "without");
    assert_eq!(text_of(&fixture, "A").await, "without");
}

#[tokio::test]
async fn test_compress_rejects_non_neighbors() {
    let fixture = forked_fixture().await;
    let (april, sweet) = (fixture.ids[0], fixture.ids[3]);

    let err = fixture
        .editor
        .compress(&fixture.tradition, april, sweet, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not neighbors"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 4: Identity Reports
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_identical_readings_after_normalization() {
    let fixture = forked_fixture().await;
    let shoures = fixture.ids[2];

    fixture
        .editor
        .set_reading_text(&fixture.tradition, shoures, "showers")
        .await
        .unwrap();

    let groups = fixture
        .editor
        .identical_readings(&fixture.tradition, 0, 10)
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(groups[0].iter().all(|r| r.text == "showers"));
}

#[tokio::test]
async fn test_identical_readings_empty_without_duplicates() {
    let fixture = forked_fixture().await;

    let groups = fixture
        .editor
        .identical_readings(&fixture.tradition, 0, 10)
        .await
        .unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_could_be_identical_excludes_forced_order() {
    // "sweet" renamed to "april" shares text with april(1) but every
    // path orders them, so the pair is not mergeable.
    let fixture = forked_fixture().await;
    let sweet = fixture.ids[3];

    fixture
        .editor
        .set_reading_text(&fixture.tradition, sweet, "april")
        .await
        .unwrap();

    let groups = fixture
        .editor
        .could_be_identical_readings(&fixture.tradition, 0, 10)
        .await
        .unwrap();
    assert!(groups.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Phase 5: Atomicity
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_rejected_operation_changes_nothing() {
    let fixture = forked_fixture().await;
    let showers = fixture.ids[1];

    let before = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();

    // Fails the same-text precondition.
    let err = fixture
        .editor
        .merge(&fixture.tradition, showers, fixture.ids[2])
        .await;
    assert!(err.is_err());

    let after = fixture
        .editor
        .store()
        .section(&fixture.tradition)
        .await
        .unwrap();
    assert_eq!(after.num_readings(), before.num_readings());
    assert_eq!(after.num_sequence_edges(), before.num_sequence_edges());
    assert_eq!(after.relations().count(), before.relations().count());
}

#[tokio::test]
async fn test_unknown_tradition_is_reported() {
    let fixture = forked_fixture().await;

    let err = fixture
        .editor
        .all_readings(&TraditionId::from("missing"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing"));
}
