//! End-to-end editing lifecycle: authoring, retirement, deletion
//!
//! Exercises the public facade the way a request handler would: open a
//! context against a branch, edit, commit, reopen, retire or delete, and
//! verify the persisted graph afterwards.

use proptest::prelude::*;
use std::sync::Arc;
use termgraph::memory::{ArenaReader, MemoryStore, SequentialIdService};
use termgraph::{
    constants, BranchPath, CancellationToken, Change, ComponentId, ComponentKey, EditingConfig,
    EditingContext, InactivationReason, MemberPayload, RevisionStore, TermError,
};

fn open(store: &MemoryStore, ids: &Arc<SequentialIdService>) -> EditingContext {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    EditingContext::open(
        store,
        ids.clone(),
        BranchPath::main(),
        EditingConfig::default(),
    )
    .expect("MAIN exists")
}

/// Author a three-level hierarchy root <- mid <- leaf and return the ids.
fn author_hierarchy(
    store: &MemoryStore,
    ids: &Arc<SequentialIdService>,
) -> (ComponentId, ComponentId, ComponentId) {
    let mut ctx = open(store, ids);
    let root = ctx.create_concept().unwrap();
    let mid = ctx.create_concept().unwrap();
    let leaf = ctx.create_concept().unwrap();
    for (concept, term) in [(&root, "Root"), (&mid, "Mid"), (&leaf, "Leaf")] {
        let fsn = format!("{} (test)", term);
        let description = ctx
            .add_description(concept, fsn, constants::FULLY_SPECIFIED_NAME.clone())
            .unwrap();
        ctx.set_acceptability(
            &description,
            &constants::US_ENGLISH_LANGUAGE_REFSET,
            constants::PREFERRED.clone(),
        )
        .unwrap();
    }
    ctx.add_relationship(&mid, constants::IS_A.clone(), &root)
        .unwrap();
    ctx.add_relationship(&leaf, constants::IS_A.clone(), &mid)
        .unwrap();
    ctx.commit(store, "author hierarchy").unwrap();
    (root, mid, leaf)
}

#[test]
fn authoring_round_trip_persists_the_graph() {
    let store = MemoryStore::new();
    let ids = Arc::new(SequentialIdService::new());
    let (root, mid, leaf) = author_hierarchy(&store, &ids);

    let snapshot = store.read_snapshot(&BranchPath::main()).unwrap();
    for concept in [&root, &mid, &leaf] {
        assert!(snapshot.arena.concept(concept).is_some());
        assert_eq!(snapshot.arena.descriptions_of(concept).count(), 1);
    }
    let reader = ArenaReader::new(&snapshot.arena);
    use termgraph::TaxonomyView;
    let descendants = reader.descendants_of(&root).unwrap();
    assert_eq!(descendants.len(), 2, "mid and leaf descend from root");
}

#[test]
fn retirement_cascades_to_descendants_and_attaches_indicators() {
    let store = MemoryStore::new();
    let ids = Arc::new(SequentialIdService::new());
    let (_, mid, leaf) = author_hierarchy(&store, &ids);

    let mut ctx = open(&store, &ids);
    let snapshot = ctx.arena().clone();
    let reader = ArenaReader::new(&snapshot);
    let plan = ctx
        .plan_inactivation(&reader, &[mid.clone()], &CancellationToken::new())
        .unwrap()
        .expect("not cancelled");
    assert!(plan.concepts().contains(&mid));
    assert!(
        plan.concepts().contains(&leaf),
        "leaf has no other ancestor path and retires with mid"
    );

    ctx.perform_inactivation(&plan, InactivationReason::Ambiguous, None)
        .unwrap();
    ctx.commit_plan(&store, "retire mid hierarchy")
        .unwrap()
        .expect("dirty context commits");

    let persisted = store.read_snapshot(&BranchPath::main()).unwrap();
    for concept in [&mid, &leaf] {
        assert!(!persisted.arena.concept(concept).unwrap().active);
        assert!(
            persisted
                .arena
                .members_referencing_component(concept)
                .any(|m| m.refset_id == *constants::CONCEPT_INACTIVATION_INDICATOR_REFSET),
            "{} carries an inactivation indicator",
            concept
        );
    }
}

#[test]
fn deletion_of_released_content_requires_force() {
    let store = MemoryStore::new();
    let ids = Arc::new(SequentialIdService::new());
    let (_, mid, _) = author_hierarchy(&store, &ids);

    // Publish mid, then try to delete it.
    let mut ctx = open(&store, &ids);
    {
        use termgraph::Component;
        ctx.arena_mut()
            .concept_mut(&mid)
            .unwrap()
            .release(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }
    let plan = ctx.plan_delete(
        &ComponentKey::Concept(mid.clone()),
        false,
        &CancellationToken::new(),
    );
    assert!(plan.is_rejected());
    let err = ctx.pre_commit(plan).unwrap_err();
    assert!(matches!(err, TermError::Rejected { .. }));

    let forced = ctx.plan_delete(
        &ComponentKey::Concept(mid.clone()),
        true,
        &CancellationToken::new(),
    );
    ctx.pre_commit(forced).unwrap();
    assert!(ctx.arena().concept(&mid).is_none());
    assert!(
        ctx.arena().dangling_references().is_empty(),
        "forced deletion still cascades completely"
    );
}

#[test]
fn stale_context_cannot_commit_past_an_advanced_tip() {
    let store = MemoryStore::new();
    let ids = Arc::new(SequentialIdService::new());
    let (root, _, _) = author_hierarchy(&store, &ids);

    let mut stale = open(&store, &ids);
    stale
        .apply(&ComponentKey::Concept(root.clone()), Change::SetActive(false))
        .unwrap();

    let mut other = open(&store, &ids);
    other.create_concept().unwrap();
    other.commit(&store, "advance the tip").unwrap();

    let err = stale.commit(&store, "late").unwrap_err();
    assert!(
        matches!(err, TermError::InvalidOperation(_)),
        "a stale context must be reconciled before committing"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Deleting any concept with force leaves no resolvable reference to it:
    /// no dangling ownership, no relationship endpoint, no member dependency.
    #[test]
    fn forced_deletion_never_leaves_danglers(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..12),
        member_targets in prop::collection::vec(0usize..6, 0..6),
        victim in 0usize..6,
    ) {
        let store = MemoryStore::new();
        let ids = Arc::new(SequentialIdService::new());
        let mut ctx = open(&store, &ids);

        let concepts: Vec<ComponentId> =
            (0..6).map(|_| ctx.create_concept().unwrap()).collect();
        for (source, destination) in edges {
            if source != destination {
                ctx.add_relationship(
                    &concepts[source],
                    constants::IS_A.clone(),
                    &concepts[destination],
                )
                .unwrap();
            }
        }
        for target in member_targets {
            ctx.add_member(
                &constants::SAME_AS_ASSOCIATION_REFSET,
                &concepts[0],
                MemberPayload::Association {
                    target_component_id: concepts[target].clone(),
                },
            )
            .unwrap();
        }
        ctx.commit(&store, "seed random graph").unwrap();
        drop(ctx);

        let mut ctx = open(&store, &ids);
        let victim_id = concepts[victim].clone();
        let plan = ctx.plan_delete(
            &ComponentKey::Concept(victim_id.clone()),
            true,
            &CancellationToken::new(),
        );
        prop_assert!(!plan.is_rejected());
        ctx.pre_commit(plan).unwrap();

        prop_assert!(ctx.arena().concept(&victim_id).is_none());
        prop_assert_eq!(ctx.arena().members_depending_on(&victim_id).count(), 0);
        prop_assert_eq!(ctx.arena().inbound_relationships(&victim_id).count(), 0);
        prop_assert_eq!(ctx.arena().outbound_relationships(&victim_id).count(), 0);
        prop_assert!(ctx.arena().dangling_references().is_empty());
    }

    /// However identifiers are generated and re-validated, no two components
    /// hold the same id at commit time.
    #[test]
    fn identifier_uniqueness_holds_under_revalidation(
        revalidate in prop::collection::vec(any::<bool>(), 8),
    ) {
        let store = MemoryStore::new();
        let ids = Arc::new(SequentialIdService::new());
        let mut ctx = open(&store, &ids);

        let mut concepts: Vec<ComponentId> = Vec::new();
        for _ in 0..8 {
            concepts.push(ctx.create_concept().unwrap());
        }
        for (concept, revalidate) in concepts.iter().zip(revalidate) {
            if revalidate {
                ctx.validate_and_replace(&ComponentKey::Concept(concept.clone()))
                    .unwrap();
            }
        }
        let distinct: std::collections::HashSet<&ComponentId> = ctx
            .created()
            .iter()
            .filter_map(|key| key.component_id())
            .collect();
        prop_assert_eq!(distinct.len(), 8);
        ctx.commit(&store, "commit validated ids").unwrap();
    }
}
