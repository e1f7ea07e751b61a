//! In-memory reference implementations of the boundary traits
//!
//! A process-local revision store, identifier service, and graph reader,
//! sufficient to embed the editing core without a server: branches live in a
//! guarded map, revisions are a monotonic counter, identifier issuance is a
//! sequential counter with a reclaimed-id pool, and taxonomy queries walk
//! the stored arena's active IS-A edges.

use crate::arena::GraphArena;
use crate::component::GraphComponent;
use crate::error::{Result, TermError};
use crate::refset::ReferenceSetMember;
use crate::sctid;
use crate::traits::{
    BranchRegistry, GraphSnapshot, IdentifierService, ReleasedStateSource, RevisionDraft,
    RevisionStore, TaxonomyView, TerminologyReader,
};
use crate::types::{
    BranchPath, ComponentCategory, ComponentId, ComponentKey, IdNamespace, RevisionId,
};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// MemoryStore
// =============================================================================

#[derive(Debug, Clone)]
struct BranchState {
    head: RevisionId,
    arena: GraphArena,
}

/// Process-local revision store.
///
/// Each branch holds its full arena at its current tip; a commit applies the
/// draft and advances the branch head to a globally monotonic revision.
#[derive(Debug, Default)]
pub struct MemoryStore {
    branches: Mutex<FxHashMap<BranchPath, BranchState>>,
    next_revision: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store with a `MAIN` branch at revision 0.
    pub fn new() -> Self {
        let store = Self::default();
        store.create_branch(BranchPath::main());
        store
    }

    /// Register a branch, empty, at revision 0. Idempotent.
    pub fn create_branch(&self, branch: BranchPath) {
        self.branches
            .lock()
            .entry(branch)
            .or_insert_with(|| BranchState {
                head: RevisionId::new(0),
                arena: GraphArena::new(),
            });
    }

    /// Fork a child branch carrying a copy of the parent's current content.
    pub fn fork_branch(&self, parent: &BranchPath, segment: &str) -> Result<BranchPath> {
        let child = parent
            .child(segment)
            .ok_or_else(|| TermError::InvalidOperation(format!("invalid segment {:?}", segment)))?;
        let mut branches = self.branches.lock();
        let parent_state = branches
            .get(parent)
            .ok_or_else(|| TermError::NotFound {
                id: parent.to_string(),
            })?
            .clone();
        branches.insert(child.clone(), parent_state);
        Ok(child)
    }

    /// Seed a branch with content, for bootstrap and tests.
    pub fn seed(&self, branch: &BranchPath, arena: GraphArena) -> Result<RevisionId> {
        let mut branches = self.branches.lock();
        let state = branches.get_mut(branch).ok_or_else(|| TermError::NotFound {
            id: branch.to_string(),
        })?;
        let revision = RevisionId::new(self.next_revision.fetch_add(1, Ordering::SeqCst) + 1);
        state.arena = arena;
        state.head = revision;
        Ok(revision)
    }

    /// Run a closure over a branch's current arena.
    pub fn with_arena<T>(
        &self,
        branch: &BranchPath,
        f: impl FnOnce(&GraphArena) -> T,
    ) -> Result<T> {
        let branches = self.branches.lock();
        let state = branches.get(branch).ok_or_else(|| TermError::NotFound {
            id: branch.to_string(),
        })?;
        Ok(f(&state.arena))
    }
}

impl RevisionStore for MemoryStore {
    fn read_snapshot(&self, branch: &BranchPath) -> Result<GraphSnapshot> {
        let branches = self.branches.lock();
        let state = branches.get(branch).ok_or_else(|| TermError::NotFound {
            id: branch.to_string(),
        })?;
        Ok(GraphSnapshot {
            head: state.head,
            arena: state.arena.clone(),
        })
    }

    fn head(&self, branch: &BranchPath) -> Result<RevisionId> {
        let branches = self.branches.lock();
        branches
            .get(branch)
            .map(|state| state.head)
            .ok_or_else(|| TermError::NotFound {
                id: branch.to_string(),
            })
    }

    fn commit(&self, branch: &BranchPath, draft: RevisionDraft) -> Result<RevisionId> {
        let mut branches = self.branches.lock();
        let state = branches.get_mut(branch).ok_or_else(|| TermError::NotFound {
            id: branch.to_string(),
        })?;
        for key in &draft.deleted {
            state.arena.remove(key);
        }
        for component in draft.created.iter().chain(draft.changed.iter()) {
            state.arena.insert(component.clone());
        }
        let revision = RevisionId::new(self.next_revision.fetch_add(1, Ordering::SeqCst) + 1);
        state.head = revision;
        Ok(revision)
    }
}

impl ReleasedStateSource for MemoryStore {
    fn released_state(
        &self,
        branch: &BranchPath,
        key: &ComponentKey,
    ) -> Result<Option<GraphComponent>> {
        let branches = self.branches.lock();
        let Some(state) = branches.get(branch) else {
            return Ok(None);
        };
        let released = state.arena.get(key).filter(|component| match component {
            GraphComponent::Concept(c) => c.released,
            GraphComponent::Description(d) => d.released,
            GraphComponent::Relationship(r) => r.released,
            GraphComponent::Member(m) => m.released,
            GraphComponent::RefSet(_) => false,
        });
        Ok(released)
    }
}

impl BranchRegistry for MemoryStore {
    fn ancestry(&self, path: &BranchPath) -> Result<Vec<BranchPath>> {
        let branches = self.branches.lock();
        if !branches.contains_key(path) {
            return Err(TermError::NotFound {
                id: path.to_string(),
            });
        }
        Ok(path.ancestry().collect())
    }
}

// =============================================================================
// SequentialIdService
// =============================================================================

/// Identifier service backed by a sequential item counter.
///
/// Released identifiers go to a free pool and are handed out again before
/// fresh ones, which keeps the id space dense and exercises the editing
/// context's collision repair in tests.
#[derive(Debug)]
pub struct SequentialIdService {
    next_item: AtomicU64,
    pool: Mutex<Vec<ComponentId>>,
}

impl SequentialIdService {
    /// Create a service issuing item numbers from 100000 upward.
    pub fn new() -> Self {
        Self::starting_at(100_000)
    }

    /// Create a service issuing item numbers from `first_item` upward.
    pub fn starting_at(first_item: u64) -> Self {
        Self {
            next_item: AtomicU64::new(first_item),
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Number of identifiers currently in the reclaimed pool.
    pub fn pooled(&self) -> usize {
        self.pool.lock().len()
    }
}

impl Default for SequentialIdService {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierService for SequentialIdService {
    fn generate(
        &self,
        category: ComponentCategory,
        namespace: IdNamespace,
    ) -> Result<ComponentId> {
        {
            let mut pool = self.pool.lock();
            if let Some(pos) = pool
                .iter()
                .position(|id| sctid::category_of(id.as_str()) == Some(category))
            {
                return Ok(pool.swap_remove(pos));
            }
        }
        let item = self.next_item.fetch_add(1, Ordering::SeqCst);
        sctid::compose(item, namespace, category)
            .map(ComponentId::from)
            .ok_or_else(|| {
                TermError::InvalidOperation(format!(
                    "cannot compose identifier for item {} in namespace {}",
                    item, namespace
                ))
            })
    }

    fn release(&self, ids: &FxHashSet<ComponentId>) -> Result<()> {
        let mut pool = self.pool.lock();
        pool.extend(ids.iter().cloned());
        Ok(())
    }
}

// =============================================================================
// ArenaReader
// =============================================================================

/// Graph reader answering taxonomy and member queries from an arena.
///
/// Bind one to a freshly read snapshot to query a branch tip.
#[derive(Debug, Clone, Copy)]
pub struct ArenaReader<'a> {
    arena: &'a GraphArena,
}

impl<'a> ArenaReader<'a> {
    /// Create a reader over an arena.
    pub fn new(arena: &'a GraphArena) -> Self {
        Self { arena }
    }

    fn parents_of(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.arena
            .outbound_relationships(id)
            .filter(|r| r.active && r.is_taxonomy_edge())
            .filter_map(|r| r.destination_id.clone())
            .collect()
    }

    fn children_of(&self, id: &ComponentId) -> Vec<ComponentId> {
        self.arena
            .inbound_relationships(id)
            .filter(|r| r.active && r.is_taxonomy_edge())
            .filter_map(|r| r.source_id.clone())
            .collect()
    }

    fn closure(
        &self,
        id: &ComponentId,
        step: impl Fn(&Self, &ComponentId) -> Vec<ComponentId>,
    ) -> FxHashSet<ComponentId> {
        let mut seen = FxHashSet::default();
        let mut frontier = step(self, id);
        while let Some(next) = frontier.pop() {
            if next != *id && seen.insert(next.clone()) {
                frontier.extend(step(self, &next));
            }
        }
        seen
    }
}

impl TaxonomyView for ArenaReader<'_> {
    fn ancestors_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>> {
        Ok(self.closure(id, Self::parents_of))
    }

    fn descendants_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>> {
        Ok(self.closure(id, Self::children_of))
    }
}

impl TerminologyReader for ArenaReader<'_> {
    fn active_members_referencing(&self, id: &ComponentId) -> Result<Vec<ReferenceSetMember>> {
        Ok(self
            .arena
            .members_referencing_component(id)
            .filter(|m| m.active)
            .cloned()
            .collect())
    }

    fn find_by_ids(&self, ids: &[ComponentId]) -> Result<Vec<GraphComponent>> {
        let mut found = Vec::new();
        for id in ids {
            for key in [
                ComponentKey::Concept(id.clone()),
                ComponentKey::Description(id.clone()),
                ComponentKey::Relationship(id.clone()),
                ComponentKey::RefSet(id.clone()),
            ] {
                if let Some(component) = self.arena.get(&key) {
                    found.push(component);
                }
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Concept, Relationship};
    use crate::constants;

    fn module() -> ComponentId {
        constants::CORE_MODULE.clone()
    }

    fn concept(id: &str) -> GraphComponent {
        GraphComponent::Concept(Concept::new(ComponentId::from(id), module()))
    }

    fn isa(id: &str, source: &str, destination: &str) -> GraphComponent {
        GraphComponent::Relationship(Relationship::new(
            ComponentId::from(id),
            ComponentId::from(source),
            constants::IS_A.clone(),
            ComponentId::from(destination),
            module(),
        ))
    }

    fn three_level_arena() -> GraphArena {
        // root <- mid <- leaf
        let mut arena = GraphArena::new();
        arena.insert(concept("138875005"));
        arena.insert(concept("404684003"));
        arena.insert(concept("64572001"));
        arena.insert(isa("100022", "404684003", "138875005"));
        arena.insert(isa("100123029", "64572001", "404684003"));
        arena
    }

    #[test]
    fn test_memory_store_snapshot_and_commit_cycle() {
        let store = MemoryStore::new();
        let main = BranchPath::main();
        assert_eq!(store.head(&main).unwrap(), RevisionId::new(0));

        let draft = RevisionDraft {
            message: "add root".into(),
            created: vec![concept("138875005")],
            changed: vec![],
            deleted: vec![],
        };
        let r1 = store.commit(&main, draft).unwrap();
        assert!(r1 > RevisionId::new(0));

        let snapshot = store.read_snapshot(&main).unwrap();
        assert_eq!(snapshot.head, r1);
        assert!(snapshot
            .arena
            .concept(&ComponentId::from("138875005"))
            .is_some());
    }

    #[test]
    fn test_memory_store_unknown_branch_errors() {
        let store = MemoryStore::new();
        let missing = BranchPath::new("MAIN/none").unwrap();
        assert!(matches!(
            store.read_snapshot(&missing),
            Err(TermError::NotFound { .. })
        ));
        assert!(matches!(
            store.head(&missing),
            Err(TermError::NotFound { .. })
        ));
    }

    #[test]
    fn test_memory_store_fork_copies_content() {
        let store = MemoryStore::new();
        let main = BranchPath::main();
        store.seed(&main, three_level_arena()).unwrap();
        let task = store.fork_branch(&main, "task-1").unwrap();

        let snapshot = store.read_snapshot(&task).unwrap();
        assert_eq!(snapshot.arena.len(), 5, "Fork carries the parent content");
    }

    #[test]
    fn test_memory_store_commit_applies_deletes() {
        let store = MemoryStore::new();
        let main = BranchPath::main();
        store.seed(&main, three_level_arena()).unwrap();
        store
            .commit(
                &main,
                RevisionDraft {
                    message: "drop leaf".into(),
                    created: vec![],
                    changed: vec![],
                    deleted: vec![ComponentKey::Concept(ComponentId::from("64572001"))],
                },
            )
            .unwrap();
        let snapshot = store.read_snapshot(&main).unwrap();
        assert!(snapshot
            .arena
            .concept(&ComponentId::from("64572001"))
            .is_none());
    }

    #[test]
    fn test_branch_registry_ancestry() {
        let store = MemoryStore::new();
        let main = BranchPath::main();
        store.fork_branch(&main, "ext").unwrap();
        let ext = BranchPath::new("MAIN/ext").unwrap();
        let ancestry = store.ancestry(&ext).unwrap();
        assert_eq!(ancestry, vec![ext.clone(), main]);
    }

    #[test]
    fn test_sequential_ids_are_valid_and_unique() {
        let service = SequentialIdService::new();
        let mut seen = FxHashSet::default();
        for _ in 0..50 {
            let id = service
                .generate(ComponentCategory::Concept, IdNamespace::INTERNATIONAL)
                .unwrap();
            assert!(sctid::is_valid(id.as_str()), "{} should be valid", id);
            assert!(seen.insert(id), "Generated ids must not repeat");
        }
    }

    #[test]
    fn test_released_ids_are_reissued_per_category() {
        let service = SequentialIdService::new();
        let concept_id = service
            .generate(ComponentCategory::Concept, IdNamespace::INTERNATIONAL)
            .unwrap();
        let mut released = FxHashSet::default();
        released.insert(concept_id.clone());
        service.release(&released).unwrap();
        assert_eq!(service.pooled(), 1);

        // A description request must not receive the pooled concept id.
        let description_id = service
            .generate(ComponentCategory::Description, IdNamespace::INTERNATIONAL)
            .unwrap();
        assert_ne!(description_id, concept_id);
        assert_eq!(service.pooled(), 1);

        let reissued = service
            .generate(ComponentCategory::Concept, IdNamespace::INTERNATIONAL)
            .unwrap();
        assert_eq!(reissued, concept_id, "Pooled id should be reissued first");
        assert_eq!(service.pooled(), 0);
    }

    #[test]
    fn test_arena_reader_taxonomy_closure() {
        let arena = three_level_arena();
        let reader = ArenaReader::new(&arena);

        let leaf = ComponentId::from("64572001");
        let mid = ComponentId::from("404684003");
        let root = ComponentId::from("138875005");

        let ancestors = reader.ancestors_of(&leaf).unwrap();
        assert_eq!(ancestors.len(), 2);
        assert!(ancestors.contains(&mid) && ancestors.contains(&root));

        let descendants = reader.descendants_of(&root).unwrap();
        assert_eq!(descendants.len(), 2);
        assert!(descendants.contains(&mid) && descendants.contains(&leaf));

        assert!(
            !reader.ancestors_of(&root).unwrap().contains(&root),
            "Closure is exclusive of the queried id"
        );
    }

    #[test]
    fn test_arena_reader_ignores_inactive_edges() {
        let mut arena = three_level_arena();
        arena
            .relationship_mut(&ComponentId::from("100123029"))
            .unwrap()
            .active = false;
        let reader = ArenaReader::new(&arena);
        assert!(
            reader
                .ancestors_of(&ComponentId::from("64572001"))
                .unwrap()
                .is_empty(),
            "Inactive IS-A edges do not contribute to the taxonomy"
        );
    }
}
