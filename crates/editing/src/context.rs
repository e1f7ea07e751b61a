//! The editing context: a staging transaction over a branch snapshot
//!
//! A context is bound to a branch snapshot at open time and buffers all
//! mutations locally in three disjoint sets (`created`, `changed`,
//! `detached`) plus a per-entity delta log. Nothing is visible outside the
//! context until `commit` hands an atomic revision draft to the store.
//!
//! # Lifecycle
//!
//! 1. **OPEN**: `EditingContext::open` reads a snapshot of the branch tip
//! 2. **EDIT**: create/apply/plan-delete/inactivate
//! 3. **COMMIT**: `commit` persists and clears the buffered sets; generated
//!    identifiers are retained
//! 4. **CLOSE**: `close` (or drop) releases every pending identifier back to
//!    the identifier service, the one piece of shared state that must be
//!    reclaimed on every failure or abandonment path

use crate::change::{apply_change, Change};
use crate::config::EditingConfig;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use termgraph_core::arena::GraphArena;
use termgraph_core::component::{Concept, Description, GraphComponent, Relationship};
use termgraph_core::error::{Result, TermError};
use termgraph_core::refset::{MemberPayload, ReferenceSet, ReferenceSetMember};
use termgraph_core::traits::{IdentifierService, RevisionDraft, RevisionStore};
use termgraph_core::types::{
    BranchPath, ComponentCategory, ComponentId, ComponentKey, MemberId, RevisionId,
};
use tracing::{debug, info, warn};

/// A staging transaction over a branch-qualified snapshot of the graph.
pub struct EditingContext {
    branch: BranchPath,
    head: RevisionId,
    arena: GraphArena,
    created: BTreeSet<ComponentKey>,
    changed: BTreeMap<ComponentKey, Vec<Change>>,
    detached: BTreeSet<ComponentKey>,
    pending_ids: FxHashSet<ComponentId>,
    ids: Arc<dyn IdentifierService>,
    config: EditingConfig,
    closed: bool,
}

impl EditingContext {
    /// Open a context against the current tip of `branch`.
    pub fn open(
        store: &dyn RevisionStore,
        ids: Arc<dyn IdentifierService>,
        branch: BranchPath,
        config: EditingConfig,
    ) -> Result<Self> {
        let snapshot = store.read_snapshot(&branch)?;
        debug!(
            target: "termgraph::editing",
            branch = %branch,
            head = %snapshot.head,
            "Editing context opened"
        );
        Ok(Self {
            branch,
            head: snapshot.head,
            arena: snapshot.arena,
            created: BTreeSet::new(),
            changed: BTreeMap::new(),
            detached: BTreeSet::new(),
            pending_ids: FxHashSet::default(),
            ids,
            config,
            closed: false,
        })
    }

    // === Introspection ===

    /// The branch this context edits.
    pub fn branch(&self) -> &BranchPath {
        &self.branch
    }

    /// The revision the snapshot was taken at.
    pub fn head(&self) -> RevisionId {
        self.head
    }

    /// The context's component store: snapshot plus local edits.
    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }

    /// Mutable access to the component store.
    ///
    /// Reserved for reconciliation: mutations made here bypass delta
    /// tracking, so ordinary edits must go through [`EditingContext::apply`].
    pub fn arena_mut(&mut self) -> &mut GraphArena {
        &mut self.arena
    }

    /// The context's configuration.
    pub fn config(&self) -> &EditingConfig {
        &self.config
    }

    /// Entities created in this context, in deterministic order.
    pub fn created(&self) -> &BTreeSet<ComponentKey> {
        &self.created
    }

    /// Deltas recorded against pre-existing entities, in deterministic order.
    pub fn changed(&self) -> &BTreeMap<ComponentKey, Vec<Change>> {
        &self.changed
    }

    /// Pre-existing entities removed in this context, in deterministic order.
    pub fn detached(&self) -> &BTreeSet<ComponentKey> {
        &self.detached
    }

    /// Whether the context buffers any uncommitted work.
    pub fn is_dirty(&self) -> bool {
        !self.created.is_empty() || !self.changed.is_empty() || !self.detached.is_empty()
    }

    /// Whether the context has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Identifiers generated in this context and not yet committed.
    pub fn pending_ids(&self) -> &FxHashSet<ComponentId> {
        &self.pending_ids
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TermError::InvalidOperation(format!(
                "editing context on {} is closed",
                self.branch
            )))
        } else {
            Ok(())
        }
    }

    // === Creation ===

    /// Create a new concept with a generated identifier.
    pub fn create_concept(&mut self) -> Result<ComponentId> {
        self.ensure_open()?;
        let id = self.generate_id(ComponentCategory::Concept)?;
        let concept = Concept::new(id.clone(), self.config.default_module_id.clone());
        self.arena.insert(GraphComponent::Concept(concept));
        self.record_create(ComponentKey::Concept(id.clone()));
        Ok(id)
    }

    /// Create a new description under an existing concept.
    pub fn add_description(
        &mut self,
        concept_id: &ComponentId,
        term: impl Into<String>,
        type_id: ComponentId,
    ) -> Result<ComponentId> {
        self.ensure_open()?;
        if self.arena.concept(concept_id).is_none() {
            return Err(TermError::NotFound {
                id: concept_id.to_string(),
            });
        }
        let id = self.generate_id(ComponentCategory::Description)?;
        let description = Description::new(
            id.clone(),
            concept_id.clone(),
            term,
            type_id,
            self.config.default_module_id.clone(),
        );
        self.arena.insert(GraphComponent::Description(description));
        self.record_create(ComponentKey::Description(id.clone()));
        Ok(id)
    }

    /// Create a new relationship between two existing concepts.
    pub fn add_relationship(
        &mut self,
        source_id: &ComponentId,
        type_id: ComponentId,
        destination_id: &ComponentId,
    ) -> Result<ComponentId> {
        self.ensure_open()?;
        for endpoint in [source_id, destination_id] {
            if self.arena.concept(endpoint).is_none() {
                return Err(TermError::NotFound {
                    id: endpoint.to_string(),
                });
            }
        }
        let id = self.generate_id(ComponentCategory::Relationship)?;
        let relationship = Relationship::new(
            id.clone(),
            source_id.clone(),
            type_id,
            destination_id.clone(),
            self.config.default_module_id.clone(),
        );
        self.arena
            .insert(GraphComponent::Relationship(relationship));
        self.record_create(ComponentKey::Relationship(id.clone()));
        Ok(id)
    }

    /// Register a reference set identified by an existing concept.
    pub fn create_reference_set(&mut self, refset: ReferenceSet) -> Result<()> {
        self.ensure_open()?;
        if self.arena.concept(&refset.identifier_id).is_none() {
            return Err(TermError::NotFound {
                id: refset.identifier_id.to_string(),
            });
        }
        if self.arena.refset(&refset.identifier_id).is_some() {
            return Err(TermError::InvalidOperation(format!(
                "concept {} already identifies a reference set",
                refset.identifier_id
            )));
        }
        let key = ComponentKey::RefSet(refset.identifier_id.clone());
        self.arena.insert(GraphComponent::RefSet(refset));
        self.record_create(key);
        Ok(())
    }

    /// Attach a new member to a reference set.
    ///
    /// When the reference set is present in the arena the payload is checked
    /// against its kind; members of metadata sets that are not loaded are
    /// accepted as-is.
    pub fn add_member(
        &mut self,
        refset_id: &ComponentId,
        referenced_component_id: &ComponentId,
        payload: MemberPayload,
    ) -> Result<MemberId> {
        self.ensure_open()?;
        let member = ReferenceSetMember::new(
            refset_id.clone(),
            referenced_component_id.clone(),
            self.config.default_module_id.clone(),
            payload,
        );
        if let Some(refset) = self.arena.refset(refset_id) {
            refset.validate_member(&member)?;
        }
        let uuid = member.uuid;
        self.arena.insert(GraphComponent::Member(member));
        self.record_create(ComponentKey::Member(uuid));
        Ok(uuid)
    }

    /// Set a description's acceptability in a language reference set.
    ///
    /// Updates the existing active language member when one exists, creates
    /// one otherwise.
    pub fn set_acceptability(
        &mut self,
        description_id: &ComponentId,
        language_refset_id: &ComponentId,
        acceptability_id: ComponentId,
    ) -> Result<MemberId> {
        self.ensure_open()?;
        let existing = self
            .arena
            .members_referencing_component(description_id)
            .find(|m| {
                m.active
                    && m.refset_id == *language_refset_id
                    && matches!(m.payload, MemberPayload::Language { .. })
            })
            .map(|m| m.uuid);
        if let Some(uuid) = existing {
            self.apply(
                &ComponentKey::Member(uuid),
                Change::SetAcceptability(acceptability_id),
            )?;
            Ok(uuid)
        } else {
            self.add_member(
                language_refset_id,
                description_id,
                MemberPayload::Language { acceptability_id },
            )
        }
    }

    // === Mutation ===

    /// Apply a field-level change and record it for replay.
    ///
    /// Changes to entities created in this context are folded into the
    /// created entity; changes to pre-existing entities are appended to the
    /// delta log. Released components accept only the changes
    /// [`Change::allowed_on_released`] permits.
    pub fn apply(&mut self, key: &ComponentKey, change: Change) -> Result<()> {
        self.ensure_open()?;
        if self.detached.contains(key) {
            return Err(TermError::InvalidOperation(format!(
                "{} was detached in this context",
                key
            )));
        }
        if self.arena.is_released(key) && !change.allowed_on_released() {
            return Err(TermError::InvalidOperation(format!(
                "{} is released; {:?} would alter an identifying field",
                key, change
            )));
        }
        apply_change(&mut self.arena, key, change.clone())?;
        if !self.created.contains(key) {
            self.changed.entry(key.clone()).or_default().push(change);
        }
        Ok(())
    }

    // === Bookkeeping shared with the planners and the merge engine ===

    /// Track an entity as created in this context.
    pub fn record_create(&mut self, key: ComponentKey) {
        self.changed.remove(&key);
        self.detached.remove(&key);
        self.created.insert(key);
    }

    /// Track the removal of an entity.
    ///
    /// An entity created in this context simply vanishes; a pre-existing one
    /// moves to the detached set.
    pub fn record_removal(&mut self, key: &ComponentKey) {
        if self.created.remove(key) {
            self.changed.remove(key);
        } else {
            self.changed.remove(key);
            self.detached.insert(key.clone());
        }
    }

    /// Note an identifier as pending in this context.
    pub fn record_pending_id(&mut self, id: ComponentId) {
        self.pending_ids.insert(id);
    }

    /// Handle to the identifier service this context allocates from.
    pub(crate) fn ids_service(&self) -> Arc<dyn IdentifierService> {
        Arc::clone(&self.ids)
    }

    /// Drop a key from the created set without touching the arena.
    pub(crate) fn untrack_created(&mut self, key: &ComponentKey) -> bool {
        self.created.remove(key)
    }

    /// Hand the pending identifiers over to another owner.
    ///
    /// Used by the merge engine: migrated entities keep their identifiers,
    /// so the fresh context takes responsibility for releasing them.
    pub fn take_pending_ids(&mut self) -> FxHashSet<ComponentId> {
        std::mem::take(&mut self.pending_ids)
    }

    /// Adopt pending identifiers handed over by another context.
    pub fn absorb_pending_ids(&mut self, ids: FxHashSet<ComponentId>) {
        self.pending_ids.extend(ids);
    }

    // === Commit / close ===

    /// Commit the buffered work as one atomic revision.
    ///
    /// Fails when the branch tip has advanced since this context opened;
    /// the caller then merges onto a freshly opened context and retries.
    /// On success the buffered sets are cleared and generated identifiers
    /// are retained (they are now in use). On failure the context stays
    /// open and untouched so the caller can reconcile and retry.
    pub fn commit(&mut self, store: &dyn RevisionStore, message: &str) -> Result<RevisionId> {
        self.ensure_open()?;
        if !self.is_dirty() {
            return Err(TermError::InvalidOperation(format!(
                "nothing to commit on {}",
                self.branch
            )));
        }
        let tip = store.head(&self.branch)?;
        if tip != self.head {
            warn!(
                target: "termgraph::editing",
                branch = %self.branch,
                opened_at = %self.head,
                tip = %tip,
                "Context is stale; reconcile before committing"
            );
            return Err(TermError::InvalidOperation(format!(
                "branch {} advanced to {} since this context opened at {}; reconcile and retry",
                self.branch, tip, self.head
            )));
        }
        let draft = RevisionDraft {
            message: message.to_string(),
            created: self
                .created
                .iter()
                .filter_map(|key| self.arena.get(key))
                .collect(),
            changed: self
                .changed
                .keys()
                .filter_map(|key| self.arena.get(key))
                .collect(),
            deleted: self.detached.iter().cloned().collect(),
        };
        match store.commit(&self.branch, draft) {
            Ok(revision) => {
                info!(
                    target: "termgraph::editing",
                    branch = %self.branch,
                    revision = %revision,
                    created = self.created.len(),
                    changed = self.changed.len(),
                    deleted = self.detached.len(),
                    "Revision committed"
                );
                self.head = revision;
                self.created.clear();
                self.changed.clear();
                self.detached.clear();
                self.pending_ids.clear();
                Ok(revision)
            }
            Err(e) => {
                warn!(
                    target: "termgraph::editing",
                    branch = %self.branch,
                    error = %e,
                    "Commit failed"
                );
                Err(e)
            }
        }
    }

    /// Abandon the context, releasing every pending identifier.
    ///
    /// Idempotent; buffered work is discarded without persisted effect.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let pending = std::mem::take(&mut self.pending_ids);
        if !pending.is_empty() {
            self.ids.release(&pending)?;
        }
        self.created.clear();
        self.changed.clear();
        self.detached.clear();
        debug!(
            target: "termgraph::editing",
            branch = %self.branch,
            released = pending.len(),
            "Editing context closed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for EditingContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingContext")
            .field("branch", &self.branch)
            .field("head", &self.head)
            .field("created", &self.created.len())
            .field("changed", &self.changed.len())
            .field("detached", &self.detached.len())
            .field("pending_ids", &self.pending_ids.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl Drop for EditingContext {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.close() {
                warn!(
                    target: "termgraph::editing",
                    branch = %self.branch,
                    error = %e,
                    "Failed to release pending identifiers on drop"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termgraph_core::component::Component;
    use termgraph_core::constants;
    use termgraph_core::memory::{MemoryStore, SequentialIdService};
    use termgraph_core::refset::ReferenceSetType;
    use termgraph_core::types::IdNamespace;

    fn open_context() -> (MemoryStore, Arc<SequentialIdService>, EditingContext) {
        let store = MemoryStore::new();
        let ids = Arc::new(SequentialIdService::new());
        let ctx = EditingContext::open(
            &store,
            ids.clone(),
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        (store, ids, ctx)
    }

    #[test]
    fn test_open_clean_context() {
        let (_, _, ctx) = open_context();
        assert!(!ctx.is_dirty());
        assert!(!ctx.is_closed());
        assert_eq!(ctx.head(), RevisionId::new(0));
    }

    #[test]
    fn test_create_concept_tracks_created_and_pending() {
        let (_, _, mut ctx) = open_context();
        let id = ctx.create_concept().unwrap();
        assert!(ctx.arena().concept(&id).is_some());
        assert!(ctx.created().contains(&ComponentKey::Concept(id.clone())));
        assert!(ctx.pending_ids().contains(&id));
        assert!(ctx.is_dirty());
    }

    #[test]
    fn test_add_description_requires_concept() {
        let (_, _, mut ctx) = open_context();
        let err = ctx
            .add_description(
                &ComponentId::from("404684003"),
                "Missing",
                constants::SYNONYM.clone(),
            )
            .unwrap_err();
        assert!(matches!(err, TermError::NotFound { .. }));
    }

    #[test]
    fn test_commit_clears_buffers_and_retains_ids() {
        let (store, ids, mut ctx) = open_context();
        let concept_id = ctx.create_concept().unwrap();
        ctx.add_description(&concept_id, "Thing (thing)", constants::FULLY_SPECIFIED_NAME.clone())
            .unwrap();

        let revision = ctx.commit(&store, "add concept with fsn").unwrap();
        assert!(revision > RevisionId::new(0));
        assert!(!ctx.is_dirty());
        assert!(ctx.pending_ids().is_empty());
        assert_eq!(ids.pooled(), 0, "Committed identifiers are retained");

        let snapshot = store.read_snapshot(&BranchPath::main()).unwrap();
        assert!(snapshot.arena.concept(&concept_id).is_some());
        assert_eq!(snapshot.arena.descriptions_of(&concept_id).count(), 1);
    }

    #[test]
    fn test_commit_clean_context_is_invalid() {
        let (store, _, mut ctx) = open_context();
        let err = ctx.commit(&store, "noop").unwrap_err();
        assert!(matches!(err, TermError::InvalidOperation(_)));
    }

    #[test]
    fn test_close_releases_pending_ids() {
        let (_, ids, mut ctx) = open_context();
        ctx.create_concept().unwrap();
        ctx.create_concept().unwrap();
        ctx.close().unwrap();
        assert!(ctx.is_closed());
        assert_eq!(ids.pooled(), 2, "Abandoned identifiers return to the pool");

        // Idempotent
        ctx.close().unwrap();
        assert_eq!(ids.pooled(), 2);
    }

    #[test]
    fn test_drop_releases_pending_ids() {
        let (_, ids, mut ctx) = open_context();
        ctx.create_concept().unwrap();
        drop(ctx);
        assert_eq!(ids.pooled(), 1, "Drop releases what close would");
    }

    #[test]
    fn test_operations_on_closed_context_fail() {
        let (_, _, mut ctx) = open_context();
        ctx.close().unwrap();
        assert!(matches!(
            ctx.create_concept(),
            Err(TermError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_apply_on_created_entity_folds_into_creation() {
        let (_, _, mut ctx) = open_context();
        let id = ctx.create_concept().unwrap();
        let key = ComponentKey::Concept(id.clone());
        ctx.apply(&key, Change::SetDefinitionStatus(constants::FULLY_DEFINED.clone()))
            .unwrap();
        assert!(
            ctx.changed().is_empty(),
            "Changes to created entities fold into the creation"
        );
        assert_eq!(
            ctx.arena().concept(&id).unwrap().definition_status_id,
            *constants::FULLY_DEFINED
        );
    }

    #[test]
    fn test_apply_on_snapshot_entity_records_delta() {
        let (store, ids, _seed) = open_context();
        // Seed the branch with a committed concept, then reopen.
        let mut seeding = EditingContext::open(
            &store,
            ids.clone(),
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        let id = seeding.create_concept().unwrap();
        seeding.commit(&store, "seed").unwrap();

        let mut ctx = EditingContext::open(
            &store,
            ids,
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        let key = ComponentKey::Concept(id.clone());
        ctx.apply(&key, Change::SetActive(false)).unwrap();
        assert_eq!(ctx.changed().get(&key).map(Vec::len), Some(1));
        assert!(!ctx.arena().concept(&id).unwrap().active);
    }

    #[test]
    fn test_released_component_rejects_identifying_change() {
        let (store, ids, mut ctx) = open_context();
        let concept_id = ctx.create_concept().unwrap();
        let description_id = ctx
            .add_description(&concept_id, "Term", constants::SYNONYM.clone())
            .unwrap();
        ctx.arena_mut()
            .description_mut(&description_id)
            .unwrap()
            .release(chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        ctx.commit(&store, "seed released").unwrap();

        let mut reopened = EditingContext::open(
            &store,
            ids,
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        let key = ComponentKey::Description(description_id);
        let err = reopened
            .apply(&key, Change::SetTerm("Renamed".into()))
            .unwrap_err();
        assert!(matches!(err, TermError::InvalidOperation(_)));

        // Activity still toggles on released components.
        reopened.apply(&key, Change::SetActive(false)).unwrap();
    }

    #[test]
    fn test_set_acceptability_updates_existing_member() {
        let (_, _, mut ctx) = open_context();
        let concept_id = ctx.create_concept().unwrap();
        let description_id = ctx
            .add_description(&concept_id, "Term", constants::SYNONYM.clone())
            .unwrap();

        let first = ctx
            .set_acceptability(
                &description_id,
                &constants::US_ENGLISH_LANGUAGE_REFSET,
                constants::PREFERRED.clone(),
            )
            .unwrap();
        let second = ctx
            .set_acceptability(
                &description_id,
                &constants::US_ENGLISH_LANGUAGE_REFSET,
                constants::ACCEPTABLE.clone(),
            )
            .unwrap();
        assert_eq!(first, second, "Existing member is updated, not duplicated");
        assert!(!ctx.arena().member(&first).unwrap().is_preferred_language());
    }

    #[test]
    fn test_create_reference_set_validates_identifier_concept() {
        let (_, _, mut ctx) = open_context();
        let refset = ReferenceSet::new(
            ComponentId::from("446609009"),
            ReferenceSetType::Simple,
            ComponentCategory::Concept,
        );
        assert!(matches!(
            ctx.create_reference_set(refset),
            Err(TermError::NotFound { .. })
        ));

        let concept_id = ctx.create_concept().unwrap();
        ctx.create_reference_set(ReferenceSet::new(
            concept_id.clone(),
            ReferenceSetType::Simple,
            ComponentCategory::Concept,
        ))
        .unwrap();
        assert!(ctx.arena().refset(&concept_id).is_some());

        let err = ctx
            .create_reference_set(ReferenceSet::new(
                concept_id,
                ReferenceSetType::Simple,
                ComponentCategory::Concept,
            ))
            .unwrap_err();
        assert!(matches!(err, TermError::InvalidOperation(_)));
    }

    #[test]
    fn test_add_member_validates_payload_against_known_refset() {
        let (_, _, mut ctx) = open_context();
        let concept_id = ctx.create_concept().unwrap();
        ctx.create_reference_set(ReferenceSet::new(
            concept_id.clone(),
            ReferenceSetType::Simple,
            ComponentCategory::Concept,
        ))
        .unwrap();

        let err = ctx
            .add_member(
                &concept_id.clone(),
                &concept_id,
                MemberPayload::Language {
                    acceptability_id: constants::PREFERRED.clone(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, TermError::UnsupportedComponentType { .. }));

        ctx.add_member(&concept_id.clone(), &concept_id, MemberPayload::Simple)
            .unwrap();
    }

    #[test]
    fn test_record_removal_distinguishes_created_and_snapshot() {
        let (store, ids, mut ctx) = open_context();
        let committed = ctx.create_concept().unwrap();
        ctx.commit(&store, "seed").unwrap();
        drop(ctx);

        let mut ctx = EditingContext::open(
            &store,
            ids,
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        let fresh = ctx.create_concept().unwrap();

        let fresh_key = ComponentKey::Concept(fresh);
        let committed_key = ComponentKey::Concept(committed);
        ctx.record_removal(&fresh_key);
        ctx.record_removal(&committed_key);

        assert!(!ctx.created().contains(&fresh_key));
        assert!(
            !ctx.detached().contains(&fresh_key),
            "A created entity vanishes instead of detaching"
        );
        assert!(ctx.detached().contains(&committed_key));
    }

    #[test]
    fn test_generated_ids_respect_configured_namespace() {
        let store = MemoryStore::new();
        let ids = Arc::new(SequentialIdService::new());
        let config = EditingConfig {
            default_namespace: IdNamespace::extension(1000154),
            ..EditingConfig::default()
        };
        let mut ctx =
            EditingContext::open(&store, ids, BranchPath::main(), config).unwrap();
        let id = ctx.create_concept().unwrap();
        assert!(
            id.as_str().contains("1000154"),
            "{} should embed the extension namespace",
            id
        );
    }
}
