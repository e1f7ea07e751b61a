//! Concept and description retirement
//!
//! Retirement never deletes: components are marked inactive and traceability
//! is preserved through indicator and historical-association memberships.
//! Marking is idempotent, collection is cancellable to a `None` plan before
//! anything is applied, and descriptions are the deliberate exception: a
//! retired description keeps its `active` flag and is expressed as
//! non-current purely through its indicator membership.

use crate::context::EditingContext;
use crate::taxonomy::collect_self_and_descendants;
use rustc_hash::FxHashSet;
use termgraph_core::cancel::CancellationToken;
use termgraph_core::component::GraphComponent;
use termgraph_core::constants;
use termgraph_core::error::{Result, TermError};
use termgraph_core::refset::{InactivationReason, MemberPayload, ReferenceSetMember};
use termgraph_core::traits::{RevisionStore, TerminologyReader};
use termgraph_core::types::{ComponentId, ComponentKey, MemberId, RevisionId};
use tracing::{debug, info, warn};

/// Accumulated retirement work, in deterministic iteration order.
#[derive(Debug, Default)]
pub struct InactivationPlan {
    concepts: Vec<ComponentId>,
    descriptions: Vec<ComponentId>,
    relationships: Vec<ComponentId>,
    members: Vec<MemberId>,
    seen: FxHashSet<ComponentKey>,
}

impl InactivationPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Concepts marked inactive, in marking order.
    pub fn concepts(&self) -> &[ComponentId] {
        &self.concepts
    }

    /// Descriptions marked non-current, in marking order.
    pub fn descriptions(&self) -> &[ComponentId] {
        &self.descriptions
    }

    /// Relationships marked inactive, in marking order.
    pub fn relationships(&self) -> &[ComponentId] {
        &self.relationships
    }

    /// Members marked inactive, in marking order.
    pub fn members(&self) -> &[MemberId] {
        &self.members
    }

    /// Whether nothing was marked.
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
            && self.descriptions.is_empty()
            && self.relationships.is_empty()
            && self.members.is_empty()
    }

    /// Total number of marked entities.
    pub fn len(&self) -> usize {
        self.concepts.len() + self.descriptions.len() + self.relationships.len() + self.members.len()
    }

    fn note(&mut self, key: ComponentKey) -> bool {
        self.seen.insert(key)
    }
}

/// Read-only collection result: what one concept's retirement touches.
#[derive(Debug, Default)]
struct MarkSet {
    keys: Vec<ComponentKey>,
    /// Members known to the branch tip but not yet loaded into the arena.
    imported: Vec<ReferenceSetMember>,
}

impl EditingContext {
    /// Mark one component for inactivation.
    ///
    /// Idempotent: an already-inactive component is a no-op and does not
    /// enter the plan. Descriptions keep their `active` flag; only their
    /// plan entry (and later the indicator membership) expresses retirement.
    pub fn mark_for_inactivation(
        &mut self,
        plan: &mut InactivationPlan,
        key: &ComponentKey,
    ) -> Result<()> {
        self.ensure_open()?;
        match key {
            ComponentKey::Concept(id) => {
                let concept = self.arena().concept(id).ok_or_else(|| TermError::NotFound {
                    id: id.to_string(),
                })?;
                if !concept.active {
                    return Ok(());
                }
                self.apply(key, crate::change::Change::SetActive(false))?;
                if plan.note(key.clone()) {
                    plan.concepts.push(id.clone());
                }
            }
            ComponentKey::Description(id) => {
                if self.arena().description(id).is_none() {
                    return Err(TermError::NotFound {
                        id: id.to_string(),
                    });
                }
                if plan.note(key.clone()) {
                    plan.descriptions.push(id.clone());
                }
            }
            ComponentKey::Relationship(id) => {
                let relationship =
                    self.arena()
                        .relationship(id)
                        .ok_or_else(|| TermError::NotFound {
                            id: id.to_string(),
                        })?;
                if !relationship.active {
                    return Ok(());
                }
                self.apply(key, crate::change::Change::SetActive(false))?;
                if plan.note(key.clone()) {
                    plan.relationships.push(id.clone());
                }
            }
            ComponentKey::Member(uuid) => {
                let member = self.arena().member(uuid).ok_or_else(|| TermError::NotFound {
                    id: uuid.to_string(),
                })?;
                if !member.active {
                    return Ok(());
                }
                self.apply(key, crate::change::Change::SetActive(false))?;
                if plan.note(key.clone()) {
                    plan.members.push(*uuid);
                }
            }
            ComponentKey::RefSet(_) => {
                return Err(TermError::UnsupportedComponentType {
                    detail: format!("{} cannot be marked; retire its identifying concept", key),
                })
            }
        }
        Ok(())
    }

    /// Everything one concept's retirement touches, collected read-only.
    ///
    /// Returns `None` on cancellation; the context is untouched either way.
    fn collect_inactivation(
        &self,
        reader: &dyn TerminologyReader,
        concept_id: &ComponentId,
        token: &CancellationToken,
    ) -> Result<Option<MarkSet>> {
        if token.is_cancelled() {
            return Ok(None);
        }
        if self.arena().concept(concept_id).is_none() {
            return Err(TermError::NotFound {
                id: concept_id.to_string(),
            });
        }
        let mut marks = MarkSet::default();
        let mut seen_members: FxHashSet<MemberId> = FxHashSet::default();
        marks.keys.push(ComponentKey::Concept(concept_id.clone()));

        for description in self.arena().descriptions_of(concept_id) {
            if token.is_cancelled() {
                return Ok(None);
            }
            marks
                .keys
                .push(ComponentKey::Description(description.id.clone()));
        }
        for relationship in self
            .arena()
            .inbound_relationships(concept_id)
            .chain(self.arena().outbound_relationships(concept_id))
        {
            if token.is_cancelled() {
                return Ok(None);
            }
            if relationship.active {
                marks
                    .keys
                    .push(ComponentKey::Relationship(relationship.id.clone()));
            }
        }
        for member in self.arena().members_referencing_component(concept_id) {
            if token.is_cancelled() {
                return Ok(None);
            }
            if member.active && seen_members.insert(member.uuid) {
                marks.keys.push(ComponentKey::Member(member.uuid));
            }
        }
        for member in reader.active_members_referencing(concept_id)? {
            if token.is_cancelled() {
                return Ok(None);
            }
            if !seen_members.insert(member.uuid) {
                continue;
            }
            marks.keys.push(ComponentKey::Member(member.uuid));
            if self.arena().member(&member.uuid).is_none() {
                marks.imported.push(member);
            }
        }
        if self.arena().refset(concept_id).is_some() {
            for member in self.arena().members_of_refset(concept_id) {
                if token.is_cancelled() {
                    return Ok(None);
                }
                if member.active && seen_members.insert(member.uuid) {
                    marks.keys.push(ComponentKey::Member(member.uuid));
                }
            }
        }
        Ok(Some(marks))
    }

    fn apply_marks(&mut self, plan: &mut InactivationPlan, marks: MarkSet) -> Result<()> {
        for member in marks.imported {
            self.arena_mut().insert(GraphComponent::Member(member));
        }
        for key in marks.keys {
            self.mark_for_inactivation(plan, &key)?;
        }
        Ok(())
    }

    /// Retire one concept: the concept itself, its descriptions, every
    /// relationship touching it, every active member referencing it, and,
    /// when the concept identifies a reference set, that set's members.
    ///
    /// Cancellable: `Ok(None)` means nothing was applied.
    pub fn inactivate_concept(
        &mut self,
        reader: &dyn TerminologyReader,
        concept_id: &ComponentId,
        token: &CancellationToken,
    ) -> Result<Option<InactivationPlan>> {
        self.ensure_open()?;
        let Some(marks) = self.collect_inactivation(reader, concept_id, token)? else {
            debug!(
                target: "termgraph::editing",
                concept = %concept_id,
                "Inactivation cancelled during collection"
            );
            return Ok(None);
        };
        let mut plan = InactivationPlan::new();
        self.apply_marks(&mut plan, marks)?;
        Ok(Some(plan))
    }

    /// Retire a focus set together with every descendant that loses its last
    /// live ancestor path, as computed by the taxonomic survivor walk.
    ///
    /// Collection is completed for the whole closure before anything is
    /// applied, so cancellation always yields `Ok(None)` with the context
    /// untouched. Concepts are processed in identifier order for
    /// reproducible commits.
    pub fn plan_inactivation(
        &mut self,
        reader: &dyn TerminologyReader,
        focus_ids: &[ComponentId],
        token: &CancellationToken,
    ) -> Result<Option<InactivationPlan>> {
        self.ensure_open()?;
        let closure = collect_self_and_descendants(reader, focus_ids)?;
        let mut ordered: Vec<ComponentId> = closure.into_iter().collect();
        ordered.sort();

        let mut collected = Vec::with_capacity(ordered.len());
        for concept_id in &ordered {
            match self.collect_inactivation(reader, concept_id, token)? {
                Some(marks) => collected.push(marks),
                None => {
                    debug!(
                        target: "termgraph::editing",
                        "Inactivation cancelled; no marks applied"
                    );
                    return Ok(None);
                }
            }
        }
        let mut plan = InactivationPlan::new();
        for marks in collected {
            self.apply_marks(&mut plan, marks)?;
        }
        info!(
            target: "termgraph::editing",
            branch = %self.branch(),
            concepts = plan.concepts.len(),
            descriptions = plan.descriptions.len(),
            relationships = plan.relationships.len(),
            members = plan.members.len(),
            "Inactivation planned"
        );
        Ok(Some(plan))
    }

    /// Attach the memberships that make a retirement traceable.
    ///
    /// `Retired` is a bare retirement: no membership at all. Every other
    /// reason attaches its inactivation indicator to each marked concept,
    /// plus a historical association to `target` when one is given. Marked
    /// descriptions always receive the fixed "concept non-current" indicator
    /// regardless of reason. Existing active indicators are not duplicated.
    pub fn perform_inactivation(
        &mut self,
        plan: &InactivationPlan,
        reason: InactivationReason,
        target: Option<&ComponentId>,
    ) -> Result<()> {
        self.ensure_open()?;
        if reason == InactivationReason::PendingMove {
            // A pending move keeps the component active by definition, yet it
            // arrives here through the same retirement path as every other
            // reason. Surfaced for review instead of silently altered.
            warn!(
                target: "termgraph::editing",
                concepts = plan.concepts.len(),
                "Pending-move reason applied through retirement"
            );
        }
        let concept_ids: Vec<ComponentId> = plan.concepts.to_vec();
        for concept_id in &concept_ids {
            if reason == InactivationReason::Retired {
                continue;
            }
            if let (Some(refset_id), Some(target_id)) = (reason.association_refset_id(), target) {
                let target_id = target_id.clone();
                self.add_member(
                    refset_id,
                    concept_id,
                    MemberPayload::Association {
                        target_component_id: target_id,
                    },
                )?;
            }
            if let Some(indicator) = reason.indicator_id() {
                self.attach_indicator(
                    concept_id,
                    &constants::CONCEPT_INACTIVATION_INDICATOR_REFSET,
                    indicator.clone(),
                )?;
            }
        }
        let description_ids: Vec<ComponentId> = plan.descriptions.to_vec();
        for description_id in &description_ids {
            self.attach_indicator(
                description_id,
                &constants::DESCRIPTION_INACTIVATION_INDICATOR_REFSET,
                constants::CONCEPT_NON_CURRENT.clone(),
            )?;
        }
        Ok(())
    }

    fn attach_indicator(
        &mut self,
        component_id: &ComponentId,
        indicator_refset: &ComponentId,
        value_id: ComponentId,
    ) -> Result<()> {
        let already_indicated = self
            .arena()
            .members_referencing_component(component_id)
            .any(|m| {
                m.active
                    && m.refset_id == *indicator_refset
                    && matches!(m.payload, MemberPayload::AttributeValue { .. })
            });
        if already_indicated {
            return Ok(());
        }
        self.add_member(
            indicator_refset,
            component_id,
            MemberPayload::AttributeValue { value_id },
        )?;
        Ok(())
    }

    /// Commit the retirement, but only when the context actually buffers
    /// work; a clean context is a no-op.
    pub fn commit_plan(
        &mut self,
        store: &dyn RevisionStore,
        message: &str,
    ) -> Result<Option<RevisionId>> {
        self.ensure_open()?;
        if !self.is_dirty() {
            debug!(
                target: "termgraph::editing",
                branch = %self.branch(),
                "Nothing to commit for inactivation plan"
            );
            return Ok(None);
        }
        self.commit(store, message).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditingConfig;
    use std::sync::Arc;
    use termgraph_core::arena::GraphArena;
    use termgraph_core::component::{Concept, Description, Relationship};
    use termgraph_core::memory::{ArenaReader, MemoryStore, SequentialIdService};
    use termgraph_core::refset::{ReferenceSet, ReferenceSetType};
    use termgraph_core::types::{BranchPath, ComponentCategory};

    fn module() -> ComponentId {
        constants::CORE_MODULE.clone()
    }

    /// parent <- target <- child, with a description on target, a simple
    /// reference set identified by target, and an association member
    /// pointing at target from elsewhere.
    fn seeded_context() -> (MemoryStore, EditingContext, GraphArena, ComponentId) {
        let mut arena = GraphArena::new();
        let parent = ComponentId::from("138875005");
        let target = ComponentId::from("404684003");
        let child = ComponentId::from("64572001");
        for id in [&parent, &target, &child] {
            arena.insert(GraphComponent::Concept(Concept::new(id.clone(), module())));
        }
        arena.insert(GraphComponent::Description(Description::new(
            ComponentId::from("754754016"),
            target.clone(),
            "Clinical finding (finding)",
            constants::FULLY_SPECIFIED_NAME.clone(),
            module(),
        )));
        arena.insert(GraphComponent::Relationship(Relationship::new(
            ComponentId::from("100022"),
            target.clone(),
            constants::IS_A.clone(),
            parent.clone(),
            module(),
        )));
        arena.insert(GraphComponent::Relationship(Relationship::new(
            ComponentId::from("100123029"),
            child.clone(),
            constants::IS_A.clone(),
            target.clone(),
            module(),
        )));
        arena.insert(GraphComponent::RefSet(ReferenceSet::new(
            target.clone(),
            ReferenceSetType::Simple,
            ComponentCategory::Concept,
        )));
        arena.insert(GraphComponent::Member(ReferenceSetMember::new(
            target.clone(),
            parent.clone(),
            module(),
            MemberPayload::Simple,
        )));
        arena.insert(GraphComponent::Member(ReferenceSetMember::new(
            constants::SAME_AS_ASSOCIATION_REFSET.clone(),
            target.clone(),
            module(),
            MemberPayload::Simple,
        )));

        let store = MemoryStore::new();
        store.seed(&BranchPath::main(), arena.clone()).unwrap();
        let ctx = EditingContext::open(
            &store,
            Arc::new(SequentialIdService::new()),
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        (store, ctx, arena, target)
    }

    #[test]
    fn test_mark_already_inactive_concept_is_noop() {
        let (_, mut ctx, _, target) = seeded_context();
        ctx.arena_mut().concept_mut(&target).unwrap().active = false;

        let mut plan = InactivationPlan::new();
        ctx.mark_for_inactivation(&mut plan, &ComponentKey::Concept(target.clone()))
            .unwrap();
        ctx.mark_for_inactivation(&mut plan, &ComponentKey::Concept(target))
            .unwrap();
        assert!(plan.is_empty(), "Already-inactive concept is a no-op");
        assert!(ctx.changed().is_empty(), "No state change recorded");
    }

    #[test]
    fn test_mark_description_leaves_active_flag() {
        let (_, mut ctx, _, _) = seeded_context();
        let description_id = ComponentId::from("754754016");
        let mut plan = InactivationPlan::new();
        ctx.mark_for_inactivation(&mut plan, &ComponentKey::Description(description_id.clone()))
            .unwrap();
        assert_eq!(plan.descriptions(), &[description_id.clone()]);
        assert!(
            ctx.arena().description(&description_id).unwrap().active,
            "A retired description stays active; the indicator expresses non-currency"
        );
    }

    #[test]
    fn test_inactivate_concept_marks_full_neighborhood() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .inactivate_concept(&reader, &target, &CancellationToken::new())
            .unwrap()
            .expect("Not cancelled");

        assert_eq!(plan.concepts(), &[target.clone()]);
        assert_eq!(plan.descriptions().len(), 1);
        assert_eq!(plan.relationships().len(), 2, "Inbound and outbound edges");
        assert_eq!(
            plan.members().len(),
            2,
            "The referencing member and the identified set's member"
        );

        assert!(!ctx.arena().concept(&target).unwrap().active);
        for relationship_id in plan.relationships() {
            assert!(!ctx.arena().relationship(relationship_id).unwrap().active);
        }
        for uuid in plan.members() {
            assert!(!ctx.arena().member(uuid).unwrap().active);
        }
    }

    #[test]
    fn test_cancellation_applies_nothing() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let token = CancellationToken::new();
        token.cancel();

        let result = ctx.inactivate_concept(&reader, &target, &token).unwrap();
        assert!(result.is_none(), "Cancellation yields a null plan");
        assert!(!ctx.is_dirty(), "Nothing may be applied on cancellation");
        assert!(ctx.arena().concept(&target).unwrap().active);
    }

    #[test]
    fn test_plan_inactivation_covers_descendants() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .plan_inactivation(&reader, &[target.clone()], &CancellationToken::new())
            .unwrap()
            .expect("Not cancelled");

        let child = ComponentId::from("64572001");
        assert!(plan.concepts().contains(&target));
        assert!(
            plan.concepts().contains(&child),
            "The child loses its only ancestor path and retires too"
        );
        assert!(!ctx.arena().concept(&child).unwrap().active);
    }

    #[test]
    fn test_perform_retired_attaches_nothing_to_concepts() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .inactivate_concept(&reader, &target, &CancellationToken::new())
            .unwrap()
            .unwrap();
        let members_before = ctx.arena().members().count();

        ctx.perform_inactivation(&plan, InactivationReason::Retired, None)
            .unwrap();
        let indicator_members = ctx
            .arena()
            .members_referencing_component(&target)
            .filter(|m| m.refset_id == *constants::CONCEPT_INACTIVATION_INDICATOR_REFSET)
            .count();
        assert_eq!(indicator_members, 0, "Bare retirement attaches no indicator");
        // The description still gets its non-current indicator.
        assert_eq!(ctx.arena().members().count(), members_before + 1);
    }

    #[test]
    fn test_perform_duplicate_attaches_association_and_indicator() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let replacement = ComponentId::from("138875005");
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .inactivate_concept(&reader, &target, &CancellationToken::new())
            .unwrap()
            .unwrap();

        ctx.perform_inactivation(&plan, InactivationReason::Duplicate, Some(&replacement))
            .unwrap();

        let association = ctx
            .arena()
            .members_referencing_component(&target)
            .find(|m| m.refset_id == *constants::SAME_AS_ASSOCIATION_REFSET)
            .expect("Association member attached");
        assert!(matches!(
            &association.payload,
            MemberPayload::Association { target_component_id } if *target_component_id == replacement
        ));

        let indicator = ctx
            .arena()
            .members_referencing_component(&target)
            .find(|m| m.refset_id == *constants::CONCEPT_INACTIVATION_INDICATOR_REFSET)
            .expect("Indicator member attached");
        assert!(matches!(
            &indicator.payload,
            MemberPayload::AttributeValue { value_id } if *value_id == *constants::DUPLICATE_COMPONENT
        ));

        let description_component = ComponentId::from("754754016");
        let description_indicator = ctx
            .arena()
            .members_referencing_component(&description_component)
            .find(|m| m.refset_id == *constants::DESCRIPTION_INACTIVATION_INDICATOR_REFSET)
            .expect("Description indicator attached");
        assert!(matches!(
            &description_indicator.payload,
            MemberPayload::AttributeValue { value_id } if *value_id == *constants::CONCEPT_NON_CURRENT
        ));
    }

    #[test]
    fn test_repeated_perform_does_not_duplicate_indicators() {
        let (_, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .inactivate_concept(&reader, &target, &CancellationToken::new())
            .unwrap()
            .unwrap();
        ctx.perform_inactivation(&plan, InactivationReason::Ambiguous, None)
            .unwrap();
        let count_after_first = ctx.arena().members().count();
        ctx.perform_inactivation(&plan, InactivationReason::Ambiguous, None)
            .unwrap();
        assert_eq!(
            ctx.arena().members().count(),
            count_after_first,
            "Indicators must not be duplicated"
        );
    }

    #[test]
    fn test_commit_plan_noop_on_clean_context() {
        let (store, mut ctx, _, _) = seeded_context();
        let result = ctx.commit_plan(&store, "no work").unwrap();
        assert_eq!(result, None, "Clean context commits nothing");
    }

    #[test]
    fn test_commit_plan_persists_retirement() {
        let (store, mut ctx, snapshot, target) = seeded_context();
        let reader = ArenaReader::new(&snapshot);
        let plan = ctx
            .inactivate_concept(&reader, &target, &CancellationToken::new())
            .unwrap()
            .unwrap();
        ctx.perform_inactivation(&plan, InactivationReason::Outdated, None)
            .unwrap();
        let revision = ctx.commit_plan(&store, "retire concept").unwrap();
        assert!(revision.is_some());

        let persisted = store.read_snapshot(&BranchPath::main()).unwrap();
        assert!(!persisted.arena.concept(&target).unwrap().active);
        assert!(persisted
            .arena
            .members_referencing_component(&target)
            .any(|m| m.refset_id == *constants::CONCEPT_INACTIVATION_INDICATOR_REFSET));
    }
}
