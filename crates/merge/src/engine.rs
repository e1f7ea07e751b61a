//! Replay of a stale editing context onto a fresh one
//!
//! When a branch tip advances under an open editing context, the context's
//! edits are replayed onto a context freshly opened on the new tip:
//!
//! 1. Root-level creates (concepts, reference sets) migrate first
//! 2. Nested creates (descriptions, relationships, members) attach to their
//!    migrated or pre-existing owners; a newly preferred term demotes a
//!    sibling's existing preferred membership mechanically
//! 3. Detachments replay idempotently
//! 4. Field-level deltas replay one change at a time
//!
//! Entities that the new tip has legitimately lost are skipped one change at
//! a time; structural failures abort the whole merge. One situation is
//! neither: when the tip gained a new preferred term for a description the
//! stale context also modified, both sides have re-decided the concept's
//! preferred terminology and no mechanical replay is correct; the caller
//! gets an explicit refresh-required outcome instead.
//!
//! The stale context is closed on every path; on success its generated
//! identifiers migrate to the fresh context first so they are neither leaked
//! nor double-released.

use termgraph_core::component::GraphComponent;
use termgraph_core::error::{Result, TermError};
use termgraph_core::refset::MemberPayload;
use termgraph_core::types::{ComponentId, ComponentKey, MemberId};
use termgraph_editing::{Change, EditingContext, Role};
use tracing::{debug, info, warn};

/// Result of reconciling a stale context with a fresh one.
#[derive(Debug)]
pub enum MergeOutcome {
    /// The fresh context, now carrying the stale context's edits.
    Merged(Box<EditingContext>),
    /// Both the branch tip and the stale context re-decided a concept's
    /// preferred terminology; the caller must discard the stale edits and
    /// re-edit from the new tip. No resources are corrupted.
    RefreshRequired {
        /// Concept whose preferred terminology diverged
        concept_id: ComponentId,
        /// Description the competing preferred memberships attach to
        description_id: ComponentId,
    },
}

/// Replay `dirty` onto `fresh`.
///
/// `dirty` is closed unconditionally, success or failure. Errors other than
/// the explicit refresh-required outcome surface as
/// [`TermError::MergeFailed`].
pub fn merge(mut dirty: EditingContext, mut fresh: EditingContext) -> Result<MergeOutcome> {
    if dirty.branch() != fresh.branch() {
        let _ = dirty.close();
        let _ = fresh.close();
        return Err(TermError::MergeFailed {
            reason: "contexts are bound to different branches".to_string(),
        });
    }
    match replay(&mut dirty, &mut fresh) {
        Ok(Some((concept_id, description_id))) => {
            let _ = dirty.close();
            let _ = fresh.close();
            info!(
                target: "termgraph::merge",
                concept = %concept_id,
                description = %description_id,
                "Concurrent preferred-term change; refresh required"
            );
            Ok(MergeOutcome::RefreshRequired {
                concept_id,
                description_id,
            })
        }
        Ok(None) => {
            let pending = dirty.take_pending_ids();
            fresh.absorb_pending_ids(pending);
            let _ = dirty.close();
            info!(
                target: "termgraph::merge",
                branch = %fresh.branch(),
                created = fresh.created().len(),
                changed = fresh.changed().len(),
                detached = fresh.detached().len(),
                "Stale context replayed onto fresh tip"
            );
            Ok(MergeOutcome::Merged(Box::new(fresh)))
        }
        Err(e) => {
            let _ = dirty.close();
            let _ = fresh.close();
            warn!(
                target: "termgraph::merge",
                error = %e,
                "Merge failed"
            );
            Err(TermError::MergeFailed {
                reason: e.to_string(),
            })
        }
    }
}

type PreferredConflict = (ComponentId, ComponentId);

fn replay(
    dirty: &mut EditingContext,
    fresh: &mut EditingContext,
) -> Result<Option<PreferredConflict>> {
    if let Some(conflict) = detect_preferred_conflict(dirty, fresh) {
        return Ok(Some(conflict));
    }
    migrate_root_creates(dirty, fresh);
    migrate_nested_creates(dirty, fresh)?;
    replay_detachments(dirty, fresh);
    replay_changes(dirty, fresh)?;
    Ok(None)
}

/// Descriptions the dirty context touched: the description itself, or one of
/// its language memberships.
fn modified_descriptions(dirty: &EditingContext) -> Vec<ComponentId> {
    let mut out = Vec::new();
    for key in dirty.changed().keys() {
        match key {
            ComponentKey::Description(id) => out.push(id.clone()),
            ComponentKey::Member(uuid) => {
                if let Some(member) = dirty.arena().member(uuid) {
                    if matches!(member.payload, MemberPayload::Language { .. }) {
                        out.push(member.referenced_component_id.clone());
                    }
                }
            }
            _ => {}
        }
    }
    out
}

/// The hard-conflict rule, checked before any mechanical replay.
fn detect_preferred_conflict(
    dirty: &EditingContext,
    fresh: &EditingContext,
) -> Option<PreferredConflict> {
    for description_id in modified_descriptions(dirty) {
        // A preferred membership the tip gained that the stale snapshot
        // never saw.
        let upstream_new = fresh
            .arena()
            .members_referencing_component(&description_id)
            .any(|m| {
                m.active && m.is_preferred_language() && dirty.arena().member(&m.uuid).is_none()
            });
        if !upstream_new {
            continue;
        }
        let concept_id = fresh
            .arena()
            .description(&description_id)
            .and_then(|d| d.concept_id.clone())
            .or_else(|| {
                dirty
                    .arena()
                    .description(&description_id)
                    .and_then(|d| d.concept_id.clone())
            });
        let Some(concept_id) = concept_id else {
            continue;
        };
        // The stale side may have made its own competing preferred choice
        // for the same concept; only then is mechanical demotion safe.
        let dirty_added_preferred = dirty.created().iter().any(|key| {
            let ComponentKey::Member(uuid) = key else {
                return false;
            };
            let Some(member) = dirty.arena().member(uuid) else {
                return false;
            };
            member.is_preferred_language()
                && dirty
                    .arena()
                    .description(&member.referenced_component_id)
                    .and_then(|d| d.concept_id.as_ref())
                    == Some(&concept_id)
        });
        if !dirty_added_preferred {
            return Some((concept_id, description_id));
        }
    }
    None
}

/// Phase 1: concepts and reference sets created in the dirty context move
/// into the fresh arena. Created-set order guarantees concepts land before
/// the reference sets they identify.
fn migrate_root_creates(dirty: &mut EditingContext, fresh: &mut EditingContext) {
    let keys: Vec<ComponentKey> = dirty.created().iter().cloned().collect();
    for key in keys {
        match &key {
            ComponentKey::Concept(_) => {
                if let Some(component) = dirty.arena_mut().remove(&key) {
                    fresh.arena_mut().insert(component);
                    fresh.record_create(key);
                }
            }
            ComponentKey::RefSet(id) => {
                if fresh.arena().concept(id).is_none() {
                    // Identifying concept vanished upstream and was not
                    // migrated; the set has nothing to attach to.
                    debug!(
                        target: "termgraph::merge",
                        refset = %id,
                        "Skipping created reference set; identifying concept is gone"
                    );
                    continue;
                }
                if let Some(component) = dirty.arena_mut().remove(&key) {
                    fresh.arena_mut().insert(component);
                    fresh.record_create(key);
                }
            }
            _ => {}
        }
    }
}

/// Phase 2: descriptions, relationships, and members created in the dirty
/// context attach to their owners in the fresh arena.
fn migrate_nested_creates(dirty: &mut EditingContext, fresh: &mut EditingContext) -> Result<()> {
    let keys: Vec<ComponentKey> = dirty.created().iter().cloned().collect();
    for key in keys {
        match &key {
            ComponentKey::Description(_) => {
                let Some(GraphComponent::Description(description)) = dirty.arena().get(&key)
                else {
                    continue;
                };
                if let Some(owner) = &description.concept_id {
                    if fresh.arena().concept(owner).is_none() {
                        debug!(
                            target: "termgraph::merge",
                            description = %description.id,
                            "Skipping created description; owning concept is gone"
                        );
                        continue;
                    }
                }
                dirty.arena_mut().remove(&key);
                fresh.arena_mut().insert(GraphComponent::Description(description));
                fresh.record_create(key);
            }
            ComponentKey::Relationship(_) => {
                let Some(GraphComponent::Relationship(relationship)) = dirty.arena().get(&key)
                else {
                    continue;
                };
                let endpoints_resolve = [&relationship.source_id, &relationship.destination_id]
                    .into_iter()
                    .flatten()
                    .all(|endpoint| fresh.arena().concept(endpoint).is_some());
                if !endpoints_resolve {
                    debug!(
                        target: "termgraph::merge",
                        relationship = %relationship.id,
                        "Skipping created relationship; an endpoint is gone"
                    );
                    continue;
                }
                dirty.arena_mut().remove(&key);
                fresh
                    .arena_mut()
                    .insert(GraphComponent::Relationship(relationship));
                fresh.record_create(key);
            }
            ComponentKey::Member(_) => {
                let Some(GraphComponent::Member(member)) = dirty.arena().get(&key) else {
                    continue;
                };
                if !referenced_component_resolves(fresh, &member.referenced_component_id) {
                    debug!(
                        target: "termgraph::merge",
                        member = %member.uuid,
                        "Skipping created member; referenced component is gone"
                    );
                    continue;
                }
                if member.active && member.is_preferred_language() {
                    demote_competing_preferred(fresh, &member.refset_id, &member.referenced_component_id, member.uuid)?;
                }
                dirty.arena_mut().remove(&key);
                fresh.arena_mut().insert(GraphComponent::Member(member));
                fresh.record_create(key);
            }
            _ => {}
        }
    }
    Ok(())
}

fn referenced_component_resolves(fresh: &EditingContext, id: &ComponentId) -> bool {
    let arena = fresh.arena();
    arena.concept(id).is_some()
        || arena.description(id).is_some()
        || arena.relationship(id).is_some()
}

/// The preferred-term demotion rule: a newly preferred non-FSN description
/// demotes a sibling's existing preferred membership in the same language
/// reference set to acceptable. Brand-new concepts are exempt: their
/// descriptions cannot collide with committed state.
fn demote_competing_preferred(
    fresh: &mut EditingContext,
    language_refset_id: &ComponentId,
    description_id: &ComponentId,
    incoming_member: MemberId,
) -> Result<()> {
    let Some(description) = fresh.arena().description(description_id) else {
        return Ok(());
    };
    if description.is_fsn() || !description.active {
        return Ok(());
    }
    let Some(concept_id) = description.concept_id.clone() else {
        return Ok(());
    };
    if fresh
        .created()
        .contains(&ComponentKey::Concept(concept_id.clone()))
    {
        return Ok(());
    }

    struct Demotion {
        member: MemberId,
        released: bool,
        sibling: ComponentId,
    }
    let demotions: Vec<Demotion> = fresh
        .arena()
        .descriptions_of(&concept_id)
        .filter(|sibling| sibling.id != *description_id && sibling.active && !sibling.is_fsn())
        .flat_map(|sibling| {
            fresh
                .arena()
                .members_referencing_component(&sibling.id)
                .filter(|m| {
                    m.uuid != incoming_member
                        && m.active
                        && m.refset_id == *language_refset_id
                        && m.is_preferred_language()
                })
                .map(|m| Demotion {
                    member: m.uuid,
                    released: m.released,
                    sibling: sibling.id.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    for demotion in demotions {
        let key = ComponentKey::Member(demotion.member);
        if demotion.released {
            // Published memberships retire instead of vanishing.
            fresh.apply(&key, Change::SetActive(false))?;
        } else {
            fresh.arena_mut().remove(&key);
            fresh.record_removal(&key);
        }
        fresh.add_member(
            language_refset_id,
            &demotion.sibling,
            MemberPayload::Language {
                acceptability_id: termgraph_core::constants::ACCEPTABLE.clone(),
            },
        )?;
        debug!(
            target: "termgraph::merge",
            sibling = %demotion.sibling,
            "Demoted competing preferred membership to acceptable"
        );
    }
    Ok(())
}

/// Phase 3: removals from the dirty context replay idempotently.
fn replay_detachments(dirty: &EditingContext, fresh: &mut EditingContext) {
    for key in dirty.detached() {
        if fresh.arena().contains(key) {
            fresh.arena_mut().remove(key);
            fresh.record_removal(key);
        }
        // Already gone upstream: nothing to sever.
    }
}

/// Phase 4: field-level deltas replay one change at a time; a change whose
/// target or referenced entity vanished upstream is skipped.
fn replay_changes(dirty: &EditingContext, fresh: &mut EditingContext) -> Result<()> {
    for (key, changes) in dirty.changed() {
        if !fresh.arena().contains(key) {
            debug!(
                target: "termgraph::merge",
                entity = %key,
                "Skipping deltas; entity is gone upstream"
            );
            continue;
        }
        for change in changes {
            if let Change::Rebind(role, Some(target)) = change {
                let resolves = match role {
                    Role::Source | Role::Destination | Role::Concept => {
                        fresh.arena().concept(target).is_some()
                    }
                    Role::ReferencedComponent | Role::AssociationTarget | Role::AttributeValue => {
                        referenced_component_resolves(fresh, target)
                    }
                    // Reference set ids are metadata concepts that need not
                    // be loaded into the arena.
                    Role::ReferenceSet => true,
                };
                if !resolves {
                    debug!(
                        target: "termgraph::merge",
                        entity = %key,
                        target = %target,
                        "Skipping rebind; target is gone upstream"
                    );
                    continue;
                }
            }
            match fresh.apply(key, change.clone()) {
                Ok(()) => {}
                Err(TermError::NotFound { .. }) => {
                    // Removed between the presence check and the change;
                    // same benign skip.
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(())
}
