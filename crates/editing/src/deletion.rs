//! Deletion planning and the commit-boundary dependency sweep
//!
//! Deletion happens in two stages. `plan_delete` walks the cascade for one
//! requested component (inbound edges, owned descriptions and edges, an
//! identified reference set and its members), accumulating rejections
//! instead of failing on the first one, so a caller sees the full list.
//! `pre_commit` turns a plan into arena mutations: it first appends every
//! reference set member that depends on a to-be-deleted component through
//! *any* property, then removes everything, guaranteeing that no dangling
//! member, no relationship with a deleted endpoint, and no description of a
//! deleted concept survives.

use crate::context::EditingContext;
use rustc_hash::FxHashSet;
use termgraph_core::cancel::CancellationToken;
use termgraph_core::error::{Result, TermError};
use termgraph_core::refset::MemberPayload;
use termgraph_core::types::{ComponentId, ComponentKey};
use tracing::{debug, info};

/// Accumulated outcome of planning one deletion request.
///
/// Transient and owned by exactly one editing context; discarded after each
/// pre-commit cycle.
#[derive(Debug, Default)]
pub struct DeletionPlan {
    force: bool,
    to_delete: Vec<ComponentKey>,
    seen: FxHashSet<ComponentKey>,
    rejections: Vec<String>,
    cancelled: bool,
}

impl DeletionPlan {
    fn new(force: bool) -> Self {
        Self {
            force,
            ..Self::default()
        }
    }

    fn cancelled_empty() -> Self {
        Self {
            cancelled: true,
            ..Self::default()
        }
    }

    fn add(&mut self, key: ComponentKey) {
        if self.seen.insert(key.clone()) {
            self.to_delete.push(key);
        }
    }

    fn reject(&mut self, reason: String) {
        self.rejections.push(reason);
    }

    /// Whether released-component protection is overridden.
    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// Entities scheduled for removal, in discovery order.
    pub fn components(&self) -> &[ComponentKey] {
        &self.to_delete
    }

    /// Whether the plan schedules the given entity.
    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.seen.contains(key)
    }

    /// Every rejection recorded while planning.
    pub fn rejections(&self) -> &[String] {
        &self.rejections
    }

    /// Whether any rejection was recorded.
    pub fn is_rejected(&self) -> bool {
        !self.rejections.is_empty()
    }

    /// Whether the plan schedules nothing and rejects nothing.
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.rejections.is_empty()
    }

    /// Whether planning was cancelled; a cancelled plan is empty.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl EditingContext {
    /// Compute the deletion cascade for one component.
    ///
    /// Never mutates the context. A rejected sub-plan leaves its reasons in
    /// the plan; cancellation yields an empty plan.
    pub fn plan_delete(
        &self,
        key: &ComponentKey,
        force: bool,
        token: &CancellationToken,
    ) -> DeletionPlan {
        let mut plan = DeletionPlan::new(force);
        self.plan_component(&mut plan, key, token);
        if plan.cancelled {
            debug!(
                target: "termgraph::editing",
                branch = %self.branch(),
                "Deletion planning cancelled"
            );
            return DeletionPlan::cancelled_empty();
        }
        plan
    }

    fn released_blocks(&self, plan: &mut DeletionPlan, key: &ComponentKey) -> bool {
        if self.arena().is_released(key) && !plan.force {
            plan.reject(format!("{} is released", key));
            true
        } else {
            false
        }
    }

    fn plan_component(
        &self,
        plan: &mut DeletionPlan,
        key: &ComponentKey,
        token: &CancellationToken,
    ) -> bool {
        if token.is_cancelled() {
            plan.cancelled = true;
            return false;
        }
        if plan.contains(key) {
            return true;
        }
        if !self.arena().contains(key) {
            plan.reject(format!("{} not found", key));
            return false;
        }
        match key {
            ComponentKey::Concept(id) => self.plan_concept(plan, key, id, token),
            ComponentKey::Description(_) => {
                if self.released_blocks(plan, key) {
                    return false;
                }
                plan.add(key.clone());
                true
            }
            ComponentKey::Relationship(id) => {
                if self.released_blocks(plan, key) {
                    return false;
                }
                // A relationship already severed from its source is left
                // alone; the detachment made it unreachable.
                let has_source = self
                    .arena()
                    .relationship(id)
                    .map_or(false, |r| r.source_id.is_some());
                if has_source {
                    plan.add(key.clone());
                }
                true
            }
            ComponentKey::RefSet(id) => self.plan_refset(plan, key, id, token),
            ComponentKey::Member(_) => {
                if self.released_blocks(plan, key) {
                    return false;
                }
                plan.add(key.clone());
                true
            }
        }
    }

    fn plan_concept(
        &self,
        plan: &mut DeletionPlan,
        key: &ComponentKey,
        id: &ComponentId,
        token: &CancellationToken,
    ) -> bool {
        if self.released_blocks(plan, key) {
            return false;
        }
        let inbound: Vec<ComponentKey> = self
            .arena()
            .inbound_relationships(id)
            .map(|r| ComponentKey::Relationship(r.id.clone()))
            .collect();
        for relationship in inbound {
            if !self.plan_component(plan, &relationship, token) {
                plan.reject(format!(
                    "cannot delete concept {}: inbound {} was rejected",
                    id, relationship
                ));
                return false;
            }
        }
        let owned: Vec<ComponentKey> = self
            .arena()
            .descriptions_of(id)
            .map(|d| ComponentKey::Description(d.id.clone()))
            .chain(
                self.arena()
                    .outbound_relationships(id)
                    .map(|r| ComponentKey::Relationship(r.id.clone())),
            )
            .collect();
        for child in owned {
            if !self.plan_component(plan, &child, token) {
                plan.reject(format!(
                    "cannot delete concept {}: owned {} was rejected",
                    id, child
                ));
                return false;
            }
        }
        if self.arena().refset(id).is_some() {
            let refset_key = ComponentKey::RefSet(id.clone());
            if !self.plan_component(plan, &refset_key, token) {
                plan.reject(format!(
                    "cannot delete concept {}: identified reference set was rejected",
                    id
                ));
                return false;
            }
        }
        plan.add(key.clone());
        true
    }

    fn plan_refset(
        &self,
        plan: &mut DeletionPlan,
        key: &ComponentKey,
        id: &ComponentId,
        token: &CancellationToken,
    ) -> bool {
        let members: Vec<ComponentKey> = self
            .arena()
            .members_of_refset(id)
            .map(|m| ComponentKey::Member(m.uuid))
            .collect();
        for member in members {
            if !self.plan_component(plan, &member, token) {
                plan.reject(format!(
                    "cannot delete reference set {}: {} was rejected",
                    id, member
                ));
                return false;
            }
        }
        plan.add(key.clone());
        true
    }

    /// Apply a deletion plan at the commit boundary.
    ///
    /// A rejected plan fails with `Rejected` and deletes nothing. Otherwise
    /// the dependency sweep appends every member that depends on a scheduled
    /// component through any property, subject to the same released
    /// protection, and everything is removed from the arena. A cancelled
    /// plan is a no-op.
    pub fn pre_commit(&mut self, mut plan: DeletionPlan) -> Result<()> {
        self.ensure_open()?;
        if plan.was_cancelled() {
            return Ok(());
        }
        if plan.is_rejected() {
            return Err(TermError::Rejected {
                reasons: plan.rejections.clone(),
            });
        }

        // Every component id scheduled for removal, for the dependency check.
        let planned_ids: FxHashSet<ComponentId> = plan
            .to_delete
            .iter()
            .filter_map(|key| key.component_id().cloned())
            .collect();

        let mut sweep_rejections = Vec::new();
        let mut swept = Vec::new();
        for member in self.arena().members() {
            let member_key = ComponentKey::Member(member.uuid);
            if plan.contains(&member_key) {
                continue;
            }
            let Some(depends_on) = planned_ids.iter().find(|id| member.references(id)) else {
                continue;
            };
            if member.released && !plan.force {
                // A released member cannot be removed; if it keeps an active
                // description format alive the operation names that reason.
                let format_in_use = member.active
                    && matches!(
                        &member.payload,
                        MemberPayload::DescriptionType { description_format_id, .. }
                            if planned_ids.contains(description_format_id)
                    );
                if format_in_use {
                    sweep_rejections.push(format!(
                        "concept {} identifies a description format still in active use by member {}",
                        depends_on, member.uuid
                    ));
                } else {
                    sweep_rejections.push(format!(
                        "member {} depending on {} is released",
                        member.uuid, depends_on
                    ));
                }
            } else {
                swept.push(member_key);
            }
        }
        if !sweep_rejections.is_empty() {
            return Err(TermError::Rejected {
                reasons: sweep_rejections,
            });
        }
        for member_key in swept {
            plan.add(member_key);
        }

        // Physical removal: members first so no membership ever outlives the
        // component it annotates, then edges, descriptions, sets, concepts.
        let order = |key: &ComponentKey| match key {
            ComponentKey::Member(_) => 0,
            ComponentKey::Relationship(_) => 1,
            ComponentKey::Description(_) => 2,
            ComponentKey::RefSet(_) => 3,
            ComponentKey::Concept(_) => 4,
        };
        let mut removal = plan.to_delete.clone();
        removal.sort_by_key(order);
        let removed = removal.len();
        for key in removal {
            self.arena_mut().remove(&key);
            self.record_removal(&key);
        }
        info!(
            target: "termgraph::editing",
            branch = %self.branch(),
            removed,
            "Deletion plan applied"
        );
        Ok(())
    }
}
