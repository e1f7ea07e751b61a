//! Effective-time restoration
//!
//! Editing a released component clears its effective time, marking it
//! unpublished. When later edits bring the component back to exactly its
//! published form, the cleared date is noise: this pass walks the branch
//! ancestry bottom-to-top, finds the nearest released state of each changed
//! component, and restores the publication date when the content matches.

use crate::change::Change;
use crate::context::EditingContext;
use termgraph_core::component::GraphComponent;
use termgraph_core::error::Result;
use termgraph_core::traits::{BranchRegistry, ReleasedStateSource};
use termgraph_core::types::ComponentKey;
use tracing::debug;

fn effective_time_of(component: &GraphComponent) -> Option<chrono::NaiveDate> {
    match component {
        GraphComponent::Concept(c) => c.effective_time,
        GraphComponent::Description(d) => d.effective_time,
        GraphComponent::Relationship(r) => r.effective_time,
        GraphComponent::Member(m) => m.effective_time,
        GraphComponent::RefSet(_) => None,
    }
}

/// Strip publication state so two components compare by content alone.
fn normalized(component: &GraphComponent) -> GraphComponent {
    let mut normalized = component.clone();
    match &mut normalized {
        GraphComponent::Concept(c) => {
            c.effective_time = None;
            c.released = false;
        }
        GraphComponent::Description(d) => {
            d.effective_time = None;
            d.released = false;
        }
        GraphComponent::Relationship(r) => {
            r.effective_time = None;
            r.released = false;
        }
        GraphComponent::Member(m) => {
            m.effective_time = None;
            m.released = false;
        }
        GraphComponent::RefSet(_) => {}
    }
    normalized
}

/// Restore publication dates on changed components whose content matches
/// their nearest released state up the branch ancestry.
///
/// Returns the number of components restored. Components created in this
/// context are never candidates; the nearest branch carrying a released
/// state decides, matching or not.
pub fn restore_effective_times(
    ctx: &mut EditingContext,
    registry: &dyn BranchRegistry,
    source: &dyn ReleasedStateSource,
) -> Result<usize> {
    let ancestry = registry.ancestry(ctx.branch())?;
    let candidates: Vec<ComponentKey> = ctx.changed().keys().cloned().collect();
    let mut restored = 0;
    for key in candidates {
        let Some(current) = ctx.arena().get(&key) else {
            continue;
        };
        if effective_time_of(&current).is_some() {
            continue;
        }
        for branch in &ancestry {
            let Some(released) = source.released_state(branch, &key)? else {
                continue;
            };
            if normalized(&current) == normalized(&released) {
                if let Some(date) = effective_time_of(&released) {
                    ctx.apply(&key, Change::SetEffectiveTime(Some(date)))?;
                    restored += 1;
                }
            }
            break;
        }
    }
    if restored > 0 {
        debug!(
            target: "termgraph::editing",
            branch = %ctx.branch(),
            restored,
            "Effective times restored"
        );
    }
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditingConfig;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use termgraph_core::arena::GraphArena;
    use termgraph_core::component::{Component, Concept};
    use termgraph_core::constants;
    use termgraph_core::memory::{MemoryStore, SequentialIdService};
    use termgraph_core::types::{BranchPath, ComponentId};

    fn released_concept(id: &str, date: NaiveDate) -> Concept {
        let mut concept = Concept::new(
            ComponentId::from(id),
            constants::CORE_MODULE.clone(),
        );
        concept.release(date);
        concept
    }

    fn seeded() -> (MemoryStore, EditingContext, ComponentId, NaiveDate) {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let id = ComponentId::from("404684003");
        let mut arena = GraphArena::new();
        arena.insert(GraphComponent::Concept(released_concept("404684003", date)));
        let store = MemoryStore::new();
        store.seed(&BranchPath::main(), arena).unwrap();
        let ctx = EditingContext::open(
            &store,
            Arc::new(SequentialIdService::new()),
            BranchPath::main(),
            EditingConfig::default(),
        )
        .unwrap();
        (store, ctx, id, date)
    }

    #[test]
    fn test_reverted_edit_regains_effective_time() {
        let (store, mut ctx, id, date) = seeded();
        let key = ComponentKey::Concept(id.clone());

        // Toggle off and back on: the content now matches the released
        // state but the effective time has been cleared.
        ctx.apply(&key, Change::SetActive(false)).unwrap();
        ctx.apply(&key, Change::SetActive(true)).unwrap();
        assert_eq!(ctx.arena().concept(&id).unwrap().effective_time, None);

        let restored = restore_effective_times(&mut ctx, &store, &store).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(
            ctx.arena().concept(&id).unwrap().effective_time,
            Some(date)
        );
    }

    #[test]
    fn test_genuine_change_keeps_cleared_effective_time() {
        let (store, mut ctx, id, _) = seeded();
        let key = ComponentKey::Concept(id.clone());
        ctx.apply(&key, Change::SetActive(false)).unwrap();

        let restored = restore_effective_times(&mut ctx, &store, &store).unwrap();
        assert_eq!(restored, 0, "Content differs from the released state");
        assert_eq!(ctx.arena().concept(&id).unwrap().effective_time, None);
    }

    #[test]
    fn test_restoration_walks_branch_ancestry() {
        let (store, _, id, date) = seeded();
        // Fork a task branch; its own copy diverges, but MAIN still holds
        // the released state.
        let task = store.fork_branch(&BranchPath::main(), "task-1").unwrap();
        let mut ctx = EditingContext::open(
            &store,
            Arc::new(SequentialIdService::new()),
            task,
            EditingConfig::default(),
        )
        .unwrap();
        let key = ComponentKey::Concept(id.clone());
        ctx.apply(&key, Change::SetActive(false)).unwrap();
        ctx.apply(&key, Change::SetActive(true)).unwrap();

        let restored = restore_effective_times(&mut ctx, &store, &store).unwrap();
        assert_eq!(restored, 1);
        assert_eq!(
            ctx.arena().concept(&id).unwrap().effective_time,
            Some(date)
        );
    }
}
