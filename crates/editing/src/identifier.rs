//! Identifier generation and within-transaction uniqueness repair
//!
//! The external identifier service guarantees cross-transaction uniqueness;
//! what it cannot see is an id already handed to a new, uncommitted
//! component inside the *same* transaction. `validate_and_replace` repairs
//! exactly that case: a colliding component is reassigned a freshly
//! generated id, every reference in the arena follows the reassignment, and
//! the fresh id is itself re-validated against the pending set before being
//! accepted.

use crate::context::EditingContext;
use termgraph_core::error::{Result, TermError};
use termgraph_core::types::{ComponentCategory, ComponentId, ComponentKey};
use tracing::debug;

impl EditingContext {
    /// Issue a fresh identifier for `category` and record it as pending.
    pub fn generate_id(&mut self, category: ComponentCategory) -> Result<ComponentId> {
        self.ensure_open()?;
        let service = self.ids_service();
        let id = service.generate(category, self.config().default_namespace)?;
        self.record_pending_id(id.clone());
        Ok(id)
    }

    /// Validate a component's identifier against this transaction's pending
    /// set, replacing it when it collides.
    ///
    /// Returns `true` when the id was free: it is recorded as pending and
    /// the component is untouched. Returns `false` when a replacement
    /// occurred: the component (and everything referencing it) now carries a
    /// freshly generated id. Generation is retried until the fresh id is
    /// itself collision-free, bounded by `EditingConfig::max_id_retries`;
    /// exhausting the bound fails fast with `IdentifierSpaceExhausted`.
    pub fn validate_and_replace(&mut self, key: &ComponentKey) -> Result<bool> {
        self.ensure_open()?;
        let (category, old_id) = match key {
            ComponentKey::Concept(id) => (ComponentCategory::Concept, id.clone()),
            ComponentKey::Description(id) => (ComponentCategory::Description, id.clone()),
            ComponentKey::Relationship(id) => (ComponentCategory::Relationship, id.clone()),
            other => {
                return Err(TermError::UnsupportedComponentType {
                    detail: format!("{} has no replaceable component identifier", other),
                })
            }
        };
        if !self.arena().contains(key) {
            return Err(TermError::NotFound {
                id: old_id.to_string(),
            });
        }
        if !self.pending_ids().contains(&old_id) {
            self.record_pending_id(old_id);
            return Ok(true);
        }

        let max_retries = self.config().max_id_retries;
        let namespace = self.config().default_namespace;
        let service = self.ids_service();
        let mut attempts = 0;
        let candidate = loop {
            if attempts >= max_retries {
                return Err(TermError::IdentifierSpaceExhausted { category, attempts });
            }
            attempts += 1;
            let candidate = service.generate(category, namespace)?;
            // The fresh id may collide with one generated earlier in this
            // same pass; re-validate before accepting it.
            if !self.pending_ids().contains(&candidate) {
                break candidate;
            }
        };

        self.arena_mut().rekey(&old_id, &candidate);
        self.rekey_tracking(key, &candidate);
        self.record_pending_id(candidate.clone());
        debug!(
            target: "termgraph::editing",
            old = %old_id,
            new = %candidate,
            attempts,
            "Colliding identifier replaced"
        );
        Ok(false)
    }

    fn rekey_tracking(&mut self, key: &ComponentKey, new_id: &ComponentId) {
        let new_key = match key {
            ComponentKey::Concept(_) => ComponentKey::Concept(new_id.clone()),
            ComponentKey::Description(_) => ComponentKey::Description(new_id.clone()),
            ComponentKey::Relationship(_) => ComponentKey::Relationship(new_id.clone()),
            other => other.clone(),
        };
        if self.untrack_created(key) {
            self.record_create(new_key.clone());
        }
        // A concept id also keys any reference set it identifies.
        if let (ComponentKey::Concept(old), ComponentKey::Concept(new)) = (key, &new_key) {
            let old_refset = ComponentKey::RefSet(old.clone());
            if self.untrack_created(&old_refset) {
                self.record_create(ComponentKey::RefSet(new.clone()));
            }
        }
    }
}
