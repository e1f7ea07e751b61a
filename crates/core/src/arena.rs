//! Id-addressed component store
//!
//! A `GraphArena` holds every entity visible to one editing context:
//! concepts, descriptions, relationships, reference sets, and members, each
//! in its own id-keyed map. All cross-entity references are ids resolved
//! through the arena, so cascades, uniqueness repair, and merge replay are
//! plain map operations.

use crate::component::{Concept, Description, GraphComponent, Relationship};
use crate::refset::{ReferenceSet, ReferenceSetMember};
use crate::types::{ComponentId, ComponentKey, MemberId};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// The component store backing one editing context or snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphArena {
    concepts: FxHashMap<ComponentId, Concept>,
    descriptions: FxHashMap<ComponentId, Description>,
    relationships: FxHashMap<ComponentId, Relationship>,
    refsets: FxHashMap<ComponentId, ReferenceSet>,
    members: FxHashMap<MemberId, ReferenceSetMember>,
}

impl GraphArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    // === Insertion ===

    /// Insert any entity, replacing an existing one under the same key.
    pub fn insert(&mut self, component: GraphComponent) {
        match component {
            GraphComponent::Concept(c) => {
                self.concepts.insert(c.id.clone(), c);
            }
            GraphComponent::Description(d) => {
                self.descriptions.insert(d.id.clone(), d);
            }
            GraphComponent::Relationship(r) => {
                self.relationships.insert(r.id.clone(), r);
            }
            GraphComponent::RefSet(s) => {
                self.refsets.insert(s.identifier_id.clone(), s);
            }
            GraphComponent::Member(m) => {
                self.members.insert(m.uuid, m);
            }
        }
    }

    // === Typed accessors ===

    /// Look up a concept.
    pub fn concept(&self, id: &ComponentId) -> Option<&Concept> {
        self.concepts.get(id)
    }

    /// Look up a concept mutably.
    pub fn concept_mut(&mut self, id: &ComponentId) -> Option<&mut Concept> {
        self.concepts.get_mut(id)
    }

    /// Look up a description.
    pub fn description(&self, id: &ComponentId) -> Option<&Description> {
        self.descriptions.get(id)
    }

    /// Look up a description mutably.
    pub fn description_mut(&mut self, id: &ComponentId) -> Option<&mut Description> {
        self.descriptions.get_mut(id)
    }

    /// Look up a relationship.
    pub fn relationship(&self, id: &ComponentId) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Look up a relationship mutably.
    pub fn relationship_mut(&mut self, id: &ComponentId) -> Option<&mut Relationship> {
        self.relationships.get_mut(id)
    }

    /// Look up a reference set by its identifying concept.
    pub fn refset(&self, identifier_id: &ComponentId) -> Option<&ReferenceSet> {
        self.refsets.get(identifier_id)
    }

    /// Look up a member by uuid.
    pub fn member(&self, uuid: &MemberId) -> Option<&ReferenceSetMember> {
        self.members.get(uuid)
    }

    /// Look up a member mutably.
    pub fn member_mut(&mut self, uuid: &MemberId) -> Option<&mut ReferenceSetMember> {
        self.members.get_mut(uuid)
    }

    // === Keyed access ===

    /// Whether the arena holds the entity addressed by `key`.
    pub fn contains(&self, key: &ComponentKey) -> bool {
        match key {
            ComponentKey::Concept(id) => self.concepts.contains_key(id),
            ComponentKey::Description(id) => self.descriptions.contains_key(id),
            ComponentKey::Relationship(id) => self.relationships.contains_key(id),
            ComponentKey::RefSet(id) => self.refsets.contains_key(id),
            ComponentKey::Member(id) => self.members.contains_key(id),
        }
    }

    /// Clone out the entity addressed by `key`.
    pub fn get(&self, key: &ComponentKey) -> Option<GraphComponent> {
        match key {
            ComponentKey::Concept(id) => self.concepts.get(id).cloned().map(GraphComponent::Concept),
            ComponentKey::Description(id) => self
                .descriptions
                .get(id)
                .cloned()
                .map(GraphComponent::Description),
            ComponentKey::Relationship(id) => self
                .relationships
                .get(id)
                .cloned()
                .map(GraphComponent::Relationship),
            ComponentKey::RefSet(id) => self.refsets.get(id).cloned().map(GraphComponent::RefSet),
            ComponentKey::Member(id) => self.members.get(id).cloned().map(GraphComponent::Member),
        }
    }

    /// Remove and return the entity addressed by `key`.
    pub fn remove(&mut self, key: &ComponentKey) -> Option<GraphComponent> {
        match key {
            ComponentKey::Concept(id) => self.concepts.remove(id).map(GraphComponent::Concept),
            ComponentKey::Description(id) => {
                self.descriptions.remove(id).map(GraphComponent::Description)
            }
            ComponentKey::Relationship(id) => self
                .relationships
                .remove(id)
                .map(GraphComponent::Relationship),
            ComponentKey::RefSet(id) => self.refsets.remove(id).map(GraphComponent::RefSet),
            ComponentKey::Member(id) => self.members.remove(id).map(GraphComponent::Member),
        }
    }

    /// Whether the entity addressed by `key` is released.
    ///
    /// Reference sets have no release state of their own; theirs follows the
    /// identifying concept.
    pub fn is_released(&self, key: &ComponentKey) -> bool {
        match key {
            ComponentKey::Concept(id) => self.concepts.get(id).map_or(false, |c| c.released),
            ComponentKey::Description(id) => {
                self.descriptions.get(id).map_or(false, |d| d.released)
            }
            ComponentKey::Relationship(id) => {
                self.relationships.get(id).map_or(false, |r| r.released)
            }
            ComponentKey::RefSet(id) => self.concepts.get(id).map_or(false, |c| c.released),
            ComponentKey::Member(id) => self.members.get(id).map_or(false, |m| m.released),
        }
    }

    // === Iteration ===

    /// All concepts, in arbitrary order.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    /// All descriptions, in arbitrary order.
    pub fn descriptions(&self) -> impl Iterator<Item = &Description> {
        self.descriptions.values()
    }

    /// All relationships, in arbitrary order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// All reference sets, in arbitrary order.
    pub fn refsets(&self) -> impl Iterator<Item = &ReferenceSet> {
        self.refsets.values()
    }

    /// All members, in arbitrary order.
    pub fn members(&self) -> impl Iterator<Item = &ReferenceSetMember> {
        self.members.values()
    }

    /// Total entity count across all kinds.
    pub fn len(&self) -> usize {
        self.concepts.len()
            + self.descriptions.len()
            + self.relationships.len()
            + self.refsets.len()
            + self.members.len()
    }

    /// Whether the arena holds no entities.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Ownership queries ===

    /// Descriptions owned by a concept.
    pub fn descriptions_of<'a>(
        &'a self,
        concept_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a Description> {
        self.descriptions
            .values()
            .filter(move |d| d.concept_id.as_ref() == Some(concept_id))
    }

    /// Relationships whose source is the given concept.
    pub fn outbound_relationships<'a>(
        &'a self,
        concept_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .values()
            .filter(move |r| r.source_id.as_ref() == Some(concept_id))
    }

    /// Relationships whose destination is the given concept.
    pub fn inbound_relationships<'a>(
        &'a self,
        concept_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .values()
            .filter(move |r| r.destination_id.as_ref() == Some(concept_id))
    }

    /// Members belonging to a reference set.
    pub fn members_of_refset<'a>(
        &'a self,
        refset_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a ReferenceSetMember> {
        self.members
            .values()
            .filter(move |m| m.refset_id == *refset_id)
    }

    /// Members whose referenced component is the given component.
    pub fn members_referencing_component<'a>(
        &'a self,
        component_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a ReferenceSetMember> {
        self.members
            .values()
            .filter(move |m| m.referenced_component_id == *component_id)
    }

    /// Members depending on the given component through any property:
    /// referenced component, owning set, or any payload field.
    pub fn members_depending_on<'a>(
        &'a self,
        component_id: &'a ComponentId,
    ) -> impl Iterator<Item = &'a ReferenceSetMember> {
        self.members
            .values()
            .filter(move |m| m.references(component_id))
    }

    // === Identifier replacement ===

    /// Move an id-addressed entity from `old` to `new` and repoint every
    /// field in the arena that referenced `old`.
    ///
    /// Used by identifier uniqueness repair: once an id is reassigned, a
    /// dangling reference anywhere in the arena would be a corruption, so
    /// ownership links, relationship endpoints, reference-set identifiers,
    /// member references, and payload ids all follow. Returns false when no
    /// entity was keyed by `old`.
    pub fn rekey(&mut self, old: &ComponentId, new: &ComponentId) -> bool {
        let mut moved = false;
        if let Some(mut concept) = self.concepts.remove(old) {
            concept.id = new.clone();
            self.concepts.insert(new.clone(), concept);
            moved = true;
        }
        if let Some(mut description) = self.descriptions.remove(old) {
            description.id = new.clone();
            self.descriptions.insert(new.clone(), description);
            moved = true;
        }
        if let Some(mut relationship) = self.relationships.remove(old) {
            relationship.id = new.clone();
            self.relationships.insert(new.clone(), relationship);
            moved = true;
        }
        if !moved {
            return false;
        }

        if let Some(mut refset) = self.refsets.remove(old) {
            refset.identifier_id = new.clone();
            self.refsets.insert(new.clone(), refset);
        }
        for description in self.descriptions.values_mut() {
            if description.concept_id.as_ref() == Some(old) {
                description.concept_id = Some(new.clone());
            }
        }
        for relationship in self.relationships.values_mut() {
            if relationship.source_id.as_ref() == Some(old) {
                relationship.source_id = Some(new.clone());
            }
            if relationship.destination_id.as_ref() == Some(old) {
                relationship.destination_id = Some(new.clone());
            }
        }
        for member in self.members.values_mut() {
            if member.referenced_component_id == *old {
                member.referenced_component_id = new.clone();
            }
            if member.refset_id == *old {
                member.refset_id = new.clone();
            }
            rekey_payload(&mut member.payload, old, new);
        }
        true
    }

    // === Consistency ===

    /// Every reference held by an entity that fails to resolve in this arena.
    ///
    /// Snapshot arenas may legitimately reference components outside the
    /// loaded region, so this is a diagnostic for tests over self-contained
    /// graphs, not an invariant of every arena.
    pub fn dangling_references(&self) -> Vec<String> {
        let mut dangling = Vec::new();
        for description in self.descriptions.values() {
            if let Some(concept_id) = &description.concept_id {
                if !self.concepts.contains_key(concept_id) {
                    dangling.push(format!(
                        "description {} -> concept {}",
                        description.id, concept_id
                    ));
                }
            }
        }
        for relationship in self.relationships.values() {
            for endpoint in [&relationship.source_id, &relationship.destination_id] {
                if let Some(concept_id) = endpoint {
                    if !self.concepts.contains_key(concept_id) {
                        dangling.push(format!(
                            "relationship {} -> concept {}",
                            relationship.id, concept_id
                        ));
                    }
                }
            }
        }
        for member in self.members.values() {
            let id = &member.referenced_component_id;
            let resolvable = self.concepts.contains_key(id)
                || self.descriptions.contains_key(id)
                || self.relationships.contains_key(id);
            if !resolvable {
                dangling.push(format!("member {} -> component {}", member.uuid, id));
            }
        }
        dangling
    }
}

fn rekey_payload(payload: &mut crate::refset::MemberPayload, old: &ComponentId, new: &ComponentId) {
    use crate::refset::MemberPayload::*;
    let replace = |id: &mut ComponentId| {
        if id == old {
            *id = new.clone();
        }
    };
    match payload {
        Simple | Query { .. } | SimpleMap { .. } | ModuleDependency { .. } | MrcmDomain { .. }
        | OwlAxiom { .. } => {}
        Association {
            target_component_id,
        } => replace(target_component_id),
        AttributeValue { value_id } => replace(value_id),
        Language { acceptability_id } => replace(acceptability_id),
        ComplexMap { correlation_id, .. } => replace(correlation_id),
        ExtendedMap {
            correlation_id,
            map_category_id,
            ..
        } => {
            replace(correlation_id);
            replace(map_category_id);
        }
        ConcreteDataType {
            uom_id,
            operator_id,
            characteristic_type_id,
            ..
        } => {
            if let Some(uom) = uom_id {
                replace(uom);
            }
            replace(operator_id);
            replace(characteristic_type_id);
        }
        DescriptionType {
            description_format_id,
            ..
        } => replace(description_format_id),
        MrcmAttributeDomain {
            domain_id,
            rule_strength_id,
            content_type_id,
            ..
        } => {
            replace(domain_id);
            replace(rule_strength_id);
            replace(content_type_id);
        }
        MrcmAttributeRange {
            rule_strength_id,
            content_type_id,
            ..
        } => {
            replace(rule_strength_id);
            replace(content_type_id);
        }
        MrcmModuleScope {
            mrcm_ruleset_refset_id,
        } => replace(mrcm_ruleset_refset_id),
    }
}
