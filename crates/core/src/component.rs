//! Concepts, descriptions, and relationships
//!
//! Components are plain values addressed by id inside a [`crate::arena::GraphArena`];
//! every cross-entity reference is an id, never an in-memory pointer, which
//! keeps cascade and merge logic serializable and testable without a live
//! object graph. Ownership links (`Description::concept_id`,
//! `Relationship::source_id`/`destination_id`) are optional so an entity can
//! be severed from its owner without being destroyed.

use crate::constants;
use crate::refset::{ReferenceSet, ReferenceSetMember};
use crate::types::{ComponentId, ComponentKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shared component state: activity, release status, publication date, module.
///
/// A released component has appeared in a published snapshot; its effective
/// time marks that publication point and its identifying fields may no longer
/// change. The `active` flag may still toggle after release.
pub trait Component {
    /// Whether the component is in effect.
    fn is_active(&self) -> bool;
    /// Toggle the component's activity. Clears the effective time, since the
    /// new state is unpublished.
    fn set_active(&mut self, active: bool);
    /// Whether the component has appeared in a published snapshot.
    fn is_released(&self) -> bool;
    /// Publication date, absent while unpublished.
    fn effective_time(&self) -> Option<NaiveDate>;
    /// Set or clear the publication date.
    fn set_effective_time(&mut self, effective_time: Option<NaiveDate>);
    /// Module owning the component.
    fn module_id(&self) -> &ComponentId;
    /// Mark the component as published at `date`.
    fn release(&mut self, date: NaiveDate) {
        self.set_effective_time(Some(date));
        self.set_released_flag(true);
    }
    /// Raw released-flag mutation; prefer [`Component::release`].
    fn set_released_flag(&mut self, released: bool);
}

macro_rules! impl_component {
    ($ty:ty) => {
        impl Component for $ty {
            fn is_active(&self) -> bool {
                self.active
            }
            fn set_active(&mut self, active: bool) {
                if self.active != active {
                    self.active = active;
                    self.effective_time = None;
                }
            }
            fn is_released(&self) -> bool {
                self.released
            }
            fn effective_time(&self) -> Option<NaiveDate> {
                self.effective_time
            }
            fn set_effective_time(&mut self, effective_time: Option<NaiveDate>) {
                self.effective_time = effective_time;
            }
            fn module_id(&self) -> &ComponentId {
                &self.module_id
            }
            fn set_released_flag(&mut self, released: bool) {
                self.released = released;
            }
        }
    };
}

/// A taxonomy node; the unit of clinical meaning.
///
/// A concept's position in the taxonomy is derived by traversing active
/// IS-A relationship edges, never stored on the concept itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Component identifier
    pub id: ComponentId,
    /// Whether the concept is in effect
    pub active: bool,
    /// Whether the concept has been published
    pub released: bool,
    /// Publication date, absent while unpublished
    pub effective_time: Option<NaiveDate>,
    /// Module owning the concept
    pub module_id: ComponentId,
    /// Primitive or fully defined
    pub definition_status_id: ComponentId,
}

impl Concept {
    /// Create a new, active, unpublished, primitive concept.
    pub fn new(id: ComponentId, module_id: ComponentId) -> Self {
        Self {
            id,
            active: true,
            released: false,
            effective_time: None,
            module_id,
            definition_status_id: constants::PRIMITIVE.clone(),
        }
    }
}

impl_component!(Concept);

/// A human-readable term attached to a concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Description {
    /// Component identifier
    pub id: ComponentId,
    /// Owning concept; None once severed
    pub concept_id: Option<ComponentId>,
    /// Whether the description is in effect
    pub active: bool,
    /// Whether the description has been published
    pub released: bool,
    /// Publication date, absent while unpublished
    pub effective_time: Option<NaiveDate>,
    /// Module owning the description
    pub module_id: ComponentId,
    /// The term text
    pub term: String,
    /// Fully specified name, synonym, or definition
    pub type_id: ComponentId,
    /// Case significance of the term
    pub case_significance_id: ComponentId,
    /// ISO 639-1 language code
    pub language_code: String,
}

impl Description {
    /// Create a new, active, unpublished synonym-like description.
    pub fn new(
        id: ComponentId,
        concept_id: ComponentId,
        term: impl Into<String>,
        type_id: ComponentId,
        module_id: ComponentId,
    ) -> Self {
        Self {
            id,
            concept_id: Some(concept_id),
            active: true,
            released: false,
            effective_time: None,
            module_id,
            term: term.into(),
            type_id,
            case_significance_id: constants::CASE_INSENSITIVE.clone(),
            language_code: "en".to_string(),
        }
    }

    /// Whether this description is a fully specified name.
    pub fn is_fsn(&self) -> bool {
        self.type_id == *constants::FULLY_SPECIFIED_NAME
    }
}

impl_component!(Description);

/// A directed, typed edge between concepts.
///
/// The IS-A type forms the taxonomy; every other type is an attribute.
/// Endpoints are optional so an edge can be severed without being destroyed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Component identifier
    pub id: ComponentId,
    /// Source concept; None once severed
    pub source_id: Option<ComponentId>,
    /// Destination concept; None once severed
    pub destination_id: Option<ComponentId>,
    /// Relationship type concept
    pub type_id: ComponentId,
    /// Role group number; 0 = ungrouped
    pub group: u8,
    /// Union group number; 0 = no union
    pub union_group: u8,
    /// Stated or inferred
    pub characteristic_type_id: ComponentId,
    /// Existential or universal restriction
    pub modifier_id: ComponentId,
    /// Whether the relationship is in effect
    pub active: bool,
    /// Whether the relationship has been published
    pub released: bool,
    /// Publication date, absent while unpublished
    pub effective_time: Option<NaiveDate>,
    /// Module owning the relationship
    pub module_id: ComponentId,
}

impl Relationship {
    /// Create a new, active, unpublished, ungrouped stated relationship.
    pub fn new(
        id: ComponentId,
        source_id: ComponentId,
        type_id: ComponentId,
        destination_id: ComponentId,
        module_id: ComponentId,
    ) -> Self {
        Self {
            id,
            source_id: Some(source_id),
            destination_id: Some(destination_id),
            type_id,
            group: 0,
            union_group: 0,
            characteristic_type_id: constants::STATED_RELATIONSHIP.clone(),
            modifier_id: constants::EXISTENTIAL_MODIFIER.clone(),
            active: true,
            released: false,
            effective_time: None,
            module_id,
        }
    }

    /// Whether this edge participates in the taxonomy.
    pub fn is_taxonomy_edge(&self) -> bool {
        self.type_id == *constants::IS_A
    }
}

impl_component!(Relationship);

impl Component for ReferenceSetMember {
    fn is_active(&self) -> bool {
        self.active
    }
    fn set_active(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.effective_time = None;
        }
    }
    fn is_released(&self) -> bool {
        self.released
    }
    fn effective_time(&self) -> Option<NaiveDate> {
        self.effective_time
    }
    fn set_effective_time(&mut self, effective_time: Option<NaiveDate>) {
        self.effective_time = effective_time;
    }
    fn module_id(&self) -> &ComponentId {
        &self.module_id
    }
    fn set_released_flag(&mut self, released: bool) {
        self.released = released;
    }
}

/// Any entity the graph can hold, as one owned value.
///
/// Used where entities of mixed kinds travel together: revision drafts,
/// deletion plans, released-state lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphComponent {
    /// A concept
    Concept(Concept),
    /// A description
    Description(Description),
    /// A relationship
    Relationship(Relationship),
    /// A reference set
    RefSet(ReferenceSet),
    /// A reference set member
    Member(ReferenceSetMember),
}

impl GraphComponent {
    /// The typed key addressing this entity.
    pub fn key(&self) -> ComponentKey {
        match self {
            GraphComponent::Concept(c) => ComponentKey::Concept(c.id.clone()),
            GraphComponent::Description(d) => ComponentKey::Description(d.id.clone()),
            GraphComponent::Relationship(r) => ComponentKey::Relationship(r.id.clone()),
            GraphComponent::RefSet(s) => ComponentKey::RefSet(s.identifier_id.clone()),
            GraphComponent::Member(m) => ComponentKey::Member(m.uuid),
        }
    }
}
