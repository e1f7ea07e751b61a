//! Field-level change deltas
//!
//! Every mutation an editing context performs on an already-persisted entity
//! is recorded as a `Change` value. Replay, in particular the merge
//! engine's replay of a stale context onto a fresh one, is then a match
//! over a closed set of variants instead of generic field access.
//!
//! Applying a change to a released component is restricted: identifying
//! fields may not move, while activity, module, publication date, and member
//! annotation values remain mutable.

use serde::{Deserialize, Serialize};
use termgraph_core::arena::GraphArena;
use termgraph_core::component::Component;
use termgraph_core::error::{Result, TermError};
use termgraph_core::refset::MemberPayload;
use termgraph_core::types::{ComponentId, ComponentKey};

/// Which reference slot a [`Change::Rebind`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Relationship source concept
    Source,
    /// Relationship destination concept
    Destination,
    /// Description's owning concept
    Concept,
    /// Member's owning reference set
    ReferenceSet,
    /// Member's referenced component
    ReferencedComponent,
    /// Association payload target
    AssociationTarget,
    /// Attribute-value payload value
    AttributeValue,
}

/// One field-level delta applied to an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// Toggle activity
    SetActive(bool),
    /// Reassign the owning module
    SetModule(ComponentId),
    /// Set or clear the publication date
    SetEffectiveTime(Option<chrono::NaiveDate>),
    /// Replace a description's term
    SetTerm(String),
    /// Replace a description's case significance
    SetCaseSignificance(ComponentId),
    /// Replace a description's language code
    SetLanguageCode(String),
    /// Replace a description's type
    SetDescriptionType(ComponentId),
    /// Replace a concept's definition status
    SetDefinitionStatus(ComponentId),
    /// Replace a relationship's type
    SetRelationshipType(ComponentId),
    /// Replace a relationship's role group
    SetGroup(u8),
    /// Replace a relationship's union group
    SetUnionGroup(u8),
    /// Replace a relationship's characteristic type
    SetCharacteristicType(ComponentId),
    /// Replace a relationship's modifier
    SetModifier(ComponentId),
    /// Replace a language member's acceptability
    SetAcceptability(ComponentId),
    /// Repoint a reference slot; None severs optional links
    Rebind(Role, Option<ComponentId>),
}

impl Change {
    /// Whether this change may be applied to a released component.
    ///
    /// Released components keep their identifying fields; activity, module,
    /// publication date, and member annotation values stay mutable.
    pub fn allowed_on_released(&self) -> bool {
        matches!(
            self,
            Change::SetActive(_)
                | Change::SetModule(_)
                | Change::SetEffectiveTime(_)
                | Change::SetAcceptability(_)
                | Change::Rebind(Role::AssociationTarget, _)
                | Change::Rebind(Role::AttributeValue, _)
        )
    }
}

fn unsupported(key: &ComponentKey, change: &Change) -> TermError {
    TermError::UnsupportedComponentType {
        detail: format!("{:?} cannot be applied to {}", change, key),
    }
}

fn missing(key: &ComponentKey) -> TermError {
    TermError::NotFound {
        id: key.to_string(),
    }
}

fn required(role: Role, id: Option<ComponentId>) -> Result<ComponentId> {
    id.ok_or_else(|| {
        TermError::InvalidOperation(format!("rebinding {:?} requires a target id", role))
    })
}

/// Apply one change to the entity addressed by `key`.
///
/// Any mutation other than an explicit `SetEffectiveTime` leaves the entity
/// unpublished (effective time cleared). Returns `NotFound` when the arena
/// does not hold the entity and `UnsupportedComponentType` when the change
/// does not fit the entity kind.
pub fn apply_change(arena: &mut GraphArena, key: &ComponentKey, change: Change) -> Result<()> {
    match key {
        ComponentKey::Concept(id) => {
            let Some(concept) = arena.concept_mut(id) else {
                return Err(missing(key));
            };
            match change {
                Change::SetActive(active) => concept.set_active(active),
                Change::SetModule(module) => {
                    concept.module_id = module;
                    concept.effective_time = None;
                }
                Change::SetEffectiveTime(et) => concept.effective_time = et,
                Change::SetDefinitionStatus(status) => {
                    concept.definition_status_id = status;
                    concept.effective_time = None;
                }
                other => return Err(unsupported(key, &other)),
            }
        }
        ComponentKey::Description(id) => {
            let Some(description) = arena.description_mut(id) else {
                return Err(missing(key));
            };
            match change {
                Change::SetActive(active) => description.set_active(active),
                Change::SetModule(module) => {
                    description.module_id = module;
                    description.effective_time = None;
                }
                Change::SetEffectiveTime(et) => description.effective_time = et,
                Change::SetTerm(term) => {
                    description.term = term;
                    description.effective_time = None;
                }
                Change::SetCaseSignificance(case) => {
                    description.case_significance_id = case;
                    description.effective_time = None;
                }
                Change::SetLanguageCode(code) => {
                    description.language_code = code;
                    description.effective_time = None;
                }
                Change::SetDescriptionType(type_id) => {
                    description.type_id = type_id;
                    description.effective_time = None;
                }
                Change::Rebind(Role::Concept, concept_id) => {
                    description.concept_id = concept_id;
                    description.effective_time = None;
                }
                other => return Err(unsupported(key, &other)),
            }
        }
        ComponentKey::Relationship(id) => {
            let Some(relationship) = arena.relationship_mut(id) else {
                return Err(missing(key));
            };
            match change {
                Change::SetActive(active) => relationship.set_active(active),
                Change::SetModule(module) => {
                    relationship.module_id = module;
                    relationship.effective_time = None;
                }
                Change::SetEffectiveTime(et) => relationship.effective_time = et,
                Change::SetRelationshipType(type_id) => {
                    relationship.type_id = type_id;
                    relationship.effective_time = None;
                }
                Change::SetGroup(group) => {
                    relationship.group = group;
                    relationship.effective_time = None;
                }
                Change::SetUnionGroup(group) => {
                    relationship.union_group = group;
                    relationship.effective_time = None;
                }
                Change::SetCharacteristicType(characteristic) => {
                    relationship.characteristic_type_id = characteristic;
                    relationship.effective_time = None;
                }
                Change::SetModifier(modifier) => {
                    relationship.modifier_id = modifier;
                    relationship.effective_time = None;
                }
                Change::Rebind(Role::Source, source) => {
                    relationship.source_id = source;
                    relationship.effective_time = None;
                }
                Change::Rebind(Role::Destination, destination) => {
                    relationship.destination_id = destination;
                    relationship.effective_time = None;
                }
                other => return Err(unsupported(key, &other)),
            }
        }
        ComponentKey::RefSet(_) => {
            // Reference sets have no mutable fields of their own; their
            // lifecycle follows the identifying concept.
            return Err(unsupported(key, &change));
        }
        ComponentKey::Member(uuid) => {
            let Some(member) = arena.member_mut(uuid) else {
                return Err(missing(key));
            };
            match change {
                Change::SetActive(active) => member.set_active(active),
                Change::SetModule(module) => {
                    member.module_id = module;
                    member.effective_time = None;
                }
                Change::SetEffectiveTime(et) => member.effective_time = et,
                Change::SetAcceptability(acceptability) => match &mut member.payload {
                    MemberPayload::Language { acceptability_id } => {
                        *acceptability_id = acceptability;
                        member.effective_time = None;
                    }
                    _ => {
                        return Err(unsupported(key, &Change::SetAcceptability(acceptability)));
                    }
                },
                Change::Rebind(Role::ReferenceSet, refset) => {
                    member.refset_id = required(Role::ReferenceSet, refset)?;
                    member.effective_time = None;
                }
                Change::Rebind(Role::ReferencedComponent, referenced) => {
                    member.referenced_component_id = required(Role::ReferencedComponent, referenced)?;
                    member.effective_time = None;
                }
                Change::Rebind(Role::AssociationTarget, target) => match &mut member.payload {
                    MemberPayload::Association {
                        target_component_id,
                    } => {
                        *target_component_id = required(Role::AssociationTarget, target)?;
                        member.effective_time = None;
                    }
                    _ => return Err(unsupported(key, &Change::Rebind(Role::AssociationTarget, target))),
                },
                Change::Rebind(Role::AttributeValue, value) => match &mut member.payload {
                    MemberPayload::AttributeValue { value_id } => {
                        *value_id = required(Role::AttributeValue, value)?;
                        member.effective_time = None;
                    }
                    _ => return Err(unsupported(key, &Change::Rebind(Role::AttributeValue, value))),
                },
                other => return Err(unsupported(key, &other)),
            }
        }
    }
    Ok(())
}
