//! Reference sets and their typed members
//!
//! A reference set is identified by a concept and carries a closed `kind`
//! discriminator. Its members carry a payload whose shape is fully
//! determined by that kind: the payload is a tagged union, and every
//! consumer (the deletion sweep's dependency check, merge replay,
//! inactivation indicator creation) matches it exhaustively, so adding a
//! kind is a compile-time-enforced exercise.

use crate::constants;
use crate::error::{Result, TermError};
use crate::types::{ComponentCategory, ComponentId, MemberId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of reference set kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSetType {
    /// Plain component collection
    Simple,
    /// Historical association (target component per member)
    Association,
    /// Attribute-value annotation (value concept per member)
    AttributeValue,
    /// Language acceptability for descriptions
    Language,
    /// Stored query definition
    Query,
    /// Single map target per member
    SimpleMap,
    /// Grouped, prioritized map with rule and advice
    ComplexMap,
    /// Complex map with an additional map category
    ExtendedMap,
    /// Typed literal with unit and comparison operator
    ConcreteDataType,
    /// Description format and length constraints
    DescriptionType,
    /// Module version dependency
    ModuleDependency,
    /// Machine-readable concept model: domain constraints
    MrcmDomain,
    /// Machine-readable concept model: attribute domain
    MrcmAttributeDomain,
    /// Machine-readable concept model: attribute range
    MrcmAttributeRange,
    /// Machine-readable concept model: module scope
    MrcmModuleScope,
    /// OWL axiom expression
    OwlAxiom,
}

impl ReferenceSetType {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceSetType::Simple => "simple",
            ReferenceSetType::Association => "association",
            ReferenceSetType::AttributeValue => "attribute-value",
            ReferenceSetType::Language => "language",
            ReferenceSetType::Query => "query",
            ReferenceSetType::SimpleMap => "simple-map",
            ReferenceSetType::ComplexMap => "complex-map",
            ReferenceSetType::ExtendedMap => "extended-map",
            ReferenceSetType::ConcreteDataType => "concrete-data-type",
            ReferenceSetType::DescriptionType => "description-type",
            ReferenceSetType::ModuleDependency => "module-dependency",
            ReferenceSetType::MrcmDomain => "mrcm-domain",
            ReferenceSetType::MrcmAttributeDomain => "mrcm-attribute-domain",
            ReferenceSetType::MrcmAttributeRange => "mrcm-attribute-range",
            ReferenceSetType::MrcmModuleScope => "mrcm-module-scope",
            ReferenceSetType::OwlAxiom => "owl-axiom",
        }
    }
}

impl fmt::Display for ReferenceSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference set: a typed, concept-identified collection of members.
///
/// The identifying concept couples concept lifecycle to reference-set
/// lifecycle: deleting or retiring the concept cascades to the set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSet {
    /// The concept identifying this reference set
    pub identifier_id: ComponentId,
    /// Which payload shape this set's members carry
    pub kind: ReferenceSetType,
    /// What kind of component members may reference
    pub referenced_component_type: ComponentCategory,
}

impl ReferenceSet {
    /// Create a reference set identified by `identifier_id`.
    pub fn new(
        identifier_id: ComponentId,
        kind: ReferenceSetType,
        referenced_component_type: ComponentCategory,
    ) -> Self {
        Self {
            identifier_id,
            kind,
            referenced_component_type,
        }
    }

    /// Check that a member's payload agrees with this set's kind.
    ///
    /// The payload shape is fully determined by the set's kind; a member
    /// carrying fields foreign to the kind is a modelling error.
    pub fn validate_member(&self, member: &ReferenceSetMember) -> Result<()> {
        if member.payload.kind() == self.kind {
            Ok(())
        } else {
            Err(TermError::UnsupportedComponentType {
                detail: format!(
                    "member {} carries a {} payload but reference set {} is {}",
                    member.uuid,
                    member.payload.kind(),
                    self.identifier_id,
                    self.kind
                ),
            })
        }
    }
}

/// A typed literal carried by a concrete-data-type member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// Boolean literal
    Boolean(bool),
    /// Integer literal
    Integer(i64),
    /// Decimal literal, kept in its lexical form
    Decimal(String),
    /// String literal
    String(String),
}

/// Payload of a reference set member, one variant per reference set kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MemberPayload {
    /// No extra fields
    Simple,
    /// Historical association target
    Association {
        /// Component the association points at
        target_component_id: ComponentId,
    },
    /// Attribute-value annotation
    AttributeValue {
        /// Value concept (e.g. an inactivation indicator)
        value_id: ComponentId,
    },
    /// Per-locale acceptability of a description
    Language {
        /// Preferred or acceptable
        acceptability_id: ComponentId,
    },
    /// Stored query
    Query {
        /// Query source text
        query: String,
    },
    /// Single map target
    SimpleMap {
        /// Target code in the external scheme
        map_target: String,
    },
    /// Grouped, prioritized map entry
    ComplexMap {
        /// Target code in the external scheme
        map_target: String,
        /// Map group
        group: u8,
        /// Priority within the group
        priority: u8,
        /// Machine-readable rule
        map_rule: String,
        /// Human-readable advice
        map_advice: String,
        /// Correlation concept
        correlation_id: ComponentId,
    },
    /// Complex map entry with a map category
    ExtendedMap {
        /// Target code in the external scheme
        map_target: String,
        /// Map group
        group: u8,
        /// Priority within the group
        priority: u8,
        /// Machine-readable rule
        map_rule: String,
        /// Human-readable advice
        map_advice: String,
        /// Correlation concept
        correlation_id: ComponentId,
        /// Map category concept
        map_category_id: ComponentId,
    },
    /// Typed literal with unit, operator, and characteristic type
    ConcreteDataType {
        /// The literal value
        value: DataValue,
        /// Attribute label
        label: String,
        /// Unit of measure concept, when applicable
        uom_id: Option<ComponentId>,
        /// Comparison operator concept
        operator_id: ComponentId,
        /// Stated or inferred characteristic
        characteristic_type_id: ComponentId,
    },
    /// Description format constraint
    DescriptionType {
        /// Description format concept
        description_format_id: ComponentId,
        /// Maximum description length
        description_length: u32,
    },
    /// Module version dependency
    ModuleDependency {
        /// Effective time of the depending module
        source_effective_time: Option<NaiveDate>,
        /// Effective time of the module depended upon
        target_effective_time: Option<NaiveDate>,
    },
    /// MRCM domain constraint
    MrcmDomain {
        /// Domain constraint expression
        domain_constraint: String,
        /// Parent domain expression, when nested
        parent_domain: Option<String>,
        /// Proximal primitive constraint expression
        proximal_primitive_constraint: String,
        /// Domain template for precoordination
        domain_template: String,
    },
    /// MRCM attribute domain constraint
    MrcmAttributeDomain {
        /// Domain concept
        domain_id: ComponentId,
        /// Whether the attribute may appear in a role group
        grouped: bool,
        /// Cardinality of the attribute
        attribute_cardinality: String,
        /// Cardinality of the attribute within a group
        attribute_in_group_cardinality: String,
        /// Mandatory or optional rule strength concept
        rule_strength_id: ComponentId,
        /// Applicable content type concept
        content_type_id: ComponentId,
    },
    /// MRCM attribute range constraint
    MrcmAttributeRange {
        /// Range constraint expression
        range_constraint: String,
        /// Attribute rule expression
        attribute_rule: String,
        /// Mandatory or optional rule strength concept
        rule_strength_id: ComponentId,
        /// Applicable content type concept
        content_type_id: ComponentId,
    },
    /// MRCM module scope
    MrcmModuleScope {
        /// Ruleset reference set in scope for the module
        mrcm_ruleset_refset_id: ComponentId,
    },
    /// OWL axiom expression
    OwlAxiom {
        /// OWL functional syntax expression
        owl_expression: String,
    },
}

impl MemberPayload {
    /// The reference set kind this payload belongs to.
    pub fn kind(&self) -> ReferenceSetType {
        match self {
            MemberPayload::Simple => ReferenceSetType::Simple,
            MemberPayload::Association { .. } => ReferenceSetType::Association,
            MemberPayload::AttributeValue { .. } => ReferenceSetType::AttributeValue,
            MemberPayload::Language { .. } => ReferenceSetType::Language,
            MemberPayload::Query { .. } => ReferenceSetType::Query,
            MemberPayload::SimpleMap { .. } => ReferenceSetType::SimpleMap,
            MemberPayload::ComplexMap { .. } => ReferenceSetType::ComplexMap,
            MemberPayload::ExtendedMap { .. } => ReferenceSetType::ExtendedMap,
            MemberPayload::ConcreteDataType { .. } => ReferenceSetType::ConcreteDataType,
            MemberPayload::DescriptionType { .. } => ReferenceSetType::DescriptionType,
            MemberPayload::ModuleDependency { .. } => ReferenceSetType::ModuleDependency,
            MemberPayload::MrcmDomain { .. } => ReferenceSetType::MrcmDomain,
            MemberPayload::MrcmAttributeDomain { .. } => ReferenceSetType::MrcmAttributeDomain,
            MemberPayload::MrcmAttributeRange { .. } => ReferenceSetType::MrcmAttributeRange,
            MemberPayload::MrcmModuleScope { .. } => ReferenceSetType::MrcmModuleScope,
            MemberPayload::OwlAxiom { .. } => ReferenceSetType::OwlAxiom,
        }
    }

    /// Every component id held inside the payload.
    ///
    /// This is the payload half of the "does this member depend on component
    /// X through any property" check the deletion sweep performs.
    pub fn referenced_ids(&self) -> Vec<&ComponentId> {
        match self {
            MemberPayload::Simple
            | MemberPayload::Query { .. }
            | MemberPayload::SimpleMap { .. }
            | MemberPayload::ModuleDependency { .. }
            | MemberPayload::MrcmDomain { .. }
            | MemberPayload::OwlAxiom { .. } => Vec::new(),
            MemberPayload::Association {
                target_component_id,
            } => vec![target_component_id],
            MemberPayload::AttributeValue { value_id } => vec![value_id],
            MemberPayload::Language { acceptability_id } => vec![acceptability_id],
            MemberPayload::ComplexMap { correlation_id, .. } => vec![correlation_id],
            MemberPayload::ExtendedMap {
                correlation_id,
                map_category_id,
                ..
            } => vec![correlation_id, map_category_id],
            MemberPayload::ConcreteDataType {
                uom_id,
                operator_id,
                characteristic_type_id,
                ..
            } => {
                let mut ids = vec![operator_id, characteristic_type_id];
                if let Some(uom) = uom_id {
                    ids.push(uom);
                }
                ids
            }
            MemberPayload::DescriptionType {
                description_format_id,
                ..
            } => vec![description_format_id],
            MemberPayload::MrcmAttributeDomain {
                domain_id,
                rule_strength_id,
                content_type_id,
                ..
            } => vec![domain_id, rule_strength_id, content_type_id],
            MemberPayload::MrcmAttributeRange {
                rule_strength_id,
                content_type_id,
                ..
            } => vec![rule_strength_id, content_type_id],
            MemberPayload::MrcmModuleScope {
                mrcm_ruleset_refset_id,
            } => vec![mrcm_ruleset_refset_id],
        }
    }
}

/// A reference set member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceSetMember {
    /// Member identity
    pub uuid: MemberId,
    /// Whether the membership is in effect
    pub active: bool,
    /// Whether the member has appeared in a published snapshot
    pub released: bool,
    /// Publication date, absent while unpublished
    pub effective_time: Option<NaiveDate>,
    /// Module owning the member
    pub module_id: ComponentId,
    /// Reference set this member belongs to
    pub refset_id: ComponentId,
    /// Component the membership annotates
    pub referenced_component_id: ComponentId,
    /// Kind-specific payload
    pub payload: MemberPayload,
}

impl ReferenceSetMember {
    /// Create a new, active, unpublished member with a fresh uuid.
    pub fn new(
        refset_id: ComponentId,
        referenced_component_id: ComponentId,
        module_id: ComponentId,
        payload: MemberPayload,
    ) -> Self {
        Self {
            uuid: MemberId::new(),
            active: true,
            released: false,
            effective_time: None,
            module_id,
            refset_id,
            referenced_component_id,
            payload,
        }
    }

    /// Whether this member depends on `id` through any property: the
    /// referenced component, the owning reference set, or any payload field.
    pub fn references(&self, id: &ComponentId) -> bool {
        self.referenced_component_id == *id
            || self.refset_id == *id
            || self.payload.referenced_ids().into_iter().any(|r| r == id)
    }

    /// Whether this member expresses preferred acceptability.
    pub fn is_preferred_language(&self) -> bool {
        matches!(
            &self.payload,
            MemberPayload::Language { acceptability_id } if *acceptability_id == *constants::PREFERRED
        )
    }
}

/// Why a component is being retired.
///
/// Each reason except `Retired` is statically mapped to one historical
/// association reference set and one inactivation indicator value.
/// `PendingMove` is accepted for completeness, but its semantics require
/// the concept to remain active; combining it with cascading inactivation
/// is flagged by the planner rather than resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InactivationReason {
    /// Duplicates another concept (SAME AS)
    Duplicate,
    /// Superseded content (REPLACED BY)
    Outdated,
    /// Carries more than one meaning (POSSIBLY EQUIVALENT TO)
    Ambiguous,
    /// Incorrect content (REPLACED BY)
    Erroneous,
    /// Limited clinical value (WAS A)
    Limited,
    /// Moved to another code system (MOVED TO)
    MovedElsewhere,
    /// Scheduled to move to another code system (MOVED TO)
    PendingMove,
    /// Bare retirement, no association and no indicator
    Retired,
}

impl InactivationReason {
    /// Historical association reference set for this reason, when one applies.
    pub fn association_refset_id(&self) -> Option<&'static ComponentId> {
        match self {
            InactivationReason::Duplicate => Some(&constants::SAME_AS_ASSOCIATION_REFSET),
            InactivationReason::Outdated | InactivationReason::Erroneous => {
                Some(&constants::REPLACED_BY_ASSOCIATION_REFSET)
            }
            InactivationReason::Ambiguous => {
                Some(&constants::POSSIBLY_EQUIVALENT_TO_ASSOCIATION_REFSET)
            }
            InactivationReason::Limited => Some(&constants::WAS_A_ASSOCIATION_REFSET),
            InactivationReason::MovedElsewhere | InactivationReason::PendingMove => {
                Some(&constants::MOVED_TO_ASSOCIATION_REFSET)
            }
            InactivationReason::Retired => None,
        }
    }

    /// Inactivation indicator value for this reason, when one applies.
    pub fn indicator_id(&self) -> Option<&'static ComponentId> {
        match self {
            InactivationReason::Duplicate => Some(&constants::DUPLICATE_COMPONENT),
            InactivationReason::Outdated => Some(&constants::OUTDATED_COMPONENT),
            InactivationReason::Ambiguous => Some(&constants::AMBIGUOUS_COMPONENT),
            InactivationReason::Erroneous => Some(&constants::ERRONEOUS_COMPONENT),
            InactivationReason::Limited => Some(&constants::LIMITED_COMPONENT),
            InactivationReason::MovedElsewhere => Some(&constants::MOVED_ELSEWHERE),
            InactivationReason::PendingMove => Some(&constants::PENDING_MOVE_VALUE),
            InactivationReason::Retired => None,
        }
    }
}
