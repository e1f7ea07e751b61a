//! Core identifier and addressing types
//!
//! This module defines the foundational types:
//! - ComponentId: SCTID-shaped identifier for concepts, descriptions, relationships
//! - MemberId: UUID identifier for reference set members
//! - ComponentCategory: partition of the identifier space
//! - ComponentKey: typed handle addressing any entity in an arena
//! - BranchPath: hierarchical branch name with bottom-to-top ancestry
//! - RevisionId: monotonically increasing commit revision

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier for a concept, description, or relationship.
///
/// A ComponentId wraps the string form of an SCTID. The wrapper is
/// deliberately permissive: syntactic validation (length, partition digit,
/// check digit) lives in [`crate::sctid`] and is applied at the boundaries
/// that need it, not on construction, because editing contexts must be able
/// to hold identifiers issued by external tooling verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a ComponentId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// View the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Category encoded in the partition digit, if the identifier is a
    /// syntactically valid SCTID.
    pub fn category(&self) -> Option<ComponentCategory> {
        crate::sctid::category_of(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a reference set member.
///
/// A MemberId is a wrapper around a UUID v4. Members are the only entities
/// addressed by UUID; all other components use SCTID-shaped [`ComponentId`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Create a new random MemberId using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a MemberId from raw bytes.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a MemberId from a string representation.
    ///
    /// Accepts standard UUID format (with or without hyphens). Returns None
    /// if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this MemberId.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partition of the component identifier space.
///
/// The category is encoded in the second-to-last digit of an SCTID and
/// selects which kind of component an identifier may address. Identifier
/// generation is always performed per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentCategory {
    /// Concept identifiers (partition digit 0)
    Concept,
    /// Description identifiers (partition digit 1)
    Description,
    /// Relationship identifiers (partition digit 2)
    Relationship,
}

impl ComponentCategory {
    /// Partition digit for identifiers in this category.
    ///
    /// The same digit is used for both the short (international) and long
    /// (namespaced) identifier formats; the preceding digit distinguishes
    /// the two formats.
    pub fn partition_digit(&self) -> u8 {
        match self {
            ComponentCategory::Concept => 0,
            ComponentCategory::Description => 1,
            ComponentCategory::Relationship => 2,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Concept => "concept",
            ComponentCategory::Description => "description",
            ComponentCategory::Relationship => "relationship",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifier namespace for extension content.
///
/// `None` addresses the international (core) identifier space; `Some(n)`
/// addresses the seven-digit extension namespace `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IdNamespace(pub Option<u32>);

impl IdNamespace {
    /// The international (core) namespace.
    pub const INTERNATIONAL: IdNamespace = IdNamespace(None);

    /// An extension namespace.
    pub fn extension(namespace: u32) -> Self {
        Self(Some(namespace))
    }
}

impl fmt::Display for IdNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{:07}", n),
            None => write!(f, "core"),
        }
    }
}

/// Typed handle addressing any entity held by a graph arena.
///
/// Every write-tracking structure (created/changed/detached sets, deletion
/// plans) stores ComponentKeys rather than entity values, so membership
/// checks are cheap and iteration order is deterministic via `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKey {
    /// A concept, by id
    Concept(ComponentId),
    /// A description, by id
    Description(ComponentId),
    /// A relationship, by id
    Relationship(ComponentId),
    /// A reference set, by its identifier concept id
    RefSet(ComponentId),
    /// A reference set member, by uuid
    Member(MemberId),
}

impl ComponentKey {
    /// The component id behind this key, when the entity is id-addressed.
    ///
    /// Members are uuid-addressed and return None.
    pub fn component_id(&self) -> Option<&ComponentId> {
        match self {
            ComponentKey::Concept(id)
            | ComponentKey::Description(id)
            | ComponentKey::Relationship(id)
            | ComponentKey::RefSet(id) => Some(id),
            ComponentKey::Member(_) => None,
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKey::Concept(id) => write!(f, "concept {}", id),
            ComponentKey::Description(id) => write!(f, "description {}", id),
            ComponentKey::Relationship(id) => write!(f, "relationship {}", id),
            ComponentKey::RefSet(id) => write!(f, "reference set {}", id),
            ComponentKey::Member(id) => write!(f, "member {}", id),
        }
    }
}

/// Hierarchical branch name: `MAIN`, `MAIN/extension`, `MAIN/extension/task-12`.
///
/// A branch path is a `/`-delimited name. Bottom-to-top traversal yields the
/// branch itself, then its parent, up to the root; this ordering is the one
/// the effective-time restoration pass consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BranchPath(String);

impl BranchPath {
    /// Create a branch path from its string form.
    ///
    /// Returns None when the path is empty or contains an empty segment
    /// (leading, trailing, or doubled separator).
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.is_empty() || path.split('/').any(|segment| segment.is_empty()) {
            return None;
        }
        Some(Self(path))
    }

    /// The conventional root branch.
    pub fn main() -> Self {
        Self("MAIN".to_string())
    }

    /// View the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The parent branch, or None at the root.
    pub fn parent(&self) -> Option<BranchPath> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Whether this path has no parent.
    pub fn is_root(&self) -> bool {
        !self.0.contains('/')
    }

    /// A direct child of this branch.
    pub fn child(&self, segment: &str) -> Option<BranchPath> {
        if segment.is_empty() || segment.contains('/') {
            return None;
        }
        Some(Self(format!("{}/{}", self.0, segment)))
    }

    /// Iterate bottom-to-top: this branch, its parent, ..., the root.
    pub fn ancestry(&self) -> impl Iterator<Item = BranchPath> {
        std::iter::successors(Some(self.clone()), |path| path.parent())
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a committed revision.
///
/// Revisions are totally ordered per store; the store allocates the next
/// id on each successful commit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct RevisionId(u64);

impl RevisionId {
    /// Wrap a raw revision number.
    pub fn new(revision: u64) -> Self {
        Self(revision)
    }

    /// The raw revision number.
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The revision that follows this one.
    pub fn next(&self) -> RevisionId {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
