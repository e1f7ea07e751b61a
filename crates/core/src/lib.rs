//! Core types and traits for the terminology editing core
//!
//! This crate defines the foundational pieces used throughout the system:
//! - ComponentId / MemberId / ComponentKey: entity addressing
//! - BranchPath / RevisionId: branch-qualified versioning
//! - Concept / Description / Relationship: graph components
//! - ReferenceSet / ReferenceSetMember / MemberPayload: typed memberships
//! - GraphArena: id-addressed component store per snapshot or context
//! - TermError: error type hierarchy
//! - Boundary traits: RevisionStore, IdentifierService, TerminologyReader,
//!   BranchRegistry, ReleasedStateSource
//! - memory: in-memory reference implementations of the boundary traits

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arena;
pub mod cancel;
pub mod component;
pub mod constants;
pub mod error;
pub mod memory;
pub mod refset;
pub mod sctid;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use arena::GraphArena;
pub use cancel::CancellationToken;
pub use component::{Component, Concept, Description, GraphComponent, Relationship};
pub use error::{Result, TermError};
pub use refset::{
    DataValue, InactivationReason, MemberPayload, ReferenceSet, ReferenceSetMember,
    ReferenceSetType,
};
pub use traits::{
    BranchRegistry, GraphSnapshot, IdentifierService, ReleasedStateSource, RevisionDraft,
    RevisionStore, TaxonomyView, TerminologyReader,
};
pub use types::{
    BranchPath, ComponentCategory, ComponentId, ComponentKey, IdNamespace, MemberId, RevisionId,
};
