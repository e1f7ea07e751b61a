//! Termgraph - editing and reconciliation core for a branched, versioned
//! terminology server
//!
//! Termgraph maintains a clinical coding graph of concepts, descriptions,
//! relationships, and typed reference-set memberships under concurrent
//! editing. Staging transactions buffer edits against a branch snapshot;
//! deletion and inactivation planners keep referential and release
//! invariants intact; the merge engine replays a stale transaction onto a
//! freshly opened one when the branch tip has advanced.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use termgraph::memory::{MemoryStore, SequentialIdService};
//! use termgraph::{constants, BranchPath, EditingConfig, EditingContext};
//!
//! let store = MemoryStore::new();
//! let ids = Arc::new(SequentialIdService::new());
//!
//! let mut ctx = EditingContext::open(
//!     &store,
//!     ids,
//!     BranchPath::main(),
//!     EditingConfig::default(),
//! )?;
//! let concept = ctx.create_concept()?;
//! ctx.add_description(&concept, "Example (example)", constants::FULLY_SPECIFIED_NAME.clone())?;
//! ctx.commit(&store, "add example concept")?;
//! # Ok::<(), termgraph::TermError>(())
//! ```
//!
//! # Architecture
//!
//! The persistence engine, identifier issuance, branch registry, and graph
//! query index are external collaborators reached through the traits in
//! [`termgraph_core::traits`]; [`memory`] provides process-local reference
//! implementations sufficient for embedding and tests.

// Re-export the public API from the member crates
pub use termgraph_core::*;
pub use termgraph_editing::{
    collect_self_and_descendants, restore_effective_times, Change, DeletionPlan, EditingConfig,
    EditingContext, InactivationPlan, Role,
};
pub use termgraph_merge::{merge, MergeOutcome};
