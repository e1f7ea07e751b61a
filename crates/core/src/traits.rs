//! Boundary traits consumed and exposed by the editing core
//!
//! The core is a library inside a server process; these traits are its only
//! seams. The revision store persists committed revisions and answers
//! point-in-time reads; the identifier service issues and reclaims
//! identifiers; the branch registry resolves branch ancestry; the
//! terminology reader answers graph queries against a branch tip.
//!
//! Reader implementations are bound to a branch at construction and must
//! answer against that branch's current tip at call time; the core does not
//! cache results across calls.

use crate::arena::GraphArena;
use crate::component::GraphComponent;
use crate::error::Result;
use crate::refset::ReferenceSetMember;
use crate::types::{
    BranchPath, ComponentCategory, ComponentId, ComponentKey, IdNamespace, RevisionId,
};
use rustc_hash::FxHashSet;

/// Taxonomic reachability oracle over active IS-A edges.
///
/// Both operations are exclusive of the queried id and transitive.
pub trait TaxonomyView {
    /// All ancestors of `id`, excluding `id`.
    fn ancestors_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>>;
    /// All descendants of `id`, excluding `id`.
    fn descendants_of(&self, id: &ComponentId) -> Result<FxHashSet<ComponentId>>;
}

/// Graph queries the editing core delegates to the query collaborator.
pub trait TerminologyReader: TaxonomyView {
    /// Active members referencing `id` as their referenced component.
    fn active_members_referencing(&self, id: &ComponentId) -> Result<Vec<ReferenceSetMember>>;
    /// Resolve a batch of component ids to their current entities.
    ///
    /// Unknown ids are silently absent from the result.
    fn find_by_ids(&self, ids: &[ComponentId]) -> Result<Vec<GraphComponent>>;
}

/// External identifier issuance and reclamation.
///
/// The service guarantees cross-transaction uniqueness of generated ids;
/// within-transaction collisions are repaired by the editing context's
/// uniqueness validator.
pub trait IdentifierService {
    /// Issue a candidate identifier for a category within a namespace.
    fn generate(&self, category: ComponentCategory, namespace: IdNamespace)
        -> Result<ComponentId>;
    /// Return unused identifiers to the pool.
    ///
    /// Called on every transaction failure or abandonment exit path so
    /// pending identifiers never leak.
    fn release(&self, ids: &FxHashSet<ComponentId>) -> Result<()>;
}

/// Branch path resolution.
pub trait BranchRegistry {
    /// The branch itself, then its parent, up to the root.
    fn ancestry(&self, path: &BranchPath) -> Result<Vec<BranchPath>>;
}

/// A consistent point-in-time read of a branch.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    /// Revision the snapshot was taken at
    pub head: RevisionId,
    /// Every entity visible on the branch at that revision
    pub arena: GraphArena,
}

/// The contents of one commit, handed to the revision store atomically.
#[derive(Debug, Clone)]
pub struct RevisionDraft {
    /// Caller-supplied commit message
    pub message: String,
    /// Entities that did not exist before this revision
    pub created: Vec<GraphComponent>,
    /// Full new state of entities that changed in this revision
    pub changed: Vec<GraphComponent>,
    /// Entities removed in this revision
    pub deleted: Vec<ComponentKey>,
}

impl RevisionDraft {
    /// Whether the draft carries no work.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }
}

/// The revision-storage engine, at its interface boundary.
pub trait RevisionStore {
    /// Read a consistent snapshot of a branch at its current tip.
    fn read_snapshot(&self, branch: &BranchPath) -> Result<GraphSnapshot>;
    /// The branch's current tip revision.
    fn head(&self, branch: &BranchPath) -> Result<RevisionId>;
    /// Atomically commit a new revision to a branch.
    fn commit(&self, branch: &BranchPath, draft: RevisionDraft) -> Result<RevisionId>;
}

/// Source of the latest released state of a component on a branch.
///
/// Consumed by the effective-time restoration pass, which walks the branch
/// ancestry bottom-to-top looking for the published form of an edited
/// component.
pub trait ReleasedStateSource {
    /// The latest released state of the component on the given branch, if
    /// the component has ever been published there.
    fn released_state(
        &self,
        branch: &BranchPath,
        key: &ComponentKey,
    ) -> Result<Option<GraphComponent>>;
}
