//! Error types for the editing core
//!
//! One `thiserror` enum covers the whole crate family. Two outcomes that
//! look like errors deliberately are not: cooperative cancellation returns
//! an empty plan, and a merge-level refresh-required conflict is a variant
//! of `MergeOutcome`; both leave no resources corrupted and carry no
//! failure semantics.

use crate::types::ComponentCategory;
use thiserror::Error;

/// Result type alias for editing-core operations.
pub type Result<T> = std::result::Result<T, TermError>;

/// Error types for the editing core.
#[derive(Debug, Clone, Error)]
pub enum TermError {
    /// Deletion or inactivation blocked by released-component protection.
    ///
    /// The reasons accumulate across the whole plan and surface verbatim at
    /// the commit boundary; nothing is applied.
    #[error("operation rejected: {}", reasons.join("; "))]
    Rejected {
        /// Every rejection recorded while planning
        reasons: Vec<String>,
    },

    /// The uniqueness validator could not find a free identifier within the
    /// configured retry bound.
    #[error("identifier space exhausted for {category} after {attempts} attempts")]
    IdentifierSpaceExhausted {
        /// Category being allocated
        category: ComponentCategory,
        /// Number of generation attempts made
        attempts: usize,
    },

    /// An operation received an entity or member variant it does not know
    /// how to process. Programming invariant violation, not recoverable.
    #[error("unsupported component type: {detail}")]
    UnsupportedComponentType {
        /// What was encountered and where
        detail: String,
    },

    /// Replaying a stale transaction onto a fresh one failed structurally.
    ///
    /// The dirty context has already been closed when this surfaces.
    #[error("merge failed: {reason}")]
    MergeFailed {
        /// What went wrong during replay
        reason: String,
    },

    /// An entity lookup failed where the entity was required to exist.
    #[error("not found: {id}")]
    NotFound {
        /// Identifier that failed to resolve
        id: String,
    },

    /// Invalid operation or state.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Underlying revision store error.
    #[error("store error: {0}")]
    Store(String),
}

impl TermError {
    /// Convenience constructor for a single-reason rejection.
    pub fn rejected(reason: impl Into<String>) -> Self {
        TermError::Rejected {
            reasons: vec![reason.into()],
        }
    }
}
