//! Editing engine for the terminology core
//!
//! This crate hosts the staging transaction and the planners that run
//! inside it:
//! - EditingContext: branch-qualified snapshot plus buffered edits
//! - Identifier uniqueness validation with bounded replacement
//! - DeletionPlan: cascading deletion with released-component protection
//! - InactivationPlan: retirement with indicator/association memberships
//! - Taxonomic survivor computation
//! - Effective-time restoration over the branch ancestry

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod change;
pub mod config;
pub mod context;
pub mod deletion;
pub mod effective_time;
mod identifier;
pub mod inactivation;
pub mod taxonomy;

pub use change::{Change, Role};
pub use config::EditingConfig;
pub use context::EditingContext;
pub use deletion::DeletionPlan;
pub use effective_time::restore_effective_times;
pub use inactivation::InactivationPlan;
pub use taxonomy::collect_self_and_descendants;
