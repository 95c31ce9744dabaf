//! gitlet: a miniature version-control engine
//!
//! - `areas`: on-disk state (object database, stage, refs, workspace) and the repository
//! - `artifacts`: objects, stage record format, revisions, history, checkout and merge planning
//! - `commands`: user-facing operations, one per CLI command
//! - `errors`: user-facing error taxonomy

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;

pub use errors::{GitletError, UsageError};
