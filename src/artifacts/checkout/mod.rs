//! Working tree reconciliation
//!
//! Switching the working tree to another commit is planned in full before any
//! file is touched, so a refused checkout leaves the tree as it was.

pub mod migration;
