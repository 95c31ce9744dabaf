//! Three-way merge building blocks
//!
//! - `split_point`: lowest common ancestor of two commits
//! - `resolution`: per-file classification and conflict content

pub mod resolution;
pub mod split_point;

/// How a merge ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The other branch is an ancestor of HEAD; nothing changed
    AlreadyUpToDate,
    /// HEAD was an ancestor of the other branch and now points at its tip
    FastForward,
    /// A merge commit was written; `conflicted` tells whether markers were left
    Merged { conflicted: bool },
}
