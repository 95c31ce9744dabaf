//! Working tree status inspection
//!
//! Compares the working tree against the stage and the HEAD commit.
//!
//! ## Components
//!
//! - `file_change`: labels for unstaged modifications
//! - `status_info`: collects branches, staged, removed, modified and untracked files

pub mod file_change;
pub mod status_info;
