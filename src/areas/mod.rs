//! Core repository components
//!
//! - `database`: content-addressable store for blobs and commits
//! - `index`: staging area for the next commit
//! - `refs`: branches and HEAD
//! - `repository`: ties the areas together for a single working root
//! - `workspace`: working directory file system operations

pub(crate) mod database;
pub(crate) mod index;
pub(crate) mod refs;
pub mod repository;
pub(crate) mod workspace;
