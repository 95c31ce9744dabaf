//! Version-control data structures and algorithms
//!
//! - `branch`: branch names and revision parsing
//! - `checkout`: working tree migration between commits
//! - `core`: shared output utilities (pager wrapper)
//! - `index`: binary layout of the stage file
//! - `log`: commit graph traversal
//! - `merge`: split point search and three-way classification
//! - `objects`: blob and commit objects
//! - `status`: working tree status inspection

pub mod branch;
pub mod checkout;
pub mod core;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
