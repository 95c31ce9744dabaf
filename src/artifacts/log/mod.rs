//! Commit history traversal
//!
//! - `commit_graph`: queries over the stored commit DAG (parents, every
//!   commit ever written, split points)
//! - `rev_list`: lazy first-parent walk used by `log`

pub mod commit_graph;
pub mod rev_list;
