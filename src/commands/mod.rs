//! Command implementations
//!
//! Every command is an `impl Repository` block in `porcelain`. Commands print
//! through the repository writer and report user errors as `GitletError`.

pub mod porcelain;
