//! User-facing commands
//!
//! ## Commands
//!
//! - `init`: create the repository layout and the root commit
//! - `add`: stage a file
//! - `rm`: unstage or stage the removal of a file
//! - `commit`: record the stage as a new commit
//! - `log`: show the first-parent history, or every commit (`global-log`)
//! - `find`: list commits by message
//! - `status`: show branches, the stage and working tree changes
//! - `checkout`: switch branches or restore a single file
//! - `branch`: create or delete branches
//! - `reset`: move the current branch to a commit
//! - `merge`: three-way merge of another branch into the current one

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod find;
pub mod init;
pub mod log;
pub mod merge;
pub mod reset;
pub mod rm;
pub mod status;

#[cfg(test)]
pub(crate) mod test_support;
