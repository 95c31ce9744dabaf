//! User-facing errors
//!
//! Every variant maps to a single line printed by the CLI. Anything that is
//! not a `GitletError` (I/O failures, corrupted objects) is treated as fatal.

/// Command-line usage problems detected before any repository access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("Please enter a command.")]
    MissingCommand,
    #[error("No command with that name exists.")]
    UnknownCommand,
    #[error("Incorrect operands.")]
    IncorrectOperands,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GitletError {
    #[error(transparent)]
    Usage(#[from] UsageError),

    #[error("Not in an initialized Gitlet directory.")]
    NotInitialized,

    #[error("A Gitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist.")]
    FileNotFound(String),

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NoChanges,

    #[error("No reason to remove the file.")]
    NothingToRemove(String),

    #[error("No such branch exists.")]
    NoSuchBranch(String),

    #[error("A branch with that name already exists.")]
    BranchExists(String),

    #[error("'{0}' is not a valid branch name.")]
    InvalidBranchName(String),

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    #[error("No need to checkout the current branch.")]
    AlreadyCurrent,

    #[error("No commit with that id exists.")]
    NoSuchCommit(String),

    #[error("Commit id prefix '{0}' is ambiguous.")]
    AmbiguousCommit(String),

    #[error("File does not exist in that commit.")]
    FileNotInCommit(String),

    /// Carries the offending paths so callers can log or display them.
    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedOverwrite(Vec<String>),

    #[error("Found no commit with that message.")]
    NoMatch,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    MergeWithSelf,

    #[error("HEAD does not point to a branch.")]
    DetachedHead,
}

impl GitletError {
    /// Find a `GitletError` anywhere in an `anyhow` error chain.
    pub fn find_in(error: &anyhow::Error) -> Option<&GitletError> {
        error
            .chain()
            .find_map(|cause| cause.downcast_ref::<GitletError>())
    }
}
