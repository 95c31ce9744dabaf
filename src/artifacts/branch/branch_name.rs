use crate::artifacts::branch::{HEADS_PREFIX, INVALID_BRANCH_NAME_REGEX};
use crate::errors::GitletError;
use anyhow::Context;

/// Branch every new repository starts on
pub const DEFAULT_BRANCH: &str = "master";

/// A validated branch name
///
/// Names follow the git ref-name rules: no leading dot or slash, no `..`,
/// no trailing slash or `.lock`, no `@{`, and no control or glob characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: String) -> anyhow::Result<Self> {
        if name.is_empty() {
            return Err(GitletError::InvalidBranchName(name).into());
        }

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if re.is_match(&name) {
            Err(GitletError::InvalidBranchName(name).into())
        } else {
            Ok(Self(name))
        }
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    /// Parse the target of a symbolic ref such as `refs/heads/master`
    pub fn try_parse_ref_path(ref_path: &str) -> anyhow::Result<Self> {
        let name = ref_path.strip_prefix(HEADS_PREFIX).with_context(|| {
            format!(
                "symbolic ref must start with '{}', got '{}'",
                HEADS_PREFIX, ref_path
            )
        })?;

        Self::try_parse(name.to_string())
    }

    /// Path of this branch's ref relative to `.gitlet`
    pub fn to_ref_path(&self) -> String {
        format!("{}{}", HEADS_PREFIX, self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
