use crate::areas::repository::Repository;
use crate::areas::refs::HEAD_REF_NAME;
use crate::artifacts::branch::REF_ALIASES;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitletError;

/// A user-supplied reference to a commit
///
/// Supported forms:
/// - `HEAD` and its alias `@`
/// - full or abbreviated commit ids (any non-empty hex prefix)
/// - parent notation: `<revision>^`
/// - ancestor notation: `<revision>~<n>`, following first parents only
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Head,
    /// Lowercased hex prefix of a commit id
    CommitId(String),
    /// The first parent of a revision (e.g., HEAD^)
    Parent(Box<Revision>),
    /// The Nth first-parent ancestor of a revision (e.g., HEAD~3)
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        // Suffixes are peeled off right to left, then reapplied innermost first.
        let mut suffixes = Vec::new();
        let mut base = revision;

        loop {
            if let Some(rest) = base.strip_suffix('^').filter(|rest| !rest.is_empty()) {
                suffixes.push(None);
                base = rest;
            } else if let Some((rest, generations)) = Self::split_ancestor_suffix(base) {
                let generations: usize = generations
                    .parse()
                    .map_err(|_| GitletError::NoSuchCommit(revision.to_string()))?;
                suffixes.push(Some(generations));
                base = rest;
            } else {
                break;
            }
        }

        let mut parsed = Self::parse_base(base, revision)?;
        for suffix in suffixes.into_iter().rev() {
            parsed = match suffix {
                None => Revision::Parent(Box::new(parsed)),
                Some(generations) => Revision::Ancestor(Box::new(parsed), generations),
            };
        }

        Ok(parsed)
    }

    /// Split `<base>~<n>` into its base and generation count
    fn split_ancestor_suffix(revision: &str) -> Option<(&str, &str)> {
        let (base, generations) = revision.rsplit_once('~')?;
        let is_count = !generations.is_empty() && generations.bytes().all(|b| b.is_ascii_digit());

        (!base.is_empty() && is_count).then_some((base, generations))
    }

    fn parse_base(name: &str, revision: &str) -> anyhow::Result<Revision> {
        let resolved_name = *REF_ALIASES.get(name).unwrap_or(&name);

        if resolved_name == HEAD_REF_NAME {
            Ok(Revision::Head)
        } else if ObjectId::is_valid_prefix(resolved_name) {
            Ok(Revision::CommitId(resolved_name.to_ascii_lowercase()))
        } else {
            Err(GitletError::NoSuchCommit(revision.to_string()).into())
        }
    }

    pub fn resolve(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Head => repository.head_oid(),
            Revision::CommitId(prefix) => Self::resolve_oid(prefix, repository),
            Revision::Parent(base_revision) => {
                Self::resolve_commit_parent(base_revision.resolve(repository)?, repository)
            }
            Revision::Ancestor(base_revision, generations) => {
                let mut oid = base_revision.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::resolve_commit_parent(oid, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_commit_parent(oid: ObjectId, repository: &Repository) -> anyhow::Result<ObjectId> {
        repository
            .commit_graph()
            .parent_of(&oid, 0)?
            .ok_or_else(|| GitletError::NoSuchCommit(format!("{}^", oid)).into())
    }

    fn resolve_oid(prefix: &str, repository: &Repository) -> anyhow::Result<ObjectId> {
        let mut matches = repository.database().find_commits_by_prefix(prefix)?;

        match matches.len() {
            0 => Err(GitletError::NoSuchCommit(prefix.to_string()).into()),
            1 => Ok(matches.remove(0)),
            _ => {
                log::debug!(
                    "prefix {} matches {}",
                    prefix,
                    matches
                        .iter()
                        .map(ObjectId::to_short_oid)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Err(GitletError::AmbiguousCommit(prefix.to_string()).into())
            }
        }
    }
}
