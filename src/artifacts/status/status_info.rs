use crate::areas::index::Index;
use crate::areas::refs::SymRefOrOid;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::CommitTree;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeSet = BTreeMap<String, WorkspaceChangeType>;
pub type FileSet = BTreeSet<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) branches: Vec<BranchName>,
    /// `None` when HEAD is detached
    pub(crate) current_branch: Option<BranchName>,
    pub(crate) staged_files: FileSet,
    pub(crate) removed_files: FileSet,
    pub(crate) workspace_changeset: ChangeSet,
    pub(crate) untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, index: &Index) -> anyhow::Result<StatusInfo> {
        let current_branch = match self.repository.refs().read_head()? {
            SymRefOrOid::SymRef(branch_name) => Some(branch_name),
            SymRefOrOid::Oid(_) => None,
        };
        let branches = self.repository.refs().list_branches()?;

        let (_, head_commit) = self.repository.head_commit()?;
        let working_blobs = self.scan_workspace()?;

        let mut workspace_changeset = ChangeSet::new();
        let mut untracked_files = FileSet::new();

        self.check_staged_files(index, &working_blobs, &mut workspace_changeset);
        self.check_head_files(
            head_commit.tree(),
            index,
            &working_blobs,
            &mut workspace_changeset,
        );
        self.collect_untracked_files(
            head_commit.tree(),
            index,
            &working_blobs,
            &mut untracked_files,
        );

        Ok(StatusInfo {
            branches,
            current_branch,
            staged_files: index.added().keys().cloned().collect(),
            removed_files: index.removed().clone(),
            workspace_changeset,
            untracked_files,
        })
    }

    /// Blob id of every file in the working tree
    fn scan_workspace(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let workspace = self.repository.workspace();
        let mut working_blobs = BTreeMap::new();

        for name in workspace.list_files()? {
            if let Some(blob) = workspace.parse_blob(&name)? {
                working_blobs.insert(name, blob.object_id()?);
            }
        }

        Ok(working_blobs)
    }

    fn check_staged_files(
        &self,
        index: &Index,
        working_blobs: &BTreeMap<String, ObjectId>,
        changeset: &mut ChangeSet,
    ) {
        for (name, staged_oid) in index.added() {
            match working_blobs.get(name) {
                None => {
                    changeset.insert(name.clone(), WorkspaceChangeType::Deleted);
                }
                Some(working_oid) if working_oid != staged_oid => {
                    changeset.insert(name.clone(), WorkspaceChangeType::Modified);
                }
                Some(_) => {}
            }
        }
    }

    fn check_head_files(
        &self,
        head_tree: &CommitTree,
        index: &Index,
        working_blobs: &BTreeMap<String, ObjectId>,
        changeset: &mut ChangeSet,
    ) {
        let unstaged = head_tree.iter().filter(|(name, _)| {
            index.staged_blob(name).is_none() && !index.is_staged_for_removal(name)
        });

        for (name, head_oid) in unstaged {
            match working_blobs.get(name) {
                None => {
                    changeset.insert(name.clone(), WorkspaceChangeType::Deleted);
                }
                Some(working_oid) if working_oid != head_oid => {
                    changeset.insert(name.clone(), WorkspaceChangeType::Modified);
                }
                Some(_) => {}
            }
        }
    }

    // A file staged for removal and then re-created counts as untracked.
    fn collect_untracked_files(
        &self,
        head_tree: &CommitTree,
        index: &Index,
        working_blobs: &BTreeMap<String, ObjectId>,
        untracked_files: &mut FileSet,
    ) {
        for name in working_blobs.keys() {
            let is_staged = index.staged_blob(name).is_some();
            let is_tracked = head_tree.contains_key(name) && !index.is_staged_for_removal(name);

            if !is_staged && !is_tracked {
                untracked_files.insert(name.clone());
            }
        }
    }
}
