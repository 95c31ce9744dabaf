use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::MergeOutcome;
use crate::artifacts::merge::resolution::{FileMerge, classify_trees, conflict_content};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, CommitTree};
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitletError;
use anyhow::Context;
use bytes::Bytes;

impl Repository {
    /// Merge another branch into the current one
    ///
    /// The merge is anchored at the split point of the two branch tips. When
    /// one tip already contains the other nothing is committed; otherwise a
    /// two-parent commit is written, even if some files were left with
    /// conflict markers.
    pub async fn merge(&mut self, target: &str) -> anyhow::Result<MergeOutcome> {
        let current_branch = self.current_branch()?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        if !index.is_empty() {
            return Err(GitletError::UncommittedChanges.into());
        }

        let other_branch = BranchName::try_parse(target.to_string())
            .map_err(|_| GitletError::NoSuchBranch(target.to_string()))?;
        let other_oid = self.refs().branch_tip(&other_branch)?;
        if other_branch == current_branch {
            return Err(GitletError::MergeWithSelf.into());
        }

        let (head_oid, head_commit) = self.head_commit()?;
        let split_oid = self
            .commit_graph()
            .lowest_common_ancestor(&head_oid, &other_oid)?
            .with_context(|| {
                format!("{} and {} share no history", head_oid, other_oid)
            })?;
        log::debug!(
            "merging {} into {} from split point {}",
            other_oid.to_short_oid(),
            head_oid.to_short_oid(),
            split_oid.to_short_oid()
        );

        if split_oid == other_oid {
            writeln!(
                self.writer(),
                "Given branch is an ancestor of the current branch."
            )?;
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        if split_oid == head_oid {
            self.migrate_to(&mut index, &other_oid)?;
            self.refs().update_branch(&current_branch, &other_oid)?;
            index.write_updates()?;

            writeln!(self.writer(), "Current branch fast-forwarded.")?;
            return Ok(MergeOutcome::FastForward);
        }

        let split_commit = self.load_commit(&split_oid)?;
        let other_commit = self.load_commit(&other_oid)?;
        let (result_tree, conflict_blobs) =
            self.resolve_trees(&split_commit, &head_commit, &other_commit)?;

        {
            let mut migration = Migration::new(self, head_commit.tree(), &result_tree);
            migration.plan_changes(&index)?;

            for blob in &conflict_blobs {
                self.staging().store(blob)?;
            }
            migration.apply()?;
        }

        Self::stage_tree_changes(&mut index, head_commit.tree(), &result_tree);

        let message = format!("Merged {} into {}.", other_branch, current_branch);
        self.write_commit(&mut index, &head_commit, vec![head_oid, other_oid], message)?;

        let conflicted = !conflict_blobs.is_empty();
        if conflicted {
            writeln!(self.writer(), "Encountered a merge conflict.")?;
        }

        Ok(MergeOutcome::Merged { conflicted })
    }

    /// Build the merged tree and the blobs holding conflict markers
    fn resolve_trees(
        &self,
        split: &Commit,
        head: &Commit,
        other: &Commit,
    ) -> anyhow::Result<(CommitTree, Vec<Blob>)> {
        let mut result_tree = CommitTree::new();
        let mut conflict_blobs = Vec::new();

        for (name, file_merge) in classify_trees(split.tree(), head.tree(), other.tree()) {
            match file_merge {
                FileMerge::Take(Some(blob_id)) => {
                    result_tree.insert(name, blob_id);
                }
                FileMerge::Take(None) => {}
                FileMerge::Conflict { head, other } => {
                    let content = conflict_content(
                        &self.blob_content(head.as_ref())?,
                        &self.blob_content(other.as_ref())?,
                    );
                    let blob = Blob::new(name.clone(), content);

                    result_tree.insert(name, blob.object_id()?);
                    conflict_blobs.push(blob);
                }
            }
        }

        Ok((result_tree, conflict_blobs))
    }

    fn blob_content(&self, blob_id: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match blob_id {
            Some(blob_id) => Ok(self.load_blob(blob_id)?.content_or_empty()),
            None => Ok(Bytes::new()),
        }
    }

    // Additions and modifications go to `added`, deletions to `removed`.
    fn stage_tree_changes(index: &mut Index, head_tree: &CommitTree, result_tree: &CommitTree) {
        for (name, blob_id) in result_tree {
            if head_tree.get(name) != Some(blob_id) {
                index.add(name.clone(), blob_id.clone());
            }
        }

        for name in head_tree.keys() {
            if !result_tree.contains_key(name) {
                index.remove(name.clone());
            }
        }
    }
}
