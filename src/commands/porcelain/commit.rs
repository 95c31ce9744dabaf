use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitletError;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(GitletError::EmptyMessage.into());
        }

        let branch_name = self.current_branch()?;
        let (head_oid, head_commit) = self.head_commit()?;

        let index = self.index();
        let mut index = index.lock().await;

        // Load the stage from disk
        index.rehydrate()?;

        if index.is_empty() {
            return Err(GitletError::NoChanges.into());
        }

        let commit_id = self.write_commit(
            &mut index,
            &head_commit,
            vec![head_oid],
            message.to_string(),
        )?;
        let commit = self.load_commit(&commit_id)?;

        writeln!(
            self.writer(),
            "[{} {}] {}",
            branch_name,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }

    /// Record `base`'s tree updated with the stage as a commit on the current branch
    ///
    /// Staged blobs are promoted into the permanent store and the stage is
    /// emptied afterwards.
    pub(crate) fn write_commit(
        &self,
        index: &mut Index,
        base: &Commit,
        parents: Vec<ObjectId>,
        message: String,
    ) -> anyhow::Result<ObjectId> {
        let branch_name = self.current_branch()?;

        let mut tree = base.tree().clone();
        for (name, blob_id) in index.added() {
            self.database().promote(self.staging(), blob_id)?;
            tree.insert(name.clone(), blob_id.clone());
        }
        for name in index.removed() {
            tree.remove(name);
        }

        let timestamp = Commit::load_timestamp_from_env();
        let commit = Commit::new(message, timestamp, parents, tree);
        let commit_id = self.database().store(&commit)?;

        self.refs().update_branch(&branch_name, &commit_id)?;

        index.clear();
        index.write_updates()?;

        Ok(commit_id)
    }

    /// Empty the stage, purging staged blob bytes
    pub(crate) fn clear_stage(&self, index: &mut Index) -> anyhow::Result<()> {
        for staged_oid in index.added().values() {
            self.staging().discard(staged_oid)?;
        }
        index.clear();

        Ok(())
    }
}
