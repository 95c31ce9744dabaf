use crate::areas::repository::Repository;

impl Repository {
    /// Check out a whole commit and move the current branch to it
    pub async fn reset(&mut self, revision: &str) -> anyhow::Result<()> {
        let target_oid = self.resolve_revision(revision)?;
        let branch_name = self.current_branch()?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        self.migrate_to(&mut index, &target_oid)?;
        self.refs().update_branch(&branch_name, &target_oid)?;
        index.write_updates()?;

        Ok(())
    }
}
