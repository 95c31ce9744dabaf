use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitletError;

impl Repository {
    /// Switch the working tree and HEAD to another branch
    pub async fn checkout_branch(&mut self, target: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(target.to_string())
            .map_err(|_| GitletError::NoSuchBranch(target.to_string()))?;
        let target_oid = self.refs().branch_tip(&branch_name)?;

        if self.refs().is_current_branch(&branch_name)? {
            return Err(GitletError::AlreadyCurrent.into());
        }

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        self.migrate_to(&mut index, &target_oid)?;
        self.refs().set_head(&branch_name)?;
        index.write_updates()?;

        log::debug!("switched to branch {}", branch_name);

        Ok(())
    }

    /// Overwrite one working file with its version in a commit
    ///
    /// HEAD is used when no revision is given. The stage is left alone.
    pub async fn checkout_file(&mut self, revision: Option<&str>, file: &str) -> anyhow::Result<()> {
        let commit_oid = match revision {
            Some(revision) => self.resolve_revision(revision)?,
            None => self.head_oid()?,
        };
        let commit = self.load_commit(&commit_oid)?;

        let name = self
            .workspace()
            .normalize_name(file)
            .ok_or_else(|| GitletError::FileNotInCommit(file.to_string()))?;
        let blob_id = commit
            .blob_id(&name)
            .ok_or_else(|| GitletError::FileNotInCommit(file.to_string()))?;

        let blob = self.load_blob(blob_id)?;
        self.workspace().write_file(&name, &blob.content_or_empty())?;

        Ok(())
    }

    /// Reconcile the working tree from HEAD to `target_oid` and empty the stage
    ///
    /// Nothing is written when an untracked file would be overwritten. The
    /// caller persists the stage and moves the refs.
    pub(crate) fn migrate_to(&self, index: &mut Index, target_oid: &ObjectId) -> anyhow::Result<()> {
        let (_, head_commit) = self.head_commit()?;
        let target_commit = self.load_commit(target_oid)?;

        let mut migration = Migration::new(self, head_commit.tree(), target_commit.tree());
        migration.apply_changes(index)?;

        self.clear_stage(index)
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::porcelain::test_support::{init_repository, read, write};
    use crate::errors::GitletError;
    use assert_fs::TempDir;

    #[tokio::test]
    async fn switching_branches_reproduces_the_target_tree() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "shared.txt", "v1");
        repository.add("shared.txt").await.unwrap();
        repository.commit("v1").await.unwrap();
        repository.branch("side").unwrap();

        write(&dir, "shared.txt", "v2");
        write(&dir, "dir/only_master.txt", "master");
        repository.add("shared.txt").await.unwrap();
        repository.add("dir/only_master.txt").await.unwrap();
        repository.commit("v2").await.unwrap();

        repository.checkout_branch("side").await.unwrap();

        assert_eq!(read(&dir, "shared.txt").as_deref(), Some("v1"));
        assert_eq!(read(&dir, "dir/only_master.txt"), None);
        assert!(!dir.path().join("dir").exists());
        assert_eq!(repository.current_branch().unwrap().as_ref(), "side");

        repository.checkout_branch("master").await.unwrap();

        assert_eq!(read(&dir, "shared.txt").as_deref(), Some("v2"));
        assert_eq!(read(&dir, "dir/only_master.txt").as_deref(), Some("master"));
    }

    #[tokio::test]
    async fn an_untracked_file_in_the_way_aborts_the_switch() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        repository.branch("side").unwrap();
        repository.checkout_branch("side").await.unwrap();
        write(&dir, "f.txt", "tracked on side");
        repository.add("f.txt").await.unwrap();
        repository.commit("side file").await.unwrap();
        repository.checkout_branch("master").await.unwrap();
        let master_oid = repository.head_oid().unwrap();

        write(&dir, "f.txt", "precious");
        let error = repository.checkout_branch("side").await.unwrap_err();

        assert!(matches!(
            GitletError::find_in(&error),
            Some(GitletError::UntrackedOverwrite(_))
        ));
        assert_eq!(read(&dir, "f.txt").as_deref(), Some("precious"));
        assert_eq!(repository.current_branch().unwrap().as_ref(), "master");
        assert_eq!(repository.head_oid().unwrap(), master_oid);
    }

    #[tokio::test]
    async fn an_untracked_file_with_the_target_content_is_not_in_the_way() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        repository.branch("side").unwrap();
        repository.checkout_branch("side").await.unwrap();
        write(&dir, "f.txt", "same");
        repository.add("f.txt").await.unwrap();
        repository.commit("side file").await.unwrap();
        repository.checkout_branch("master").await.unwrap();

        write(&dir, "f.txt", "same");
        repository.checkout_branch("side").await.unwrap();

        assert_eq!(read(&dir, "f.txt").as_deref(), Some("same"));
    }

    #[tokio::test]
    async fn checking_out_the_current_or_a_missing_branch_fails() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;

        let current = repository.checkout_branch("master").await.unwrap_err();
        let missing = repository.checkout_branch("nope").await.unwrap_err();

        assert_eq!(
            GitletError::find_in(&current),
            Some(&GitletError::AlreadyCurrent)
        );
        assert!(matches!(
            GitletError::find_in(&missing),
            Some(GitletError::NoSuchBranch(_))
        ));
    }

    #[tokio::test]
    async fn a_file_is_restored_from_an_abbreviated_commit_id() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "a.txt", "first");
        repository.add("a.txt").await.unwrap();
        repository.commit("first").await.unwrap();
        let first_oid = repository.head_oid().unwrap();
        write(&dir, "a.txt", "second");
        repository.add("a.txt").await.unwrap();
        repository.commit("second").await.unwrap();

        repository
            .checkout_file(Some(&first_oid.as_ref()[..8]), "a.txt")
            .await
            .unwrap();
        assert_eq!(read(&dir, "a.txt").as_deref(), Some("first"));

        repository.checkout_file(None, "a.txt").await.unwrap();
        assert_eq!(read(&dir, "a.txt").as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn restoring_a_file_the_commit_lacks_fails() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;

        let missing_file = repository.checkout_file(None, "a.txt").await.unwrap_err();
        let missing_commit = repository
            .checkout_file(Some("abcdef0"), "a.txt")
            .await
            .unwrap_err();

        assert!(matches!(
            GitletError::find_in(&missing_file),
            Some(GitletError::FileNotInCommit(_))
        ));
        assert!(matches!(
            GitletError::find_in(&missing_commit),
            Some(GitletError::NoSuchCommit(_))
        ));
    }

    #[tokio::test]
    async fn an_untracked_file_inside_a_directory_in_the_way_aborts_the_switch() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        repository.branch("side").unwrap();
        repository.checkout_branch("side").await.unwrap();
        write(&dir, "d", "file on side");
        repository.add("d").await.unwrap();
        repository.commit("side file").await.unwrap();
        repository.checkout_branch("master").await.unwrap();

        write(&dir, "d/precious.txt", "precious");
        let error = repository.checkout_branch("side").await.unwrap_err();

        assert_eq!(
            GitletError::find_in(&error),
            Some(&GitletError::UntrackedOverwrite(vec!["d/precious.txt".to_string()]))
        );
        assert_eq!(read(&dir, "d/precious.txt").as_deref(), Some("precious"));
        assert_eq!(repository.current_branch().unwrap().as_ref(), "master");
    }

    #[tokio::test]
    async fn an_untracked_file_where_a_directory_goes_aborts_before_any_change() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        repository.branch("side").unwrap();
        repository.checkout_branch("side").await.unwrap();
        write(&dir, "a/b.txt", "nested on side");
        repository.add("a/b.txt").await.unwrap();
        repository.commit("side nested").await.unwrap();
        repository.checkout_branch("master").await.unwrap();
        write(&dir, "m.txt", "master only");
        repository.add("m.txt").await.unwrap();
        repository.commit("master file").await.unwrap();

        write(&dir, "a", "untracked");
        let error = repository.checkout_branch("side").await.unwrap_err();

        assert_eq!(
            GitletError::find_in(&error),
            Some(&GitletError::UntrackedOverwrite(vec!["a".to_string()]))
        );
        assert_eq!(read(&dir, "a").as_deref(), Some("untracked"));
        assert_eq!(read(&dir, "m.txt").as_deref(), Some("master only"));
        assert_eq!(repository.current_branch().unwrap().as_ref(), "master");
    }

    #[tokio::test]
    async fn a_tracked_file_and_a_tracked_directory_swap_places() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "d/x.txt", "nested");
        repository.add("d/x.txt").await.unwrap();
        repository.commit("nested").await.unwrap();
        repository.branch("side").unwrap();
        repository.checkout_branch("side").await.unwrap();
        repository.rm("d/x.txt").await.unwrap();
        write(&dir, "d", "flat");
        repository.add("d").await.unwrap();
        repository.commit("flatten").await.unwrap();

        repository.checkout_branch("master").await.unwrap();
        assert_eq!(read(&dir, "d/x.txt").as_deref(), Some("nested"));

        repository.checkout_branch("side").await.unwrap();
        assert_eq!(read(&dir, "d").as_deref(), Some("flat"));
    }
}
