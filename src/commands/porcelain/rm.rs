use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use crate::errors::GitletError;

impl Repository {
    /// Unstage a file, or stage its removal when HEAD tracks it
    ///
    /// The working copy is deleted only when it still matches HEAD's version.
    pub async fn rm(&mut self, file: &str) -> anyhow::Result<()> {
        let name = self
            .workspace()
            .normalize_name(file)
            .ok_or_else(|| GitletError::NothingToRemove(file.to_string()))?;
        let (_, head_commit) = self.head_commit()?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        if let Some(staged_oid) = index.unstage(&name) {
            self.staging().discard(&staged_oid)?;
            index.write_updates()?;

            return Ok(());
        }

        let Some(head_oid) = head_commit.blob_id(&name) else {
            return Err(GitletError::NothingToRemove(file.to_string()).into());
        };

        index.remove(name.clone());

        match self.workspace().parse_blob(&name)? {
            Some(working_blob) if &working_blob.object_id()? == head_oid => {
                self.workspace().remove_file(&name)?;
            }
            Some(_) => log::debug!("{} differs from HEAD, keeping the working copy", name),
            None => {}
        }

        index.write_updates()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::porcelain::test_support::{init_repository, read, write};
    use crate::errors::GitletError;
    use assert_fs::TempDir;

    #[tokio::test]
    async fn removing_a_staged_file_only_unstages_it() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "a.txt", "new");
        repository.add("a.txt").await.unwrap();

        repository.rm("a.txt").await.unwrap();

        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();
        assert!(index.is_empty());
        assert_eq!(read(&dir, "a.txt").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn removing_a_tracked_file_deletes_the_unchanged_copy() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "a.txt", "tracked");
        repository.add("a.txt").await.unwrap();
        repository.commit("track a").await.unwrap();

        repository.rm("a.txt").await.unwrap();

        assert_eq!(read(&dir, "a.txt"), None);
        let index = repository.index();
        let mut index = index.lock().await;
        index.rehydrate().unwrap();
        assert!(index.is_staged_for_removal("a.txt"));
    }

    #[tokio::test]
    async fn removing_a_diverged_tracked_file_keeps_the_copy() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "a.txt", "tracked");
        repository.add("a.txt").await.unwrap();
        repository.commit("track a").await.unwrap();
        write(&dir, "a.txt", "edited");

        repository.rm("a.txt").await.unwrap();

        assert_eq!(read(&dir, "a.txt").as_deref(), Some("edited"));
    }

    #[tokio::test]
    async fn removing_an_unknown_file_fails() {
        let dir = TempDir::new().unwrap();
        let (mut repository, _) = init_repository(&dir).await;
        write(&dir, "loose.txt", "untracked");

        let error = repository.rm("loose.txt").await.unwrap_err();

        assert!(matches!(
            GitletError::find_in(&error),
            Some(GitletError::NothingToRemove(_))
        ));
    }
}
