use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::errors::GitletError;

impl Repository {
    pub async fn add(&mut self, file: &str) -> anyhow::Result<()> {
        let name = self
            .workspace()
            .normalize_name(file)
            .ok_or_else(|| GitletError::FileNotFound(file.to_string()))?;
        let blob = self
            .workspace()
            .parse_blob(&name)?
            .ok_or_else(|| GitletError::FileNotFound(file.to_string()))?;

        let (_, head_commit) = self.head_commit()?;

        let index = self.index();
        let mut index = index.lock().await;

        // Load the stage from disk
        index.rehydrate()?;

        self.stage_add(&mut index, &head_commit, blob)?;

        if index.has_changed() {
            index.write_updates()?;
        }

        Ok(())
    }

    /// Stage a working file against the given HEAD commit
    ///
    /// Content equal to HEAD's cancels whatever was staged for the file.
    pub(crate) fn stage_add(
        &self,
        index: &mut Index,
        head_commit: &Commit,
        blob: Blob,
    ) -> anyhow::Result<()> {
        let name = blob.filename().to_string();
        let blob_id = blob.object_id()?;

        if head_commit.blob_id(&name) == Some(&blob_id) {
            if let Some(staged_oid) = index.unstage(&name) {
                self.staging().discard(&staged_oid)?;
            }
            index.unmark_removed(&name);
            log::debug!("{} matches HEAD, nothing staged", name);

            return Ok(());
        }

        if index.staged_blob(&name) == Some(&blob_id) {
            return Ok(());
        }

        self.staging().store(&blob)?;
        if let Some(previous_oid) = index.add(name.clone(), blob_id.clone()) {
            self.staging().discard(&previous_oid)?;
        }
        log::debug!("staged {} as {}", name, blob_id);

        Ok(())
    }
}
