use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use crate::errors::GitletError;
use anyhow::Context;
use std::fs;

const DEFAULT_CONFIG: &str = "[core]\n\trepositoryformatversion = 0\n";

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            return Err(GitletError::AlreadyInitialized.into());
        }

        fs::create_dir_all(self.gitlet_path()).context("Failed to create .gitlet directory")?;
        self.staging()
            .create_dirs()
            .context("Failed to create .gitlet/staging directory")?;
        self.database()
            .create_dirs()
            .context("Failed to create .gitlet object directories")?;
        self.refs()
            .create_dirs()
            .context("Failed to create .gitlet/refs directories")?;

        fs::write(self.config_path(), DEFAULT_CONFIG)
            .context("Failed to create .gitlet/config file")?;

        {
            let index = self.index();
            let mut index = index.lock().await;
            index.clear();
            index.write_updates()?;
        }

        let root_oid = self.database().store(&Commit::root())?;
        let default_branch = BranchName::default_branch();
        self.refs()
            .create_branch(&default_branch, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_head(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        writeln!(
            self.writer(),
            "Initialized empty Gitlet repository in {}",
            self.gitlet_path().display()
        )?;

        Ok(())
    }
}
