use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{Status, StatusInfo};

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let status = Status::new(self).initialize(&index)?;

        self.print_branches(&status)?;
        self.print_file_section("Staged Files", status.staged_files.iter())?;
        self.print_file_section("Removed Files", status.removed_files.iter())?;
        self.print_file_section(
            "Modifications Not Staged For Commit",
            status
                .workspace_changeset
                .iter()
                .map(|(name, change)| format!("{} {}", name, change)),
        )?;
        self.print_file_section("Untracked Files", status.untracked_files.iter())?;

        Ok(())
    }

    fn print_branches(&self, status: &StatusInfo) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== Branches ===")?;
        for branch_name in &status.branches {
            let marker = if status.current_branch.as_ref() == Some(branch_name) {
                "*"
            } else {
                ""
            };
            writeln!(self.writer(), "{}{}", marker, branch_name)?;
        }
        writeln!(self.writer())?;

        Ok(())
    }

    fn print_file_section<T: std::fmt::Display>(
        &self,
        title: &str,
        lines: impl Iterator<Item = T>,
    ) -> anyhow::Result<()> {
        writeln!(self.writer(), "=== {} ===", title)?;
        for line in lines {
            writeln!(self.writer(), "{}", line)?;
        }
        writeln!(self.writer())?;

        Ok(())
    }
}
