use crate::areas::repository::Repository;
use crate::errors::GitletError;

impl Repository {
    /// Print the id of every commit whose message contains `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let matching = self
            .commit_graph()
            .all_commits()?
            .into_iter()
            .filter(|(_, commit)| commit.message().contains(message))
            .map(|(commit_oid, _)| commit_oid)
            .collect::<Vec<_>>();

        if matching.is_empty() {
            return Err(GitletError::NoMatch.into());
        }

        for commit_oid in matching {
            writeln!(self.writer(), "{}", commit_oid)?;
        }

        Ok(())
    }
}
