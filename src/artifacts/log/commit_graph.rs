use crate::areas::database::Database;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::merge::split_point::SplitPointFinder;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Read-only queries over the commits stored in the object database
#[derive(Debug, Clone, Copy, new)]
pub struct CommitGraph<'r> {
    database: &'r Database,
}

impl<'r> CommitGraph<'r> {
    /// Parent number `index` of a commit (0 is the first parent)
    pub fn parent_of(&self, oid: &ObjectId, index: usize) -> anyhow::Result<Option<ObjectId>> {
        let commit = self.database.parse_object_as_commit(oid)?;
        Ok(commit.parents().get(index).cloned())
    }

    pub fn first_parent_chain(&self, oid: ObjectId) -> RevList<'r> {
        RevList::new(self.database, oid)
    }

    /// Every commit ever written, in id order
    pub fn all_commits(&self) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        self.database
            .list_commits()?
            .into_iter()
            .map(|oid| {
                let commit = self.database.parse_object_as_commit(&oid)?;
                Ok((oid, commit))
            })
            .collect()
    }

    pub fn lowest_common_ancestor(
        &self,
        source: &ObjectId,
        target: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let finder = SplitPointFinder::new(|oid: &ObjectId| -> anyhow::Result<Vec<ObjectId>> {
            let commit = self.database.parse_object_as_commit(oid)?;
            Ok(commit.parents().to_vec())
        });

        finder.find(source, target)
    }
}
