//! Working tree migration
//!
//! Moving the working tree from one commit's file set to another happens in
//! two steps:
//!
//! 1. Planning: compare the current and target trees and check that no
//!    untracked file would be overwritten. Nothing is touched yet.
//! 2. Applying: delete the files the target does not track, then write every
//!    file of the target tree.
//!
//! A file counts as untracked when it is in the working tree but neither in
//! the current HEAD tree nor staged for addition. Overwriting it is only safe
//! when its content already equals the target's version.
//!
//! Paths that change kind are checked too: a directory standing where the
//! target wants a file must hold only files the current tree tracks, and a
//! file standing where the target wants a directory must be tracked.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::CommitTree;
use crate::artifacts::objects::object::Object;
use crate::errors::GitletError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeSet, HashMap};

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create a file the current tree does not track
    Add,
    /// Delete a file the target does not track
    Delete,
    /// Overwrite a file tracked by both trees
    Modify,
}

/// Set of planned actions grouped by type
pub type ActionsSet = HashMap<ActionType, Vec<String>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    current: &'r CommitTree,
    target: &'r CommitTree,
    actions: ActionsSet,
    /// Untracked files the target would clobber
    conflicts: BTreeSet<String>,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, current: &'r CommitTree, target: &'r CommitTree) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            repository,
            current,
            target,
            actions,
            conflicts: BTreeSet::new(),
        }
    }

    pub fn files(&self, action: ActionType) -> impl Iterator<Item = &str> {
        self.actions
            .get(&action)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn apply_changes(&mut self, index: &Index) -> anyhow::Result<()> {
        self.plan_changes(index)?;
        self.apply()
    }

    /// Record the actions and abort if an untracked file is in the way
    pub fn plan_changes(&mut self, index: &Index) -> anyhow::Result<()> {
        for (name, target_oid) in self.target {
            self.check_parents_in_the_way(name);
            self.check_directory_in_the_way(name)?;

            if self.current.contains_key(name) {
                self.record(ActionType::Modify, name);
                continue;
            }

            self.record(ActionType::Add, name);

            if index.staged_blob(name).is_some() {
                continue;
            }
            let Some(working_blob) = self.repository.workspace().parse_blob(name)? else {
                continue;
            };
            if &working_blob.object_id()? != target_oid {
                self.conflicts.insert(name.clone());
            }
        }

        for name in self.current.keys() {
            if !self.target.contains_key(name) {
                self.record(ActionType::Delete, name);
            }
        }

        if !self.conflicts.is_empty() {
            log::debug!("untracked files in the way: {:?}", self.conflicts);
            return Err(GitletError::UntrackedOverwrite(self.conflicts.iter().cloned().collect()).into());
        }

        log::debug!(
            "migration planned: {} added, {} modified, {} deleted",
            self.actions[&ActionType::Add].len(),
            self.actions[&ActionType::Modify].len(),
            self.actions[&ActionType::Delete].len()
        );

        Ok(())
    }

    /// Untracked files sitting where the target needs a parent directory
    fn check_parents_in_the_way(&mut self, name: &str) {
        let workspace = self.repository.workspace();

        for (position, _) in name.match_indices('/') {
            let parent = &name[..position];
            if workspace.is_file(parent) && !self.current.contains_key(parent) {
                self.conflicts.insert(parent.to_string());
            }
        }
    }

    /// Untracked files inside a directory sitting where the target needs a file
    fn check_directory_in_the_way(&mut self, name: &str) -> anyhow::Result<()> {
        let workspace = self.repository.workspace();
        if !workspace.is_dir(name) {
            return Ok(());
        }

        for file in workspace.list_files_under(name)? {
            if !self.current.contains_key(&file) {
                self.conflicts.insert(file);
            }
        }

        Ok(())
    }

    fn record(&mut self, action: ActionType, name: &str) {
        self.actions
            .entry(action)
            .or_default()
            .push(name.to_string());
    }

    pub fn apply(&self) -> anyhow::Result<()> {
        self.repository.workspace().apply_migration(self)
    }

    pub fn load_blob_data(&self, name: &str) -> anyhow::Result<Bytes> {
        let oid = self
            .target
            .get(name)
            .with_context(|| format!("{} is not part of the target tree", name))?;

        let blob = self.repository.load_blob(oid)?;
        Ok(blob.content_or_empty())
    }
}
