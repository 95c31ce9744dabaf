//! Branch references and HEAD
//!
//! Branches are files under `refs/heads/` holding a commit id. HEAD normally
//! holds `ref: refs/heads/<branch>`; a HEAD holding a raw id (detached) can be
//! read but no command produces one.
//!
//! Every write goes to a temporary file that is renamed over the ref, so a
//! reader never observes a half-written ref.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::GitletError;
use anyhow::Context;
use derive_new::new;
use fake::rand;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the `.gitlet` directory
    path: Box<Path>,
}

/// Content of HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymRefOrOid {
    /// Attached to a branch
    SymRef(BranchName),
    /// Detached at a commit
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read_symref_or_oid(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_match = regex::Regex::new(SYMREF_REGEX)?.captures(content);
        if let Some(symref_match) = symref_match {
            Ok(Some(SymRefOrOid::SymRef(BranchName::try_parse_ref_path(
                &symref_match[1],
            )?)))
        } else {
            Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(
                content.to_string(),
            )?)))
        }
    }
}

impl Refs {
    pub fn create_dirs(&self) -> anyhow::Result<()> {
        for dir in [self.heads_path(), self.remotes_path()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create refs directory at {:?}", dir))?;
        }

        Ok(())
    }

    pub fn read_head(&self) -> anyhow::Result<SymRefOrOid> {
        SymRefOrOid::read_symref_or_oid(&self.head_path())?
            .with_context(|| format!("HEAD is missing at {:?}", self.head_path()))
    }

    /// Commit HEAD resolves to, following the branch it is attached to
    pub fn head_oid(&self) -> anyhow::Result<ObjectId> {
        match self.read_head()? {
            SymRefOrOid::SymRef(branch_name) => self
                .read_branch(&branch_name)?
                .with_context(|| format!("HEAD points to missing branch {}", branch_name)),
            SymRefOrOid::Oid(oid) => Ok(oid),
        }
    }

    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        match self.read_head()? {
            SymRefOrOid::SymRef(branch_name) => Ok(branch_name),
            SymRefOrOid::Oid(_) => Err(GitletError::DetachedHead.into()),
        }
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> anyhow::Result<bool> {
        match self.read_head()? {
            SymRefOrOid::SymRef(current) => Ok(&current == branch_name),
            SymRefOrOid::Oid(_) => Ok(false),
        }
    }

    /// Attach HEAD to a branch
    pub fn set_head(&self, branch_name: &BranchName) -> anyhow::Result<()> {
        self.write_ref_file(
            &self.head_path(),
            &format!("ref: {}", branch_name.to_ref_path()),
        )
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.branch_path(branch_name).is_file()
    }

    pub fn read_branch(&self, branch_name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read_symref_or_oid(&self.branch_path(branch_name))? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(_)) => {
                anyhow::bail!("branch {} holds a symbolic ref", branch_name)
            }
            None => Ok(None),
        }
    }

    /// Tip of an existing branch, `NoSuchBranch` otherwise
    pub fn branch_tip(&self, branch_name: &BranchName) -> anyhow::Result<ObjectId> {
        self.read_branch(branch_name)?
            .ok_or_else(|| GitletError::NoSuchBranch(branch_name.to_string()).into())
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(GitletError::BranchExists(name.to_string()).into());
        }

        self.write_ref_file(&self.branch_path(name), source_oid.as_ref())?;
        log::debug!("created branch {} at {}", name, source_oid);

        Ok(())
    }

    /// Move a branch to a new commit
    pub fn update_branch(&self, name: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_ref_file(&self.branch_path(name), oid.as_ref())?;
        log::debug!("moved branch {} to {}", name, oid);

        Ok(())
    }

    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        let branch_path = self.branch_path(name);
        let oid = self.branch_tip(name)?;

        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {:?}", branch_path))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;
        log::debug!("deleted branch {} (was {})", name, oid);

        Ok(oid)
    }

    /// All branches, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn write_ref_file(&self, path: &Path, raw_ref: &str) -> anyhow::Result<()> {
        let parent = path.parent().with_context(|| {
            format!(
                "failed to create parent directories for ref file at {:?}",
                path
            )
        })?;
        std::fs::create_dir_all(parent)?;

        let temp_path = parent.join(format!(".ref-{}.tmp", rand::random::<u32>()));
        {
            let mut ref_file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .with_context(|| format!("failed to open ref file at {:?}", temp_path))?;
            let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
            lock.deref_mut().write_all(raw_ref.as_bytes())?;
            lock.deref_mut().write_all(b"\n")?;
        }

        std::fs::rename(&temp_path, path)
            .with_context(|| format!("failed to replace ref file at {:?}", path))
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {:?}", parent)
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, branch_name: &BranchName) -> Box<Path> {
        self.path.join(branch_name.to_ref_path()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }

    pub fn remotes_path(&self) -> Box<Path> {
        self.refs_path().join("remotes").into_boxed_path()
    }
}
