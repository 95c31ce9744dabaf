use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::log::commit_graph::CommitGraph;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitletError;
use anyhow::Context;
use file_guard::FileGuard;
use std::cell::{RefCell, RefMut};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the repository directory inside the working root
pub const GITLET_DIR: &str = ".gitlet";

/// Exclusive lock held on `.gitlet/lock` while a command runs
pub struct RepositoryLock {
    _guard: FileGuard<Box<File>>,
}

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    staging: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository rooted at `path`
    ///
    /// Nothing is read from `.gitlet` here; commands check that the repository
    /// is initialized and load what they need.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Unable to resolve repository root {}", path.display()))?;
        let gitlet_path = path.join(GITLET_DIR);

        let index = Index::new(gitlet_path.join("stage").into_boxed_path());
        let database = Database::new(&gitlet_path);
        let staging = Database::staging(&gitlet_path.join("staging"));
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(gitlet_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            staging,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gitlet_path(&self) -> Box<Path> {
        self.path.join(GITLET_DIR).into_boxed_path()
    }

    pub fn config_path(&self) -> Box<Path> {
        self.gitlet_path().join("config").into_boxed_path()
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Store holding blobs that are staged but not committed
    pub fn staging(&self) -> &Database {
        &self.staging
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn commit_graph(&'_ self) -> CommitGraph<'_> {
        CommitGraph::new(&self.database)
    }

    pub fn is_initialized(&self) -> bool {
        self.gitlet_path().is_dir()
    }

    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(GitletError::NotInitialized.into())
        }
    }

    /// Take the repository-wide advisory lock
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn lock(&self) -> anyhow::Result<RepositoryLock> {
        let lock_path = self.gitlet_path().join("lock");
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Unable to open lock file {}", lock_path.display()))?;

        let guard = file_guard::lock(Box::new(lock_file), file_guard::Lock::Exclusive, 0, 1)
            .with_context(|| format!("Unable to lock {}", lock_path.display()))?;

        Ok(RepositoryLock { _guard: guard })
    }

    pub fn head_oid(&self) -> anyhow::Result<ObjectId> {
        self.refs.head_oid()
    }

    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        self.refs.current_branch()
    }

    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        self.database.parse_object_as_commit(oid)
    }

    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self.head_oid()?;
        let commit = self.load_commit(&oid)?;

        Ok((oid, commit))
    }

    /// Load a blob from the permanent store, falling back to the staged ones
    pub fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Blob> {
        if self.database.exists(ObjectType::Blob, oid) {
            self.database.parse_object_as_blob(oid)
        } else {
            self.staging
                .parse_object_as_blob(oid)
                .with_context(|| format!("Blob {} is missing", oid))
        }
    }

    /// Resolve a user-supplied commit reference to a stored commit id
    pub fn resolve_revision(&self, revision: &str) -> anyhow::Result<ObjectId> {
        let oid = Revision::try_parse(revision)?.resolve(self)?;

        if !self.database.exists(ObjectType::Commit, &oid) {
            return Err(GitletError::NoSuchCommit(revision.to_string()).into());
        }

        Ok(oid)
    }
}
