use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use anyhow::Context;
use bytes::Bytes;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 3] = [".gitlet", ".", ".."];

/// The working tree
///
/// File names handed in and out of the workspace are relative to its root and
/// use `/` as separator, the same form commits and the stage store.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn is_file(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    pub fn is_dir(&self, name: &str) -> bool {
        self.file_path(name).is_dir()
    }

    /// Every regular file under the root, sorted, skipping `.gitlet`
    pub fn list_files(&self) -> anyhow::Result<Vec<String>> {
        self.walk_files(&self.path)
    }

    /// Every regular file below the directory `name`
    pub fn list_files_under(&self, name: &str) -> anyhow::Result<Vec<String>> {
        self.walk_files(&self.file_path(name))
    }

    fn walk_files(&self, root: &Path) -> anyhow::Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()));

        for entry in walker {
            let entry = entry.context("Unable to walk the working tree")?;
            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(name) = self.relative_name(entry.path()) {
                files.push(name);
            }
        }

        files.sort();
        Ok(files)
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .map(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }

    fn relative_name(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        let components = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some(components.join("/"))
    }

    /// Turn a user-supplied path into a workspace file name
    ///
    /// Paths may be absolute (inside the root) or relative to the root; `.`
    /// components are dropped and `..` is resolved lexically. Names with line
    /// breaks cannot be recorded in a commit and are refused.
    pub fn normalize_name(&self, raw: &str) -> Option<String> {
        if raw.contains(['\n', '\r']) {
            return None;
        }

        let path = Path::new(raw);
        let path = if path.is_absolute() {
            path.strip_prefix(self.path.as_ref()).ok()?
        } else {
            path
        };

        let mut parts: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
                Component::CurDir => {}
                Component::ParentDir => {
                    parts.pop()?;
                }
                _ => return None,
            }
        }

        if parts.is_empty() || parts.first().map(String::as_str) == Some(".gitlet") {
            return None;
        }

        Some(parts.join("/"))
    }

    pub fn read_file(&self, name: &str) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.file_path(name))
            .with_context(|| format!("Unable to read working file {}", name))?;

        Ok(Bytes::from(content))
    }

    /// Blob for the current content of a working file, `None` when absent
    pub fn parse_blob(&self, name: &str) -> anyhow::Result<Option<Blob>> {
        if !self.is_file(name) {
            return Ok(None);
        }

        Ok(Some(Blob::new(name, self.read_file(name)?)))
    }

    /// Write a working file, creating its parent directories
    pub fn write_file(&self, name: &str, content: &[u8]) -> anyhow::Result<()> {
        let path = self.file_path(name);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directories for {}", name))?;
        }

        // Only an emptied directory can be left here once planning has passed.
        if path.is_dir() {
            std::fs::remove_dir(&path)
                .with_context(|| format!("Failed to replace directory {} with a file", name))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Failed to open file: {}", name))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to file: {}", name))?;

        Ok(())
    }

    /// Delete a working file and prune the directories it leaves empty
    pub fn remove_file(&self, name: &str) -> anyhow::Result<()> {
        let path = self.file_path(name);

        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove file: {}", name))?;
        }

        self.prune_empty_parents(&path)
    }

    fn prune_empty_parents(&self, path: &Path) -> anyhow::Result<()> {
        let mut current = path.parent();

        while let Some(dir) = current {
            if dir == self.path.as_ref() || !dir.starts_with(self.path.as_ref()) {
                break;
            }

            let is_empty = match std::fs::read_dir(dir) {
                Ok(mut entries) => entries.next().is_none(),
                Err(_) => false,
            };
            if !is_empty {
                break;
            }

            std::fs::remove_dir(dir)
                .with_context(|| format!("Failed to remove empty directory: {:?}", dir))?;
            current = dir.parent();
        }

        Ok(())
    }

    // Deletions go first so that a tracked file replaced by a directory (or the
    // other way around) is out of the way before the new layout is written.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for name in migration.files(ActionType::Delete) {
            self.remove_file(name)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for name in migration.files(action) {
                let content = migration.load_blob_data(name)?;
                self.write_file(name, &content)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(dir.path().to_path_buf().into_boxed_path())
    }

    #[test]
    fn listing_skips_the_repository_directory() {
        let dir = TempDir::new().unwrap();
        dir.child("b.txt").write_str("b").unwrap();
        dir.child("nested/a.txt").write_str("a").unwrap();
        dir.child(".gitlet/stage").write_str("").unwrap();

        let files = workspace(&dir).list_files().unwrap();

        assert_eq!(files, vec!["b.txt".to_string(), "nested/a.txt".to_string()]);
    }

    #[test]
    fn removing_the_last_file_prunes_its_directories() {
        let dir = TempDir::new().unwrap();
        dir.child("a/b/c.txt").write_str("c").unwrap();
        let workspace = workspace(&dir);

        workspace.remove_file("a/b/c.txt").unwrap();

        assert!(!dir.path().join("a").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn writing_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);

        workspace.write_file("deep/dir/file.txt", b"content").unwrap();

        dir.child("deep/dir/file.txt").assert("content");
    }

    #[test]
    fn user_paths_are_normalized() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);

        assert_eq!(
            workspace.normalize_name("./dir/../a.txt"),
            Some("a.txt".to_string())
        );
        assert_eq!(
            workspace.normalize_name(&dir.path().join("x/y.txt").to_string_lossy()),
            Some("x/y.txt".to_string())
        );
        assert_eq!(workspace.normalize_name("../outside.txt"), None);
        assert_eq!(workspace.normalize_name(".gitlet/HEAD"), None);
    }

    #[test]
    fn absent_file_has_no_blob() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);

        assert!(workspace.parse_blob("missing.txt").unwrap().is_none());
    }

    #[test]
    fn names_with_line_breaks_are_refused() {
        let dir = TempDir::new().unwrap();
        let workspace = workspace(&dir);

        assert_eq!(workspace.normalize_name("a\nb.txt"), None);
        assert_eq!(workspace.normalize_name("a.txt\r"), None);
    }

    #[test]
    fn files_under_a_directory_keep_root_relative_names() {
        let dir = TempDir::new().unwrap();
        dir.child("d/x.txt").write_str("x").unwrap();
        dir.child("d/e/y.txt").write_str("y").unwrap();
        dir.child("other.txt").write_str("o").unwrap();

        let files = workspace(&dir).list_files_under("d").unwrap();

        assert_eq!(files, vec!["d/e/y.txt".to_string(), "d/x.txt".to_string()]);
    }

    #[test]
    fn writing_over_a_directory_with_files_fails_and_keeps_them() {
        let dir = TempDir::new().unwrap();
        dir.child("d/precious.txt").write_str("keep").unwrap();
        let workspace = workspace(&dir);

        assert!(workspace.write_file("d", b"file").is_err());

        dir.child("d/precious.txt").assert("keep");
    }

    #[test]
    fn writing_over_an_empty_directory_replaces_it() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("d")).unwrap();
        let workspace = workspace(&dir);

        workspace.write_file("d", b"file").unwrap();

        dir.child("d").assert("file");
    }
}
