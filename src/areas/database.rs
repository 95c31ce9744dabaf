//! Content-addressable object database
//!
//! Objects are serialized, hashed, zlib-compressed and stored under their hex
//! id. The permanent store keeps `blobs/<id>` and `commits/<id>`; a second
//! instance rooted at `.gitlet/staging` holds blob bytes that were added but
//! not committed yet.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::GitletError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Database {
    blobs_path: Box<Path>,
    commits_path: Box<Path>,
}

impl Database {
    /// Permanent store rooted at the `.gitlet` directory
    pub fn new(path: &Path) -> Self {
        Database {
            blobs_path: path.join(ObjectType::Blob.store_dir()).into_boxed_path(),
            commits_path: path.join(ObjectType::Commit.store_dir()).into_boxed_path(),
        }
    }

    /// Pending store holding staged blob bytes directly under `path`
    pub fn staging(path: &Path) -> Self {
        Database {
            blobs_path: path.to_path_buf().into_boxed_path(),
            commits_path: path.to_path_buf().into_boxed_path(),
        }
    }

    pub fn objects_path(&self, object_type: ObjectType) -> &Path {
        match object_type {
            ObjectType::Blob => &self.blobs_path,
            ObjectType::Commit => &self.commits_path,
        }
    }

    pub fn create_dirs(&self) -> anyhow::Result<()> {
        for dir in [&self.blobs_path, &self.commits_path] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Unable to create object directory {}", dir.display()))?;
        }

        Ok(())
    }

    fn object_path(&self, object_type: ObjectType, object_id: &ObjectId) -> PathBuf {
        self.objects_path(object_type).join(object_id.as_ref())
    }

    pub fn exists(&self, object_type: ObjectType, object_id: &ObjectId) -> bool {
        self.object_path(object_type, object_id).is_file()
    }

    /// Persist an object and return its id
    ///
    /// Writing is skipped when an object with the same id is already stored.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = object.object_id()?;
        let object_path = self.object_path(object.object_type(), &object_id);

        if object_path.exists() {
            log::debug!("{} {} already stored", object.object_type(), object_id);
            return Ok(object_id);
        }

        self.write_object(object_path, object_content)?;
        log::debug!("stored {} {}", object.object_type(), object_id);

        Ok(object_id)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let object_reader = self.parse_object_as_bytes(ObjectType::Blob, object_id)?;
        Blob::deserialize(object_reader)
            .with_context(|| format!("Unable to parse blob {}", object_id))
    }

    /// Load a commit; a commit that was never written is reported as `NoSuchCommit`
    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        if !self.exists(ObjectType::Commit, object_id) {
            return Err(GitletError::NoSuchCommit(object_id.to_string()).into());
        }

        let object_reader = self.parse_object_as_bytes(ObjectType::Commit, object_id)?;
        Commit::deserialize(object_reader)
            .with_context(|| format!("Unable to parse commit {}", object_id))
    }

    fn parse_object_as_bytes(
        &self,
        expected_type: ObjectType,
        object_id: &ObjectId,
    ) -> anyhow::Result<impl BufRead> {
        let object_path = self.object_path(expected_type, object_id);
        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;
        if object_type != expected_type {
            anyhow::bail!(
                "Object {} is a {}, expected a {}",
                object_id,
                object_type,
                expected_type
            );
        }

        Ok(object_reader)
    }

    /// Move a staged blob into this store
    ///
    /// When the blob is already permanent the staged copy is only purged.
    pub fn promote(&self, staging: &Database, object_id: &ObjectId) -> anyhow::Result<()> {
        let staged_path = staging.object_path(ObjectType::Blob, object_id);
        let permanent_path = self.object_path(ObjectType::Blob, object_id);

        if permanent_path.exists() {
            if staged_path.exists() {
                std::fs::remove_file(&staged_path).with_context(|| {
                    format!("Unable to purge staged blob {}", staged_path.display())
                })?;
            } else {
                log::warn!("staged blob {} was already purged", object_id);
            }
            return Ok(());
        }

        if !staged_path.exists() {
            anyhow::bail!("Staged blob {} is missing from the staging area", object_id);
        }

        std::fs::rename(&staged_path, &permanent_path).with_context(|| {
            format!(
                "Unable to move staged blob {} to {}",
                object_id,
                permanent_path.display()
            )
        })?;
        log::debug!("promoted blob {}", object_id);

        Ok(())
    }

    /// Purge a blob from this store if present
    pub fn discard(&self, object_id: &ObjectId) -> anyhow::Result<()> {
        let object_path = self.object_path(ObjectType::Blob, object_id);

        if object_path.exists() {
            std::fs::remove_file(&object_path)
                .with_context(|| format!("Unable to discard blob {}", object_path.display()))?;
            log::debug!("discarded staged blob {}", object_id);
        }

        Ok(())
    }

    /// Every commit ever written, sorted by id
    pub fn list_commits(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.list_objects(ObjectType::Commit)
    }

    fn list_objects(&self, object_type: ObjectType) -> anyhow::Result<Vec<ObjectId>> {
        let dir_path = self.objects_path(object_type);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        // temporary files and foreign names are skipped
        Ok(WalkDir::new(dir_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                ObjectId::try_parse(entry.file_name().to_string_lossy().to_string()).ok()
            })
            .collect())
    }

    /// Find all commits whose id starts with the given prefix.
    ///
    /// # Returns
    ///
    /// A vector of all matching ObjectIds. An empty vector means no match, more
    /// than one entry means the prefix is ambiguous.
    pub fn find_commits_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();

        Ok(self
            .list_commits()?
            .into_iter()
            .filter(|oid| oid.as_ref().starts_with(&prefix))
            .collect())
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir).context(format!(
            "Unable to create object directory {}",
            object_dir.display()
        ))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
