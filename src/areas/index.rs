//! Staging area
//!
//! The stage tracks what the next commit should change relative to HEAD:
//! files queued for addition (with the id of their staged blob) and files
//! queued for removal. A file name is never in both sets.
//!
//! The stage is persisted in `.gitlet/stage` using the format described in
//! [`crate::artifacts::index`].

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{
    ADDED_KIND, ENTRY_NAME_LENGTH_SIZE, ENTRY_OID_SIZE, EntryState, IndexEntry,
};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow};
use byteorder::ByteOrder;
use fake::rand;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the stage file (`.gitlet/stage`)
    path: Box<Path>,
    /// Files queued for addition, mapped to their staged blob id
    added: BTreeMap<String, ObjectId>,
    /// Files queued for removal
    removed: BTreeSet<String>,
    header: IndexHeader,
    /// Whether the stage was modified since it was loaded
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            added: BTreeMap::new(),
            removed: BTreeSet::new(),
            header: IndexHeader::empty(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn added(&self) -> &BTreeMap<String, ObjectId> {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn staged_blob(&self, name: &str) -> Option<&ObjectId> {
        self.added.get(name)
    }

    pub fn is_staged_for_removal(&self, name: &str) -> bool {
        self.removed.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }

        self.added.clear();
        self.removed.clear();
        self.header = IndexHeader::empty();
    }

    /// Queue a file for addition, cancelling any pending removal
    ///
    /// # Returns
    ///
    /// The blob id previously staged for this name, if any
    pub fn add(&mut self, name: String, oid: ObjectId) -> Option<ObjectId> {
        self.removed.remove(&name);
        self.changed = true;
        self.added.insert(name, oid)
    }

    /// Queue a file for removal, cancelling any pending addition
    pub fn remove(&mut self, name: String) -> Option<ObjectId> {
        let previous = self.added.remove(&name);
        self.removed.insert(name);
        self.changed = true;
        previous
    }

    /// Drop a pending addition
    pub fn unstage(&mut self, name: &str) -> Option<ObjectId> {
        let previous = self.added.remove(name);
        if previous.is_some() {
            self.changed = true;
        }
        previous
    }

    /// Drop a pending removal
    pub fn unmark_removed(&mut self, name: &str) -> bool {
        let was_removed = self.removed.remove(name);
        if was_removed {
            self.changed = true;
        }
        was_removed
    }

    pub fn entries(&self) -> impl Iterator<Item = IndexEntry> + '_ {
        let added = self
            .added
            .iter()
            .map(|(name, oid)| IndexEntry::new(name.clone(), EntryState::Added(oid.clone())));
        let removed = self
            .removed
            .iter()
            .map(|name| IndexEntry::new(name.clone(), EntryState::Removed));

        added.chain(removed)
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        match entry.state {
            EntryState::Added(oid) => {
                self.added.insert(entry.name, oid);
            }
            EntryState::Removed => {
                self.removed.insert(entry.name);
            }
        }
    }

    /// Load the stage from disk
    ///
    /// A missing or empty stage file yields an empty stage. A stage with a bad
    /// signature, unknown version or mismatching checksum is an error.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the stage file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();
        self.changed = false;

        if !self.path().exists() {
            return Ok(());
        }

        let mut stage_file = std::fs::OpenOptions::new()
            .read(true)
            .open(self.path())
            .with_context(|| format!("Unable to open stage file {}", self.path().display()))?;
        let mut lock = file_guard::lock(&mut stage_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader
            .verify()
            .with_context(|| format!("Corrupted stage file {}", self.path.display()))
    }

    fn parse_header(&mut self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid stage file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported stage file version: {}",
                header.version
            ));
        }

        let entries_count = header.entries_count;
        self.header = header;

        Ok(entries_count)
    }

    /// Parse all entries from the stage file
    ///
    /// Entries have variable length: the kind byte decides whether a blob id
    /// follows, and the name length prefix decides how much name to read.
    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let mut entry_bytes = reader.read(1)?.to_vec();
            if entry_bytes[0] == ADDED_KIND {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_OID_SIZE)?);
            }

            let name_length = reader.read(ENTRY_NAME_LENGTH_SIZE)?;
            let name_size = byteorder::NetworkEndian::read_u16(&name_length) as usize;
            entry_bytes.extend_from_slice(&name_length);
            entry_bytes.extend_from_slice(&reader.read(name_size)?);

            let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;
            self.store_entry(entry);
        }

        Ok(())
    }

    /// Persist the stage
    ///
    /// The new content is written to a temporary file under an exclusive lock
    /// and renamed over the old stage file.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let stage_dir = self
            .path
            .parent()
            .context("Stage file has no parent directory")?;
        let temp_path = stage_dir.join(format!("stage-{}.tmp", rand::random::<u32>()));

        {
            let mut stage_file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp_path)
                .with_context(|| {
                    format!("Unable to create stage file {}", temp_path.display())
                })?;
            let lock = file_guard::lock(&mut stage_file, file_guard::Lock::Exclusive, 0, 1)?;

            let mut writer = Checksum::new(lock);

            self.header = IndexHeader {
                entries_count: (self.added.len() + self.removed.len()) as u32,
                ..self.header.clone()
            };
            writer.write(&self.header.serialize()?)?;

            for entry in self.entries().collect::<Vec<_>>() {
                writer.write(&entry.serialize()?)?;
            }

            writer.write_checksum()?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Unable to replace stage file {}", self.path.display()))?;
        log::debug!(
            "stage written: {} added, {} removed",
            self.added.len(),
            self.removed.len()
        );
        self.changed = false;

        Ok(())
    }
}
