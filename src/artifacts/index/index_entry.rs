//! Stage entry representation
//!
//! Each entry is a file name plus what the next commit should do with it:
//! record a new blob for it, or drop it from the tree.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::{Context, anyhow};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

/// Kind byte of an entry staged for addition
pub const ADDED_KIND: u8 = 1;

/// Kind byte of an entry staged for removal
pub const REMOVED_KIND: u8 = 2;

/// Size of a binary blob id
pub const ENTRY_OID_SIZE: usize = 20;

/// Size of the name length prefix
pub const ENTRY_NAME_LENGTH_SIZE: usize = 2;

/// Longest file name a stage entry can hold
const MAX_PATH_SIZE: usize = u16::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Queued for addition with the staged blob's id
    Added(ObjectId),
    /// Queued for removal
    Removed,
}

impl EntryState {
    pub fn kind(&self) -> u8 {
        match self {
            EntryState::Added(_) => ADDED_KIND,
            EntryState::Removed => REMOVED_KIND,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct IndexEntry {
    /// File path relative to the working root
    pub name: String,
    pub state: EntryState,
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        if self.name.len() > MAX_PATH_SIZE {
            anyhow::bail!("File name too long for the stage: {}", self.name);
        }

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u8(self.state.kind())?;
        if let EntryState::Added(oid) = &self.state {
            oid.write_h40_to(&mut entry_bytes)?;
        }
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.name.len() as u16)?;
        entry_bytes.write_all(self.name.as_bytes())?;

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut kind = [0u8; 1];
        reader
            .read_exact(&mut kind)
            .context("Stage entry is missing its kind")?;

        let state = match kind[0] {
            ADDED_KIND => EntryState::Added(ObjectId::read_h40_from(&mut reader)?),
            REMOVED_KIND => EntryState::Removed,
            other => return Err(anyhow!("Unknown stage entry kind {}", other)),
        };

        let mut name_length = [0u8; ENTRY_NAME_LENGTH_SIZE];
        reader
            .read_exact(&mut name_length)
            .context("Stage entry is missing its name length")?;
        let name_length = byteorder::NetworkEndian::read_u16(&name_length) as usize;

        let mut name = vec![0u8; name_length];
        reader
            .read_exact(&mut name)
            .context("Stage entry name is truncated")?;
        let name = String::from_utf8(name).context("Stage entry name is not UTF-8")?;

        Ok(IndexEntry::new(name, state))
    }
}
