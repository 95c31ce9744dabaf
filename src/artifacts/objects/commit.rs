//! Commit object
//!
//! Commits are immutable snapshots of the tracked file set. They contain:
//! - Parent commit ID(s) (none for the root, two for merges)
//! - A timestamp with its UTC offset
//! - The tree: file names mapped to blob ids
//! - The commit message
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! parent <parent-sha>
//! timestamp <unix-seconds> <+hhmm>
//! file <blob-sha> <file name>
//!
//! <commit message>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Message of the root commit every repository starts with
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Environment variable overriding the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "GITLET_COMMIT_DATE";

/// File name to blob id, ordered so serialization is deterministic
pub type CommitTree = BTreeMap<String, ObjectId>;

/// Commit object
///
/// Represents a snapshot of the working tree with metadata.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Commit message
    message: String,
    /// Creation time with its original UTC offset
    timestamp: DateTime<FixedOffset>,
    /// Parent commit IDs (empty for the root commit, two for merge commits)
    parents: Vec<ObjectId>,
    /// Tracked files
    tree: CommitTree,
}

impl Commit {
    pub fn new(
        message: String,
        timestamp: DateTime<FixedOffset>,
        parents: Vec<ObjectId>,
        tree: CommitTree,
    ) -> Self {
        Commit {
            message,
            timestamp,
            parents,
            tree,
        }
    }

    /// The fixed root commit: same message, epoch timestamp and empty tree
    /// in every repository, hence the same id.
    pub fn root() -> Self {
        let epoch = DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset();
        Commit::new(
            ROOT_COMMIT_MESSAGE.to_string(),
            epoch,
            Vec::new(),
            CommitTree::new(),
        )
    }

    /// Timestamp for a new commit
    ///
    /// Reads `GITLET_COMMIT_DATE` (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`) and
    /// falls back to the current local time.
    pub fn load_timestamp_from_env() -> DateTime<FixedOffset> {
        std::env::var(COMMIT_DATE_ENV)
            .ok()
            .and_then(|date_str| {
                DateTime::parse_from_rfc2822(&date_str)
                    .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset())
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn tree(&self) -> &CommitTree {
        &self.tree
    }

    pub fn blob_id(&self, filename: &str) -> Option<&ObjectId> {
        self.tree.get(filename)
    }

    /// Format timestamp in human-readable form
    ///
    /// # Returns
    ///
    /// String like "Thu Nov 9 20:00:05 2017 -0800"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<FixedOffset>> {
        let (seconds, offset) = value
            .split_once(' ')
            .context("Invalid commit object: malformed timestamp")?;
        let seconds = seconds
            .parse::<i64>()
            .context("Invalid commit object: timestamp seconds")?;
        let offset = Self::parse_offset(offset)?;

        let utc = DateTime::from_timestamp(seconds, 0)
            .context("Invalid commit object: timestamp out of range")?;
        Ok(utc.with_timezone(&offset))
    }

    fn parse_offset(value: &str) -> anyhow::Result<FixedOffset> {
        if value.len() != 5 {
            anyhow::bail!("Invalid commit object: timezone '{}'", value);
        }

        let sign = match &value[..1] {
            "+" => 1,
            "-" => -1,
            _ => anyhow::bail!("Invalid commit object: timezone '{}'", value),
        };
        let hours = value[1..3]
            .parse::<i32>()
            .context("Invalid commit object: timezone hours")?;
        let minutes = value[3..5]
            .parse::<i32>()
            .context("Invalid commit object: timezone minutes")?;

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .context("Invalid commit object: timezone out of range")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        object_content.push(format!(
            "timestamp {} {}",
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        ));
        for (filename, blob_oid) in &self.tree {
            if filename.contains(['\n', '\r']) {
                anyhow::bail!("Cannot record file name {:?}: it contains a line break", filename);
            }
            object_content.push(format!("file {} {}", blob_oid.as_ref(), filename));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        Ok(with_header(self.object_type(), object_content.as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .context("Invalid commit object: not UTF-8")?;

        let (header, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut parents = Vec::new();
        let mut timestamp = None;
        let mut tree = CommitTree::new();

        for line in header.lines() {
            if let Some(parent_oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent_oid.to_string())?);
            } else if let Some(value) = line.strip_prefix("timestamp ") {
                timestamp = Some(Self::parse_timestamp(value)?);
            } else if let Some(entry) = line.strip_prefix("file ") {
                let (blob_oid, filename) = entry
                    .split_once(' ')
                    .context("Invalid commit object: malformed file line")?;
                tree.insert(
                    filename.to_string(),
                    ObjectId::try_parse(blob_oid.to_string())?,
                );
            } else {
                anyhow::bail!("Invalid commit object: unexpected line '{}'", line);
            }
        }

        let timestamp = timestamp.context("Invalid commit object: missing timestamp line")?;

        Ok(Self::new(message.to_string(), timestamp, parents, tree))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
