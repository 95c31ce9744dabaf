//! Three-way classification of files
//!
//! Every file name present in the split point, HEAD or the other branch is
//! classified by comparing its blob ids (absence counts as a value):
//!
//! | condition  | result     |
//! |------------|------------|
//! | head == other  | head   |
//! | head == split  | other  |
//! | other == split | head   |
//! | otherwise      | conflict |

use crate::artifacts::objects::commit::CommitTree;
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::collections::{BTreeMap, BTreeSet};

pub const CONFLICT_HEAD_MARKER: &str = "<<<<<<< HEAD\n";
pub const CONFLICT_SEPARATOR: &str = "=======\n";
pub const CONFLICT_END_MARKER: &str = ">>>>>>>\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileMerge {
    /// The file ends up with this blob, or is absent
    Take(Option<ObjectId>),
    /// Both sides changed the file differently
    Conflict {
        head: Option<ObjectId>,
        other: Option<ObjectId>,
    },
}

/// Classify one file
pub fn classify(
    split: Option<&ObjectId>,
    head: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> FileMerge {
    if head == other || other == split {
        FileMerge::Take(head.cloned())
    } else if head == split {
        FileMerge::Take(other.cloned())
    } else {
        FileMerge::Conflict {
            head: head.cloned(),
            other: other.cloned(),
        }
    }
}

/// Classify every file of the three trees
pub fn classify_trees(
    split: &CommitTree,
    head: &CommitTree,
    other: &CommitTree,
) -> BTreeMap<String, FileMerge> {
    let names = split
        .keys()
        .chain(head.keys())
        .chain(other.keys())
        .collect::<BTreeSet<_>>();

    names
        .into_iter()
        .map(|name| {
            let merge = classify(split.get(name), head.get(name), other.get(name));
            log::debug!("merge {}: {:?}", name, merge);
            (name.clone(), merge)
        })
        .collect()
}

/// Content written for a conflicted file; an absent side contributes nothing
pub fn conflict_content(head: &[u8], other: &[u8]) -> Bytes {
    let mut content = Vec::with_capacity(
        head.len() + other.len() + CONFLICT_HEAD_MARKER.len() + CONFLICT_SEPARATOR.len() + 8,
    );
    content.extend_from_slice(CONFLICT_HEAD_MARKER.as_bytes());
    content.extend_from_slice(head);
    content.extend_from_slice(CONFLICT_SEPARATOR.as_bytes());
    content.extend_from_slice(other);
    content.extend_from_slice(CONFLICT_END_MARKER.as_bytes());

    Bytes::from(content)
}
