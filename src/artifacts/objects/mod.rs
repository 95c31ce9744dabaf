//! Object types and operations
//!
//! All repository content is stored as objects identified by SHA-1 hashes:
//!
//! - **Blob**: a file name together with its raw content
//! - **Commit**: snapshot metadata (message, timestamp, parents) plus the tree
//!   mapping file names to blob ids
//!
//! Objects serialize to `<type> <size>\0<content>`; the id is the SHA-1 of that record.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Length of an abbreviated object id in log output
pub const SHORT_OBJECT_ID_LENGTH: usize = 7;
