//! Stage file format
//!
//! The stage records files queued for the next commit. It is persisted as a
//! small binary record protected by a checksum.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "STAG" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Kind: 1 = staged for addition, 2 = staged for removal (1 byte)
//!   - Blob id, additions only (20 bytes)
//!   - Name length (2 bytes) followed by the UTF-8 name
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20; // SHA1 produces a 20-byte hash

/// Size of stage header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Magic signature identifying stage files
pub const SIGNATURE: &str = "STAG";

/// Stage file format version
pub const VERSION: u32 = 1;
