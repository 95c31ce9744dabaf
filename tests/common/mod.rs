#![allow(dead_code)]

pub mod command;
pub mod file;

/// Date every commit made through the CLI helpers carries
pub const FIXED_COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

/// How `log` prints [`FIXED_COMMIT_DATE`]
pub const FIXED_READABLE_DATE: &str = "Sun Jan 1 12:00:00 2023 +0000";
