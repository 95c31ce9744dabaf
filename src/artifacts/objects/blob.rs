//! Blob object
//!
//! A blob pairs a file name with the file's raw content, so two files with the
//! same bytes under different names get different ids.
//!
//! ## Format
//!
//! Present file: `blob <size>\0<filename>\0<content>`
//! Absent file:  `blob <size>\0<filename>`
//!
//! The absent form is a sentinel used to compare "no file" against a tracked
//! version; it is never written to the object database.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, with_header};
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Path relative to the working root, `/` separated
    filename: String,
    /// Raw file content, `None` when the file does not exist
    content: Option<Bytes>,
}

impl Blob {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Blob {
            filename: filename.into(),
            content: Some(content.into()),
        }
    }

    pub fn absent(filename: impl Into<String>) -> Self {
        Blob {
            filename: filename.into(),
            content: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn exists(&self) -> bool {
        self.content.is_some()
    }

    pub fn content(&self) -> Option<&Bytes> {
        self.content.as_ref()
    }

    /// Content of a present blob, empty for the absent sentinel
    pub fn content_or_empty(&self) -> Bytes {
        self.content.clone().unwrap_or_default()
    }
}

impl Packable for Blob {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut blob_content = Vec::new();
        blob_content.extend_from_slice(self.filename.as_bytes());

        if let Some(content) = &self.content {
            blob_content.push(b'\0');
            blob_content.extend_from_slice(content);
        }

        Ok(with_header(self.object_type(), &blob_content))
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        // the header has already been read
        let mut filename = Vec::new();
        reader
            .read_until(b'\0', &mut filename)
            .context("Invalid blob object: unreadable file name")?;

        let present = filename.last() == Some(&b'\0');
        if present {
            filename.pop();
        }
        let filename = String::from_utf8(filename).context("Invalid blob object: file name")?;

        if !present {
            return Ok(Blob::absent(filename));
        }

        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .context("Invalid blob object: unreadable content")?;

        Ok(Blob::new(filename, content))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }
}
