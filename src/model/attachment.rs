//! Attachments extracted from MIME parts.
//!
//! The decoded payload is held in memory in full; there is no streaming
//! path and no size cap.

use std::collections::BTreeMap;

/// A MIME part carrying an `attachment` or `inline` disposition.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// MIME content type (e.g. `"image/jpeg"`, `"application/pdf"`).
    pub content_type: String,

    /// Decoded size in bytes. Always equal to `content.len()`.
    pub size: usize,

    /// Payload with its transfer encoding reversed.
    pub content: Vec<u8>,

    /// `Content-Disposition` parameters: lowercase key → unquoted value.
    pub params: BTreeMap<String, String>,
}

impl Attachment {
    /// Value of the `filename` disposition parameter, if any.
    pub fn filename(&self) -> Option<&str> {
        self.params.get("filename").map(String::as_str)
    }
}
