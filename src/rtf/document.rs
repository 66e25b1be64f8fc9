//! Raw document bytes as received from the caller.

use std::borrow::Cow;

use crate::error::{Result, RtfError};

/// Every RTF document starts with this signature.
pub const RTF_SIGNATURE: &[u8] = b"{\\rtf";

/// Immutable RTF input plus its signature check.
///
/// The tokenizer works on text, so [`RawDocument::source`] decodes the bytes:
/// valid UTF-8 (which includes every 7-bit RTF file) is borrowed as-is and byte
/// offsets in the source equal byte offsets in the file. Anything else is read
/// as Windows-1252, the code page most RTF writers assume for raw 8-bit bytes,
/// and [`ByteOffsets`] converts offsets in that decoded text back to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    bytes: Vec<u8>,
    valid: bool,
}

impl RawDocument {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let valid = bytes.starts_with(RTF_SIGNATURE);
        Self { bytes, valid }
    }

    /// Whether the buffer begins with the RTF signature.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fail with [`RtfError::InvalidFormat`] unless the signature is present.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.valid {
            return Ok(());
        }
        let prefix = &self.bytes[..self.bytes.len().min(RTF_SIGNATURE.len() + 8)];
        Err(RtfError::InvalidFormat {
            found: String::from_utf8_lossy(prefix).into_owned(),
        })
    }

    /// Fail with [`RtfError::TooLarge`] when the buffer exceeds `max` bytes.
    pub fn ensure_within(&self, max: usize) -> Result<()> {
        if self.bytes.len() > max {
            return Err(RtfError::TooLarge {
                size: self.bytes.len(),
                max,
            });
        }
        Ok(())
    }

    /// Text view of the bytes used for tokenizing.
    pub fn source(&self) -> Cow<'_, str> {
        match std::str::from_utf8(&self.bytes) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => {
                let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&self.bytes);
                text
            }
        }
    }
}

/// Offsets in a Windows-1252 decoded source mapped back to the raw bytes.
///
/// Windows-1252 decodes every byte to exactly one character, so the raw offset
/// of a position is the number of characters before it.
#[derive(Debug, Clone)]
pub struct ByteOffsets {
    char_starts: Vec<usize>,
}

impl ByteOffsets {
    pub fn new(decoded: &str) -> Self {
        Self {
            char_starts: decoded.char_indices().map(|(index, _)| index).collect(),
        }
    }

    /// Raw byte offset of `offset` in the decoded text.
    pub fn raw(&self, offset: usize) -> usize {
        self.char_starts.partition_point(|&start| start < offset)
    }
}

impl From<&str> for RawDocument {
    fn from(source: &str) -> Self {
        RawDocument::new(source.as_bytes())
    }
}

impl From<Vec<u8>> for RawDocument {
    fn from(bytes: Vec<u8>) -> Self {
        RawDocument::new(bytes)
    }
}
