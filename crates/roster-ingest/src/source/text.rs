//! Delimited text decoding.

use csv::ReaderBuilder;
use encoding_rs::Encoding;

use super::Grid;
use crate::error::{IngestError, Result};

/// A character encoding used to decode text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding(&'static Encoding);

impl TextEncoding {
    pub fn utf8() -> Self {
        Self(encoding_rs::UTF_8)
    }

    /// Resolves a WHATWG encoding label such as `windows-1256` or `cp1256`.
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(Self)
            .ok_or_else(|| IngestError::UnknownEncoding {
                label: label.to_string(),
            })
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl From<&'static Encoding> for TextEncoding {
    fn from(encoding: &'static Encoding) -> Self {
        Self(encoding)
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}

/// Decodes `bytes` strictly; returns `None` on malformed input.
///
/// A byte-order mark overrides the requested encoding and is removed.
pub fn decode_text(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    let (encoding, payload) = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) => (bom_encoding, &bytes[bom_len..]),
        None => (encoding.0, bytes),
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(payload)
        .map(|text| text.into_owned())
}

/// Picks the delimiter that occurs most often on the first non-blank line.
///
/// Ties and lines without any candidate fall back to a comma.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(line) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };
    let mut best = (b',', 0usize);
    for candidate in [b',', b';', b'\t'] {
        let count = line.bytes().filter(|byte| *byte == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Parses decoded text into rows of cells. Rows may have differing widths.
pub fn parse_delimited(text: &str) -> Result<Grid> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(text))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}
