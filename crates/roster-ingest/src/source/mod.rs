//! Decoding raw bytes into a grid of string cells.
//!
//! Binary workbooks (`.xlsx`, `.xls`, `.ods`) are recognised by their
//! container signature and read with calamine. Everything else is treated
//! as delimited text and decoded with a caller-chosen character encoding.

mod text;
mod workbook;

pub use text::{TextEncoding, decode_text, parse_delimited, sniff_delimiter};
pub use workbook::{cell_to_string, read_workbook};

/// A decoded sheet: rows of trimmed-on-demand string cells.
pub type Grid = Vec<Vec<String>>;

const ZIP_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
const OLE_SIGNATURE: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Container format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip (xlsx, ods) or OLE compound (xls) workbook.
    Workbook,
    /// Delimited text in some character encoding.
    Text,
}

impl SourceFormat {
    /// Detects the format from the leading bytes.
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&ZIP_SIGNATURE) || bytes.starts_with(&OLE_SIGNATURE) {
            Self::Workbook
        } else {
            Self::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Workbook => "workbook",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
