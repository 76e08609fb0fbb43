//! Line-ending normalization for text content

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Line terminator written by newline-normalizing copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// The convention of the platform running the publish.
    #[default]
    Native,
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Native => {
                if cfg!(windows) {
                    b"\r\n"
                } else {
                    b"\n"
                }
            }
            Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Rewrite every line break (`\r\n`, `\n` or a lone `\r`) as `ending`.
///
/// Content without a final line break keeps its last line unterminated.
pub fn normalize_newlines(content: &[u8], ending: LineEnding) -> Vec<u8> {
    let terminator = ending.as_bytes();
    let mut out = Vec::with_capacity(content.len());
    let mut i = 0;
    while i < content.len() {
        match content[i] {
            b'\r' => {
                out.extend_from_slice(terminator);
                if content.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(terminator),
            byte => out.push(byte),
        }
        i += 1;
    }
    out
}

/// Labels of encodings whose line breaks are not single `\r`/`\n` bytes.
const WIDE_ENCODINGS: &[&str] = &[
    "utf-16", "utf16", "utf-32", "utf32", "ucs-2", "ucs2", "ucs-4", "ucs4", "unicode",
];

/// Check that `encoding` can be normalized byte-wise.
///
/// Normalization works on raw bytes, which is exact for UTF-8 and every
/// ASCII-compatible legacy charset: their `\r` and `\n` bytes never occur
/// inside multi-byte sequences.
pub fn ensure_line_oriented(encoding: &str) -> Result<()> {
    let label = encoding.trim().to_ascii_lowercase().replace('_', "-");
    if label.is_empty() || WIDE_ENCODINGS.iter().any(|wide| label.starts_with(wide)) {
        return Err(Error::UnsupportedEncoding {
            encoding: encoding.to_string(),
        });
    }
    Ok(())
}
