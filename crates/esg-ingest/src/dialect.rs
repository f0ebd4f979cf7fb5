//! Text encodings, field delimiters and the candidate search used to pick them.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::{UTF_8, WINDOWS_1252};

/// Character encodings the vendor exports are known to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "cp1252",
        }
    }

    /// Strict decode: `None` when the bytes are not valid in this encoding.
    ///
    /// A UTF-8 byte-order mark is stripped. Single-byte encodings accept any input.
    pub fn decode(self, bytes: &[u8]) -> Option<Cow<'_, str>> {
        match self {
            Self::Utf8 => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                UTF_8.decode_without_bom_handling_and_without_replacement(body)
            }
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            Self::Windows1252 => Some(WINDOWS_1252.decode_without_bom_handling(bytes).0),
        }
    }

    /// Lossy UTF-8 decode used by the permissive fallback.
    pub fn decode_lossy(bytes: &[u8]) -> Cow<'_, str> {
        UTF_8.decode_with_bom_removal(bytes).0
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Field delimiter of a delimited-text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delimiter(pub u8);

impl Delimiter {
    pub const SEMICOLON: Self = Self(b';');
    pub const COMMA: Self = Self(b',');
    pub const TAB: Self = Self(b'\t');

    pub fn byte(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            b'\t' => f.write_str("'\\t'"),
            other => write!(f, "'{}'", other as char),
        }
    }
}

/// A working (encoding, delimiter) pair for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    pub encoding: TextEncoding,
    pub delimiter: Delimiter,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding {}, separator {}", self.encoding, self.delimiter)
    }
}

/// Encodings in preference order: UTF-8 first, it is the common case.
pub const DEFAULT_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

/// Delimiters in preference order for the raw-data exports.
pub const DEFAULT_DELIMITERS: [Delimiter; 3] =
    [Delimiter::SEMICOLON, Delimiter::COMMA, Delimiter::TAB];

/// Delimiters in preference order for the ratings exports.
pub const COMMA_FIRST_DELIMITERS: [Delimiter; 3] =
    [Delimiter::COMMA, Delimiter::SEMICOLON, Delimiter::TAB];

/// Expands encodings × delimiters into the ordered candidate list (encoding-major).
pub fn dialect_candidates(encodings: &[TextEncoding], delimiters: &[Delimiter]) -> Vec<Dialect> {
    encodings
        .iter()
        .flat_map(|&encoding| {
            delimiters
                .iter()
                .map(move |&delimiter| Dialect {
                    encoding,
                    delimiter,
                })
        })
        .collect()
}

/// Tries candidates in order and keeps the first success.
///
/// Failures are reported through `on_failure` and otherwise discarded.
/// Returns `None` when every candidate failed.
pub fn first_success<C, T, E>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: impl FnMut(&C) -> Result<T, E>,
    mut on_failure: impl FnMut(&C, E),
) -> Option<(C, T)> {
    for candidate in candidates {
        match attempt(&candidate) {
            Ok(value) => return Some((candidate, value)),
            Err(err) => on_failure(&candidate, err),
        }
    }
    None
}
