//! Options controlling how source files and resource dictionaries are decoded.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// What to do with byte sequences that are not valid in the detected encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Substitute U+FFFD for malformed sequences and keep going.
    #[default]
    Replace,
    /// Fail the read on the first malformed sequence.
    Strict,
}

/// Read behavior options for [`read_text`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReadOptions {
    pub decode: DecodeMode,
}

impl ReadOptions {
    /// Creates default read options (best-effort decoding).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decode mode.
    pub fn with_decode(mut self, decode: DecodeMode) -> Self {
        self.decode = decode;
        self
    }

    /// Shorthand for `with_decode(DecodeMode::Strict)` / `Replace`.
    pub fn with_strict(self, strict: bool) -> Self {
        self.with_decode(if strict {
            DecodeMode::Strict
        } else {
            DecodeMode::Replace
        })
    }
}

/// Decodes file bytes to text.
///
/// A UTF-8 or UTF-16 byte-order mark selects the encoding and is dropped;
/// without one the bytes are decoded as UTF-8. `origin` is only used in the
/// error message.
pub fn decode_bytes(bytes: &[u8], options: &ReadOptions, origin: &str) -> Result<String, Error> {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        match options.decode {
            DecodeMode::Strict => {
                return Err(Error::decode_error(
                    origin,
                    format!("malformed {} sequence", encoding.name()),
                ));
            }
            DecodeMode::Replace => {
                tracing::warn!(file = origin, "replaced malformed byte sequences");
            }
        }
    }
    Ok(text.into_owned())
}

/// Reads a whole file as text according to `options`.
pub fn read_text<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<String, Error> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    decode_bytes(&bytes, options, &path.display().to_string())
}

/// Writes text as UTF-8 without a byte-order mark.
pub fn write_text<P: AsRef<Path>>(path: P, content: &str) -> Result<(), Error> {
    fs::write(path, content.as_bytes()).map_err(Error::Io)
}
