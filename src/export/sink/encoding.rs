//! Field encoding for the output file
//!
//! The export targets legacy spreadsheet tooling that expects Shift_JIS.
//! Values are encoded one field at a time so an unencodable character can be
//! reported together with the column it appeared in.

use encoding_rs::{EncoderResult, SHIFT_JIS};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SinkError};

/// Character encoding of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    /// Shift_JIS, for legacy spreadsheet tooling.
    ShiftJis,
    /// Plain UTF-8 passthrough.
    Utf8,
}

/// What to do with a character the target encoding cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappablePolicy {
    /// Replace the character with `?`.
    Substitute,
    /// Abort the export.
    Fail,
}

/// Encodes individual field values into output bytes.
#[derive(Debug, Clone, Copy)]
pub struct FieldEncoder {
    encoding: OutputEncoding,
    policy: UnmappablePolicy,
}

impl FieldEncoder {
    pub fn new(encoding: OutputEncoding, policy: UnmappablePolicy) -> Self {
        Self { encoding, policy }
    }

    /// Encode one field value.
    ///
    /// # Arguments
    /// * `text` - Field value, already CSV-escaped
    /// * `field` - Column name, reported when encoding fails
    ///
    /// # Returns
    /// * `Result<Vec<u8>>` - Encoded bytes or error
    pub fn encode(&self, text: &str, field: &str) -> Result<Vec<u8>> {
        match self.encoding {
            OutputEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            OutputEncoding::ShiftJis => self.encode_shift_jis(text, field),
        }
    }

    fn encode_shift_jis(&self, text: &str, field: &str) -> Result<Vec<u8>> {
        let mut encoder = SHIFT_JIS.new_encoder();
        let capacity = encoder
            .max_buffer_length_from_utf8_without_replacement(text.len())
            .unwrap_or(text.len() * 2 + 16);

        let mut encoded = vec![0u8; capacity];
        let mut written = 0;
        let mut rest = text;

        loop {
            let (result, read, wrote) =
                encoder.encode_from_utf8_without_replacement(rest, &mut encoded[written..], true);
            written += wrote;
            rest = &rest[read..];

            match result {
                EncoderResult::InputEmpty => break,
                EncoderResult::OutputFull => {
                    let grown = encoded.len() * 2 + 16;
                    encoded.resize(grown, 0);
                }
                EncoderResult::Unmappable(character) => match self.policy {
                    UnmappablePolicy::Substitute => {
                        if written == encoded.len() {
                            encoded.resize(written + 16, 0);
                        }
                        encoded[written] = b'?';
                        written += 1;
                    }
                    UnmappablePolicy::Fail => {
                        return Err(SinkError::Unencodable {
                            character,
                            field: field.to_string(),
                        }
                        .into());
                    }
                },
            }
        }

        encoded.truncate(written);
        Ok(encoded)
    }
}
