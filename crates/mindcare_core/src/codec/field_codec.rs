//! Reversible field codec.
//!
//! `TaggedBase64Codec` is an obfuscation, not encryption: anyone holding the
//! stored string can recover the value. The `FieldCodec` seam is where a real
//! scheme plugs in without touching the record store or the reveal gate.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Marker prefix on tagged values.
pub const ENCODED_TAG: &str = "FHE-";

/// Reversible encoding of one private numeric field.
pub trait FieldCodec {
    fn encode(&self, value: f64) -> String;
    fn decode(&self, encoded: &str) -> Result<f64, CodecError>;
}

/// Tag + base64 of the value's decimal text.
///
/// Untagged input is parsed as a plain number so older rows written before
/// tagging keep decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggedBase64Codec;

impl FieldCodec for TaggedBase64Codec {
    fn encode(&self, value: f64) -> String {
        format!("{ENCODED_TAG}{}", STANDARD.encode(value.to_string()))
    }

    fn decode(&self, encoded: &str) -> Result<f64, CodecError> {
        let Some(payload) = encoded.strip_prefix(ENCODED_TAG) else {
            return parse_decimal(encoded.trim());
        };

        let bytes = STANDARD
            .decode(payload)
            .map_err(|err| CodecError::InvalidPayload(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| CodecError::InvalidPayload("payload is not UTF-8".to_string()))?;
        parse_decimal(text.trim())
    }
}

fn parse_decimal(text: &str) -> Result<f64, CodecError> {
    if text.is_empty() {
        return Err(CodecError::Empty);
    }
    text.parse::<f64>()
        .map_err(|_| CodecError::NotANumber(text.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    Empty,
    InvalidPayload(String),
    NotANumber(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "encoded field is empty"),
            Self::InvalidPayload(message) => write!(f, "encoded field payload is invalid: {message}"),
            Self::NotANumber(text) => write!(f, "encoded field is not a number: `{text}`"),
        }
    }
}

impl Error for CodecError {}
