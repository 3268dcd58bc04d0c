//! Private field encoding and derived annotations.
//!
//! # Responsibility
//! - Turn private numeric levels into stored strings and back.
//! - Derive the canned annotation stored alongside each record.
//!
//! # Invariants
//! - `decode(encode(v)) == v` for every finite `v`.
//! - Callers depend only on `FieldCodec`, never on a concrete encoding.

pub mod field_codec;
pub mod score;

pub use field_codec::{CodecError, FieldCodec, TaggedBase64Codec, ENCODED_TAG};
pub use score::{bucket_for_score, score, weighted_score, ANNOTATIONS};
