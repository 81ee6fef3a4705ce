//! Wire format of cached query responses: JSON, gzip-compressed.
//!
//! Gzip carries a CRC-32 and length trailer, so truncated or bit-flipped
//! entries fail to decode instead of yielding a wrong response.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

use crate::domain::query::QueryResponse;

/// Errors raised while encoding or decoding a cache entry.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to compress response: {0}")]
    Compress(#[source] std::io::Error),

    #[error("failed to decompress cache entry: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("failed to deserialize cache entry: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Serializes and compresses `response` for storage.
///
/// # Errors
///
/// Returns [`CodecError::Serialize`] or [`CodecError::Compress`].
pub fn encode_response(response: &QueryResponse) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(response).map_err(CodecError::Serialize)?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 4), Compression::default());
    encoder.write_all(&json).map_err(CodecError::Compress)?;
    encoder.finish().map_err(CodecError::Compress)
}

/// Decompresses and deserializes a stored entry.
///
/// # Errors
///
/// Returns [`CodecError::Decompress`] when the bytes are not a valid gzip
/// stream (including checksum mismatches) and [`CodecError::Deserialize`] when
/// the payload is not a response.
pub fn decode_response(bytes: &[u8]) -> Result<QueryResponse, CodecError> {
    let mut json = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut json)
        .map_err(CodecError::Decompress)?;

    serde_json::from_slice(&json).map_err(CodecError::Deserialize)
}
