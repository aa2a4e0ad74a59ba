//! JSON codec: the property tree serialized with serde.

use crate::error::CodecError;
use crate::tree::DocumentRoot;

/// Decodes a JSON document into a property tree.
pub fn decode_json(input: &[u8]) -> Result<DocumentRoot, CodecError> {
    serde_json::from_slice(input).map_err(|e| CodecError::Json(e.to_string()))
}

/// Encodes a property tree as pretty-printed JSON.
pub fn encode_json(root: &DocumentRoot) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec_pretty(root).map_err(|e| CodecError::Json(e.to_string()))
}
