//! JSON codec helpers.
//!
//! Editor traffic is JSON so the external editor can read and write it
//! without sharing Rust types.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::NetError;
use crate::messages::EditorMessage;

/// Encode a value to JSON bytes.
///
/// # Errors
///
/// Returns [`NetError::Encode`] if serialisation fails.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, NetError> {
    serde_json::to_vec(value).map_err(NetError::Encode)
}

/// Decode a value from JSON bytes.
///
/// # Errors
///
/// Returns [`NetError::Decode`] if deserialisation fails.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NetError> {
    serde_json::from_slice(bytes).map_err(NetError::Decode)
}

/// Decode an inbound editor message. Documents with an unknown `type`, a
/// missing required field or a field of the wrong type are rejected.
///
/// # Errors
///
/// Returns [`NetError::Decode`] for malformed documents.
pub fn decode_message(bytes: &[u8]) -> Result<EditorMessage, NetError> {
    decode(bytes)
}
