//! Codec trait and the JSON implementation.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The game client only needs something implementing [`Codec`]; the
//! authority speaks JSON, so [`JsonCodec`] is what ships.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{Event, ProtocolError};

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec lives inside stream handles
/// that are cloned into spawned tasks.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use castplay_protocol::{Codec, Command, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Command::Move { row: 1, column: 2 }).unwrap();
/// assert_eq!(bytes, br#"{"command":"move","row":1,"column":2}"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

/// Decodes one inbound document into an [`Event`].
///
/// The bytes are first parsed as a generic document, then classified by
/// [`Event::from_document`].
pub fn decode_event<C: Codec>(codec: &C, data: &[u8]) -> Result<Event, ProtocolError> {
    let document: Value = codec.decode(data)?;
    Event::from_document(document)
}
