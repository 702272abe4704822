//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in the shape of a
//! document, not in the channel that carried it.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a command into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The bytes were not a parseable document.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The document has no `event` field. Not an error from the
    /// authority's point of view; the message is simply not for us.
    #[error("message has no event tag")]
    MissingEvent,

    /// The `event` tag is not one this client understands.
    #[error("unknown event: {0}")]
    UnknownEvent(String),

    /// A recognised event is missing a field or has one of the wrong type.
    #[error("malformed {event} event: {reason}")]
    MalformedEvent {
        event: &'static str,
        reason: String,
    },

    /// A board layout with the wrong number of cells.
    #[error("board has {actual} cells, expected {expected}")]
    InvalidBoard { expected: usize, actual: usize },

    /// A board cell holding a code that is not empty, X or O.
    #[error("invalid board cell code: {0}")]
    InvalidCell(i64),

    /// The document is invalid at the protocol level.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// Returns `true` for documents that are simply not game events
    /// (no tag, or a tag we don't know). These are discarded quietly.
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::MissingEvent | Self::UnknownEvent(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_classification() {
        assert!(ProtocolError::MissingEvent.is_unrecognized());
        assert!(ProtocolError::UnknownEvent("wave".into()).is_unrecognized());
        assert!(!ProtocolError::InvalidCell(7).is_unrecognized());
        assert!(!ProtocolError::InvalidBoard { expected: 9, actual: 8 }
            .is_unrecognized());
    }

    #[test]
    fn test_malformed_event_display() {
        let err = ProtocolError::MalformedEvent {
            event: "moved",
            reason: "missing field `row`".into(),
        };
        assert_eq!(err.to_string(), "malformed moved event: missing field `row`");
    }
}
