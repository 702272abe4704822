//! Unified error type for the Castplay client.

use castplay_protocol::ProtocolError;
use castplay_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CastError {
    /// A transport-level error (connect, send, recv, not attached).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
