/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The channel was closed, by us or by the peer.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// No channel is attached to the stream.
    #[error("message stream is not attached")]
    NotAttached,

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// Opening a connection to the peer failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),
}

impl TransportError {
    /// Returns `true` if the error means the channel is gone for good.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_) | Self::NotAttached)
    }
}
