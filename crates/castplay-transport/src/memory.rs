//! In-process connection pair backed by Tokio channels.

use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::{Connection, ConnectionId, TransportError};

/// One end of an in-memory channel. Create both ends with
/// [`MemoryConnection::pair`].
///
/// Documents sent on one end arrive, in order, on the other. Closing an
/// end (or dropping it) makes the peer's `recv` return `Ok(None)` once
/// everything already sent has been read.
pub struct MemoryConnection {
    id: ConnectionId,
    outbound: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryConnection {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        let a = Self {
            id: ConnectionId::next(),
            outbound: Mutex::new(Some(a_tx)),
            inbound: tokio::sync::Mutex::new(b_rx),
        };
        let b = Self {
            id: ConnectionId::next(),
            outbound: Mutex::new(Some(b_tx)),
            inbound: tokio::sync::Mutex::new(a_rx),
        };
        (a, b)
    }
}

impl Connection for MemoryConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        let outbound = self.outbound.lock().unwrap_or_else(PoisonError::into_inner);
        match outbound.as_ref() {
            Some(tx) => tx.send(data.to_vec()).map_err(|_| {
                TransportError::ConnectionClosed("peer dropped".into())
            }),
            None => Err(TransportError::ConnectionClosed("closed locally".into())),
        }
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn close(&self) -> Result<(), Self::Error> {
        let taken = self
            .outbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match taken {
            Some(_) => {
                tracing::debug!(id = %self.id, "memory connection closed");
                Ok(())
            }
            None => Err(TransportError::ConnectionClosed("already closed".into())),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
