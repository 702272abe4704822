//! Game sessions: one attached channel, one reader, one writer.
//!
//! A [`GameSession`] is the explicit context a controller holds while it is
//! connected to an authority. It is created from a connected channel,
//! spawns two tasks, and is torn down with [`GameSession::end`]:
//!
//! ```text
//!   GameStream::send ──▶ outbound queue ──▶ writer task ──▶ conn.send
//!   conn.recv ──▶ reader task ──▶ GameStream::dispatch ──▶ EventHandler
//! ```
//!
//! The reader handles one document at a time, so events reach the handler
//! in exactly the order the channel delivered them. The writer is the only
//! task that writes to the channel.

use std::sync::Arc;

use castplay_protocol::GAME_NAMESPACE;
use castplay_transport::{
    Connection, ConnectionId, TransportError, WebSocketConnection,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{CastError, EventHandler, GameStream};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Where to find the authority and how to introduce ourselves.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the authority, e.g. `ws://192.168.1.20:8008`.
    pub url: String,

    /// Namespace the game channel is scoped to. Appended to `url` as the
    /// request path.
    pub namespace: String,

    /// If set, a `join` with this name is sent as soon as the channel is
    /// attached.
    pub player_name: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8008".to_string(),
            namespace: GAME_NAMESPACE.to_string(),
            player_name: None,
        }
    }
}

impl SessionConfig {
    /// The full channel URL: `url/namespace`.
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.namespace)
    }
}

// ---------------------------------------------------------------------------
// GameSessionBuilder
// ---------------------------------------------------------------------------

/// Builder for connecting a [`GameSession`] over WebSocket.
///
/// # Example
///
/// ```rust,no_run
/// use castplay::prelude::*;
///
/// # async fn run() -> Result<(), CastError> {
/// let session = GameSession::builder()
///     .url("ws://192.168.1.20:8008")
///     .join_as("MyName")
///     .connect(GameView::new())
///     .await?;
/// session.stream().make_move(1, 1);
/// session.end().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameSessionBuilder {
    config: SessionConfig,
}

impl GameSessionBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authority's base URL.
    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    /// Overrides the game namespace.
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.config.namespace = namespace.to_string();
        self
    }

    /// Joins the game under `name` once connected.
    pub fn join_as(mut self, name: &str) -> Self {
        self.config.player_name = Some(name.to_string());
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Connects to the authority and starts the session.
    pub async fn connect<H>(
        self,
        handler: H,
    ) -> Result<GameSession<WebSocketConnection>, CastError>
    where
        H: EventHandler + Send + 'static,
    {
        let endpoint = self.config.endpoint();
        let conn = WebSocketConnection::connect(&endpoint).await?;
        tracing::info!(%endpoint, "connected to authority");

        let session = GameSession::start(conn, handler);
        if let Some(name) = &self.config.player_name {
            session.stream().join(name);
        }
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// A live game channel.
///
/// Dropping a session without calling [`end`](Self::end) stops both tasks
/// but sends no `leave`.
pub struct GameSession<C>
where
    C: Connection<Error = TransportError>,
{
    conn: Arc<C>,
    stream: GameStream,
    shutdown: Option<oneshot::Sender<()>>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl GameSession<WebSocketConnection> {
    /// Creates a new builder.
    pub fn builder() -> GameSessionBuilder {
        GameSessionBuilder::new()
    }
}

impl<C> GameSession<C>
where
    C: Connection<Error = TransportError>,
{
    /// Attaches a game stream to an already-open channel.
    ///
    /// Must be called inside a Tokio runtime: the reader and writer run as
    /// spawned tasks.
    pub fn start<H>(conn: C, handler: H) -> Self
    where
        H: EventHandler + Send + 'static,
    {
        let conn = Arc::new(conn);
        let conn_id = conn.id();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let stream = GameStream::attached(outbound_tx, conn_id);

        let writer =
            tokio::spawn(run_writer(Arc::clone(&conn), outbound_rx, shutdown_rx));
        let reader =
            tokio::spawn(run_reader(Arc::clone(&conn), stream.clone(), handler));

        tracing::info!(%conn_id, "game session started");

        Self {
            conn,
            stream,
            shutdown: Some(shutdown_tx),
            reader: Some(reader),
            writer: Some(writer),
        }
    }

    /// The handle for sending commands. Clone it to send from other tasks.
    pub fn stream(&self) -> &GameStream {
        &self.stream
    }

    pub fn id(&self) -> ConnectionId {
        self.conn.id()
    }

    /// Returns `true` until the channel is closed by the peer or fails.
    pub fn is_open(&self) -> bool {
        self.reader.as_ref().is_some_and(|r| !r.is_finished())
    }

    /// Waits until the peer closes the channel (or it fails).
    pub async fn closed(&mut self) {
        if let Some(reader) = self.reader.as_mut() {
            let _ = reader.await;
        }
        self.reader = None;
    }

    /// Ends the session: leaves the game if the channel is still open,
    /// flushes queued commands, then closes the channel.
    pub async fn end(mut self) -> Result<(), CastError> {
        let conn_id = self.conn.id();

        if self.is_open() {
            self.stream.leave();
        }
        if let Some(reader) = self.reader.take() {
            reader.abort();
            let _ = reader.await;
        }
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.await {
                tracing::warn!(%conn_id, error = %e, "writer task failed");
            }
        }

        tracing::info!(%conn_id, "game session ended");

        match self.conn.close().await {
            Ok(()) => Ok(()),
            Err(e) if e.is_closed() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl<C> Drop for GameSession<C>
where
    C: Connection<Error = TransportError>,
{
    fn drop(&mut self) {
        // The writer stops on its own once `shutdown` is dropped.
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Reads documents until the channel closes, dispatching each in order.
async fn run_reader<C, H>(conn: Arc<C>, stream: GameStream, mut handler: H)
where
    C: Connection<Error = TransportError>,
    H: EventHandler + Send + 'static,
{
    let conn_id = conn.id();
    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                stream.dispatch(&data, &mut handler);
            }
            Ok(None) => {
                tracing::info!(%conn_id, "channel closed");
                break;
            }
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "channel receive failed");
                break;
            }
        }
    }
}

/// Writes queued documents until shutdown, then flushes what is left.
async fn run_writer<C>(
    conn: Arc<C>,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
    mut shutdown: oneshot::Receiver<()>,
) where
    C: Connection<Error = TransportError>,
{
    loop {
        tokio::select! {
            document = outbound.recv() => match document {
                Some(document) => deliver(conn.as_ref(), &document).await,
                None => break,
            },
            _ = &mut shutdown => {
                outbound.close();
                while let Some(document) = outbound.recv().await {
                    deliver(conn.as_ref(), &document).await;
                }
                break;
            }
        }
    }
    tracing::debug!(conn_id = %conn.id(), "writer stopped");
}

async fn deliver<C>(conn: &C, document: &[u8])
where
    C: Connection<Error = TransportError>,
{
    if let Err(e) = conn.send(document).await {
        tracing::warn!(conn_id = %conn.id(), error = %e, "unable to deliver message");
    }
}
