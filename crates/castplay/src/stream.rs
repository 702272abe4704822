//! The game message stream: outbound commands and inbound dispatch.
//!
//! Outbound calls are fire-and-forget. Each one builds the command's
//! document and queues it for the session's writer task; if that fails
//! (encoding, no channel attached, channel gone) the failure is logged and
//! the caller carries on. Callers notice lost commands only by the absence
//! of the authority's answer.
//!
//! Inbound documents are decoded one at a time and handed to an
//! [`EventHandler`]. Anything that isn't a well-formed event is logged and
//! dropped without touching the channel.

use castplay_protocol::{decode_event, Codec, Command, JsonCodec, ProtocolError};
use castplay_transport::{ConnectionId, TransportError};
use tokio::sync::mpsc;

use crate::{CastError, EventHandler};

/// Handle for talking to the authority.
///
/// Cheap to clone: every clone feeds the same outbound queue, so the UI,
/// an input task and the event handler can all send commands.
#[derive(Debug, Clone)]
pub struct GameStream {
    outbound: Option<mpsc::UnboundedSender<Vec<u8>>>,
    conn_id: Option<ConnectionId>,
    codec: JsonCodec,
}

impl GameStream {
    /// A stream with no channel behind it. Every send logs
    /// "not attached" and does nothing; dispatch still works.
    pub fn detached() -> Self {
        Self {
            outbound: None,
            conn_id: None,
            codec: JsonCodec,
        }
    }

    /// A stream feeding the given writer queue.
    pub(crate) fn attached(
        outbound: mpsc::UnboundedSender<Vec<u8>>,
        conn_id: ConnectionId,
    ) -> Self {
        Self {
            outbound: Some(outbound),
            conn_id: Some(conn_id),
            codec: JsonCodec,
        }
    }

    /// Returns `true` while a writer is accepting documents.
    pub fn is_attached(&self) -> bool {
        self.outbound.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// The connection this stream writes to, if any.
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.conn_id
    }

    // -----------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------

    /// Asks for a seat in the game under `name`.
    pub fn join(&self, name: &str) {
        tracing::debug!(name, "join");
        self.send(Command::Join {
            name: name.to_string(),
        });
    }

    /// Places our mark at `(row, column)`. Not validated locally; the
    /// authority answers illegal moves with an error event.
    pub fn make_move(&self, row: i32, column: i32) {
        tracing::debug!(row, column, "move");
        self.send(Command::Move { row, column });
    }

    /// Leaves the current game.
    pub fn leave(&self) {
        tracing::debug!("leave");
        self.send(Command::Leave);
    }

    /// Asks the authority for the current board.
    pub fn request_board_layout(&self) {
        tracing::debug!("request board layout");
        self.send(Command::BoardLayoutRequest);
    }

    /// Sends a command, logging instead of returning any failure.
    pub fn send(&self, command: Command) {
        if let Err(e) = self.try_send(&command) {
            tracing::warn!(
                conn_id = ?self.conn_id,
                command = command.name(),
                error = %e,
                "unable to send command"
            );
        }
    }

    /// Sends a command and reports whether it was queued.
    ///
    /// `Ok` means the document reached the writer, not that the authority
    /// received it; write failures on the channel itself are only logged.
    pub fn try_send(&self, command: &Command) -> Result<(), CastError> {
        let document = self.codec.encode(command)?;
        let outbound = self.outbound.as_ref().ok_or(TransportError::NotAttached)?;
        outbound.send(document).map_err(|_| {
            TransportError::ConnectionClosed("outbound queue closed".into())
        })?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------

    /// Decodes one inbound document and hands the event to `handler`.
    ///
    /// Returns `true` if the handler was invoked. Documents that aren't
    /// events, or are events with bad fields, are logged and dropped.
    pub fn dispatch<H>(&self, data: &[u8], handler: &mut H) -> bool
    where
        H: EventHandler + ?Sized,
    {
        match decode_event(&self.codec, data) {
            Ok(event) => {
                tracing::debug!(
                    conn_id = ?self.conn_id,
                    event = event.name(),
                    "event received"
                );
                handler.on_event(event, self);
                true
            }
            Err(ProtocolError::MissingEvent) => {
                tracing::warn!(
                    conn_id = ?self.conn_id,
                    message = %String::from_utf8_lossy(data),
                    "unknown message"
                );
                false
            }
            Err(ProtocolError::UnknownEvent(tag)) => {
                tracing::debug!(conn_id = ?self.conn_id, %tag, "ignoring event");
                false
            }
            Err(e) => {
                tracing::warn!(
                    conn_id = ?self.conn_id,
                    error = %e,
                    "dropping undecodable message"
                );
                false
            }
        }
    }
}

impl Default for GameStream {
    fn default() -> Self {
        Self::detached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use castplay_protocol::{
        CellState, EndState, Event, PlayerSymbol, WinningLocation,
    };

    /// Collects every event the stream dispatches.
    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl EventHandler for Recorder {
        fn on_event(&mut self, event: Event, _stream: &GameStream) {
            self.events.push(event);
        }
    }

    fn attached() -> (GameStream, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (GameStream::attached(tx, ConnectionId::new(1)), rx)
    }

    fn sent(rx: &mut mpsc::UnboundedReceiver<Vec<u8>>) -> serde_json::Value {
        let bytes = rx.try_recv().expect("a document should be queued");
        serde_json::from_slice(&bytes).unwrap()
    }

    // =====================================================================
    // Outbound
    // =====================================================================

    #[test]
    fn test_move_produces_wire_document() {
        let (stream, mut rx) = attached();
        stream.make_move(1, 2);
        let bytes = rx.try_recv().unwrap();
        assert_eq!(bytes, br#"{"command":"move","row":1,"column":2}"#);
    }

    #[test]
    fn test_each_intent_queues_its_command() {
        let (stream, mut rx) = attached();
        stream.join("Ada");
        stream.leave();
        stream.request_board_layout();

        assert_eq!(sent(&mut rx), serde_json::json!({"command": "join", "name": "Ada"}));
        assert_eq!(sent(&mut rx), serde_json::json!({"command": "leave"}));
        assert_eq!(
            sent(&mut rx),
            serde_json::json!({"command": "board_layout_request"})
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_move_is_not_bounds_checked() {
        let (stream, mut rx) = attached();
        stream.make_move(-4, 17);
        assert_eq!(
            sent(&mut rx),
            serde_json::json!({"command": "move", "row": -4, "column": 17})
        );
    }

    #[test]
    fn test_detached_stream_sends_are_silent_noops() {
        let stream = GameStream::detached();
        assert!(!stream.is_attached());
        // Must not panic.
        stream.join("nobody");
        stream.make_move(0, 0);
        stream.leave();
        stream.request_board_layout();
    }

    #[test]
    fn test_try_send_reports_not_attached() {
        let err = GameStream::detached().try_send(&Command::Leave).unwrap_err();
        assert!(matches!(
            err,
            CastError::Transport(TransportError::NotAttached)
        ));
    }

    #[test]
    fn test_try_send_reports_closed_queue() {
        let (stream, rx) = attached();
        drop(rx);
        assert!(!stream.is_attached());
        let err = stream.try_send(&Command::Leave).unwrap_err();
        assert!(matches!(
            err,
            CastError::Transport(TransportError::ConnectionClosed(_))
        ));
        // And the fire-and-forget form just logs.
        stream.leave();
    }

    #[test]
    fn test_clones_share_the_queue() {
        let (stream, mut rx) = attached();
        let other = stream.clone();
        stream.join("a");
        other.leave();
        assert_eq!(sent(&mut rx)["command"], "join");
        assert_eq!(sent(&mut rx)["command"], "leave");
    }

    // =====================================================================
    // Inbound dispatch
    // =====================================================================

    #[test]
    fn test_dispatch_moved_invokes_handler_once() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        let invoked = stream.dispatch(
            br#"{"event":"moved","player":"X","row":1,"column":2,"game_over":false}"#,
            &mut recorder,
        );
        assert!(invoked);
        assert_eq!(
            recorder.events,
            vec![Event::Moved {
                player: "X".into(),
                row: 1,
                column: 2,
                game_over: false,
            }]
        );
        let Event::Moved { player, .. } = &recorder.events[0] else {
            unreachable!()
        };
        assert_eq!(PlayerSymbol::from_wire(player), Some(PlayerSymbol::X));
    }

    #[test]
    fn test_dispatch_endgame_diagonal() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        stream.dispatch(
            br#"{"event":"endgame","end_state":"X-won","winning_location":6}"#,
            &mut recorder,
        );
        assert_eq!(
            recorder.events,
            vec![Event::EndGame {
                end_state: EndState::XWon,
                winning_location: WinningLocation::DiagonalTopLeft,
            }]
        );
    }

    #[test]
    fn test_dispatch_one_callback_per_fixture() {
        let fixtures: [&[u8]; 5] = [
            br#"{"event":"joined","player":"X","opponent":"Bob"}"#,
            br#"{"event":"moved","player":"O","row":0,"column":0,"game_over":true}"#,
            br#"{"event":"endgame","end_state":"abandoned"}"#,
            br#"{"event":"error","message":"Game is full."}"#,
            br#"{"event":"board_layout_response","board":[0,1,2,0,1,2,0,1,2]}"#,
        ];
        let stream = GameStream::detached();
        for fixture in fixtures {
            let mut recorder = Recorder::default();
            assert!(stream.dispatch(fixture, &mut recorder));
            assert_eq!(recorder.events.len(), 1);
        }
    }

    #[test]
    fn test_dispatch_board_layout() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        stream.dispatch(
            br#"{"event":"board_layout_response","board":[2,0,0,0,1,0,0,0,0]}"#,
            &mut recorder,
        );
        let [Event::BoardLayoutResponse { board }] = recorder.events.as_slice()
        else {
            panic!("expected one board layout, got {:?}", recorder.events);
        };
        assert_eq!(board.get(0, 0), Some(CellState::O));
        assert_eq!(board.get(1, 1), Some(CellState::X));
    }

    #[test]
    fn test_dispatch_without_event_tag_invokes_nothing() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        assert!(!stream.dispatch(br#"{"player":"X"}"#, &mut recorder));
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_dispatch_unknown_event_invokes_nothing() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        assert!(!stream.dispatch(br#"{"event":"spectate"}"#, &mut recorder));
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_dispatch_short_board_invokes_nothing() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        assert!(!stream.dispatch(
            br#"{"event":"board_layout_response","board":[0,0,0,0]}"#,
            &mut recorder,
        ));
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_dispatch_garbage_invokes_nothing() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        assert!(!stream.dispatch(b"\x00\xffnot json", &mut recorder));
        assert!(recorder.events.is_empty());
    }

    #[test]
    fn test_bad_message_does_not_affect_the_next_one() {
        let stream = GameStream::detached();
        let mut recorder = Recorder::default();
        stream.dispatch(br#"{"event":"moved","player":"X"}"#, &mut recorder);
        stream.dispatch(br#"{"event":"error","message":"late"}"#, &mut recorder);
        assert_eq!(
            recorder.events,
            vec![Event::Error {
                message: "late".into()
            }]
        );
    }

    #[test]
    fn test_handler_can_reply_through_stream() {
        let (stream, mut rx) = attached();
        let mut handler = |event: Event, stream: &GameStream| {
            if let Event::Error { .. } = event {
                stream.request_board_layout();
            }
        };
        stream.dispatch(br#"{"event":"error","message":"x"}"#, &mut handler);
        assert_eq!(sent(&mut rx)["command"], "board_layout_request");
    }
}
