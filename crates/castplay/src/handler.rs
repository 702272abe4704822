//! The consumer-side hook for inbound events.

use castplay_protocol::Event;

use crate::GameStream;

/// Receives every event the authority sends, in arrival order.
///
/// One method takes the whole [`Event`] enum, so a `match` in the
/// implementation is checked for exhaustiveness by the compiler. The
/// stream is passed along so a handler can answer (for example, ask for
/// the board after being told the game is full).
///
/// Any `FnMut(Event, &GameStream)` closure is a handler:
///
/// ```rust
/// use castplay::{EventHandler, GameStream};
/// use castplay_protocol::Event;
///
/// let mut log = Vec::new();
/// let mut handler = |event: Event, _: &GameStream| log.push(event.name());
/// GameStream::detached().dispatch(br#"{"event":"error","message":"x"}"#, &mut handler);
/// assert_eq!(log, ["error"]);
/// ```
pub trait EventHandler {
    fn on_event(&mut self, event: Event, stream: &GameStream);
}

impl<F> EventHandler for F
where
    F: FnMut(Event, &GameStream),
{
    fn on_event(&mut self, event: Event, stream: &GameStream) {
        self(event, stream)
    }
}
