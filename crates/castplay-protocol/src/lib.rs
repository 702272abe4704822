//! Wire protocol for Castplay.
//!
//! This crate defines the messages a game controller exchanges with the
//! authority (the second-screen game host) over the game namespace:
//!
//! - **Types** ([`PlayerSymbol`], [`EndState`], [`WinningLocation`],
//!   [`Board`], etc.): the values carried inside messages.
//! - **Messages** ([`Command`], [`Event`]): outbound intents and
//!   inbound notifications.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between the channel (whole documents) and the
//! game client (typed callbacks). It doesn't know about connections or
//! sessions: it only knows the message schema.
//!
//! ```text
//! Channel (documents) → Protocol (Command / Event) → Client (handler)
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::{decode_event, Codec, JsonCodec};
pub use error::ProtocolError;
pub use message::{Command, Event};
pub use types::{
    Board, CellState, EndState, PlayerSymbol, WinningLocation, BOARD_CELLS,
    BOARD_DIM, GAME_FULL_MESSAGE, GAME_NAMESPACE,
};
