//! # Castplay
//!
//! Second-screen controller for a cast tic-tac-toe game.
//!
//! The game runs on an authority (the cast receiver). A controller opens
//! a message channel to it, sends [`Command`]s through a [`GameStream`],
//! and receives [`Event`]s through an [`EventHandler`]. [`GameView`] is a
//! ready-made handler that keeps a client-side picture of the game.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use castplay::prelude::*;
//!
//! # async fn run() -> Result<(), CastError> {
//! let session = GameSession::builder()
//!     .url("ws://192.168.1.20:8008")
//!     .join_as("Ada")
//!     .connect(|event: Event, _: &GameStream| println!("{event:?}"))
//!     .await?;
//!
//! session.stream().make_move(0, 0);
//! session.end().await
//! # }
//! ```

mod error;
mod handler;
mod session;
mod stream;
mod view;

pub use error::CastError;
pub use handler::EventHandler;
pub use session::{GameSession, GameSessionBuilder, SessionConfig};
pub use stream::GameStream;
pub use view::{GameView, Outcome, Phase, Reaction};

pub use castplay_protocol::{Command, Event};

/// Everything a controller usually needs, in one import.
pub mod prelude {
    pub use crate::{
        CastError, EventHandler, GameSession, GameSessionBuilder, GameStream,
        GameView, Outcome, Phase, Reaction, SessionConfig,
    };
    pub use castplay_protocol::{
        Board, CellState, Command, EndState, Event, PlayerSymbol,
        WinningLocation, GAME_NAMESPACE,
    };
    pub use castplay_transport::{Connection, ConnectionId, MemoryConnection};
}
