//! Client-side projection of the game.
//!
//! [`GameView`] folds the authority's events into what a controller needs
//! to draw: our seat, the opponent, whose turn it is, and the board. The
//! authority stays the source of truth; the view never validates moves.

use std::fmt;

use castplay_protocol::{
    Board, CellState, EndState, Event, PlayerSymbol, WinningLocation,
    GAME_FULL_MESSAGE,
};

use crate::{EventHandler, GameStream};

/// Where the controller is in the game's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No `joined` event seen yet.
    #[default]
    Unjoined,
    /// Seated with a symbol.
    Playing,
    /// Watching a game we have no seat in.
    Observing,
    Finished(Outcome),
}

/// The result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won {
        winner: PlayerSymbol,
        location: WinningLocation,
    },
    Draw,
    Abandoned,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won { winner, .. } => write!(f, "{winner} won"),
            Self::Draw => f.write_str("draw"),
            Self::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// A follow-up the view wants sent after applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    None,
    RequestBoardLayout,
}

#[derive(Debug, Clone, Default)]
pub struct GameView {
    phase: Phase,
    assigned: Option<PlayerSymbol>,
    opponent: Option<String>,
    turn: Option<PlayerSymbol>,
    board: Board,
    last_error: Option<String>,
}

impl GameView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Our symbol, if we hold a seat.
    pub fn assigned(&self) -> Option<PlayerSymbol> {
        self.assigned
    }

    pub fn opponent(&self) -> Option<&str> {
        self.opponent.as_deref()
    }

    /// The symbol expected to move next. `None` before the game starts
    /// and after it ends.
    pub fn turn(&self) -> Option<PlayerSymbol> {
        self.turn
    }

    /// Returns `true` when we are seated and it is our move.
    pub fn is_our_turn(&self) -> bool {
        self.phase == Phase::Playing && self.assigned.is_some() && self.turn == self.assigned
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The text of the most recent error event.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Folds one event into the view.
    pub fn apply(&mut self, event: &Event) -> Reaction {
        match event {
            Event::Joined { player, opponent } => {
                self.assigned = PlayerSymbol::from_wire(player);
                self.opponent = Some(opponent.clone());
                self.turn = Some(PlayerSymbol::X);
                self.board.clear();
                self.last_error = None;
                self.phase = if self.assigned.is_some() {
                    Phase::Playing
                } else {
                    Phase::Observing
                };
            }
            Event::Moved {
                player,
                row,
                column,
                game_over,
            } => {
                if let Some(symbol) = PlayerSymbol::from_wire(player) {
                    if let (Ok(r), Ok(c)) = (usize::try_from(*row), usize::try_from(*column)) {
                        self.board.set(r, c, CellState::from(symbol));
                    }
                    self.turn = if *game_over { None } else { Some(symbol.other()) };
                }
            }
            Event::EndGame {
                end_state,
                winning_location,
            } => {
                let outcome = match (end_state, end_state.winner()) {
                    (_, Some(winner)) => Outcome::Won {
                        winner,
                        location: *winning_location,
                    },
                    (EndState::Abandoned, None) => Outcome::Abandoned,
                    (_, None) => Outcome::Draw,
                };
                self.turn = None;
                self.phase = Phase::Finished(outcome);
            }
            Event::Error { message } => {
                self.last_error = Some(message.clone());
                if message == GAME_FULL_MESSAGE {
                    self.phase = Phase::Observing;
                    self.assigned = None;
                    self.board.clear();
                    return Reaction::RequestBoardLayout;
                }
            }
            Event::BoardLayoutResponse { board } => {
                self.board = *board;
            }
        }
        Reaction::None
    }
}

impl EventHandler for GameView {
    fn on_event(&mut self, event: Event, stream: &GameStream) {
        if self.apply(&event) == Reaction::RequestBoardLayout {
            stream.request_board_layout();
        }
    }
}
