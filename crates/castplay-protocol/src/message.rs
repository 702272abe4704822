//! Commands (controller → authority) and events (authority → controller).
//!
//! Both are flat JSON objects with a discriminator field: `command` for
//! outbound messages, `event` for inbound ones.
//!
//! ```text
//! {"command": "move", "row": 1, "column": 2}
//! {"event": "moved", "player": "X", "row": 1, "column": 2, "game_over": false}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Board, EndState, ProtocolError, WinningLocation};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// An intent the controller sends to the authority.
///
/// `#[serde(tag = "command")]` puts the variant name next to the fields,
/// so `Command::Leave` becomes `{"command":"leave"}` and
/// `Command::BoardLayoutRequest` becomes `{"command":"board_layout_request"}`.
///
/// No bounds checking happens here: the authority rejects illegal moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Take a seat in the game under the given display name.
    Join { name: String },

    /// Place this player's mark at `(row, column)`.
    Move { row: i32, column: i32 },

    /// Give up the seat. Ends an undecided game as abandoned.
    Leave,

    /// Ask for the current board, answered by a board layout response.
    BoardLayoutRequest,
}

impl Command {
    /// The wire discriminator of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Move { .. } => "move",
            Self::Leave => "leave",
            Self::BoardLayoutRequest => "board_layout_request",
        }
    }
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

const EVENT_KEY: &str = "event";
const JOINED: &str = "joined";
const MOVED: &str = "moved";
const ENDGAME: &str = "endgame";
const ERROR: &str = "error";
const BOARD_LAYOUT_RESPONSE: &str = "board_layout_response";

/// A notification from the authority.
///
/// Player symbols are kept exactly as received; resolve them with
/// [`PlayerSymbol::from_wire`](crate::PlayerSymbol::from_wire).
///
/// Serialization produces the authority's wire shape. Decoding goes
/// through [`Event::from_document`], which distinguishes documents that
/// aren't events at all from events with bad fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Both seats are filled. `player` is our symbol, `opponent` the
    /// other player's name.
    Joined { player: String, opponent: String },

    /// A mark was placed.
    Moved {
        player: String,
        row: i32,
        column: i32,
        game_over: bool,
    },

    /// The game finished. `winning_location` is `Unknown` when abandoned.
    #[serde(rename = "endgame")]
    EndGame {
        end_state: EndState,
        #[serde(skip_serializing_if = "WinningLocation::is_unknown")]
        winning_location: WinningLocation,
    },

    /// The authority rejected something we did.
    Error { message: String },

    /// The current board, in reply to a board layout request.
    BoardLayoutResponse { board: Board },
}

#[derive(Deserialize)]
struct JoinedFields {
    player: String,
    opponent: String,
}

#[derive(Deserialize)]
struct MovedFields {
    player: String,
    row: i32,
    column: i32,
    game_over: bool,
}

#[derive(Deserialize)]
struct EndGameFields {
    end_state: EndState,
    // Only looked at when the game wasn't abandoned.
    #[serde(default)]
    winning_location: Option<Value>,
}

#[derive(Deserialize)]
struct ErrorFields {
    message: String,
}

#[derive(Deserialize)]
struct BoardLayoutFields {
    board: Vec<i64>,
}

impl Event {
    /// Classifies and decodes one inbound document.
    ///
    /// # Errors
    /// - [`ProtocolError::MissingEvent`]: no `event` field.
    /// - [`ProtocolError::UnknownEvent`]: a tag this client doesn't know.
    /// - [`ProtocolError::MalformedEvent`]: a known tag with missing or
    ///   mistyped fields.
    /// - [`ProtocolError::InvalidBoard`] / [`ProtocolError::InvalidCell`]:
    ///   a board layout that isn't a full grid of cell codes.
    pub fn from_document(document: Value) -> Result<Self, ProtocolError> {
        let tag = match document.get(EVENT_KEY) {
            None => return Err(ProtocolError::MissingEvent),
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "event tag is not a string: {other}"
                )));
            }
        };

        match tag.as_str() {
            JOINED => {
                let f: JoinedFields = fields(JOINED, document)?;
                Ok(Self::Joined {
                    player: f.player,
                    opponent: f.opponent,
                })
            }
            MOVED => {
                let f: MovedFields = fields(MOVED, document)?;
                Ok(Self::Moved {
                    player: f.player,
                    row: f.row,
                    column: f.column,
                    game_over: f.game_over,
                })
            }
            ENDGAME => {
                let f: EndGameFields = fields(ENDGAME, document)?;
                let winning_location = match (f.end_state, f.winning_location) {
                    (EndState::Abandoned, _) => WinningLocation::Unknown,
                    (_, None | Some(Value::Null)) => WinningLocation::Unknown,
                    (_, Some(value)) => match value.as_i64() {
                        Some(code) => WinningLocation::from_code(code),
                        None => {
                            return Err(ProtocolError::MalformedEvent {
                                event: ENDGAME,
                                reason: format!(
                                    "winning_location is not an integer: {value}"
                                ),
                            });
                        }
                    },
                };
                Ok(Self::EndGame {
                    end_state: f.end_state,
                    winning_location,
                })
            }
            ERROR => {
                let f: ErrorFields = fields(ERROR, document)?;
                Ok(Self::Error { message: f.message })
            }
            BOARD_LAYOUT_RESPONSE => {
                let f: BoardLayoutFields = fields(BOARD_LAYOUT_RESPONSE, document)?;
                Ok(Self::BoardLayoutResponse {
                    board: Board::from_row_major(&f.board)?,
                })
            }
            _ => Err(ProtocolError::UnknownEvent(tag)),
        }
    }

    /// The wire discriminator of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Joined { .. } => JOINED,
            Self::Moved { .. } => MOVED,
            Self::EndGame { .. } => ENDGAME,
            Self::Error { .. } => ERROR,
            Self::BoardLayoutResponse { .. } => BOARD_LAYOUT_RESPONSE,
        }
    }
}

/// Extracts the typed fields of a recognised event. Extra keys
/// (including the tag itself) are ignored.
fn fields<T: DeserializeOwned>(
    event: &'static str,
    document: Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(document).map_err(|e| ProtocolError::MalformedEvent {
        event,
        reason: e.to_string(),
    })
}
