//! Value types carried inside game messages.
//!
//! These are the small, closed vocabularies of the tic-tac-toe protocol:
//! who is playing, how a game ended, which line won, and what the board
//! looks like. Each type knows its own wire representation.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// The namespace the game channel is scoped to. Both sides must agree on
/// it; messages on any other namespace belong to someone else.
pub const GAME_NAMESPACE: &str = "com.google.chromecast.demo.tictactoe";

/// Side length of the board.
pub const BOARD_DIM: usize = 3;

/// Number of cells on the board, and the length of the wire array.
pub const BOARD_CELLS: usize = BOARD_DIM * BOARD_DIM;

/// The error text the authority sends when both seats are taken.
pub const GAME_FULL_MESSAGE: &str = "Game is full.";

// ---------------------------------------------------------------------------
// PlayerSymbol
// ---------------------------------------------------------------------------

/// The mark a player places: `"X"` or `"O"` on the wire.
///
/// Events keep the symbol as the raw string the authority sent. Use
/// [`PlayerSymbol::from_wire`] to resolve it; anything other than `X` or
/// `O` resolves to `None` and must not be guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSymbol {
    X,
    O,
}

impl PlayerSymbol {
    /// Resolves a wire symbol. Returns `None` for anything unexpected.
    pub fn from_wire(symbol: &str) -> Option<Self> {
        match symbol {
            "X" => Some(Self::X),
            "O" => Some(Self::O),
            _ => None,
        }
    }

    /// The wire form of this symbol.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }

    /// The opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for PlayerSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EndState
// ---------------------------------------------------------------------------

/// How a game finished.
///
/// The wire strings are fixed by the authority: `"X-won"`, `"O-won"`,
/// `"draw"` and `"abandoned"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndState {
    #[serde(rename = "X-won")]
    XWon,
    #[serde(rename = "O-won")]
    OWon,
    #[serde(rename = "draw")]
    Draw,
    /// A player left before the game was decided. No winning line.
    #[serde(rename = "abandoned")]
    Abandoned,
}

impl EndState {
    /// The winning symbol, if the game was won.
    pub fn winner(self) -> Option<PlayerSymbol> {
        match self {
            Self::XWon => Some(PlayerSymbol::X),
            Self::OWon => Some(PlayerSymbol::O),
            Self::Draw | Self::Abandoned => None,
        }
    }

    /// The wire form of this end state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::XWon => "X-won",
            Self::OWon => "O-won",
            Self::Draw => "draw",
            Self::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for EndState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WinningLocation
// ---------------------------------------------------------------------------

/// The line that completed a win.
///
/// On the wire this is a small integer code:
///
/// ```text
///   0..=2  → Row(0..=2)
///   3..=5  → Column(0..=2)
///   6      → DiagonalTopLeft     (top-left to bottom-right)
///   7      → DiagonalBottomLeft  (bottom-left to top-right)
///   other  → Unknown
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WinningLocation {
    Row(u8),
    Column(u8),
    DiagonalTopLeft,
    DiagonalBottomLeft,
    /// No line, or a code we don't recognise.
    #[default]
    Unknown,
}

impl WinningLocation {
    /// Maps a wire code to a location. Total: unrecognised codes are
    /// `Unknown`, never an error.
    pub fn from_code(code: i64) -> Self {
        let dim = BOARD_DIM as i64;
        match code {
            c if (0..dim).contains(&c) => Self::Row(c as u8),
            c if (dim..2 * dim).contains(&c) => Self::Column((c - dim) as u8),
            c if c == 2 * dim => Self::DiagonalTopLeft,
            c if c == 2 * dim + 1 => Self::DiagonalBottomLeft,
            _ => Self::Unknown,
        }
    }

    /// The wire code for this location. `Unknown` is `-1`.
    pub fn code(self) -> i32 {
        let dim = BOARD_DIM as i32;
        match self {
            Self::Row(r) => i32::from(r),
            Self::Column(c) => dim + i32::from(c),
            Self::DiagonalTopLeft => 2 * dim,
            Self::DiagonalBottomLeft => 2 * dim + 1,
            Self::Unknown => -1,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The `(row, column)` cells covered by this line, or `None` for
    /// `Unknown`.
    pub fn cells(self) -> Option<[(usize, usize); BOARD_DIM]> {
        let mut out = [(0, 0); BOARD_DIM];
        for (i, cell) in out.iter_mut().enumerate() {
            *cell = match self {
                Self::Row(r) => (usize::from(r), i),
                Self::Column(c) => (i, usize::from(c)),
                Self::DiagonalTopLeft => (i, i),
                Self::DiagonalBottomLeft => (BOARD_DIM - 1 - i, i),
                Self::Unknown => return None,
            };
        }
        Some(out)
    }
}

impl Serialize for WinningLocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

// ---------------------------------------------------------------------------
// CellState and Board
// ---------------------------------------------------------------------------

/// The content of one board cell. Wire codes: 0 empty, 1 X, 2 O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Empty,
    X,
    O,
}

impl CellState {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::X),
            2 => Some(Self::O),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::X => 1,
            Self::O => 2,
        }
    }
}

impl From<PlayerSymbol> for CellState {
    fn from(symbol: PlayerSymbol) -> Self {
        match symbol {
            PlayerSymbol::X => Self::X,
            PlayerSymbol::O => Self::O,
        }
    }
}

impl Serialize for CellState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A `BOARD_DIM × BOARD_DIM` grid of cells.
///
/// The wire form is a flat array of `BOARD_CELLS` codes in row-major
/// order, so cell `(row, column)` lives at index `row * BOARD_DIM + column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[CellState; BOARD_DIM]; BOARD_DIM],
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a board from its flat wire form.
    ///
    /// # Errors
    /// [`ProtocolError::InvalidBoard`] if `codes` is not exactly
    /// `BOARD_CELLS` long, [`ProtocolError::InvalidCell`] for a code that
    /// is not a cell state.
    pub fn from_row_major(codes: &[i64]) -> Result<Self, ProtocolError> {
        if codes.len() != BOARD_CELLS {
            return Err(ProtocolError::InvalidBoard {
                expected: BOARD_CELLS,
                actual: codes.len(),
            });
        }
        let mut board = Self::new();
        for (index, &code) in codes.iter().enumerate() {
            let cell =
                CellState::from_code(code).ok_or(ProtocolError::InvalidCell(code))?;
            board.cells[index / BOARD_DIM][index % BOARD_DIM] = cell;
        }
        Ok(board)
    }

    /// The flat wire form of this board.
    pub fn to_row_major(&self) -> Vec<u8> {
        self.cells.iter().flatten().map(|c| c.code()).collect()
    }

    /// Returns the cell at `(row, column)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<CellState> {
        self.cells.get(row)?.get(column).copied()
    }

    /// Sets a cell. Returns `false` (and changes nothing) when out of bounds.
    pub fn set(&mut self, row: usize, column: usize, cell: CellState) -> bool {
        match self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn rows(&self) -> &[[CellState; BOARD_DIM]; BOARD_DIM] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|c| *c == CellState::Empty)
    }
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.cells.iter().flatten())
    }
}

/// Renders the board as text, one row per line:
///
/// ```text
/// X | O | .
/// . | X | .
/// . | . | O
/// ```
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            for (c, cell) in row.iter().enumerate() {
                if c > 0 {
                    f.write_str(" | ")?;
                }
                let mark = match cell {
                    CellState::Empty => ".",
                    CellState::X => "X",
                    CellState::O => "O",
                };
                f.write_str(mark)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // PlayerSymbol
    // =====================================================================

    #[test]
    fn test_player_symbol_from_wire() {
        assert_eq!(PlayerSymbol::from_wire("X"), Some(PlayerSymbol::X));
        assert_eq!(PlayerSymbol::from_wire("O"), Some(PlayerSymbol::O));
    }

    #[test]
    fn test_player_symbol_rejects_anything_else() {
        // Lowercase, empty and "0" must not be mapped to a player.
        assert_eq!(PlayerSymbol::from_wire("x"), None);
        assert_eq!(PlayerSymbol::from_wire(""), None);
        assert_eq!(PlayerSymbol::from_wire("0"), None);
    }

    #[test]
    fn test_player_symbol_other() {
        assert_eq!(PlayerSymbol::X.other(), PlayerSymbol::O);
        assert_eq!(PlayerSymbol::O.other(), PlayerSymbol::X);
    }

    // =====================================================================
    // EndState
    // =====================================================================

    #[test]
    fn test_end_state_wire_strings() {
        assert_eq!(serde_json::to_string(&EndState::XWon).unwrap(), "\"X-won\"");
        assert_eq!(serde_json::to_string(&EndState::OWon).unwrap(), "\"O-won\"");
        assert_eq!(serde_json::to_string(&EndState::Draw).unwrap(), "\"draw\"");
        let abandoned: EndState = serde_json::from_str("\"abandoned\"").unwrap();
        assert_eq!(abandoned, EndState::Abandoned);
    }

    #[test]
    fn test_end_state_unknown_string_fails() {
        let result: Result<EndState, _> = serde_json::from_str("\"forfeit\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_end_state_winner() {
        assert_eq!(EndState::XWon.winner(), Some(PlayerSymbol::X));
        assert_eq!(EndState::OWon.winner(), Some(PlayerSymbol::O));
        assert_eq!(EndState::Draw.winner(), None);
        assert_eq!(EndState::Abandoned.winner(), None);
    }

    // =====================================================================
    // WinningLocation
    // =====================================================================

    #[test]
    fn test_winning_location_mapping_is_total() {
        assert_eq!(WinningLocation::from_code(-1), WinningLocation::Unknown);
        assert_eq!(WinningLocation::from_code(0), WinningLocation::Row(0));
        assert_eq!(WinningLocation::from_code(2), WinningLocation::Row(2));
        assert_eq!(WinningLocation::from_code(3), WinningLocation::Column(0));
        assert_eq!(WinningLocation::from_code(5), WinningLocation::Column(2));
        assert_eq!(
            WinningLocation::from_code(6),
            WinningLocation::DiagonalTopLeft
        );
        assert_eq!(
            WinningLocation::from_code(7),
            WinningLocation::DiagonalBottomLeft
        );
        assert_eq!(WinningLocation::from_code(8), WinningLocation::Unknown);
        assert_eq!(WinningLocation::from_code(999), WinningLocation::Unknown);
        assert_eq!(
            WinningLocation::from_code(i64::MIN),
            WinningLocation::Unknown
        );
    }

    #[test]
    fn test_winning_location_code_inverts_from_code() {
        for code in 0..8 {
            assert_eq!(i64::from(WinningLocation::from_code(code).code()), code);
        }
        assert_eq!(WinningLocation::Unknown.code(), -1);
    }

    #[test]
    fn test_winning_location_cells() {
        assert_eq!(
            WinningLocation::Row(1).cells(),
            Some([(1, 0), (1, 1), (1, 2)])
        );
        assert_eq!(
            WinningLocation::Column(2).cells(),
            Some([(0, 2), (1, 2), (2, 2)])
        );
        assert_eq!(
            WinningLocation::DiagonalTopLeft.cells(),
            Some([(0, 0), (1, 1), (2, 2)])
        );
        assert_eq!(
            WinningLocation::DiagonalBottomLeft.cells(),
            Some([(2, 0), (1, 1), (0, 2)])
        );
        assert_eq!(WinningLocation::Unknown.cells(), None);
    }

    // =====================================================================
    // Board
    // =====================================================================

    #[test]
    fn test_board_from_row_major_layout() {
        let board =
            Board::from_row_major(&[1, 0, 2, 0, 1, 0, 2, 0, 0]).unwrap();
        assert_eq!(board.get(0, 0), Some(CellState::X));
        assert_eq!(board.get(0, 2), Some(CellState::O));
        assert_eq!(board.get(1, 1), Some(CellState::X));
        assert_eq!(board.get(2, 0), Some(CellState::O));
        assert_eq!(board.get(2, 2), Some(CellState::Empty));
    }

    #[test]
    fn test_board_rejects_short_array() {
        let err = Board::from_row_major(&[0; 8]).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::InvalidBoard { expected: 9, actual: 8 }
        ));
    }

    #[test]
    fn test_board_rejects_long_array() {
        let err = Board::from_row_major(&[0; 10]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidBoard { actual: 10, .. }));
    }

    #[test]
    fn test_board_rejects_unknown_cell_code() {
        let err =
            Board::from_row_major(&[0, 0, 0, 0, 3, 0, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidCell(3)));
    }

    #[test]
    fn test_board_serializes_row_major() {
        let mut board = Board::new();
        board.set(0, 1, CellState::X);
        board.set(2, 2, CellState::O);
        let json = serde_json::to_value(board).unwrap();
        assert_eq!(json, serde_json::json!([0, 1, 0, 0, 0, 0, 0, 0, 2]));
        assert_eq!(board.to_row_major(), vec![0, 1, 0, 0, 0, 0, 0, 0, 2]);
    }

    #[test]
    fn test_board_set_out_of_bounds_is_ignored() {
        let mut board = Board::new();
        assert!(!board.set(3, 0, CellState::X));
        assert!(!board.set(0, 3, CellState::X));
        assert!(board.is_empty());
        assert_eq!(board.get(5, 5), None);
    }

    #[test]
    fn test_board_display() {
        let board =
            Board::from_row_major(&[1, 2, 0, 0, 1, 0, 0, 0, 2]).unwrap();
        assert_eq!(board.to_string(), "X | O | .\n. | X | .\n. | . | O");
    }
}
