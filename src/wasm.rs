//! WebAssembly bindings for the rules engine.
//!
//! The JavaScript side addresses cells by `(row, col)` pairs and passes a
//! selection as a flat `Int8Array` of `[row, col, row, col, ..]`.
//! Directions travel as the codes of [`Direction`] (0 UpLeft, 1 UpRight,
//! 2 Left, 3 Right, 4 DownLeft, 5 DownRight) and colors as the codes of
//! [`Color`] (1 white, 2 black). Moves and snapshots cross the boundary
//! as plain objects via `serde_wasm_bindgen`.

use wasm_bindgen::prelude::*;

use crate::{Cell, Color, Coord, Direction, Game, Move, Piece, Snapshot};

/// A complete game behind a JS-friendly facade.
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a game from the standard formation, white to move.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: Game::new() }
    }

    /// What occupies a cell: 0 empty, 1 white, 2 black, 3 off the board.
    #[wasm_bindgen(js_name = colorAt)]
    pub fn color_at(&self, row: i8, col: i8) -> u8 {
        match self.inner.board().cell(Coord::new(row, col)) {
            Cell::Empty => 0,
            Cell::Occupied(color) => color as u8,
            Cell::OffBoard => 3,
        }
    }

    /// The color to move, as a color code.
    pub fn turn(&self) -> u8 {
        self.inner.turn() as u8
    }

    /// Validate a candidate move for the color to move.
    ///
    /// Returns the move as an object when it is playable, `null` when it
    /// is not, and throws a string when the selection is malformed.
    #[wasm_bindgen(js_name = validateMove)]
    pub fn validate_move(&self, selection: &[i8], direction: u8) -> Result<JsValue, JsValue> {
        let coords = parse_selection(selection)
            .ok_or_else(|| JsValue::from_str("selection must be flat [row, col, ..] pairs"))?;
        let direction = Direction::from_index(direction as usize)
            .ok_or_else(|| JsValue::from_str("direction must be 0-5"))?;
        match self.inner.validate(&coords, direction) {
            Ok(Some(mov)) => Ok(serde_wasm_bindgen::to_value(&WasmMove::from(&mov)).unwrap()),
            Ok(None) => Ok(JsValue::NULL),
            Err(err) => Err(JsValue::from_str(&err.to_string())),
        }
    }

    /// Play a move for the color to move. Returns whether it applied.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, selection: &[i8], direction: u8) -> bool {
        let coords = match parse_selection(selection) {
            Some(coords) => coords,
            None => return false,
        };
        let direction = match Direction::from_index(direction as usize) {
            Some(direction) => direction,
            None => return false,
        };
        matches!(self.inner.try_move(&coords, direction), Ok(Some(_)))
    }

    /// All legal moves for the color to move, as an array of objects.
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> JsValue {
        let moves: Vec<WasmMove> = self.inner.legal_moves().iter().map(WasmMove::from).collect();
        serde_wasm_bindgen::to_value(&moves).unwrap()
    }

    /// Number of marbles left for a color code.
    #[wasm_bindgen(js_name = countPieces)]
    pub fn count_pieces(&self, color: u8) -> u32 {
        Color::from_bits(color).map_or(0, |color| self.inner.board().count(color))
    }

    /// Whether a color code has lost six marbles.
    #[wasm_bindgen(js_name = isLosing)]
    pub fn is_losing(&self, color: u8) -> bool {
        Color::from_bits(color).is_some_and(|color| self.inner.board().is_losing(color))
    }

    /// The winner as a color code, or 0 while the game runs.
    pub fn winner(&self) -> u8 {
        self.inner.winner().map_or(0, |color| color as u8)
    }

    /// The game as a snapshot object.
    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).unwrap()
    }

    /// Rebuild a game from a snapshot object. Throws a string when the
    /// snapshot does not describe a valid position.
    pub fn restore(value: JsValue) -> Result<WasmGame, JsValue> {
        let snapshot: Snapshot = serde_wasm_bindgen::from_value(value).map_err(JsValue::from)?;
        let inner =
            Game::from_snapshot(&snapshot).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(WasmGame { inner })
    }

    /// ASCII rendering of the board, for debugging.
    pub fn render(&self) -> String {
        self.inner.board().to_string()
    }

    /// Deep copy of the game.
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_game(&self) -> WasmGame {
        WasmGame {
            inner: self.inner.clone(),
        }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_selection(flat: &[i8]) -> Option<Vec<Coord>> {
    if flat.len() % 2 != 0 {
        return None;
    }
    Some(
        flat.chunks_exact(2)
            .map(|pair| Coord::new(pair[0], pair[1]))
            .collect(),
    )
}

#[derive(serde::Serialize)]
struct WasmPiece {
    row: i8,
    col: i8,
    color: u8,
}

impl From<Piece> for WasmPiece {
    fn from(piece: Piece) -> WasmPiece {
        WasmPiece {
            row: piece.coord.row,
            col: piece.coord.col,
            color: piece.color as u8,
        }
    }
}

#[derive(serde::Serialize)]
struct WasmMove {
    direction: u8,
    sources: Vec<WasmPiece>,
    destinations: Vec<WasmPiece>,
    captured: Option<WasmPiece>,
}

impl From<&Move> for WasmMove {
    fn from(mov: &Move) -> WasmMove {
        WasmMove {
            direction: mov.direction() as u8,
            sources: mov.sources().iter().map(WasmPiece::from).collect(),
            destinations: mov.destinations().iter().map(WasmPiece::from).collect(),
            captured: mov.captured().map(WasmPiece::from),
        }
    }
}
