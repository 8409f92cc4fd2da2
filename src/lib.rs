//! Abalone rules engine with bitboard-based board representation.
//!
//! # Board Coordinates
//!
//! The board is a hexagon of side 5 holding 61 cells. A cell is addressed
//! by `(row, col)`: rows run from -4 (top) to 4 (bottom), columns start at
//! 0 at the left end of each row. A coordinate lies on the board iff
//! `|row| <= 4`, `col >= 0` and `|row| + col <= 8`.
//!
//! ```text
//! row -4      # # # # #        cols 0-4
//! row -3     # # # # # #       cols 0-5
//! row -2    # # # # # # #      cols 0-6
//! row -1   # # # # # # # #     cols 0-7
//! row  0  # # # # # # # # #    cols 0-8
//! row  1   # # # # # # # #     cols 0-7
//! row  2    # # # # # # #      cols 0-6
//! row  3     # # # # # #       cols 0-5
//! row  4      # # # # #        cols 0-4
//! ```
//!
//! Rows widen toward the equator row 0, so the column of a vertical
//! neighbor depends on which half of the board the origin row lies in
//! (see [`Coord::neighbor`]).
//!
//! Occupancy is stored as two 61-bit masks, one per color, addressed by
//! [`Coord::index`] in row-major order from the top row.
//!
//! # Moves
//!
//! A move selects one to three marbles of the mover's color forming a
//! contiguous line, plus a direction. Moving along the line's own axis is
//! an in-line move and may push one or two opposing marbles (a sumito)
//! when the column outnumbers them; moving in any other direction is a
//! broadside move and requires every target cell to be empty. A marble
//! pushed over the edge is captured, and a side that has lost six of its
//! fourteen marbles loses the game.

#[cfg(feature = "wasm")]
pub mod wasm;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells on the board.
pub const CELL_COUNT: usize = 61;

/// First cell index of each row, top row (-4) first.
/// Row widths are 5, 6, 7, 8, 9, 8, 7, 6, 5.
const ROW_OFFSET: [usize; 9] = [0, 5, 11, 18, 26, 35, 43, 50, 56];

/// Marble color, also identifying the two players.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Color {
    White = 1,
    Black = 2,
}

impl Color {
    /// Get the opposing color.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Convert from u8 (1 or 2) to Color.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Color> {
        match bits {
            1 => Some(Color::White),
            2 => Some(Color::Black),
            _ => None,
        }
    }
}

/// One of the three movement axes of the hexagonal grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Axis {
    /// Left / Right.
    Horizontal,
    /// UpLeft / DownRight.
    Falling,
    /// UpRight / DownLeft.
    Rising,
}

/// The six directions of movement on the hexagonal grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[repr(u8)]
pub enum Direction {
    UpLeft = 0,
    UpRight = 1,
    Left = 2,
    Right = 3,
    DownLeft = 4,
    DownRight = 5,
}

impl Direction {
    /// All six directions.
    pub const ALL: [Direction; 6] = [
        Direction::UpLeft,
        Direction::UpRight,
        Direction::Left,
        Direction::Right,
        Direction::DownLeft,
        Direction::DownRight,
    ];

    /// Get the opposite direction.
    #[inline]
    pub fn opposite(self) -> Direction {
        match self {
            Direction::UpLeft => Direction::DownRight,
            Direction::UpRight => Direction::DownLeft,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::DownLeft => Direction::UpRight,
            Direction::DownRight => Direction::UpLeft,
        }
    }

    /// The axis this direction travels along.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::UpLeft | Direction::DownRight => Axis::Falling,
            Direction::UpRight | Direction::DownLeft => Axis::Rising,
        }
    }

    /// Convert from index (0-5) to Direction.
    #[inline]
    pub fn from_index(idx: usize) -> Option<Direction> {
        match idx {
            0 => Some(Direction::UpLeft),
            1 => Some(Direction::UpRight),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            4 => Some(Direction::DownLeft),
            5 => Some(Direction::DownRight),
            _ => None,
        }
    }
}

/// A cell coordinate on the hexagonal board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    /// Create a coordinate. It may name a point outside the board.
    #[inline]
    pub const fn new(row: i8, col: i8) -> Coord {
        Coord { row, col }
    }

    /// Check whether this coordinate lies on the board.
    ///
    /// Total over every representable coordinate; the arithmetic is
    /// widened so extreme rows and columns cannot overflow `i8`.
    #[inline]
    pub const fn in_bounds(self) -> bool {
        let row = (self.row as i16).abs();
        let col = self.col as i16;
        col >= 0 && row <= 4 && row + col <= 8
    }

    /// Pack to a dense cell index (0-60), row-major from the top row.
    #[inline]
    pub fn index(self) -> usize {
        debug_assert!(self.in_bounds());
        ROW_OFFSET[(self.row + 4) as usize] + self.col as usize
    }

    /// Unpack a dense cell index back to a coordinate.
    pub fn from_index(idx: usize) -> Option<Coord> {
        if idx >= CELL_COUNT {
            return None;
        }
        // The first offset is 0, so the search always succeeds.
        let row = ROW_OFFSET.iter().rposition(|&off| off <= idx).unwrap_or(0);
        Some(Coord::new(row as i8 - 4, (idx - ROW_OFFSET[row]) as i8))
    }

    /// The adjacent coordinate in the given direction.
    ///
    /// Vertical neighbors shift their column only on the half of the
    /// board where the destination row is the shorter one, which keeps
    /// each direction and its opposite exact inverses. The result may
    /// lie off the board; [`Board::cell`] reports such coordinates as
    /// [`Cell::OffBoard`].
    #[inline]
    pub const fn neighbor(self, direction: Direction) -> Coord {
        let (row, col) = (self.row, self.col);
        match direction {
            Direction::Left => Coord::new(row, col - 1),
            Direction::Right => Coord::new(row, col + 1),
            Direction::UpLeft => Coord::new(row - 1, if row <= 0 { col - 1 } else { col }),
            Direction::UpRight => Coord::new(row - 1, if row >= 1 { col + 1 } else { col }),
            Direction::DownLeft => Coord::new(row + 1, if row >= 0 { col - 1 } else { col }),
            Direction::DownRight => Coord::new(row + 1, if row <= -1 { col + 1 } else { col }),
        }
    }

    /// Iterate over all 61 board coordinates, top row first.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..CELL_COUNT).filter_map(Coord::from_index)
    }
}

/// What a board point query finds at a coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    /// On the board, no marble.
    Empty,
    /// On the board, holding a marble of the given color.
    Occupied(Color),
    /// Outside the hexagon.
    OffBoard,
}

impl Cell {
    /// Check if this is an empty on-board cell.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The occupying color, if any.
    #[inline]
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Occupied(color) => Some(color),
            _ => None,
        }
    }
}

/// A marble: a color at a coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub coord: Coord,
}

impl Piece {
    /// Create a piece.
    #[inline]
    pub const fn new(color: Color, coord: Coord) -> Piece {
        Piece { color, coord }
    }
}

/// Why a selection cannot be considered for a move at all.
///
/// Distinct from an illegal move: a well-formed selection whose move is
/// not playable makes validation return `Ok(None)`, not an error.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SelectionError {
    /// No coordinates were selected.
    #[error("selection is empty")]
    EmptySelection,
    /// More than three coordinates were selected.
    #[error("selection has more than three marbles")]
    TooManyPieces,
    /// The same cell appears twice in the selection.
    #[error("selection lists the same cell twice")]
    DuplicatePiece,
    /// A selected coordinate lies outside the board.
    #[error("selected cell is outside the board")]
    OffBoard,
    /// A selected cell is empty or holds an opposing marble.
    #[error("selected cell does not hold one of the mover's marbles")]
    NotOwnPiece,
    /// The selected marbles are not a contiguous line on one axis.
    #[error("selected marbles do not form a contiguous line")]
    NotALine,
}

/// Why a snapshot cannot be restored into a game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum SnapshotError {
    /// The snapshot places a marble outside the board.
    #[error("snapshot places a marble outside the board")]
    OffBoard,
    /// The snapshot places two marbles on the same cell.
    #[error("snapshot places two marbles on the same cell")]
    DuplicateCoord,
}

/// Most pieces a single move can involve: three own marbles plus two
/// pushed opposing marbles.
pub const MAX_MOVE_PIECES: usize = 5;

/// A fixed-size piece list that avoids heap allocation.
#[derive(Clone, Copy)]
pub struct PieceList {
    pieces: [Piece; MAX_MOVE_PIECES],
    len: u8,
}

impl PieceList {
    /// Create an empty piece list.
    #[inline]
    pub const fn new() -> PieceList {
        PieceList {
            pieces: [Piece::new(Color::White, Coord::new(0, 0)); MAX_MOVE_PIECES],
            len: 0,
        }
    }

    /// Add a piece to the list.
    #[inline]
    pub fn push(&mut self, piece: Piece) {
        debug_assert!((self.len as usize) < MAX_MOVE_PIECES);
        self.pieces[self.len as usize] = piece;
        self.len += 1;
    }

    /// Get the number of pieces.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Check if empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a piece by index.
    #[inline]
    pub const fn get(&self, idx: usize) -> Piece {
        self.pieces[idx]
    }

    /// Iterate over the pieces.
    pub fn iter(&self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces[..self.len as usize].iter().copied()
    }

    /// Check whether the list holds a piece at the given coordinate.
    pub fn contains_coord(&self, coord: Coord) -> bool {
        self.iter().any(|p| p.coord == coord)
    }
}

impl Default for PieceList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PieceList {
    fn eq(&self, other: &Self) -> bool {
        self.pieces[..self.len as usize] == other.pieces[..other.len as usize]
    }
}

impl Eq for PieceList {}

impl std::fmt::Debug for PieceList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// A validated move: the marbles it displaces and where they go.
///
/// Produced by move validation and consumed by [`Board::apply`] and
/// [`Board::revert`]. `sources` holds every marble the move picks up,
/// the mover's selection first and then any pushed opposing marbles,
/// nearest first. `destinations` holds the same marbles one step along
/// `direction`, except a marble pushed over the edge, which is recorded
/// in `captured` instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Move {
    direction: Direction,
    sources: PieceList,
    destinations: PieceList,
    captured: Option<Piece>,
}

impl Move {
    /// Build a move by shifting every source piece one step.
    fn new(direction: Direction, sources: PieceList) -> Move {
        let mut destinations = PieceList::new();
        let mut captured = None;
        for piece in sources.iter() {
            let to = piece.coord.neighbor(direction);
            if to.in_bounds() {
                destinations.push(Piece::new(piece.color, to));
            } else {
                captured = Some(piece);
            }
        }
        Move {
            direction,
            sources,
            destinations,
            captured,
        }
    }

    /// The direction of travel.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The marbles the move picks up.
    #[inline]
    pub fn sources(&self) -> &PieceList {
        &self.sources
    }

    /// The marbles as placed after the move.
    #[inline]
    pub fn destinations(&self) -> &PieceList {
        &self.destinations
    }

    /// The marble pushed over the edge, if any.
    #[inline]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// The color making the move.
    #[inline]
    pub fn mover(&self) -> Color {
        self.sources.get(0).color
    }

    /// Whether the move pushes opposing marbles.
    pub fn is_push(&self) -> bool {
        let mover = self.mover();
        self.sources.iter().any(|p| p.color != mover)
    }
}

/// Bitboard occupancy for the 61-cell hexagon.
///
/// One bit per cell in each color mask, addressed by [`Coord::index`].
/// The masks stay disjoint and bits 61-63 stay clear.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Board {
    white: u64,
    black: u64,
}

impl Board {
    /// Create a board with no marbles.
    #[inline]
    pub const fn empty() -> Board {
        Board { white: 0, black: 0 }
    }

    /// Create a board in the standard starting formation.
    ///
    /// White fills rows -4 and -3 plus the middle of row -2, fourteen
    /// marbles in all; black mirrors it on rows 4, 3 and 2.
    pub fn standard() -> Board {
        let mut board = Board::empty();
        for col in 0..=4 {
            board.set(Coord::new(-4, col), Color::White);
            board.set(Coord::new(4, col), Color::Black);
        }
        for col in 0..=5 {
            board.set(Coord::new(-3, col), Color::White);
            board.set(Coord::new(3, col), Color::Black);
        }
        for col in 2..=4 {
            board.set(Coord::new(-2, col), Color::White);
            board.set(Coord::new(2, col), Color::Black);
        }
        board
    }

    // ========== Point Queries ==========

    #[inline]
    fn mask(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline]
    fn mask_mut(&mut self, color: Color) -> &mut u64 {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// What occupies the given coordinate.
    #[inline]
    pub fn cell(&self, coord: Coord) -> Cell {
        if !coord.in_bounds() {
            return Cell::OffBoard;
        }
        let bit = 1u64 << coord.index();
        if self.white & bit != 0 {
            Cell::Occupied(Color::White)
        } else if self.black & bit != 0 {
            Cell::Occupied(Color::Black)
        } else {
            Cell::Empty
        }
    }

    /// The marble at the given coordinate, if any.
    #[inline]
    pub fn piece_at(&self, coord: Coord) -> Option<Piece> {
        self.cell(coord).color().map(|color| Piece::new(color, coord))
    }

    /// The adjacent coordinate in a direction and what occupies it.
    #[inline]
    pub fn neighbor(&self, coord: Coord, direction: Direction) -> (Coord, Cell) {
        let next = coord.neighbor(direction);
        (next, self.cell(next))
    }

    /// Put a marble on a cell, replacing any marble already there.
    /// Does NOT validate a move; the coordinate must be on the board.
    #[inline]
    pub fn set(&mut self, coord: Coord, color: Color) {
        let bit = 1u64 << coord.index();
        self.white &= !bit;
        self.black &= !bit;
        *self.mask_mut(color) |= bit;
    }

    /// Remove the marble on a cell, if any.
    /// The coordinate must be on the board.
    #[inline]
    pub fn clear(&mut self, coord: Coord) {
        let bit = 1u64 << coord.index();
        self.white &= !bit;
        self.black &= !bit;
    }

    /// Iterate over every marble on the board, top row first.
    pub fn pieces(&self) -> impl Iterator<Item = Piece> + '_ {
        Coord::all().filter_map(|coord| self.piece_at(coord))
    }

    // ========== Counting & Endgame ==========

    /// Number of marbles of a color on the board.
    #[inline]
    pub fn count(&self, color: Color) -> u32 {
        self.mask(color).count_ones()
    }

    /// The color holding the majority of marbles, if any.
    pub fn dominant(&self) -> Option<Color> {
        let white = self.count(Color::White);
        let black = self.count(Color::Black);
        if white > black {
            Some(Color::White)
        } else if black > white {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// Whether a color has lost: fewer than nine marbles left, meaning
    /// six of the starting fourteen have been pushed off.
    #[inline]
    pub fn is_losing(&self, color: Color) -> bool {
        self.count(color) < 9
    }

    // ========== Apply & Revert ==========

    /// Apply a validated move: lift every source marble, then set down
    /// every destination marble. A captured marble is lifted and never
    /// set back down.
    pub fn apply(&mut self, mov: &Move) {
        for piece in mov.sources().iter() {
            self.clear(piece.coord);
        }
        for piece in mov.destinations().iter() {
            self.set(piece.coord, piece.color);
        }
    }

    /// Reverse a move applied with [`Board::apply`], restoring the
    /// previous occupancy exactly.
    pub fn revert(&mut self, mov: &Move) {
        for piece in mov.destinations().iter() {
            self.clear(piece.coord);
        }
        for piece in mov.sources().iter() {
            self.set(piece.coord, piece.color);
        }
    }

    // ========== Move Validation ==========

    /// Validate a candidate move for `mover`.
    ///
    /// Returns `Ok(Some(..))` with the full move when it is playable,
    /// `Ok(None)` when the selection is well formed but the move is not
    /// playable, and `Err` when the selection itself is malformed.
    pub fn validate_move(
        &self,
        selection: &[Coord],
        direction: Direction,
        mover: Color,
    ) -> Result<Option<Move>, SelectionError> {
        if selection.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        if selection.len() > 3 {
            return Err(SelectionError::TooManyPieces);
        }

        let mut pieces = PieceList::new();
        for (i, &coord) in selection.iter().enumerate() {
            if selection[..i].contains(&coord) {
                return Err(SelectionError::DuplicatePiece);
            }
            match self.cell(coord) {
                Cell::OffBoard => return Err(SelectionError::OffBoard),
                Cell::Occupied(color) if color == mover => pieces.push(Piece::new(mover, coord)),
                _ => return Err(SelectionError::NotOwnPiece),
            }
        }

        if pieces.len() == 1 {
            return Ok(self.single_move(pieces, direction));
        }

        let axis = match line_axis(&pieces) {
            Some(axis) => axis,
            None => return Err(SelectionError::NotALine),
        };

        if direction.axis() == axis {
            Ok(self.inline_move(pieces, direction))
        } else {
            Ok(self.broadside_move(pieces, direction))
        }
    }

    /// A lone marble steps into an adjacent empty cell.
    fn single_move(&self, pieces: PieceList, direction: Direction) -> Option<Move> {
        let (_, cell) = self.neighbor(pieces.get(0).coord, direction);
        if cell.is_empty() {
            Some(Move::new(direction, pieces))
        } else {
            None
        }
    }

    /// A side-step: every marble moves into its own adjacent cell, all
    /// of which must be empty.
    fn broadside_move(&self, pieces: PieceList, direction: Direction) -> Option<Move> {
        for piece in pieces.iter() {
            let (_, cell) = self.neighbor(piece.coord, direction);
            if !cell.is_empty() {
                return None;
            }
        }
        Some(Move::new(direction, pieces))
    }

    /// An in-line move: the column advances head first, pushing one or
    /// two opposing marbles when it outnumbers them.
    fn inline_move(&self, pieces: PieceList, direction: Direction) -> Option<Move> {
        let opponent = pieces.get(0).color.opponent();
        let head = leading_coord(&pieces, direction);

        let (first, first_cell) = self.neighbor(head, direction);
        match first_cell {
            Cell::Empty => return Some(Move::new(direction, pieces)),
            Cell::Occupied(color) if color == opponent => {}
            // An own marble ahead, or the board edge. Own marbles may
            // not leave the board.
            _ => return None,
        }

        let mut sources = pieces;
        sources.push(Piece::new(opponent, first));
        let (second, second_cell) = self.neighbor(first, direction);
        match second_cell {
            Cell::Empty | Cell::OffBoard => Some(Move::new(direction, sources)),
            Cell::Occupied(color) if color == opponent && pieces.len() == 3 => {
                sources.push(Piece::new(opponent, second));
                let (_, third_cell) = self.neighbor(second, direction);
                match third_cell {
                    Cell::Empty | Cell::OffBoard => Some(Move::new(direction, sources)),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    // ========== Move Generation ==========

    /// Generate all legal moves for a color.
    ///
    /// Enumerates every marble and every contiguous two- and
    /// three-marble line of that color once, and keeps the directions
    /// that validate. The standard opening position yields 44 moves.
    pub fn legal_moves(&self, color: Color) -> Vec<Move> {
        // One direction per axis, so each line is anchored at a unique end.
        const RUN_DIRECTIONS: [Direction; 3] = [
            Direction::Right,
            Direction::DownLeft,
            Direction::DownRight,
        ];

        let mut moves = Vec::with_capacity(64);
        let own: Vec<Coord> = self
            .pieces()
            .filter(|p| p.color == color)
            .map(|p| p.coord)
            .collect();

        for &coord in &own {
            for direction in Direction::ALL {
                if let Ok(Some(mov)) = self.validate_move(&[coord], direction, color) {
                    moves.push(mov);
                }
            }
        }

        for &coord in &own {
            for run_direction in RUN_DIRECTIONS {
                let second = coord.neighbor(run_direction);
                if self.cell(second) != Cell::Occupied(color) {
                    continue;
                }
                let pair = [coord, second];
                for direction in Direction::ALL {
                    if let Ok(Some(mov)) = self.validate_move(&pair, direction, color) {
                        moves.push(mov);
                    }
                }
                let third = second.neighbor(run_direction);
                if self.cell(third) != Cell::Occupied(color) {
                    continue;
                }
                let triple = [coord, second, third];
                for direction in Direction::ALL {
                    if let Ok(Some(mov)) = self.validate_move(&triple, direction, color) {
                        moves.push(mov);
                    }
                }
            }
        }

        moves
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in -4i8..=4 {
            let width = 9 - row.abs();
            write!(f, "{}", " ".repeat(row.abs() as usize))?;
            for col in 0..width {
                if col > 0 {
                    write!(f, " ")?;
                }
                let symbol = match self.cell(Coord::new(row, col)) {
                    Cell::Occupied(Color::White) => 'O',
                    Cell::Occupied(Color::Black) => '@',
                    _ => '.',
                };
                write!(f, "{}", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The axis on which the pieces form one contiguous line, if any.
///
/// Walks from each piece in each direction and checks whether the walk
/// visits the whole selection.
fn line_axis(pieces: &PieceList) -> Option<Axis> {
    for direction in Direction::ALL {
        for start in pieces.iter() {
            let mut walk = start.coord;
            let mut matched = 1;
            loop {
                walk = walk.neighbor(direction);
                if pieces.contains_coord(walk) {
                    matched += 1;
                } else {
                    break;
                }
            }
            if matched == pieces.len() {
                return Some(direction.axis());
            }
        }
    }
    None
}

/// The coordinate at the head of the line for a movement direction:
/// the greatest row for the downward directions, the least for the
/// upward ones, and likewise with columns horizontally.
fn leading_coord(pieces: &PieceList, direction: Direction) -> Coord {
    let mut head = pieces.get(0).coord;
    for piece in pieces.iter().skip(1) {
        if advance_key(piece.coord, direction) > advance_key(head, direction) {
            head = piece.coord;
        }
    }
    head
}

/// Progress of a coordinate along a direction of travel.
fn advance_key(coord: Coord, direction: Direction) -> i8 {
    match direction {
        Direction::UpLeft | Direction::UpRight => -coord.row,
        Direction::DownLeft | Direction::DownRight => coord.row,
        Direction::Left => -coord.col,
        Direction::Right => coord.col,
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// A running game: the board plus whose turn it is.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Game {
    board: Board,
    turn: Color,
}

impl Game {
    /// Start a game from the standard formation, white to move.
    pub fn new() -> Game {
        Game {
            board: Board::standard(),
            turn: Color::White,
        }
    }

    /// Resume a game from an arbitrary position.
    pub fn with_position(board: Board, turn: Color) -> Game {
        Game { board, turn }
    }

    /// The current board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The color to move.
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The color not on move.
    #[inline]
    pub fn opponent(&self) -> Color {
        self.turn.opponent()
    }

    /// Validate a candidate move for the color to move.
    pub fn validate(
        &self,
        selection: &[Coord],
        direction: Direction,
    ) -> Result<Option<Move>, SelectionError> {
        self.board.validate_move(selection, direction, self.turn)
    }

    /// Validate a move and, when it is playable, play it.
    ///
    /// The turn passes to the opponent only when a move applies;
    /// illegal moves and malformed selections leave the game untouched.
    pub fn try_move(
        &mut self,
        selection: &[Coord],
        direction: Direction,
    ) -> Result<Option<Move>, SelectionError> {
        let mov = self.validate(selection, direction)?;
        if let Some(mov) = &mov {
            self.board.apply(mov);
            self.turn = self.turn.opponent();
        }
        Ok(mov)
    }

    /// Take back a move played with [`Game::try_move`].
    pub fn undo(&mut self, mov: &Move) {
        self.board.revert(mov);
        self.turn = self.turn.opponent();
    }

    /// All legal moves for the color to move.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves(self.turn)
    }

    /// The winner, once either side has lost six marbles.
    pub fn winner(&self) -> Option<Color> {
        if self.board.is_losing(Color::White) {
            Some(Color::Black)
        } else if self.board.is_losing(Color::Black) {
            Some(Color::White)
        } else {
            None
        }
    }

    /// Capture the game as a serializable snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            turn: self.turn,
            pieces: self.board.pieces().collect(),
        }
    }

    /// Rebuild a game from a snapshot, checking board invariants.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Game, SnapshotError> {
        let mut board = Board::empty();
        for piece in &snapshot.pieces {
            if !piece.coord.in_bounds() {
                return Err(SnapshotError::OffBoard);
            }
            if board.cell(piece.coord) != Cell::Empty {
                return Err(SnapshotError::DuplicateCoord);
            }
            board.set(piece.coord, piece.color);
        }
        Ok(Game::with_position(board, snapshot.turn))
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable record of a game: the turn and every marble.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub turn: Color,
    pub pieces: Vec<Piece>,
}
