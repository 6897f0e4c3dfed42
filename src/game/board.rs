use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use super::player::Player;
use crate::error::BoardParseError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const VICTORY_LENGTH: usize = 4;

const SEPARATOR: &str = "+-+-+-+-+-+-+-+";
const RULER: &str = " 1 2 3 4 5 6 7";

/// Row/column steps for the four line directions (row 0 is the top).
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

type RunScan = fn(&Board, Player, usize) -> Option<Vec<(usize, usize)>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Occupied(Player),
}

impl Cell {
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(player) => player.glyph(),
        }
    }
}

/// A 6x7 Connect Four grid.
///
/// Equality and hashing look at the cells only, so a copied board can be used
/// as a map key while another copy serves as a search cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Build a board by dropping tokens in `columns`, alternating sides starting
    /// with `first`. Returns `None` if any drop is refused.
    pub fn from_moves(columns: &[usize], first: Player) -> Option<Self> {
        let mut board = Board::new();
        let mut player = first;
        for &col in columns {
            if !board.apply_move(col, player) {
                return None;
            }
            player = player.flip();
        }
        Some(board)
    }

    /// Get the cell at a specific position
    /// Row 0 is the top, row 5 is the bottom
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        if col >= COLS {
            return true;
        }
        self.cells[0][col] != Cell::Empty
    }

    /// Columns that still accept a token, left to right
    pub fn legal_columns(&self) -> impl Iterator<Item = usize> + '_ {
        (0..COLS).filter(move |&col| !self.is_column_full(col))
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| self.is_column_full(col))
    }

    pub fn token_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Cell::Empty)
            .count()
    }

    /// Drop a token for `player` into `col`. Returns `false` without touching
    /// the board if the column is full or does not exist.
    pub fn apply_move(&mut self, col: usize, player: Player) -> bool {
        if col >= COLS {
            return false;
        }

        // Find the lowest empty row in this column
        for row in (0..ROWS).rev() {
            if self.cells[row][col] == Cell::Empty {
                self.cells[row][col] = Cell::Occupied(player);
                return true;
            }
        }

        false
    }

    /// Remove the topmost token of `col`.
    ///
    /// Only meaningful as the exact reverse of a successful [`Board::apply_move`]
    /// on the same column; calls must nest like a stack.
    pub fn undo_move(&mut self, col: usize) {
        debug_assert!(col < COLS, "column {col} out of range");
        if col >= COLS {
            return;
        }

        for row in 0..ROWS {
            if self.cells[row][col] != Cell::Empty {
                self.cells[row][col] = Cell::Empty;
                return;
            }
        }
    }

    /// Apply a ply and get a guard that undoes it when dropped.
    ///
    /// The guard dereferences to the board, so recursion can keep playing on
    /// it. Because each guard mutably borrows its parent, the borrow checker
    /// enforces the stack order that [`Board::undo_move`] relies on.
    pub fn play(&mut self, col: usize, player: Player) -> Option<PlyGuard<'_>> {
        if self.apply_move(col, player) {
            Some(PlyGuard { board: self, col })
        } else {
            None
        }
    }

    /// One child board per non-full column, left to right.
    pub fn expand(&self, player: Player) -> Vec<Board> {
        let mut children = Vec::with_capacity(COLS);
        for col in 0..COLS {
            let mut child = *self;
            if child.apply_move(col, player) {
                children.push(child);
            }
        }
        children
    }

    /// True if `player` owns four adjacent cells in any direction.
    pub fn is_winning_for(&self, player: Player) -> bool {
        let target = Cell::Occupied(player);
        for &(dr, dc) in &DIRECTIONS {
            for row in 0..ROWS {
                for col in 0..COLS {
                    if self.window_matches(row, col, dr, dc, target) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// The board is full and nobody has four in a row.
    pub fn is_tie(&self) -> bool {
        self.is_full()
            && !self.is_winning_for(Player::Minimizing)
            && !self.is_winning_for(Player::Maximizing)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_full()
            || self.is_winning_for(Player::Minimizing)
            || self.is_winning_for(Player::Maximizing)
    }

    /// Check the gravity invariant: no token floats above an empty cell.
    pub fn is_well_formed(&self) -> bool {
        (0..COLS).all(|col| self.column_is_grounded(col))
    }

    /// Find the longest run of at least four same-owner cells.
    ///
    /// Lengths are tried from `ROWS` down to four, so a full row of seven is
    /// reported as its first six cells. For each length the directions are
    /// tried as vertical, ascending diagonal, descending diagonal, horizontal,
    /// and within a direction the minimizer is checked before the maximizer.
    /// Coordinates are `(column, row)` in the order the scan visits them.
    pub fn longest_winning_run(&self) -> Option<Vec<(usize, usize)>> {
        for length in (VICTORY_LENGTH..=ROWS).rev() {
            let scans: [RunScan; 4] = [
                Board::vertical_run,
                Board::ascending_run,
                Board::descending_run,
                Board::horizontal_run,
            ];
            for scan in scans {
                for player in [Player::Minimizing, Player::Maximizing] {
                    if let Some(run) = scan(self, player, length) {
                        return Some(run);
                    }
                }
            }
        }
        None
    }

    pub fn to_display_text(&self) -> String {
        self.to_string()
    }

    fn column_is_grounded(&self, col: usize) -> bool {
        let mut seen_empty = false;
        for row in (0..ROWS).rev() {
            match self.cells[row][col] {
                Cell::Empty => seen_empty = true,
                Cell::Occupied(_) if seen_empty => return false,
                Cell::Occupied(_) => {}
            }
        }
        true
    }

    fn window_matches(&self, row: usize, col: usize, dr: isize, dc: isize, target: Cell) -> bool {
        (0..VICTORY_LENGTH as isize).all(|i| {
            let r = row as isize + dr * i;
            let c = col as isize + dc * i;
            r >= 0
                && c >= 0
                && (r as usize) < ROWS
                && (c as usize) < COLS
                && self.cells[r as usize][c as usize] == target
        })
    }

    fn collect_run(
        &self,
        player: Player,
        cells: impl Iterator<Item = (usize, usize)>,
    ) -> Option<Vec<(usize, usize)>> {
        let target = Cell::Occupied(player);
        let mut run = Vec::with_capacity(COLS);
        for (col, row) in cells {
            if self.cells[row][col] != target {
                return None;
            }
            run.push((col, row));
        }
        Some(run)
    }

    fn vertical_run(&self, player: Player, length: usize) -> Option<Vec<(usize, usize)>> {
        for col in 0..COLS {
            for row in 0..=ROWS - length {
                let run = self.collect_run(player, (0..length).map(|i| (col, row + i)));
                if run.is_some() {
                    return run;
                }
            }
        }
        None
    }

    fn ascending_run(&self, player: Player, length: usize) -> Option<Vec<(usize, usize)>> {
        for row in (length - 1..ROWS).rev() {
            for col in 0..=COLS - length {
                let run = self.collect_run(player, (0..length).map(|i| (col + i, row - i)));
                if run.is_some() {
                    return run;
                }
            }
        }
        None
    }

    fn descending_run(&self, player: Player, length: usize) -> Option<Vec<(usize, usize)>> {
        for row in (length - 1..ROWS).rev() {
            for col in length - 1..COLS {
                let run = self.collect_run(player, (0..length).map(|i| (col - i, row - i)));
                if run.is_some() {
                    return run;
                }
            }
        }
        None
    }

    fn horizontal_run(&self, player: Player, length: usize) -> Option<Vec<(usize, usize)>> {
        for row in (0..ROWS).rev() {
            for col in 0..=COLS - length {
                let run = self.collect_run(player, (0..length).map(|i| (col + i, row)));
                if run.is_some() {
                    return run;
                }
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            for cell in row {
                write!(f, "|{}", cell.glyph())?;
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "{SEPARATOR}")?;
        write!(f, "{RULER}")
    }
}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parse the grid rows of [`Board::to_display_text`]. The separator and
    /// column ruler may be omitted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Board::new();
        let mut row = 0;

        for line in s.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed == SEPARATOR || trimmed == RULER.trim() {
                continue;
            }
            if !trimmed.starts_with('|') {
                return Err(BoardParseError::UnexpectedLine(trimmed.to_string()));
            }
            if row == ROWS {
                return Err(BoardParseError::RowCount { found: row + 1 });
            }

            let chars: Vec<char> = trimmed.chars().collect();
            if chars.len() != 2 * COLS + 1 || chars.iter().step_by(2).any(|&c| c != '|') {
                return Err(BoardParseError::RowShape { row });
            }

            for col in 0..COLS {
                board.cells[row][col] = match chars[2 * col + 1] {
                    '.' => Cell::Empty,
                    'O' => Cell::Occupied(Player::Maximizing),
                    'X' => Cell::Occupied(Player::Minimizing),
                    glyph => return Err(BoardParseError::UnknownGlyph { glyph, row }),
                };
            }
            row += 1;
        }

        if row != ROWS {
            return Err(BoardParseError::RowCount { found: row });
        }
        if let Some(column) = (0..COLS).find(|&col| !board.column_is_grounded(col)) {
            return Err(BoardParseError::FloatingToken { column });
        }

        Ok(board)
    }
}

/// A ply in flight: undoes itself on drop. See [`Board::play`].
pub struct PlyGuard<'a> {
    board: &'a mut Board,
    col: usize,
}

impl PlyGuard<'_> {
    pub fn column(&self) -> usize {
        self.col
    }
}

impl Deref for PlyGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for PlyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for PlyGuard<'_> {
    fn drop(&mut self) {
        self.board.undo_move(self.col);
    }
}
