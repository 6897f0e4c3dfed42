use crate::game::{Board, Cell, Player, COLS, ROWS};

use super::engine::MAX_DEPTH;

/// Score of a position won by the maximizer, before the depth bonus.
pub const MAX_WIN: i32 = 10_000_000;
/// Score of a position won by the minimizer, before the depth penalty.
pub const MIN_WIN: i32 = -10_000_000;

const TWO_BLOCKS_SCORE: i32 = 1;
const THREE_BLOCKS_SCORE: i32 = 10;

/// Line directions as (row step, column step): horizontal, vertical,
/// ascending and descending diagonals.
const LINES: [(isize, isize); 4] = [(0, 1), (1, 0), (-1, 1), (1, 1)];

/// Static evaluation of a board, always from the maximizer's point of view.
///
/// `depth` is the search depth still remaining when the board is reached, so
/// implementations can prefer wins found closer to the root. Engines never
/// pass more than [`MAX_DEPTH`].
pub trait Heuristic: Send + Sync {
    fn evaluate(&self, board: &Board, depth: u32) -> i32;
}

/// Default heuristic: terminal scores for wins, otherwise a count of the
/// same-owner pairs and triples on the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectFourHeuristic;

impl ConnectFourHeuristic {
    /// Sum of +1/-1 for every `length`-long same-owner segment, in every
    /// direction, signed by owner.
    fn segments(board: &Board, length: usize) -> i32 {
        let mut sum = 0;
        for &(dr, dc) in &LINES {
            for row in 0..ROWS {
                for col in 0..COLS {
                    match Self::segment_owner(board, row, col, dr, dc, length) {
                        Some(Player::Maximizing) => sum += 1,
                        Some(Player::Minimizing) => sum -= 1,
                        None => {}
                    }
                }
            }
        }
        sum
    }

    fn segment_owner(
        board: &Board,
        row: usize,
        col: usize,
        dr: isize,
        dc: isize,
        length: usize,
    ) -> Option<Player> {
        let last_row = row as isize + dr * (length as isize - 1);
        let last_col = col as isize + dc * (length as isize - 1);
        if last_row < 0 || last_row >= ROWS as isize || last_col >= COLS as isize {
            return None;
        }

        let owner = board.get(row, col).owner()?;
        let target = Cell::Occupied(owner);
        let all_same = (1..length as isize).all(|i| {
            let r = (row as isize + dr * i) as usize;
            let c = (col as isize + dc * i) as usize;
            board.get(r, c) == target
        });
        all_same.then_some(owner)
    }
}

impl Heuristic for ConnectFourHeuristic {
    fn evaluate(&self, board: &Board, depth: u32) -> i32 {
        // win scores stay inside the search window
        let depth = depth.min(MAX_DEPTH) as i32;
        if board.is_winning_for(Player::Minimizing) {
            return MIN_WIN - depth;
        }
        if board.is_winning_for(Player::Maximizing) {
            return MAX_WIN + depth;
        }

        TWO_BLOCKS_SCORE * Self::segments(board, 2) + THREE_BLOCKS_SCORE * Self::segments(board, 3)
    }
}
