use super::{Board, Player, COLS};
use crate::error::MoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// A board plus whose turn it is, as seen by a referee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Option<GameOutcome>,
}

impl GameState {
    /// Create initial game state with `first` to move
    pub fn initial(first: Player) -> Self {
        GameState {
            board: Board::new(),
            current_player: first,
            outcome: None,
        }
    }

    /// Wrap an existing position
    pub fn from_board(board: Board, to_move: Player) -> Self {
        GameState {
            board,
            current_player: to_move,
            outcome: outcome_of(&board),
        }
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.legal_columns().collect()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply move mutably
    pub fn apply_move_mut(&mut self, column: usize) -> Result<(), MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        if column >= COLS {
            return Err(MoveError::InvalidColumn(column));
        }
        if !self.board.apply_move(column, self.current_player) {
            return Err(MoveError::ColumnFull(column));
        }

        self.outcome = outcome_of(&self.board);
        self.current_player = self.current_player.flip();

        Ok(())
    }

    /// Accept a board produced by a search engine for the side to move.
    ///
    /// Returns the column that was played, or an error if `next` is not
    /// reachable from the current board by exactly one ply of the current player.
    pub fn advance_to(&mut self, next: &Board) -> Result<usize, MoveError> {
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }
        let column = (0..COLS)
            .find(|&col| {
                let mut probe = self.board;
                probe.apply_move(col, self.current_player) && probe == *next
            })
            .ok_or(MoveError::NotASinglePly)?;
        self.apply_move_mut(column)?;
        Ok(column)
    }
}

fn outcome_of(board: &Board) -> Option<GameOutcome> {
    if board.is_winning_for(Player::Minimizing) {
        Some(GameOutcome::Winner(Player::Minimizing))
    } else if board.is_winning_for(Player::Maximizing) {
        Some(GameOutcome::Winner(Player::Maximizing))
    } else if board.is_full() {
        Some(GameOutcome::Draw)
    } else {
        None
    }
}
