//! Core Connect Four game logic: the board with make/unmake and win detection,
//! the two players, and a small referee state for driving whole games.

pub(crate) mod board;
mod player;
mod state;

pub use board::{Board, Cell, PlyGuard, COLS, ROWS, VICTORY_LENGTH};
pub use player::Player;
pub use state::{GameOutcome, GameState};
