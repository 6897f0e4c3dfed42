#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Maximizing,
    Minimizing,
}

impl Player {
    /// Get the opponent
    pub fn flip(self) -> Player {
        match self {
            Player::Maximizing => Player::Minimizing,
            Player::Minimizing => Player::Maximizing,
        }
    }

    /// Glyph used when rendering a board
    pub fn glyph(self) -> char {
        match self {
            Player::Maximizing => 'O',
            Player::Minimizing => 'X',
        }
    }

    /// Negamax sign: +1 for the maximizer, -1 for the minimizer
    pub fn color(self) -> i32 {
        match self {
            Player::Maximizing => 1,
            Player::Minimizing => -1,
        }
    }

    /// The side to move after `plies` alternating plies starting with `self`.
    pub fn after_plies(self, plies: u32) -> Player {
        if plies % 2 == 0 {
            self
        } else {
            self.flip()
        }
    }
}
