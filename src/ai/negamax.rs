use std::sync::Arc;

use crate::config::SearchConfig;
use crate::game::{Board, Player};

use super::engine::{
    clamp_depth, is_searchable, SearchContext, SearchEngine, SearchProgress, MAX_SCORE, MIN_SCORE,
};
use super::heuristic::{ConnectFourHeuristic, Heuristic};

/// Negamax search with alpha-beta pruning.
///
/// One recursion serves both players: every score is taken from the point of
/// view of the side to move, so the heuristic is multiplied by the mover's
/// color at the leaves and negated on the way back up.
#[derive(Clone, Default)]
pub struct Negamax {
    ctx: SearchContext,
}

impl Negamax {
    pub fn new(heuristic: Arc<dyn Heuristic>, config: &SearchConfig) -> Self {
        Negamax {
            ctx: SearchContext::new(heuristic, config),
        }
    }

    pub fn with_config(config: &SearchConfig) -> Self {
        Self::new(Arc::new(ConnectFourHeuristic), config)
    }

    pub fn with_progress(mut self, progress: Arc<SearchProgress>) -> Self {
        self.ctx = self.ctx.with_progress(progress);
        self
    }

    fn negamax(&self, board: &mut Board, depth: u32, mut alpha: i32, beta: i32, player: Player) -> i32 {
        if depth == 0 || board.is_terminal() {
            return player.color() * self.ctx.evaluate(board, depth);
        }

        let mut value = MIN_SCORE;
        for &col in self.ctx.move_order() {
            let Some(mut child) = board.play(col, player) else {
                continue;
            };
            value = value.max(-self.negamax(&mut child, depth - 1, -beta, -alpha, player.flip()));
            alpha = alpha.max(value);
            if alpha >= beta {
                break;
            }
        }
        value
    }
}

impl SearchEngine for Negamax {
    fn name(&self) -> &str {
        "Negamax"
    }

    fn search_for(&self, root: &Board, depth: u32, player: Player) -> Option<Board> {
        if !is_searchable(root) {
            return None;
        }
        self.ctx.begin();

        let depth = clamp_depth(depth);
        let mut cursor = *root;
        let mut alpha = MIN_SCORE;
        let mut best: Option<(Board, i32)> = None;

        for &col in self.ctx.move_order() {
            let Some(mut child) = cursor.play(col, player) else {
                continue;
            };
            // Score from the mover's side
            let score = -self.negamax(&mut child, depth - 1, -MAX_SCORE, -alpha, player.flip());
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((*child, score));
            }
            alpha = alpha.max(score);
        }

        log::debug!(
            "{}: depth {} for {:?} -> {:?}",
            self.name(),
            depth,
            player,
            best.map(|(_, score)| score)
        );
        best.map(|(board, _)| board)
    }
}
