use std::sync::Arc;

use crate::config::SearchConfig;
use crate::game::{Board, Player};

use super::engine::{
    clamp_depth, is_searchable, SearchContext, SearchEngine, SearchProgress, MAX_SCORE, MIN_SCORE,
};
use super::heuristic::{ConnectFourHeuristic, Heuristic};

/// Principal variation search (NegaScout).
///
/// The first child of each node is searched with the full window; the rest
/// get a null window around `alpha` and are re-searched only when the probe
/// lands strictly inside `(alpha, beta)`.
#[derive(Clone, Default)]
pub struct Pvs {
    ctx: SearchContext,
}

impl Pvs {
    pub fn new(heuristic: Arc<dyn Heuristic>, config: &SearchConfig) -> Self {
        Pvs {
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

    fn pvs(&self, board: &mut Board, depth: u32, mut alpha: i32, beta: i32, player: Player) -> i32 {
        if depth == 0 || board.is_terminal() {
            return player.color() * self.ctx.evaluate(board, depth);
        }

        let mut first = true;
        for &col in self.ctx.move_order() {
            let Some(mut child) = board.play(col, player) else {
                continue;
            };
            let score = if first {
                first = false;
                -self.pvs(&mut child, depth - 1, -beta, -alpha, player.flip())
            } else {
                let probe = -self.pvs(&mut child, depth - 1, -alpha - 1, -alpha, player.flip());
                if alpha < probe && probe < beta {
                    -self.pvs(&mut child, depth - 1, -beta, -alpha, player.flip())
                } else {
                    probe
                }
            };
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        // fail-hard: the bound, not the best child score
        alpha
    }
}

impl SearchEngine for Pvs {
    fn name(&self) -> &str {
        "PVS"
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
            let score = -self.pvs(&mut child, depth - 1, -MAX_SCORE, -alpha, player.flip());
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
