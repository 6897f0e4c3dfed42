//! Fail-hard minimax with alpha-beta pruning.
//!
//! The recursion is written against a leaf scorer so the parallel engine can
//! reuse it with a score table in place of the heuristic.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::game::{Board, Player, COLS};

use super::engine::{
    clamp_depth, is_searchable, SearchContext, SearchEngine, SearchProgress, MAX_DEPTH, MAX_SCORE,
    MIN_SCORE,
};
use super::heuristic::{ConnectFourHeuristic, Heuristic};

/// Classic two-sided alpha-beta engine.
#[derive(Clone, Default)]
pub struct AlphaBeta {
    ctx: SearchContext,
}

impl AlphaBeta {
    pub fn new(heuristic: Arc<dyn Heuristic>, config: &SearchConfig) -> Self {
        AlphaBeta {
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

    pub(crate) fn context(&self) -> &SearchContext {
        &self.ctx
    }

    /// Minimax value of `board` with `player` to move, searched `depth` plies
    /// with a full window.
    pub fn value(&self, board: &Board, depth: u32, player: Player) -> i32 {
        let mut cursor = *board;
        let leaf = |b: &Board, d: u32| self.ctx.evaluate(b, d);
        alpha_beta(
            &mut cursor,
            depth.min(MAX_DEPTH),
            MIN_SCORE,
            MAX_SCORE,
            player,
            self.ctx.move_order(),
            &leaf,
        )
    }
}

impl SearchEngine for AlphaBeta {
    fn name(&self) -> &str {
        "AlphaBeta"
    }

    fn search_for(&self, root: &Board, depth: u32, player: Player) -> Option<Board> {
        if !is_searchable(root) {
            return None;
        }
        self.ctx.begin();

        let leaf = |b: &Board, d: u32| self.ctx.evaluate(b, d);
        let best = search_root(root, clamp_depth(depth), player, self.ctx.move_order(), &leaf);
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

/// Try every child of `root` and keep the first one with the best score.
///
/// The window is narrowed as better moves are found, so later children may
/// return bounds; only a strict improvement replaces the current best, which
/// makes ties go to the earliest column in `order`.
pub(crate) fn search_root<L>(
    root: &Board,
    depth: u32,
    player: Player,
    order: &[usize; COLS],
    leaf: &L,
) -> Option<(Board, i32)>
where
    L: Fn(&Board, u32) -> i32,
{
    let mut cursor = *root;
    let mut alpha = MIN_SCORE;
    let mut beta = MAX_SCORE;
    let mut best: Option<(Board, i32)> = None;

    for &col in order {
        let Some(mut child) = cursor.play(col, player) else {
            continue;
        };
        let value = alpha_beta(&mut child, depth - 1, alpha, beta, player.flip(), order, leaf);

        let improves = match (best, player) {
            (None, _) => true,
            (Some((_, best_value)), Player::Maximizing) => value > best_value,
            (Some((_, best_value)), Player::Minimizing) => value < best_value,
        };
        if improves {
            best = Some((*child, value));
        }

        match player {
            Player::Maximizing => alpha = alpha.max(value),
            Player::Minimizing => beta = beta.min(value),
        }
    }

    best
}

pub(crate) fn alpha_beta<L>(
    board: &mut Board,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    player: Player,
    order: &[usize; COLS],
    leaf: &L,
) -> i32
where
    L: Fn(&Board, u32) -> i32,
{
    if depth == 0 || board.is_terminal() {
        return leaf(board, depth);
    }

    match player {
        Player::Maximizing => {
            let mut value = MIN_SCORE;
            for &col in order {
                let Some(mut child) = board.play(col, player) else {
                    continue;
                };
                value = value.max(alpha_beta(
                    &mut child,
                    depth - 1,
                    alpha,
                    beta,
                    Player::Minimizing,
                    order,
                    leaf,
                ));
                if value > beta {
                    break;
                }
                alpha = alpha.max(value);
            }
            value
        }
        Player::Minimizing => {
            let mut value = MAX_SCORE;
            for &col in order {
                let Some(mut child) = board.play(col, player) else {
                    continue;
                };
                value = value.min(alpha_beta(
                    &mut child,
                    depth - 1,
                    alpha,
                    beta,
                    Player::Maximizing,
                    order,
                    leaf,
                ));
                if value < alpha {
                    break;
                }
                beta = beta.min(value);
            }
            value
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ai::heuristic::MAX_WIN;
    use crate::game::{Cell, ROWS};

    const MAX: Player = Player::Maximizing;
    const MIN: Player = Player::Minimizing;

    /// Midgame positions (moves from an empty board, O first) with the
    /// side to move and the expected column for depths 1 through 6.
    pub(crate) const SCENARIOS: [(&[usize], Player, [usize; 6]); 3] = [
        (&[3, 3, 2, 4, 4, 5, 2, 1], MAX, [2, 2, 2, 2, 2, 2]),
        (&[3, 2, 3, 3, 4, 4, 2, 5, 1], MIN, [4, 4, 2, 2, 2, 2]),
        (&[3, 3, 3, 3, 2, 4, 4, 2, 5, 1, 1, 5], MAX, [5, 5, 2, 2, 2, 2]),
    ];

    pub(crate) fn played_column(before: &Board, after: &Board) -> usize {
        (0..COLS)
            .find(|&col| (0..ROWS).any(|row| before.get(row, col) != after.get(row, col)))
            .expect("boards differ")
    }

    /// Run every scenario through `engine` and check the chosen columns.
    pub(crate) fn check_scenarios(engine: &dyn SearchEngine) {
        for (moves, player, expected) in SCENARIOS {
            let root = Board::from_moves(moves, MAX).unwrap();
            for (depth, &col) in (1..).zip(expected.iter()) {
                let next = engine.search_for(&root, depth, player).unwrap();
                assert_eq!(
                    played_column(&root, &next),
                    col,
                    "{} on {moves:?} at depth {depth}",
                    engine.name()
                );
                assert_eq!(next.token_count(), root.token_count() + 1);
            }
        }
    }

    #[test]
    fn empty_board_opens_in_the_center() {
        let engine = AlphaBeta::default();
        let root = Board::new();
        let next = engine.search(&root, 4).unwrap();

        assert_eq!(next.token_count(), 1);
        assert_eq!(next.get(ROWS - 1, 3), Cell::Occupied(MAX));
    }

    #[test]
    fn minimizer_also_opens_in_the_center() {
        let engine = AlphaBeta::default();
        let next = engine.search_for(&Board::new(), 4, MIN).unwrap();
        assert_eq!(next.get(ROWS - 1, 3), Cell::Occupied(MIN));
    }

    #[test]
    fn takes_winning_move() {
        // O on 0,1,2 of the bottom row, X stacked on top; O to move
        let root = Board::from_moves(&[0, 0, 1, 1, 2, 2], MAX).unwrap();
        let engine = AlphaBeta::default();
        for depth in 1..=5 {
            let next = engine.search(&root, depth).unwrap();
            assert_eq!(played_column(&root, &next), 3, "depth {depth}");
            assert!(next.is_winning_for(MAX));
        }
    }

    #[test]
    fn blocks_opponent_win() {
        // X threatens the bottom row at column 3
        let root = Board::from_moves(&[6, 0, 6, 1, 5, 2], MAX).unwrap();
        let next = AlphaBeta::default().search(&root, 4).unwrap();
        assert_eq!(played_column(&root, &next), 3);
    }

    #[test]
    fn minimizer_blocks_maximizer_win() {
        let root = Board::from_moves(&[0, 6, 1, 6, 2, 5], MAX).unwrap();
        let next = AlphaBeta::default().search_for(&root, 4, MIN).unwrap();
        assert_eq!(played_column(&root, &next), 3);
        assert_eq!(next.get(ROWS - 1, 3), Cell::Occupied(MIN));
    }

    #[test]
    fn midgame_scenarios() {
        check_scenarios(&AlphaBeta::default());
    }

    #[test]
    fn full_board_has_no_move() {
        let root: Board = crate::game::board::tests::DRAWN_BOARD.parse().unwrap();
        assert!(root.is_tie());
        let engine = AlphaBeta::default();
        for depth in 0..4 {
            assert!(engine.search(&root, depth).is_none());
            assert!(engine.search_for(&root, depth, MIN).is_none());
        }
    }

    #[test]
    fn depth_zero_still_moves() {
        let next = AlphaBeta::default().search(&Board::new(), 0).unwrap();
        assert_eq!(next.token_count(), 1);
    }

    #[test]
    fn huge_depth_searches_like_full_depth() {
        let text = crate::game::board::tests::DRAWN_BOARD.replacen('X', ".", 1);
        let root: Board = text.parse().unwrap();
        let engine = AlphaBeta::default();

        let next = engine.search_for(&root, u32::MAX, MIN).unwrap();
        assert!(next.is_full());
        assert_eq!(
            engine.value(&root, u32::MAX, MIN),
            engine.value(&root, MAX_DEPTH, MIN)
        );
    }

    #[test]
    fn search_leaves_root_untouched() {
        let root = Board::from_moves(&[3, 3, 2, 4, 4, 5, 2, 1], MAX).unwrap();
        let copy = root;
        let _ = AlphaBeta::default().search(&root, 5);
        assert_eq!(root, copy);
    }

    #[test]
    fn value_of_won_position_reflects_depth() {
        let root = Board::from_moves(&[0, 0, 1, 1, 2, 2], MAX).unwrap();
        let engine = AlphaBeta::default();
        // O wins next ply, found with 2 plies still to go at depth 3
        assert_eq!(engine.value(&root, 3, MAX), MAX_WIN + 2);
    }

    #[test]
    fn respects_configured_move_order() {
        // left-to-right order: every opening scores 0 at depth 1, so column 0 wins the tie
        let config = SearchConfig {
            move_order: [0, 1, 2, 3, 4, 5, 6],
            ..SearchConfig::default()
        };
        let next = AlphaBeta::with_config(&config).search(&Board::new(), 1).unwrap();
        assert_eq!(next.get(ROWS - 1, 0), Cell::Occupied(MAX));
    }

    #[test]
    fn progress_counts_leaves() {
        let progress = Arc::new(SearchProgress::new());
        let engine = AlphaBeta::default().with_progress(Arc::clone(&progress));
        engine.search(&Board::new(), 1);
        assert_eq!(progress.nodes(), 7);
        engine.search(&Board::new(), 2);
        assert!(progress.nodes() > 7);
        assert!(progress.nodes() <= 49);
    }

    #[test]
    fn name_is_alpha_beta() {
        assert_eq!(AlphaBeta::default().name(), "AlphaBeta");
    }
}
