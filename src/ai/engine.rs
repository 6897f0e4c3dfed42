use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::SearchConfig;
use crate::game::{Board, Player, COLS, ROWS};

use super::heuristic::{ConnectFourHeuristic, Heuristic};

/// Upper bound of every search window.
pub const MAX_SCORE: i32 = 1_000_000_000;
/// Lower bound of every search window.
pub const MIN_SCORE: i32 = -1_000_000_000;
/// Deepest useful search: every line ends once all cells are filled.
pub const MAX_DEPTH: u32 = (ROWS * COLS) as u32;

/// Common interface of the search engines.
///
/// Engines never modify `root`; they return a fresh board with exactly one
/// more token, or `None` when `root` has no legal move or is malformed.
pub trait SearchEngine: Send + Sync {
    /// Return the engine's display name.
    fn name(&self) -> &str;

    /// Pick a move for `player` looking `depth` plies ahead.
    fn search_for(&self, root: &Board, depth: u32, player: Player) -> Option<Board>;

    /// Pick a move for the maximizer.
    fn search(&self, root: &Board, depth: u32) -> Option<Board> {
        self.search_for(root, depth, Player::Maximizing)
    }
}

/// Counts evaluated leaves so a front end can show progress.
#[derive(Debug, Default)]
pub struct SearchProgress {
    nodes: AtomicU64,
}

impl SearchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.nodes.store(0, Ordering::Relaxed);
    }

    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    /// Rough completion estimate in `[0, 1]` for a search of `depth` plies.
    ///
    /// Pruning keeps the real leaf count far below `7^depth`, so the ratio is
    /// scaled up by 20 and capped.
    pub fn fraction(&self, depth: u32) -> f64 {
        let worst_case = (COLS as f64).powi(depth.min(MAX_DEPTH) as i32);
        (20.0 * self.nodes() as f64 / worst_case).min(1.0)
    }
}

/// What every engine needs: the evaluator, the column order and an optional
/// progress counter.
#[derive(Clone)]
pub struct SearchContext {
    heuristic: Arc<dyn Heuristic>,
    move_order: [usize; COLS],
    progress: Option<Arc<SearchProgress>>,
}

impl SearchContext {
    pub fn new(heuristic: Arc<dyn Heuristic>, config: &SearchConfig) -> Self {
        SearchContext {
            heuristic,
            move_order: config.move_order,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<SearchProgress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn move_order(&self) -> &[usize; COLS] {
        &self.move_order
    }

    pub fn heuristic(&self) -> &Arc<dyn Heuristic> {
        &self.heuristic
    }

    /// Evaluate a leaf and count it.
    pub fn evaluate(&self, board: &Board, depth: u32) -> i32 {
        if let Some(progress) = &self.progress {
            progress.hit();
        }
        self.heuristic.evaluate(board, depth)
    }

    /// Reset per-search state before a top-level call.
    pub(crate) fn begin(&self) {
        if let Some(progress) = &self.progress {
            progress.clear();
        }
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        SearchContext::new(Arc::new(ConnectFourHeuristic), &SearchConfig::default())
    }
}

/// Requested depth as searched: at least one ply, at most [`MAX_DEPTH`].
pub(crate) fn clamp_depth(depth: u32) -> u32 {
    depth.clamp(1, MAX_DEPTH)
}

/// A root worth searching: gravity holds and at least one column is open.
pub(crate) fn is_searchable(root: &Board) -> bool {
    root.is_well_formed() && !root.is_full()
}
