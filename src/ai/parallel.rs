//! Root-split parallel alpha-beta.
//!
//! The root is expanded breadth-first into a layer of seed boards, the seeds
//! are scored on scoped worker threads with the serial engine, and a shallow
//! alpha-beta over the seed plies picks the move using the scored table as
//! its leaves.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::{mpsc, Arc};
use std::thread;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::{AppConfig, ParallelConfig, SearchConfig};
use crate::error::SearchError;
use crate::game::{Board, Player};

use super::alpha_beta::{search_root, AlphaBeta};
use super::engine::{clamp_depth, is_searchable, SearchEngine, SearchProgress};
use super::heuristic::{ConnectFourHeuristic, Heuristic};

/// Boards reached from a root after `depth` plies, duplicates removed.
#[derive(Debug, Clone)]
pub struct SeedLayer {
    pub boards: Vec<Board>,
    pub depth: u32,
}

/// Expand `root` breadth-first for up to `seed_depth` plies, `player` moving
/// first.
///
/// Stops early when a ply produces no boards (every frontier board is full);
/// `depth` then records how far the expansion got.
pub fn seed_layer(root: &Board, seed_depth: u32, player: Player) -> SeedLayer {
    let mut boards = vec![*root];
    let mut depth = 0;

    while depth < seed_depth {
        let mover = player.after_plies(depth);
        let mut seen = HashSet::new();
        let next: Vec<Board> = boards
            .iter()
            .flat_map(|board| board.expand(mover))
            .filter(|child| seen.insert(*child))
            .collect();
        if next.is_empty() {
            break;
        }
        boards = next;
        depth += 1;
    }

    SeedLayer { boards, depth }
}

/// Split `len` items into `buckets` contiguous ranges; the first
/// `len % buckets` ranges get one extra item.
pub fn partition(len: usize, buckets: usize) -> Vec<Range<usize>> {
    let buckets = buckets.max(1);
    let base = len / buckets;
    let extra = len % buckets;

    let mut start = 0;
    (0..buckets)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

/// Alpha-beta that scores the seed layer on worker threads.
#[derive(Clone, Default)]
pub struct ParallelAlphaBeta {
    serial: AlphaBeta,
    config: ParallelConfig,
}

impl ParallelAlphaBeta {
    pub fn new(heuristic: Arc<dyn Heuristic>, search: &SearchConfig, parallel: &ParallelConfig) -> Self {
        ParallelAlphaBeta {
            serial: AlphaBeta::new(heuristic, search),
            config: parallel.clone(),
        }
    }

    pub fn with_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(ConnectFourHeuristic), &config.search, &config.parallel)
    }

    pub fn with_progress(mut self, progress: Arc<SearchProgress>) -> Self {
        self.serial = self.serial.with_progress(progress);
        self
    }

    pub fn config(&self) -> &ParallelConfig {
        &self.config
    }

    /// Like [`SearchEngine::search_for`], but reports worker failures instead
    /// of falling back to the serial engine.
    pub fn try_search_for(
        &self,
        root: &Board,
        depth: u32,
        player: Player,
    ) -> Result<Option<Board>, SearchError> {
        if !is_searchable(root) {
            return Ok(None);
        }

        let depth = clamp_depth(depth);
        if depth < self.config.min_seed_depth {
            log::debug!("depth {depth} below min seed depth, searching serially");
            return Ok(self.serial.search_for(root, depth, player));
        }

        let wanted = self.config.seed_depth.min(depth);
        let layer = seed_layer(root, wanted, player);
        if layer.depth < wanted && layer.depth <= self.config.min_seed_depth {
            log::debug!(
                "board fills up after {} plies, searching serially",
                layer.depth
            );
            return Ok(self.serial.search_for(root, layer.depth, player));
        }

        let ctx = self.serial.context();
        ctx.begin();

        let leaf_depth = depth - layer.depth;
        let leaf_player = player.after_plies(layer.depth);
        let mut seeds = layer.boards;
        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        seeds.shuffle(&mut rng);

        log::debug!(
            "{} seeds at ply {}, scoring {} plies deeper",
            seeds.len(),
            layer.depth,
            leaf_depth
        );
        let scores = self.distribute(&seeds, leaf_depth, leaf_player)?;

        let leaf = |board: &Board, d: u32| {
            if d > 0 {
                return ctx.evaluate(board, d + leaf_depth);
            }
            match scores.get(board) {
                Some(&score) => score,
                None => unreachable!("seed layer covers every board at ply {}", layer.depth),
            }
        };
        let best = search_root(root, layer.depth, player, ctx.move_order(), &leaf);
        log::debug!(
            "{}: depth {} for {:?} -> {:?}",
            self.name(),
            depth,
            player,
            best.map(|(_, score)| score)
        );
        Ok(best.map(|(board, _)| board))
    }

    /// Score every seed with a `depth`-ply search, `player` to move, spread
    /// over the configured number of workers.
    pub(crate) fn distribute(
        &self,
        seeds: &[Board],
        depth: u32,
        player: Player,
    ) -> Result<HashMap<Board, i32>, SearchError> {
        let workers = self.config.worker_count().min(seeds.len()).max(1);
        let serial = &self.serial;
        let (tx, rx) = mpsc::channel();

        let joined: Vec<bool> = thread::scope(|scope| {
            let handles: Vec<_> = partition(seeds.len(), workers)
                .into_iter()
                .enumerate()
                .map(|(worker, range)| {
                    let tx = tx.clone();
                    let bucket = &seeds[range];
                    scope.spawn(move || {
                        let mut scores = HashMap::with_capacity(bucket.len());
                        for seed in bucket {
                            scores.insert(*seed, serial.value(seed, depth, player));
                        }
                        log::trace!("worker {worker} scored {} seeds", scores.len());
                        // rx outlives the scope
                        let _ = tx.send((worker, scores));
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().is_ok()).collect()
        });
        drop(tx);

        if let Some(worker) = joined.iter().position(|ok| !ok) {
            return Err(SearchError::WorkerPanicked { worker });
        }

        let mut merged = HashMap::with_capacity(seeds.len());
        for (_, scores) in rx {
            for (board, score) in scores {
                if merged.insert(board, score).is_some() {
                    return Err(SearchError::DuplicateSeed);
                }
            }
        }
        if merged.len() != seeds.len() {
            return Err(SearchError::IncompleteScores {
                expected: seeds.len(),
                actual: merged.len(),
            });
        }
        Ok(merged)
    }
}

impl SearchEngine for ParallelAlphaBeta {
    fn name(&self) -> &str {
        "ParallelAlphaBeta"
    }

    fn search_for(&self, root: &Board, depth: u32, player: Player) -> Option<Board> {
        match self.try_search_for(root, depth, player) {
            Ok(best) => best,
            Err(e) => {
                log::warn!("parallel search failed ({e}), retrying serially");
                self.serial.search_for(root, depth, player)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::alpha_beta::tests::{check_scenarios, played_column};
    use crate::game::{Cell, GameState, COLS, ROWS};

    const MAX: Player = Player::Maximizing;
    const MIN: Player = Player::Minimizing;

    fn engine(workers: usize, seed_depth: u32) -> ParallelAlphaBeta {
        let parallel = ParallelConfig {
            seed_depth,
            workers: Some(workers),
            shuffle_seed: Some(7),
            ..ParallelConfig::default()
        };
        ParallelAlphaBeta::new(Arc::new(ConnectFourHeuristic), &SearchConfig::default(), &parallel)
    }

    /// Panics on any board with more than two tokens.
    struct ExplodingHeuristic;

    impl Heuristic for ExplodingHeuristic {
        fn evaluate(&self, board: &Board, depth: u32) -> i32 {
            assert!(board.token_count() <= 2, "boom");
            ConnectFourHeuristic.evaluate(board, depth)
        }
    }

    /// Panics only off the calling thread, so the serial fallback succeeds.
    struct WorkerOnlyPanic;

    impl Heuristic for WorkerOnlyPanic {
        fn evaluate(&self, board: &Board, depth: u32) -> i32 {
            assert!(thread::current().name().is_some(), "worker boom");
            ConnectFourHeuristic.evaluate(board, depth)
        }
    }

    fn one_hole_board() -> Board {
        let text = crate::game::board::tests::DRAWN_BOARD.replacen('X', ".", 1);
        text.parse().unwrap()
    }

    /// The drawn board with columns 0, 2 and 4 each missing their top token.
    fn three_hole_board() -> Board {
        let text = crate::game::board::tests::DRAWN_BOARD.replacen('X', ".", 3);
        text.parse().unwrap()
    }

    #[test]
    fn seed_layer_sizes_from_empty_board() {
        let root = Board::new();
        assert_eq!(seed_layer(&root, 1, MAX).boards.len(), 7);
        assert_eq!(seed_layer(&root, 2, MAX).boards.len(), 49);
        // 343 move sequences, 238 distinct positions
        let layer = seed_layer(&root, 3, MAX);
        assert_eq!(layer.depth, 3);
        assert_eq!(layer.boards.len(), 238);
        let distinct: HashSet<Board> = layer.boards.iter().copied().collect();
        assert_eq!(distinct.len(), layer.boards.len());
    }

    #[test]
    fn seed_layer_alternates_movers() {
        let layer = seed_layer(&Board::new(), 2, MIN);
        for board in &layer.boards {
            let bottom: Vec<Cell> = (0..COLS).map(|col| board.get(ROWS - 1, col)).collect();
            let owners: Vec<Cell> = bottom.into_iter().filter(|c| *c != Cell::Empty).collect();
            // two tokens side by side, or stacked in one column
            match owners.as_slice() {
                [a, b] => assert_ne!(a, b),
                [only] => assert_eq!(*only, Cell::Occupied(MIN)),
                other => panic!("unexpected bottom row {other:?}"),
            }
            assert_eq!(board.token_count(), 2);
        }
    }

    #[test]
    fn seed_layer_stops_when_board_fills() {
        let root = one_hole_board();
        let layer = seed_layer(&root, 3, MAX);
        assert_eq!(layer.depth, 1);
        assert_eq!(layer.boards.len(), 1);
        assert!(layer.boards[0].is_full());
    }

    #[test]
    fn partition_spreads_remainder_to_first_buckets() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(49, 7).iter().map(|r| r.len()).sum::<usize>(), 49);
        assert_eq!(partition(3, 1), vec![0..3]);
        assert_eq!(partition(2, 4), vec![0..1, 1..2, 2..2, 2..2]);
    }

    #[test]
    fn distribute_scores_each_seed_once() {
        let engine = engine(3, 2);
        let seeds = seed_layer(&Board::new(), 2, MAX).boards;
        let scores = engine.distribute(&seeds, 2, MAX).unwrap();

        assert_eq!(scores.len(), seeds.len());
        let serial = AlphaBeta::default();
        for seed in &seeds {
            assert_eq!(scores[seed], serial.value(seed, 2, MAX));
        }
    }

    #[test]
    fn agrees_with_serial_on_scenarios() {
        check_scenarios(&engine(3, 2));
        check_scenarios(&engine(4, 3));
    }

    #[test]
    fn agrees_with_serial_through_a_game() {
        let parallel = engine(4, 2);
        let serial = AlphaBeta::default();
        let mut state = GameState::initial(MAX);

        while !state.is_terminal() {
            let player = state.current_player();
            let ours = parallel.search_for(state.board(), 4, player).unwrap();
            let theirs = serial.search_for(state.board(), 4, player).unwrap();
            assert_eq!(ours, theirs, "diverged at\n{}", state.board());
            state.advance_to(&ours).unwrap();
        }
    }

    #[test]
    fn result_does_not_depend_on_worker_count() {
        let root = Board::from_moves(&[3, 3, 2, 4, 4, 5, 2, 1], MAX).unwrap();
        let expected = engine(1, 2).search(&root, 5).unwrap();
        for workers in [2, 5, 64] {
            assert_eq!(engine(workers, 2).search(&root, 5), Some(expected));
        }
    }

    #[test]
    fn takes_winning_move() {
        let root = Board::from_moves(&[0, 0, 1, 1, 2, 2], MAX).unwrap();
        let next = engine(2, 2).search(&root, 4).unwrap();
        assert_eq!(played_column(&root, &next), 3);
    }

    #[test]
    fn shallow_search_delegates_to_serial() {
        let next = engine(2, 2).search(&Board::new(), 1).unwrap();
        assert_eq!(next.get(ROWS - 1, 3), Cell::Occupied(MAX));
    }

    #[test]
    fn seed_depth_above_search_depth_is_capped() {
        let next = engine(2, 5).search(&Board::new(), 2).unwrap();
        let serial = AlphaBeta::default().search(&Board::new(), 2).unwrap();
        assert_eq!(next, serial);
    }

    #[test]
    fn nearly_full_board_fills_the_last_hole() {
        let root = one_hole_board();
        let next = engine(2, 3).search_for(&root, 4, MIN).unwrap();
        assert!(next.is_full());
        assert_eq!(next.get(0, 0), Cell::Occupied(MIN));
    }

    #[test]
    fn short_layer_above_min_seed_depth_still_runs_workers() {
        let root = three_hole_board();
        let engine = engine(2, 5);
        for player in [MAX, MIN] {
            // five plies wanted, the board fills after three
            assert_eq!(seed_layer(&root, 5, player).depth, 3);
            let serial = AlphaBeta::default().search_for(&root, 6, player);
            assert!(serial.is_some());
            assert_eq!(engine.try_search_for(&root, 6, player), Ok(serial));
        }
    }

    #[test]
    fn full_board_has_no_move() {
        let root: Board = crate::game::board::tests::DRAWN_BOARD.parse().unwrap();
        assert_eq!(engine(2, 2).try_search_for(&root, 4, MAX), Ok(None));
    }

    #[test]
    fn worker_panic_is_reported() {
        let parallel = ParallelConfig {
            workers: Some(2),
            shuffle_seed: Some(1),
            ..ParallelConfig::default()
        };
        let engine = ParallelAlphaBeta::new(
            Arc::new(ExplodingHeuristic),
            &SearchConfig::default(),
            &parallel,
        );
        let result = engine.try_search_for(&Board::new(), 3, MAX);
        assert!(matches!(result, Err(SearchError::WorkerPanicked { .. })));
    }

    #[test]
    fn worker_panic_falls_back_to_serial() {
        let parallel = ParallelConfig {
            workers: Some(2),
            ..ParallelConfig::default()
        };
        let engine = ParallelAlphaBeta::new(
            Arc::new(WorkerOnlyPanic),
            &SearchConfig::default(),
            &parallel,
        );
        assert!(engine.try_search_for(&Board::new(), 3, MAX).is_err());
        let next = engine.search(&Board::new(), 3).unwrap();
        assert_eq!(next.get(ROWS - 1, 3), Cell::Occupied(MAX));
    }

    #[test]
    fn progress_counts_worker_leaves() {
        let progress = Arc::new(SearchProgress::new());
        let engine = engine(3, 2).with_progress(Arc::clone(&progress));
        engine.search(&Board::new(), 3);
        // at least one leaf per seed
        assert!(progress.nodes() >= 49);
    }

    #[test]
    fn name_is_parallel_alpha_beta() {
        assert_eq!(ParallelAlphaBeta::default().name(), "ParallelAlphaBeta");
    }
}
