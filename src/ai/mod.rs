mod alpha_beta;
mod engine;
pub mod heuristic;
mod negamax;
pub mod parallel;
mod pvs;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::AppConfig;

pub use alpha_beta::AlphaBeta;
pub use engine::{SearchContext, SearchEngine, SearchProgress, MAX_DEPTH, MAX_SCORE, MIN_SCORE};
pub use heuristic::{ConnectFourHeuristic, Heuristic, MAX_WIN, MIN_WIN};
pub use negamax::Negamax;
pub use parallel::ParallelAlphaBeta;
pub use pvs::Pvs;

/// Engine selector used by the binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    AlphaBeta,
    Negamax,
    Pvs,
    Parallel,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::AlphaBeta,
        EngineKind::Negamax,
        EngineKind::Pvs,
        EngineKind::Parallel,
    ];

    /// Build the engine with the default heuristic and `config`, reporting
    /// leaf counts to `progress`.
    pub fn build(self, config: &AppConfig, progress: Arc<SearchProgress>) -> Box<dyn SearchEngine> {
        let heuristic: Arc<dyn Heuristic> = Arc::new(ConnectFourHeuristic);
        match self {
            EngineKind::AlphaBeta => {
                Box::new(AlphaBeta::new(heuristic, &config.search).with_progress(progress))
            }
            EngineKind::Negamax => {
                Box::new(Negamax::new(heuristic, &config.search).with_progress(progress))
            }
            EngineKind::Pvs => Box::new(Pvs::new(heuristic, &config.search).with_progress(progress)),
            EngineKind::Parallel => Box::new(
                ParallelAlphaBeta::new(heuristic, &config.search, &config.parallel)
                    .with_progress(progress),
            ),
        }
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alpha-beta" | "alphabeta" | "ab" => Ok(EngineKind::AlphaBeta),
            "negamax" => Ok(EngineKind::Negamax),
            "pvs" => Ok(EngineKind::Pvs),
            "parallel" => Ok(EngineKind::Parallel),
            other => Err(format!(
                "unknown engine '{other}' (expected 'alpha-beta', 'negamax', 'pvs', or 'parallel')"
            )),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineKind::AlphaBeta => "alpha-beta",
            EngineKind::Negamax => "negamax",
            EngineKind::Pvs => "pvs",
            EngineKind::Parallel => "parallel",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Board;

    #[test]
    fn engine_kind_parses_names() {
        assert_eq!("alpha-beta".parse::<EngineKind>(), Ok(EngineKind::AlphaBeta));
        assert_eq!("alphabeta".parse::<EngineKind>(), Ok(EngineKind::AlphaBeta));
        assert_eq!("AB".parse::<EngineKind>(), Ok(EngineKind::AlphaBeta));
        assert_eq!("Negamax".parse::<EngineKind>(), Ok(EngineKind::Negamax));
        assert_eq!("pvs".parse::<EngineKind>(), Ok(EngineKind::Pvs));
        assert_eq!("parallel".parse::<EngineKind>(), Ok(EngineKind::Parallel));
        assert!("mcts".parse::<EngineKind>().is_err());
    }

    #[test]
    fn engine_kind_display_parses_back() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
    }

    #[test]
    fn built_engines_have_their_names() {
        let config = AppConfig::default();
        let names: Vec<String> = EngineKind::ALL
            .iter()
            .map(|kind| kind.build(&config, Arc::default()).name().to_string())
            .collect();
        assert_eq!(names, ["AlphaBeta", "Negamax", "PVS", "ParallelAlphaBeta"]);
    }

    #[test]
    fn built_engines_report_progress() {
        let config = AppConfig::default();
        for kind in EngineKind::ALL {
            let progress = Arc::new(SearchProgress::new());
            let engine = kind.build(&config, Arc::clone(&progress));
            engine.search(&Board::new(), 3);
            assert!(progress.nodes() > 0, "{kind} counted no leaves");
        }
    }
}
