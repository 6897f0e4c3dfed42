use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use connect_four_search::ai::{EngineKind, SearchProgress};
use connect_four_search::config::AppConfig;
use connect_four_search::game::{Board, GameOutcome, GameState, Player};

/// Time the search engines and play them against each other.
#[derive(Parser)]
#[command(name = "c4bench", about = "Benchmark the Connect Four search engines")]
struct Cli {
    /// Search depth in plies (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    config.validate()?;
    let depth = config.search.depth;

    println!(
        "empty board, depth {depth}, {} workers for the parallel engine",
        config.parallel.worker_count()
    );
    let root = Board::new();
    for kind in EngineKind::ALL {
        let progress = Arc::new(SearchProgress::new());
        let engine = kind.build(&config, Arc::clone(&progress));

        let start = Instant::now();
        let Some(next) = engine.search(&root, depth) else {
            bail!("{} found no move on the empty board", engine.name());
        };
        let elapsed = start.elapsed();

        let column = GameState::initial(Player::Maximizing).advance_to(&next)?;
        println!(
            "{:>18}: column {} in {:>8.3}s, {:>10} leaves",
            engine.name(),
            column + 1,
            elapsed.as_secs_f64(),
            progress.nodes()
        );
    }

    println!("\nalpha-beta (X) vs negamax (O)");
    let progress = Arc::new(SearchProgress::new());
    let minimizer = EngineKind::AlphaBeta.build(&config, Arc::clone(&progress));
    let maximizer = EngineKind::Negamax.build(&config, Arc::clone(&progress));
    let mut state = GameState::initial(Player::Maximizing);
    let start = Instant::now();

    while !state.is_terminal() {
        let player = state.current_player();
        let engine = match player {
            Player::Maximizing => &maximizer,
            Player::Minimizing => &minimizer,
        };
        let Some(next) = engine.search_for(state.board(), depth, player) else {
            bail!("{} found no move on a live board", engine.name());
        };
        let column = state.advance_to(&next)?;
        log::info!("{} ({}) plays column {}", engine.name(), player.glyph(), column + 1);
    }

    println!("{}", state.board());
    match state.outcome() {
        Some(GameOutcome::Winner(player)) => println!("{} wins", player.glyph()),
        Some(GameOutcome::Draw) => println!("draw"),
        None => {}
    }
    println!("game took {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
