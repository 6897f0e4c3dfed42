use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use connect_four_search::ai::{EngineKind, SearchEngine, SearchProgress};
use connect_four_search::config::AppConfig;
use connect_four_search::game::{Board, GameOutcome, GameState, Player};

/// Play Connect Four against a search engine.
#[derive(Parser)]
#[command(name = "connect4", about = "Play Connect Four against an alpha-beta engine")]
struct Cli {
    /// Engine: alpha-beta, negamax, pvs or parallel
    #[arg(long, default_value = "alpha-beta")]
    engine: String,

    /// Search depth in plies (overrides the config file)
    #[arg(long)]
    depth: Option<u32>,

    /// Path to TOML configuration file
    #[arg(long, default_value = "connect4.toml")]
    config: PathBuf,

    /// Let the human (X) move first
    #[arg(long)]
    human_first: bool,

    /// Instead of playing, print the engine's move for the board in this file
    #[arg(long)]
    board: Option<PathBuf>,

    /// Side to move for --board: o or x
    #[arg(long, default_value = "o")]
    side: String,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", AppConfig::default_toml());
        return Ok(());
    }

    let kind: EngineKind = cli.engine.parse().map_err(anyhow::Error::msg)?;

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(depth) = cli.depth {
        config.search.depth = depth;
    }
    config.validate()?;

    let progress = Arc::new(SearchProgress::new());
    let engine = kind.build(&config, Arc::clone(&progress));
    log::info!("{} at depth {}", engine.name(), config.search.depth);

    match &cli.board {
        Some(path) => {
            let player = match cli.side.to_ascii_lowercase().as_str() {
                "o" => Player::Maximizing,
                "x" => Player::Minimizing,
                other => bail!("unknown side '{}' (expected 'o' or 'x')", other),
            };
            analyze(engine.as_ref(), path, player, config.search.depth)
        }
        None => play(engine.as_ref(), &progress, config.search.depth, cli.human_first),
    }
}

fn analyze(engine: &dyn SearchEngine, path: &Path, player: Player, depth: u32) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading board from {}", path.display()))?;
    let board: Board = text
        .parse()
        .with_context(|| format!("parsing board in {}", path.display()))?;
    if board.is_terminal() {
        println!("{board}");
        println!("the game on this board is already over");
        return Ok(());
    }

    match engine.search_for(&board, depth, player) {
        Some(next) => {
            let mut state = GameState::from_board(board, player);
            let column = state.advance_to(&next)?;
            println!("{} plays column {}", player.glyph(), column + 1);
            println!("{next}");
        }
        None => println!("no move: the board is full or malformed"),
    }
    Ok(())
}

fn play(engine: &dyn SearchEngine, progress: &SearchProgress, depth: u32, human_first: bool) -> Result<()> {
    let human = Player::Minimizing;
    let first = if human_first { human } else { human.flip() };
    let mut state = GameState::initial(first);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("You are {}. Enter a column 1-7, or q to quit.", human.glyph());
    while !state.is_terminal() {
        println!("\n{}", state.board());

        if state.current_player() == human {
            print!("{}> ", human.glyph());
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                return Ok(());
            };
            let line = line?;
            let input = line.trim();
            if input == "q" || input == "quit" {
                return Ok(());
            }
            let column = match input.parse::<usize>() {
                Ok(n) if (1..=7).contains(&n) => n - 1,
                _ => {
                    println!("enter a column number from 1 to 7");
                    continue;
                }
            };
            if let Err(e) = state.apply_move_mut(column) {
                println!("{e}");
            }
        } else {
            let start = Instant::now();
            let Some(next) = engine.search_for(state.board(), depth, state.current_player()) else {
                bail!("{} found no move on a live board", engine.name());
            };
            let column = state.advance_to(&next)?;
            println!(
                "{} plays column {} ({} leaves, {:.2}s)",
                engine.name(),
                column + 1,
                progress.nodes(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    println!("\n{}", state.board());
    match state.outcome() {
        Some(GameOutcome::Winner(player)) => {
            let who = if player == human { "You win" } else { "Engine wins" };
            match state.board().longest_winning_run() {
                Some(run) => {
                    let cells: Vec<String> = run
                        .iter()
                        .map(|(col, row)| format!("({}, {})", col + 1, row + 1))
                        .collect();
                    println!("{who}: {}", cells.join(" "));
                }
                None => println!("{who}"),
            }
        }
        Some(GameOutcome::Draw) => println!("Draw"),
        None => {}
    }
    Ok(())
}
