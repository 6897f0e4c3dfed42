//! # Connect Four Search
//!
//! Game-tree search for Connect Four: a 6x7 board with make/unmake moves, a
//! static evaluator, three serial alpha-beta variants and a multi-threaded
//! root-split alpha-beta.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, player, game state
//! - [`ai`] — Heuristic, search engines (alpha-beta, negamax, PVS, parallel)
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
