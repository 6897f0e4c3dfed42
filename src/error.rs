use std::path::PathBuf;

/// Errors from parsing a board out of its text rendering.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardParseError {
    #[error("expected 6 grid rows, found {found}")]
    RowCount { found: usize },

    #[error("row {row} is not of the form |c|c|c|c|c|c|c|")]
    RowShape { row: usize },

    #[error("unknown cell glyph {glyph:?} in row {row}")]
    UnknownGlyph { glyph: char, row: usize },

    #[error("unexpected line {0:?}")]
    UnexpectedLine(String),

    #[error("column {column} has a token above an empty cell")]
    FloatingToken { column: usize },
}

/// Errors from playing a move through a [`crate::game::GameState`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("column {0} does not exist")]
    InvalidColumn(usize),

    #[error("the game is already over")]
    GameOver,

    #[error("board is not one ply away from the current position")]
    NotASinglePly,
}

/// Errors that can occur while running the parallel search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("merged score map has {actual} entries, expected {expected}")]
    IncompleteScores { expected: usize, actual: usize },

    #[error("seed board scored by more than one worker")]
    DuplicateSeed,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
