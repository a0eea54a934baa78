//! Error types for game loading, replay, origin selection and corpus runs.

use shakmaty::Square;
use thiserror::Error;

/// Reasons a single game is dropped during replay.
///
/// None of these are fatal for a corpus: the game is logged and skipped,
/// and its trails never reach the aggregators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game has no moves")]
    EmptyGame,

    #[error("illegal move at ply {ply}: {uci}")]
    IllegalMove { ply: usize, uci: String },

    #[error("move at ply {ply} starts on {square}, which no live trail occupies")]
    UntrackedOrigin { ply: usize, square: Square },
}

/// Reasons the loader could not produce a game record.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no game found in PGN")]
    NoGame,

    #[error("parsing error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("illegal move at ply {ply}: {san}")]
    IllegalSan { ply: usize, san: String },

    #[error("invalid UCI move: {uci}")]
    InvalidUci { uci: String },
}

/// Malformed query parameters: selectors, result filters and key styles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("could not parse selector {input:?}")]
    Syntax { input: String },

    #[error("unknown result filter {0:?} (expected win, loss, draw or all)")]
    ResultFilter(String),

    #[error("unknown key style {0:?} (expected algebraic or coordinates)")]
    KeyStyle(String),
}

/// Failures of a whole corpus run or of a single-game query.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
