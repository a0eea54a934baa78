use pyo3::prelude::*;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use shakmaty::{Move, Square};
use tracing::{debug, info, warn};

mod counts;
mod error;
mod oracle;
mod python_bindings;
mod record;
mod selector;
mod threats;
mod trails;
mod visitor;

pub use counts::{occupancy, CorpusTotals, GameCounts, KeyStyle, SquareCounts};
pub use error::{AnalysisError, GameError, LoadError, QueryError};
pub use oracle::BoardOracle;
pub use python_bindings::HeatmapTotals;
pub use record::{uci_string, GameRecord};
pub use selector::{parse_selector, OriginFilter};
pub use threats::ThreatCounts;
pub use trails::{replay, replay_moves, GameReplay, Trail, TrailState, Visit};
pub use visitor::{load_game, GameFilter, GameLoader, ResultFilter};

/// Settings for a corpus run.
#[derive(Clone, Debug, Default)]
pub struct AnalysisConfig {
    /// How exported maps name their squares.
    pub key_style: KeyStyle,
    /// Worker threads; all cores when unset.
    pub num_threads: Option<usize>,
    /// Tag-level selection of which games to analyze.
    pub game_filter: GameFilter,
}

// --- Native Rust versions (no PyResult) ---

/// Replay one game and count occupancy and threats for the selected trails.
pub fn analyze_game(record: &GameRecord, filter: &OriginFilter) -> Result<GameCounts, GameError> {
    analyze_moves(record.initial.clone(), &record.moves, filter)
}

/// Like [`analyze_game`], against any board oracle.
pub fn analyze_moves<O: BoardOracle>(
    initial: O,
    moves: &[Move],
    filter: &OriginFilter,
) -> Result<GameCounts, GameError> {
    let replay = trails::replay_moves(initial, moves)?;
    let threat = threats::analyze(&replay, filter);
    Ok(GameCounts {
        occupancy: counts::occupancy(&replay.trails, filter),
        threatened: threat.threatened,
        threatening: threat.threatening,
    })
}

fn fold_record(totals: CorpusTotals, record: &GameRecord, filter: &OriginFilter) -> CorpusTotals {
    fold_counts(totals, analyze_game(record, filter))
}

fn fold_counts(mut totals: CorpusTotals, game: Result<GameCounts, GameError>) -> CorpusTotals {
    match game {
        Ok(game) => totals.record(&game),
        Err(err) => {
            warn!(error = %err, "skipping game");
            totals.record_skipped();
        }
    }
    totals
}

fn fold_pgn(
    mut totals: CorpusTotals,
    pgn: &str,
    filter: &OriginFilter,
    game_filter: &GameFilter,
) -> CorpusTotals {
    match load_game(pgn, game_filter) {
        Ok(Some(record)) => fold_record(totals, &record, filter),
        Ok(None) => {
            debug!("game rejected by filter");
            totals
        }
        Err(err) => {
            warn!(error = %err, "skipping unreadable game");
            totals.record_skipped();
            totals
        }
    }
}

fn thread_pool(num_threads: Option<usize>) -> Result<ThreadPool, AnalysisError> {
    let num_threads = num_threads.unwrap_or_else(num_cpus::get);
    Ok(ThreadPoolBuilder::new().num_threads(num_threads).build()?)
}

fn log_summary(totals: &CorpusTotals) {
    info!(
        games = totals.games,
        skipped = totals.skipped,
        visits = totals.occupancy.total(),
        "corpus analyzed"
    );
}

/// Aggregate already-loaded games in parallel.
///
/// Each worker folds games into its own totals; the partial totals are then
/// merged pairwise, so no lock is held while games are replayed.
pub fn analyze_records(
    records: &[GameRecord],
    filter: &OriginFilter,
    num_threads: Option<usize>,
) -> Result<CorpusTotals, AnalysisError> {
    let pool = thread_pool(num_threads)?;
    let totals = pool.install(|| {
        records
            .par_iter()
            .fold_with(CorpusTotals::default(), |totals, record| {
                fold_record(totals, record, filter)
            })
            .reduce(CorpusTotals::default, CorpusTotals::merged)
    });
    log_summary(&totals);
    Ok(totals)
}

/// Load and aggregate one PGN string per game in parallel.
///
/// Unreadable games are counted as skipped; games rejected by the config's
/// game filter are ignored.
pub fn analyze_pgns<S: AsRef<str> + Sync>(
    pgns: &[S],
    filter: &OriginFilter,
    config: &AnalysisConfig,
) -> Result<CorpusTotals, AnalysisError> {
    let pool = thread_pool(config.num_threads)?;
    let totals = pool.install(|| {
        pgns.par_iter()
            .fold_with(CorpusTotals::default(), |totals, pgn| {
                fold_pgn(totals, pgn.as_ref(), filter, &config.game_filter)
            })
            .reduce(CorpusTotals::default, CorpusTotals::merged)
    });
    log_summary(&totals);
    Ok(totals)
}

/// The squares visited by the piece that started on `origin`, or `None` if
/// that square was empty at the start.
pub fn trail_squares(pgn: &str, origin: Square) -> Result<Option<Vec<Square>>, AnalysisError> {
    let Some(record) = load_game(pgn, &GameFilter::default())? else {
        return Ok(None);
    };
    let replay = trails::replay(&record)?;
    Ok(replay.trail(origin).map(|t| t.squares().collect()))
}

// --- Python-facing wrappers (PyResult) ---

fn value_error<E: std::fmt::Display>(err: E) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(err.to_string())
}

/// Aggregate piece heatmaps over a list of PGN games, one game per string.
#[pyfunction]
#[pyo3(signature = (pgns, selector, num_threads=None, key_style="algebraic", player=None, result="all"))]
fn analyze_games(
    py: Python<'_>,
    pgns: Vec<String>,
    selector: &str,
    num_threads: Option<usize>,
    key_style: &str,
    player: Option<&str>,
    result: &str,
) -> PyResult<HeatmapTotals> {
    let filter = parse_selector(selector).map_err(value_error)?;
    let config = AnalysisConfig {
        key_style: key_style.parse().map_err(value_error)?,
        num_threads,
        game_filter: GameFilter::new(player, result.parse().map_err(value_error)?),
    };
    let totals = py
        .allow_threads(|| analyze_pgns(&pgns, &filter, &config))
        .map_err(value_error)?;
    Ok(HeatmapTotals::new(totals, config.key_style, &filter))
}

/// The squares visited by the piece starting on `origin` in a single game.
#[pyfunction]
fn trail_for(pgn: &str, origin: &str) -> PyResult<Option<Vec<String>>> {
    let origin: Square = origin.trim().parse().map_err(value_error)?;
    let squares = trail_squares(pgn, origin).map_err(value_error)?;
    Ok(squares.map(|squares| squares.iter().map(|sq| sq.to_string()).collect()))
}

/// Piece trails and square heatmaps from chess games
#[pymodule]
fn piece_heatmap(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze_games, m)?)?;
    m.add_function(wrap_pyfunction!(trail_for, m)?)?;
    m.add_class::<HeatmapTotals>()?;
    Ok(())
}
