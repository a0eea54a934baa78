use crate::counts::{CorpusTotals, KeyStyle};
use crate::selector::OriginFilter;
use pyo3::prelude::*;
use shakmaty::{Color, Piece, Role};
use std::collections::HashMap;

/// Aggregated heatmap counts over a corpus of games.
///
/// Attributes:
///     occupancy: dict mapping square keys to visit counts.
///     threatened: dict mapping square keys to how often a tracked piece
///         standing there was attacked.
///     threatening: dict mapping square keys to how often an opposing piece
///         standing there was attacked while a tracked piece moved.
///     games: number of games that contributed at least one visit.
///     skipped: number of games dropped by load or replay errors.
///     tracking: label of the tracked piece, e.g. "knight / white".
#[pyclass]
pub struct HeatmapTotals {
    pub totals: CorpusTotals,
    pub key_style: KeyStyle,
    pub tracking: Option<String>,
}

impl HeatmapTotals {
    pub fn new(totals: CorpusTotals, key_style: KeyStyle, filter: &OriginFilter) -> Self {
        HeatmapTotals {
            totals,
            key_style,
            tracking: filter.tracked_piece().map(piece_label),
        }
    }
}

#[pymethods]
impl HeatmapTotals {
    #[getter]
    fn occupancy(&self) -> HashMap<String, u64> {
        self.totals.occupancy.to_keyed(self.key_style)
    }

    #[getter]
    fn threatened(&self) -> HashMap<String, u64> {
        self.totals.threatened.to_keyed(self.key_style)
    }

    #[getter]
    fn threatening(&self) -> HashMap<String, u64> {
        self.totals.threatening.to_keyed(self.key_style)
    }

    #[getter]
    fn games(&self) -> u64 {
        self.totals.games
    }

    #[getter]
    fn skipped(&self) -> u64 {
        self.totals.skipped
    }

    #[getter]
    fn tracking(&self) -> Option<String> {
        self.tracking.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "<HeatmapTotals: {} games, {} skipped, {} visits, tracking {}>",
            self.totals.games,
            self.totals.skipped,
            self.totals.occupancy.total(),
            self.tracking.as_deref().unwrap_or("nothing")
        )
    }
}

fn piece_label(piece: Piece) -> String {
    let role = match piece.role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    };
    let color = match piece.color {
        Color::White => "white",
        Color::Black => "black",
    };
    format!("{} / {}", role, color)
}
