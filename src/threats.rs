//! Threat analyzer.
//!
//! Every square entered by a selected trail is classified against the board
//! as it stood right after the move that entered it:
//! - *threatened-at*: the square is counted once per opposing piece that
//!   attacks it;
//! - *threatening*: every opponent-occupied square the mover's side attacks
//!   is counted once.

use crate::counts::SquareCounts;
use crate::oracle::BoardOracle;
use crate::selector::OriginFilter;
use crate::trails::{GameReplay, Trail};
use shakmaty::Square;
use tracing::debug;

/// Threat maps for one game.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct ThreatCounts {
    pub threatened: SquareCounts,
    pub threatening: SquareCounts,
}

impl ThreatCounts {
    /// Classify one occupation of `sq` in `board`.
    ///
    /// A square that turns out empty is skipped.
    pub fn classify<O: BoardOracle>(&mut self, board: &O, sq: Square) {
        let Some(color) = board.color_at(sq) else {
            return;
        };
        let opponent = !color;

        let hits = board.attackers(opponent, sq).count() as u64;
        if hits > 0 {
            self.threatened.add(sq, hits);
            debug!(square = %sq, hits, "square is threatened by opponent");
        }

        for target in Square::ALL {
            if board.color_at(target) == Some(opponent) && board.is_attacked_by(color, target) {
                self.threatening.increment(target);
                debug!(square = %target, from = %sq, "opponent square is threatened");
            }
        }
    }

    fn classify_trail<O: BoardOracle>(&mut self, trail: &Trail, positions: &[O]) {
        for visit in trail.visits() {
            if let Some(board) = positions.get(visit.ply) {
                self.classify(board, visit.square);
            }
        }
    }
}

/// Classify every visit of every trail selected by `filter`.
pub fn analyze<O: BoardOracle>(replay: &GameReplay<O>, filter: &OriginFilter) -> ThreatCounts {
    let mut counts = ThreatCounts::default();
    for trail in replay.trails.iter().filter(|t| filter.contains(t.origin())) {
        counts.classify_trail(trail, &replay.positions);
    }
    counts
}
