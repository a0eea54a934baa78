//! Path tracker: replays one game and follows every piece by its origin square.
//!
//! A trail is created for each square occupied in the initial position and
//! lives for the whole game. Each move updates trails in a fixed order:
//! 1. the trail standing on the destination is captured,
//! 2. en passant captures the pawn beside the destination,
//! 3. the mover's trail appends the destination,
//! 4. castling also moves the rook's trail.
//!
//! After every move the oracle state is snapshotted so the threat analyzer
//! can look at the board exactly as it was when each square was entered.

use crate::error::GameError;
use crate::oracle::BoardOracle;
use crate::record::{uci_string, GameRecord};
use shakmaty::{CastlingSide, Chess, Move, Square};

/// A square entered by a trail, and the ply whose position shows it.
///
/// Ply 0 is the initial position; ply `k` is the position after the `k`-th move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit {
    pub square: Square,
    pub ply: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrailState {
    Live(Square),
    Captured,
}

/// The history of one piece, keyed by where it started.
#[derive(Clone, Debug)]
pub struct Trail {
    origin: Square,
    visits: Vec<Visit>,
    state: TrailState,
}

impl Trail {
    fn new(origin: Square) -> Self {
        Trail {
            origin,
            visits: vec![Visit {
                square: origin,
                ply: 0,
            }],
            state: TrailState::Live(origin),
        }
    }

    pub fn origin(&self) -> Square {
        self.origin
    }

    pub fn state(&self) -> TrailState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        self.state == TrailState::Captured
    }

    /// Every occupation in order, origin first.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> + '_ {
        self.visits.iter().map(|v| v.square)
    }

    fn is_at(&self, sq: Square) -> bool {
        self.state == TrailState::Live(sq)
    }

    fn advance(&mut self, to: Square, ply: usize) {
        // A captured trail is never extended
        if let TrailState::Live(_) = self.state {
            self.visits.push(Visit { square: to, ply });
            self.state = TrailState::Live(to);
        }
    }

    fn capture(&mut self) {
        self.state = TrailState::Captured;
    }
}

/// The finished trails of one game plus the position after every ply.
#[derive(Clone, Debug)]
pub struct GameReplay<O> {
    pub trails: Vec<Trail>,
    pub positions: Vec<O>,
}

impl<O> GameReplay<O> {
    pub fn trail(&self, origin: Square) -> Option<&Trail> {
        self.trails.iter().find(|t| t.origin == origin)
    }

    /// Number of moves replayed.
    pub fn plies(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }
}

fn live_index(trails: &[Trail], sq: Square) -> Option<usize> {
    trails.iter().position(|t| t.is_at(sq))
}

/// Replay a loaded game against the default oracle.
pub fn replay(record: &GameRecord) -> Result<GameReplay<Chess>, GameError> {
    replay_moves(record.initial.clone(), &record.moves)
}

/// Replay `moves` from `initial`, maintaining one trail per initially
/// occupied square.
///
/// Aborts on the first illegal move or on a move whose origin no live trail
/// occupies; a partially replayed game is never returned.
pub fn replay_moves<O: BoardOracle>(
    initial: O,
    moves: &[Move],
) -> Result<GameReplay<O>, GameError> {
    if moves.is_empty() {
        return Err(GameError::EmptyGame);
    }

    let mut trails: Vec<Trail> = initial.occupied().into_iter().map(Trail::new).collect();
    let mut positions = Vec::with_capacity(moves.len() + 1);
    let mut state = initial;
    positions.push(state.clone());

    for (idx, &m) in moves.iter().enumerate() {
        let ply = idx + 1;
        if !state.is_legal(m) {
            return Err(GameError::IllegalMove {
                ply,
                uci: uci_string(m),
            });
        }

        match m {
            Move::Castle { king, rook } => {
                // Castling never captures. The king may land on the rook's own
                // square in Chess960, so both trails are located before either moves.
                let side = CastlingSide::from_king_side(king < rook);
                let king_to = Square::from_coords(side.king_to_file(), king.rank());
                let rook_to = Square::from_coords(side.rook_to_file(), king.rank());
                let king_idx = live_index(&trails, king)
                    .ok_or(GameError::UntrackedOrigin { ply, square: king })?;
                let rook_idx = live_index(&trails, rook);
                trails[king_idx].advance(king_to, ply);
                if let Some(rook_idx) = rook_idx {
                    trails[rook_idx].advance(rook_to, ply);
                }
            }
            Move::Normal { from, to, .. } | Move::EnPassant { from, to } => {
                if let Some(victim) = live_index(&trails, to) {
                    trails[victim].capture();
                }
                if m.is_en_passant() {
                    let captured_at = Square::from_coords(to.file(), from.rank());
                    if let Some(victim) = live_index(&trails, captured_at) {
                        trails[victim].capture();
                    }
                }
                let mover = live_index(&trails, from)
                    .ok_or(GameError::UntrackedOrigin { ply, square: from })?;
                trails[mover].advance(to, ply);
            }
            Move::Put { to, .. } => {
                return Err(GameError::UntrackedOrigin { ply, square: to });
            }
        }

        state.apply(m);
        positions.push(state.clone());
    }

    Ok(GameReplay { trails, positions })
}
