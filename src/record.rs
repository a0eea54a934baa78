//! Game records handed from the loader to the path tracker.

use crate::error::LoadError;
use shakmaty::{uci::UciMove, CastlingMode, Chess, Move, Position};

/// One game: a starting position and its mainline moves in order.
///
/// Moves carry their own capture/castling/en-passant/promotion flags
/// (`shakmaty::Move`), so the tracker never re-derives them from geometry.
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub initial: Chess,
    pub moves: Vec<Move>,
}

impl GameRecord {
    pub fn new(initial: Chess, moves: Vec<Move>) -> Self {
        GameRecord { initial, moves }
    }

    /// Build a record from UCI strings played from the standard start.
    pub fn from_uci<S: AsRef<str>>(moves: &[S]) -> Result<Self, LoadError> {
        Self::from_uci_at(Chess::default(), moves)
    }

    /// Build a record from UCI strings played from `initial`.
    ///
    /// Each string is resolved against the position it is played from; a
    /// string that does not name a legal move rejects the whole record.
    pub fn from_uci_at<S: AsRef<str>>(initial: Chess, moves: &[S]) -> Result<Self, LoadError> {
        let mut pos = initial.clone();
        let mut resolved = Vec::with_capacity(moves.len());
        for uci in moves {
            let uci = uci.as_ref();
            let m = uci
                .parse::<UciMove>()
                .ok()
                .and_then(|u| u.to_move(&pos).ok())
                .ok_or_else(|| LoadError::InvalidUci {
                    uci: uci.to_string(),
                })?;
            pos.play_unchecked(m);
            resolved.push(m);
        }
        Ok(GameRecord::new(initial, resolved))
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// UCI text of a move, with castling written king-to-destination (`e1g1`).
pub fn uci_string(m: Move) -> String {
    UciMove::from_move(m, CastlingMode::Standard).to_string()
}
