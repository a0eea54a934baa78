//! The board oracle seam.
//!
//! Replay and threat classification never inspect board internals directly;
//! they only ask an oracle to validate and apply moves and to answer
//! occupancy and attack queries. Any `shakmaty` position type qualifies.

use shakmaty::{Bitboard, Color, Move, Position, Square};

pub trait BoardOracle: Clone {
    /// Whether `m` is legal in the current state.
    fn is_legal(&self, m: Move) -> bool;

    /// Advance the state by `m`. Callers check legality first.
    fn apply(&mut self, m: Move);

    /// Color of the piece on `sq`, if any.
    fn color_at(&self, sq: Square) -> Option<Color>;

    /// Squares of the `attacker` pieces that attack `sq`.
    fn attackers(&self, attacker: Color, sq: Square) -> Bitboard;

    /// Whether any piece of `attacker` attacks `sq`.
    fn is_attacked_by(&self, attacker: Color, sq: Square) -> bool {
        self.attackers(attacker, sq).any()
    }

    /// All occupied squares.
    fn occupied(&self) -> Bitboard;
}

impl<P: Position + Clone> BoardOracle for P {
    fn is_legal(&self, m: Move) -> bool {
        Position::is_legal(self, m)
    }

    fn apply(&mut self, m: Move) {
        self.play_unchecked(m);
    }

    fn color_at(&self, sq: Square) -> Option<Color> {
        self.board().color_at(sq)
    }

    fn attackers(&self, attacker: Color, sq: Square) -> Bitboard {
        let board = self.board();
        board.attacks_to(sq, attacker, board.occupied())
    }

    fn occupied(&self) -> Bitboard {
        self.board().occupied()
    }
}

/// A real position that pretends one square is empty when asked for the
/// occupied set, so replay meets a move from a square it never tracked.
#[cfg(test)]
#[derive(Clone, Debug)]
pub(crate) struct Blindfold {
    pub pos: shakmaty::Chess,
    pub hidden: Square,
}

#[cfg(test)]
impl BoardOracle for Blindfold {
    fn is_legal(&self, m: Move) -> bool {
        BoardOracle::is_legal(&self.pos, m)
    }

    fn apply(&mut self, m: Move) {
        BoardOracle::apply(&mut self.pos, m);
    }

    fn color_at(&self, sq: Square) -> Option<Color> {
        BoardOracle::color_at(&self.pos, sq)
    }

    fn attackers(&self, attacker: Color, sq: Square) -> Bitboard {
        BoardOracle::attackers(&self.pos, attacker, sq)
    }

    fn occupied(&self) -> Bitboard {
        BoardOracle::occupied(&self.pos).without(self.hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{uci::UciMove, Chess};

    fn play(pos: &mut Chess, uci: &str) {
        let m = uci.parse::<UciMove>().unwrap().to_move(pos).unwrap();
        assert!(BoardOracle::is_legal(pos, m));
        BoardOracle::apply(pos, m);
    }

    #[test]
    fn test_initial_attacks() {
        let pos = Chess::default();
        // Knights and pawns cover the third rank, nothing reaches the fourth
        assert!(pos.is_attacked_by(Color::White, Square::F3));
        assert!(pos.is_attacked_by(Color::White, Square::A3));
        assert!(!pos.is_attacked_by(Color::White, Square::E4));
        assert!(pos.is_attacked_by(Color::Black, Square::C6));
        assert!(!pos.is_attacked_by(Color::Black, Square::E2));
    }

    #[test]
    fn test_color_at_and_occupied() {
        let pos = Chess::default();
        assert_eq!(pos.color_at(Square::E2), Some(Color::White));
        assert_eq!(pos.color_at(Square::D8), Some(Color::Black));
        assert_eq!(pos.color_at(Square::E4), None);
        assert_eq!(BoardOracle::occupied(&pos).count(), 32);
    }

    #[test]
    fn test_attacks_follow_applied_moves() {
        let mut pos = Chess::default();
        play(&mut pos, "e2e4");
        play(&mut pos, "d7d5");
        assert!(pos.is_attacked_by(Color::White, Square::D5));
        assert!(pos.is_attacked_by(Color::Black, Square::E4));
        assert_eq!(pos.color_at(Square::E2), None);
        // d5 is hit by the e4 pawn only, e5 by nothing
        assert_eq!(pos.attackers(Color::White, Square::D5), Bitboard::from_square(Square::E4));
        assert!(pos.attackers(Color::White, Square::E5).is_empty());
        // the d8 queen defends d5 along the open file
        assert!(pos.attackers(Color::Black, Square::D5).contains(Square::D8));
    }

    #[test]
    fn test_rejects_illegal_move() {
        let pos = Chess::default();
        let m = Move::Normal {
            role: shakmaty::Role::Pawn,
            from: Square::E2,
            capture: None,
            to: Square::E5,
            promotion: None,
        };
        assert!(!BoardOracle::is_legal(&pos, m));
    }
}
