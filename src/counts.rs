//! Per-square counters, the occupancy aggregator and corpus totals.
//!
//! Counts are held in fixed 64-slot arrays indexed by square (a1=0, h8=63)
//! and only turned into string-keyed maps when exported. Merging is a
//! pointwise sum, so per-game results can be combined in any order.

use crate::error::QueryError;
use crate::selector::OriginFilter;
use crate::trails::Trail;
use shakmaty::Square;
use std::collections::HashMap;
use std::str::FromStr;

/// How exported maps name their squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyStyle {
    /// `"e4"`
    #[default]
    Algebraic,
    /// `"5,4"`: 1-based file and rank
    Coordinates,
}

impl KeyStyle {
    pub fn key(self, sq: Square) -> String {
        match self {
            KeyStyle::Algebraic => sq.to_string(),
            KeyStyle::Coordinates => {
                format!("{},{}", sq.file().to_usize() + 1, sq.rank().to_usize() + 1)
            }
        }
    }
}

impl FromStr for KeyStyle {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "algebraic" | "square" => Ok(KeyStyle::Algebraic),
            "coordinates" | "coords" | "xy" => Ok(KeyStyle::Coordinates),
            _ => Err(QueryError::KeyStyle(s.to_string())),
        }
    }
}

/// A non-negative counter per board square.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SquareCounts([u64; 64]);

impl Default for SquareCounts {
    fn default() -> Self {
        SquareCounts([0; 64])
    }
}

impl SquareCounts {
    pub fn increment(&mut self, sq: Square) {
        self.add(sq, 1);
    }

    pub fn add(&mut self, sq: Square, n: u64) {
        self.0[sq.to_usize()] += n;
    }

    pub fn get(&self, sq: Square) -> u64 {
        self.0[sq.to_usize()]
    }

    /// Sum of all squares.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    pub fn merge(&mut self, other: &SquareCounts) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine += theirs;
        }
    }

    /// Squares with a non-zero count, a1 first.
    pub fn iter(&self) -> impl Iterator<Item = (Square, u64)> + '_ {
        Square::ALL
            .into_iter()
            .map(|sq| (sq, self.get(sq)))
            .filter(|&(_, count)| count > 0)
    }

    /// Export as a string-keyed map holding only visited squares.
    pub fn to_keyed(&self, style: KeyStyle) -> HashMap<String, u64> {
        self.iter().map(|(sq, count)| (style.key(sq), count)).collect()
    }
}

/// Count every square visited by trails whose origin is selected,
/// the origin itself included.
pub fn occupancy(trails: &[Trail], filter: &OriginFilter) -> SquareCounts {
    let mut counts = SquareCounts::default();
    for trail in trails.iter().filter(|t| filter.contains(t.origin())) {
        for sq in trail.squares() {
            counts.increment(sq);
        }
    }
    counts
}

/// The three maps produced by one game.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct GameCounts {
    pub occupancy: SquareCounts,
    pub threatened: SquareCounts,
    pub threatening: SquareCounts,
}

/// Running totals over a corpus.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct CorpusTotals {
    pub occupancy: SquareCounts,
    pub threatened: SquareCounts,
    pub threatening: SquareCounts,
    /// Games that contributed at least one occupancy observation.
    pub games: u64,
    /// Games dropped by replay errors.
    pub skipped: u64,
}

impl CorpusTotals {
    /// Fold one game's counts into the totals.
    pub fn record(&mut self, game: &GameCounts) {
        if game.occupancy.is_empty() {
            return;
        }
        self.occupancy.merge(&game.occupancy);
        self.threatened.merge(&game.threatened);
        self.threatening.merge(&game.threatening);
        self.games += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Combine totals computed over disjoint sets of games.
    pub fn merge(&mut self, other: &CorpusTotals) {
        self.occupancy.merge(&other.occupancy);
        self.threatened.merge(&other.threatened);
        self.threatening.merge(&other.threatening);
        self.games += other.games;
        self.skipped += other.skipped;
    }

    pub fn merged(mut self, other: CorpusTotals) -> CorpusTotals {
        self.merge(&other);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GameRecord;
    use crate::trails::replay;

    fn trails_of(moves: &[&str]) -> Vec<Trail> {
        replay(&GameRecord::from_uci(moves).unwrap()).unwrap().trails
    }

    fn counts(entries: &[(Square, u64)]) -> SquareCounts {
        let mut c = SquareCounts::default();
        for &(sq, n) in entries {
            c.add(sq, n);
        }
        c
    }

    #[test]
    fn test_occupancy_counts_origin_and_destination() {
        let trails = trails_of(&["e2e4", "e7e5", "g1f3", "b8c6"]);
        let occ = occupancy(&trails, &OriginFilter::single(Square::E2));
        let keyed = occ.to_keyed(KeyStyle::Algebraic);
        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed["e2"], 1);
        assert_eq!(keyed["e4"], 1);
    }

    #[test]
    fn test_occupancy_stops_at_capture() {
        let trails = trails_of(&["e2e4", "d7d5", "e4d5", "d8d5"]);
        let occ = occupancy(&trails, &OriginFilter::single(Square::D7));
        assert_eq!(occ, counts(&[(Square::D7, 1), (Square::D5, 1)]));
    }

    #[test]
    fn test_occupancy_counts_repeat_visits() {
        let trails = trails_of(&["g1f3", "g8f6", "f3g1", "f6g8", "g1f3"]);
        let occ = occupancy(&trails, &OriginFilter::single(Square::G1));
        assert_eq!(occ.get(Square::G1), 2);
        assert_eq!(occ.get(Square::F3), 2);
        assert_eq!(occ.total(), 4);
    }

    #[test]
    fn test_empty_filter_yields_empty_map() {
        let trails = trails_of(&["e2e4", "e7e5"]);
        let occ = occupancy(&trails, &OriginFilter::default());
        assert!(occ.is_empty());
        assert!(occ.to_keyed(KeyStyle::Coordinates).is_empty());
    }

    #[test]
    fn test_coordinate_keys() {
        assert_eq!(KeyStyle::Coordinates.key(Square::A1), "1,1");
        assert_eq!(KeyStyle::Coordinates.key(Square::E4), "5,4");
        assert_eq!(KeyStyle::Coordinates.key(Square::H8), "8,8");
        assert_eq!(KeyStyle::Algebraic.key(Square::H8), "h8");
    }

    #[test]
    fn test_key_style_from_str() {
        assert_eq!("Coordinates".parse::<KeyStyle>(), Ok(KeyStyle::Coordinates));
        assert_eq!("algebraic".parse::<KeyStyle>(), Ok(KeyStyle::Algebraic));
        assert!("pixels".parse::<KeyStyle>().is_err());
        assert!("san".parse::<KeyStyle>().is_err());
    }

    #[test]
    fn test_merge_is_associative_and_commutative() {
        let a = counts(&[(Square::E2, 1), (Square::E4, 2)]);
        let b = counts(&[(Square::E4, 1), (Square::D5, 3)]);
        let c = counts(&[(Square::A1, 7)]);

        let mut left = a.clone();
        left.merge(&b);
        left.merge(&c);

        let mut bc = b.clone();
        bc.merge(&c);
        let mut right = a.clone();
        right.merge(&bc);

        let mut reversed = c.clone();
        reversed.merge(&b);
        reversed.merge(&a);

        assert_eq!(left, right);
        assert_eq!(left, reversed);
        assert_eq!(left.get(Square::E4), 3);
    }

    #[test]
    fn test_corpus_merge_matches_single_pass() {
        let filter = OriginFilter::single(Square::E2);
        let games: Vec<GameCounts> = [
            &["e2e4", "e7e5"][..],
            &["e2e3", "d7d5"][..],
            &["d2d4", "d7d5", "e2e4", "d5e4"][..],
        ]
        .iter()
        .map(|moves| GameCounts {
            occupancy: occupancy(&trails_of(moves), &filter),
            ..GameCounts::default()
        })
        .collect();

        let mut single = CorpusTotals::default();
        for game in &games {
            single.record(game);
        }

        let mut first = CorpusTotals::default();
        first.record(&games[0]);
        let mut rest = CorpusTotals::default();
        rest.record(&games[1]);
        rest.record(&games[2]);

        assert_eq!(first.merged(rest), single);
        assert_eq!(single.games, 3);
        assert_eq!(single.occupancy.get(Square::E2), 3);
        assert_eq!(single.occupancy.get(Square::E4), 2);
    }

    #[test]
    fn test_games_without_observations_are_not_counted() {
        let mut totals = CorpusTotals::default();
        totals.record(&GameCounts::default());
        totals.record_skipped();
        assert_eq!(totals.games, 0);
        assert_eq!(totals.skipped, 1);
    }
}
