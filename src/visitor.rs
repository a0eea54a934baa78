//! Game loader: turns one PGN game into a [`GameRecord`].
//!
//! Only the mainline is kept; variations are skipped. A `FEN` tag sets the
//! starting position and `Variant "chess960"` switches castling rules.
//! Games rejected by the [`GameFilter`] are not errors, the loader simply
//! yields `None` for them.

use crate::error::{LoadError, QueryError};
use crate::record::GameRecord;
use pgn_reader::{KnownOutcome, Outcome, RawTag, Reader, SanPlus, Skip, Visitor};
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, Move, Position};
use std::io::Cursor;
use std::ops::ControlFlow;
use std::str::FromStr;

/// Which game results to keep, seen from the filtered player's side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultFilter {
    #[default]
    All,
    Win,
    Loss,
    Draw,
}

impl ResultFilter {
    fn accepts(self, side: Color, outcome: Option<KnownOutcome>) -> bool {
        match (self, outcome) {
            (ResultFilter::All, _) => true,
            (ResultFilter::Draw, Some(KnownOutcome::Draw)) => true,
            (ResultFilter::Win, Some(KnownOutcome::Decisive { winner })) => winner == side,
            (ResultFilter::Loss, Some(KnownOutcome::Decisive { winner })) => winner != side,
            _ => false,
        }
    }
}

impl FromStr for ResultFilter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(ResultFilter::All),
            "win" => Ok(ResultFilter::Win),
            "loss" => Ok(ResultFilter::Loss),
            "draw" => Ok(ResultFilter::Draw),
            _ => Err(QueryError::ResultFilter(s.to_string())),
        }
    }
}

/// Tag-level game selection.
///
/// With a player, only that player's games are kept and wins/losses are
/// judged from their side. Without one, a win is `1-0` and a loss is `0-1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameFilter {
    player: Option<String>,
    pub result: ResultFilter,
}

impl GameFilter {
    pub fn new(player: Option<&str>, result: ResultFilter) -> Self {
        let player = player
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty());
        GameFilter { player, result }
    }

    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    /// The side results are judged from, or `None` if the game does not
    /// involve the filtered player.
    fn side(&self, tags: &GameTags) -> Option<Color> {
        let Some(player) = &self.player else {
            return Some(Color::White);
        };
        let is = |name: &Option<String>| {
            name.as_deref()
                .is_some_and(|n| n.trim().to_lowercase() == *player)
        };
        if is(&tags.white) {
            Some(Color::White)
        } else if is(&tags.black) {
            Some(Color::Black)
        } else {
            None
        }
    }
}

/// The tags the loader cares about.
#[derive(Default, Debug)]
pub struct GameTags {
    white: Option<String>,
    black: Option<String>,
    result: Option<String>,
    fen: Option<String>,
    variant: Option<String>,
}

impl GameTags {
    fn castling_mode(&self) -> CastlingMode {
        match &self.variant {
            Some(v) if v.eq_ignore_ascii_case("chess960") => CastlingMode::Chess960,
            _ => CastlingMode::Standard,
        }
    }

    fn outcome(&self) -> Option<KnownOutcome> {
        self.result.as_deref().and_then(known_outcome)
    }

    fn initial_position(&self) -> Result<Chess, LoadError> {
        let Some(fen) = &self.fen else {
            return Ok(Chess::default());
        };
        let fen: Fen = fen
            .parse()
            .map_err(|e| LoadError::InvalidFen(format!("{}: {}", fen, e)))?;
        fen.into_position(self.castling_mode())
            .map_err(|e| LoadError::InvalidFen(e.to_string()))
    }
}

fn known_outcome(result: &str) -> Option<KnownOutcome> {
    match result.trim() {
        "1-0" => Some(KnownOutcome::Decisive {
            winner: Color::White,
        }),
        "0-1" => Some(KnownOutcome::Decisive {
            winner: Color::Black,
        }),
        "1/2-1/2" => Some(KnownOutcome::Draw),
        _ => None,
    }
}

/// Mainline moves collected so far.
pub struct Moves {
    initial: Chess,
    pos: Chess,
    moves: Vec<Move>,
    side: Color,
    outcome: Option<KnownOutcome>,
}

/// PGN visitor that produces one game record.
pub struct GameLoader<'a> {
    filter: &'a GameFilter,
}

impl<'a> GameLoader<'a> {
    pub fn new(filter: &'a GameFilter) -> Self {
        GameLoader { filter }
    }
}

impl Visitor for GameLoader<'_> {
    type Tags = GameTags;
    type Movetext = Moves;
    type Output = Result<Option<GameRecord>, LoadError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(GameTags::default())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        let slot = if key.eq_ignore_ascii_case(b"White") {
            &mut tags.white
        } else if key.eq_ignore_ascii_case(b"Black") {
            &mut tags.black
        } else if key.eq_ignore_ascii_case(b"Result") {
            &mut tags.result
        } else if key.eq_ignore_ascii_case(b"FEN") {
            &mut tags.fen
        } else if key.eq_ignore_ascii_case(b"Variant") {
            &mut tags.variant
        } else {
            return ControlFlow::Continue(());
        };
        *slot = Some(String::from_utf8_lossy(&value.decode()).into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let Some(side) = self.filter.side(&tags) else {
            return ControlFlow::Break(Ok(None));
        };
        let outcome = tags.outcome();
        if outcome.is_some() && !self.filter.result.accepts(side, outcome) {
            return ControlFlow::Break(Ok(None));
        }

        let initial = match tags.initial_position() {
            Ok(pos) => pos,
            Err(err) => return ControlFlow::Break(Err(err)),
        };

        ControlFlow::Continue(Moves {
            pos: initial.clone(),
            initial,
            moves: Vec::with_capacity(80),
            side,
            outcome,
        })
    }

    fn san(
        &mut self,
        movetext: &mut Self::Movetext,
        san_plus: SanPlus,
    ) -> ControlFlow<Self::Output> {
        match san_plus.san.to_move(&movetext.pos) {
            Ok(m) => {
                movetext.pos.play_unchecked(m);
                movetext.moves.push(m);
                ControlFlow::Continue(())
            }
            Err(_) => ControlFlow::Break(Err(LoadError::IllegalSan {
                ply: movetext.moves.len() + 1,
                san: san_plus.to_string(),
            })),
        }
    }

    fn begin_variation(
        &mut self,
        _movetext: &mut Self::Movetext,
    ) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true)) // Skip variations, stay in mainline
    }

    fn outcome(
        &mut self,
        movetext: &mut Self::Movetext,
        outcome: Outcome,
    ) -> ControlFlow<Self::Output> {
        // The Result tag wins over the movetext marker
        if movetext.outcome.is_none() {
            if let Outcome::Known(known) = outcome {
                movetext.outcome = Some(known);
            }
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        if !self.filter.result.accepts(movetext.side, movetext.outcome) {
            return Ok(None);
        }
        Ok(Some(GameRecord::new(movetext.initial, movetext.moves)))
    }
}

/// Load the first game of `pgn`.
///
/// `Ok(None)` means the game was rejected by `filter`.
pub fn load_game(pgn: &str, filter: &GameFilter) -> Result<Option<GameRecord>, LoadError> {
    let mut reader = Reader::new(Cursor::new(pgn));
    let mut loader = GameLoader::new(filter);

    match reader.read_game(&mut loader)? {
        Some(output) => output,
        None => Err(LoadError::NoGame),
    }
}
