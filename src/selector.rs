//! Origin selection: which trails feed the aggregators.
//!
//! A selector string is either a list of starting squares (`"e2"`,
//! `"a1,h1"`, `"b1 g1"`) or a piece query naming a color and a piece type
//! in either order (`"white knight"`, `"N w"`, `"black:pawn"`). Piece queries
//! expand to that piece's squares in the standard starting position.

use crate::error::QueryError;
use nom::{
    branch::alt,
    character::complete::{alpha1, char, multispace0, one_of, space0, space1},
    combinator::{all_consuming, map, map_opt, recognize, value},
    multi::separated_list1,
    sequence::{delimited, pair},
    IResult, Parser,
};
use shakmaty::{Bitboard, Board, Color, Piece, Role, Square};
use std::str::FromStr;
use tracing::warn;

/// A set of origin squares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OriginFilter(Bitboard);

impl OriginFilter {
    pub fn from_squares<I: IntoIterator<Item = Square>>(squares: I) -> Self {
        OriginFilter(squares.into_iter().collect())
    }

    pub fn single(sq: Square) -> Self {
        OriginFilter(Bitboard::from_square(sq))
    }

    /// Where `piece` stands in the standard starting position.
    pub fn for_piece(piece: Piece) -> Self {
        OriginFilter(Board::new().by_piece(piece))
    }

    pub fn contains(&self, sq: Square) -> bool {
        self.0.contains(sq)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.count()
    }

    pub fn squares(&self) -> impl Iterator<Item = Square> {
        self.0.into_iter()
    }

    /// The piece that starts on the first selected origin, if any does.
    pub fn tracked_piece(&self) -> Option<Piece> {
        let board = Board::new();
        self.squares().find_map(|sq| board.piece_at(sq))
    }
}

impl FromStr for OriginFilter {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

enum Query<'a> {
    Squares(Vec<Square>),
    Words(&'a str, &'a str),
}

fn square(input: &str) -> IResult<&str, Square> {
    map_opt(
        recognize(pair(one_of("abcdefghABCDEFGH"), one_of("12345678"))),
        |s: &str| Square::from_ascii(s.to_ascii_lowercase().as_bytes()).ok(),
    )
    .parse(input)
}

fn square_list(input: &str) -> IResult<&str, Vec<Square>> {
    let separator = alt((
        value((), delimited(space0, char(','), space0)),
        value((), space1),
    ));
    separated_list1(separator, square).parse(input)
}

fn word_pair(input: &str) -> IResult<&str, (&str, &str)> {
    let separator = alt((
        value((), delimited(space0, char(':'), space0)),
        value((), space1),
    ));
    map((alpha1, separator, alpha1), |(a, _, b)| (a, b)).parse(input)
}

fn query(input: &str) -> IResult<&str, Query<'_>> {
    all_consuming(delimited(
        multispace0,
        alt((
            map(square_list, Query::Squares),
            map(word_pair, |(a, b)| Query::Words(a, b)),
        )),
        multispace0,
    ))
    .parse(input)
}

fn color_word(word: &str) -> Option<Color> {
    match word.to_ascii_lowercase().as_str() {
        "white" | "w" => Some(Color::White),
        "black" | "b" => Some(Color::Black),
        _ => None,
    }
}

fn role_word(word: &str) -> Option<Role> {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        "king" => Some(Role::King),
        "queen" => Some(Role::Queen),
        "rook" => Some(Role::Rook),
        "bishop" => Some(Role::Bishop),
        "knight" => Some(Role::Knight),
        "pawn" => Some(Role::Pawn),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Role::from_char(ch),
                _ => None,
            }
        }
    }
}

/// Parse a selector string into an origin filter.
///
/// A piece query with a color but an unknown piece word selects nothing
/// rather than failing.
pub fn parse_selector(input: &str) -> Result<OriginFilter, QueryError> {
    let (_, parsed) = query(input).map_err(|_| QueryError::Syntax {
        input: input.to_string(),
    })?;

    match parsed {
        Query::Squares(squares) => Ok(OriginFilter::from_squares(squares)),
        Query::Words(first, second) => {
            let piece = match (color_word(first), role_word(second)) {
                (Some(color), Some(role)) => Some(role.of(color)),
                _ => match (role_word(first), color_word(second)) {
                    (Some(role), Some(color)) => Some(role.of(color)),
                    _ => None,
                },
            };
            if let Some(piece) = piece {
                return Ok(OriginFilter::for_piece(piece));
            }
            if color_word(first).is_some() || color_word(second).is_some() {
                warn!(selector = input, "unknown piece type, selecting no origins");
                Ok(OriginFilter::default())
            } else {
                Err(QueryError::Syntax {
                    input: input.to_string(),
                })
            }
        }
    }
}
