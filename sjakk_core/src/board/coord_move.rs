use std::{
    fmt::{Display, Write},
    str::FromStr,
};

use thiserror::Error;

use super::{Move, Piece, PieceType, Square};

/// A move in coordinate notation, the form moves take on the wire.
///
/// Coordinate notation gives the start and end squares plus an optional
/// promotion target as a lowercase FEN character:
///
/// * `e2e4`
/// * `e1g1` (white short castling)
/// * `e7e8q` (promotion)
///
/// Unlike [`Move`], this type carries no knowledge of the position and so
/// cannot be applied to a board directly; it first has to be matched against
/// the legal moves of a position (see `Board::push_coord_move`).
///
/// ```
/// # use sjakk_core::board::{CoordMove, Square};
/// assert_eq!(
///     "e2e4".parse(),
///     Ok(CoordMove {
///         from: Square::E2,
///         to: Square::E4,
///         promotion: None,
///     })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Display for CoordMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.from.fmt(f)?;
        self.to.fmt(f)?;
        if let Some(promotion) = self.promotion {
            f.write_char(promotion.as_lowercase_char())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCoordMoveError {
    #[error("expected 4 or 5 characters")]
    IncorrectLength,
    #[error("invalid square {0}")]
    InvalidSquare(String),
    #[error("invalid promotion target {0}")]
    InvalidPromotionTarget(char),
}

impl FromStr for CoordMove {
    type Err = ParseCoordMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = s.chars().collect::<Vec<_>>();
        if chars.len() != 4 && chars.len() != 5 {
            return Err(ParseCoordMoveError::IncorrectLength);
        }

        let from_str = String::from_iter(&chars[0..2]);
        let from = from_str
            .parse()
            .map_err(|_| ParseCoordMoveError::InvalidSquare(from_str))?;

        let to_str = String::from_iter(&chars[2..4]);
        let to = to_str
            .parse()
            .map_err(|_| ParseCoordMoveError::InvalidSquare(to_str))?;

        let promotion = match chars.get(4) {
            Some(&c) => Some(
                Piece::try_from_fen_char(c)
                    .ok_or(ParseCoordMoveError::InvalidPromotionTarget(c))?
                    .piece_type(),
            ),
            None => None,
        };

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl From<Move> for CoordMove {
    fn from(value: Move) -> Self {
        Self {
            from: value.from_square(),
            to: value.to_square(),
            promotion: value.promotion().map(|p| p.piece_type()),
        }
    }
}
