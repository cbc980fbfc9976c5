use bitflags::bitflags;

use super::Square;

bitflags! {
    /// Which castling moves are still available to each player, given the
    /// history of the game.
    ///
    /// A flag is cleared permanently once the king or the relevant rook has
    /// moved (or the rook has been captured). The flags do not account for
    /// temporary obstructions -- pieces between king and rook, or attacked
    /// squares on the king's path -- which must be checked during move
    /// generation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Castling: u8 {
        const WHITE_KINGSIDE  = 0b0001;
        const WHITE_QUEENSIDE = 0b0010;
        const BLACK_KINGSIDE  = 0b0100;
        const BLACK_QUEENSIDE = 0b1000;

        const WHITE = Self::WHITE_KINGSIDE.bits() | Self::WHITE_QUEENSIDE.bits();
        const BLACK = Self::BLACK_KINGSIDE.bits() | Self::BLACK_QUEENSIDE.bits();
        const KINGSIDE = Self::WHITE_KINGSIDE.bits() | Self::BLACK_KINGSIDE.bits();
        const QUEENSIDE = Self::WHITE_QUEENSIDE.bits() | Self::BLACK_QUEENSIDE.bits();
    }
}

impl Default for Castling {
    fn default() -> Self {
        Self::all()
    }
}

impl Castling {
    /// Returns the castling state as the third FEN field: `-` if neither side
    /// can castle, otherwise some subset of `KQkq`.
    pub fn as_fen_str(self) -> String {
        if self.is_empty() {
            "-".to_owned()
        } else {
            let mut result = String::with_capacity(4);
            if self.contains(Self::WHITE_KINGSIDE) {
                result.push('K');
            }
            if self.contains(Self::WHITE_QUEENSIDE) {
                result.push('Q');
            }
            if self.contains(Self::BLACK_KINGSIDE) {
                result.push('k');
            }
            if self.contains(Self::BLACK_QUEENSIDE) {
                result.push('q');
            }
            result
        }
    }

    /// Rights that are lost when a move touches this square, either as its
    /// origin (king or rook moving away) or as its destination (rook being
    /// captured).
    pub fn square_mask(square: Square) -> Castling {
        match square {
            Square::A1 => Self::WHITE_QUEENSIDE,
            Square::E1 => Self::WHITE,
            Square::H1 => Self::WHITE_KINGSIDE,
            Square::A8 => Self::BLACK_QUEENSIDE,
            Square::E8 => Self::BLACK,
            Square::H8 => Self::BLACK_KINGSIDE,
            _ => Self::empty(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn castling_fen_field() {
        assert_eq!(Castling::all().as_fen_str(), "KQkq");
        assert_eq!(Castling::empty().as_fen_str(), "-");
        assert_eq!(
            (Castling::WHITE_KINGSIDE | Castling::BLACK_QUEENSIDE).as_fen_str(),
            "Kq"
        );
    }

    #[test]
    fn castling_square_masks() {
        assert_eq!(Castling::square_mask(Square::E1), Castling::WHITE);
        assert_eq!(Castling::square_mask(Square::A8), Castling::BLACK_QUEENSIDE);
        assert_eq!(Castling::square_mask(Square::H1), Castling::WHITE_KINGSIDE);
        assert_eq!(Castling::square_mask(Square::D4), Castling::empty());
    }
}
