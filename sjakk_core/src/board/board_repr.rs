use std::{
    ops::{Index, IndexMut, Range},
    str::FromStr,
};

use super::{Bitboard, Color, Move, Piece, PieceType, Square};

/// Just the pieces on the board, as one [`Bitboard`] per piece kind.
///
/// Holds a bitboard for every combination of [`Color`] and [`PieceType`],
/// plus an aggregate bitboard per color. The boards are accessed by indexing
/// with a [`Piece`] or a [`Color`]:
///
/// ```
/// # use sjakk_core::board::{BoardRepr, Color, Piece};
/// fn example(repr: &BoardRepr) {
///     let white_king = repr[Piece::WHITE_KING];
///     let all_black_pieces = repr[Color::Black];
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardRepr {
    // Layout:
    // 0: all white pieces
    // 1-6: white pawns, knights, bishops, rooks, queens, kings
    // 7: (unused)
    // 8: all black pieces
    // 9-14: black piece boards
    boards: [Bitboard; 15],
}

impl BoardRepr {
    const WHITE_RANGE: Range<usize> = 1..7;
    const BLACK_RANGE: Range<usize> = 9..15;

    /// Creates a new [`BoardRepr`] from a slice of squares ordered by
    /// increasing index (a1, b1, ..., h8).
    ///
    /// Entries past index 63 are ignored; missing entries are treated as
    /// empty squares.
    pub fn new(board: &[Option<Piece>]) -> Self {
        let mut repr = Self::default();

        for (i, &piece) in board.iter().take(64).enumerate() {
            if let Some(piece) = piece {
                let square = Square::from_index_unchecked(i);
                repr[piece].set(square);
                repr[piece.color()].set(square);
            }
        }

        repr
    }

    /// Returns the piece, if any, on the given square.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        let mask = Bitboard::from_square(square);

        for i in Self::WHITE_RANGE.chain(Self::BLACK_RANGE) {
            if (mask & self.boards[i]).has_piece() {
                return Piece::try_from_u8(i as u8);
            }
        }

        None
    }

    /// Returns the piece with the given color, if any, on the given square.
    /// Slightly cheaper than [`Self::piece_at`] when the color is known.
    pub fn piece_with_color_at(&self, color: Color, square: Square) -> Option<Piece> {
        let range = match color {
            Color::White => Self::WHITE_RANGE,
            Color::Black => Self::BLACK_RANGE,
        };
        let mask = Bitboard::from_square(square);

        for i in range {
            if (mask & self.boards[i]).has_piece() {
                return Piece::try_from_u8(i as u8);
            }
        }

        None
    }

    /// Returns a (white count, black count) tuple for the given piece type.
    pub fn piece_count(&self, piece_type: PieceType) -> (u32, u32) {
        (
            self[piece_type.white()].pop_count(),
            self[piece_type.black()].pop_count(),
        )
    }

    /// All squares that have a piece on them.
    pub fn occupied(&self) -> Bitboard {
        self[Color::White] | self[Color::Black]
    }

    /// All squares that do not have a piece on them.
    pub fn empty(&self) -> Bitboard {
        !self.occupied()
    }

    /// Iterates over the bitboards for all possible [`Piece`]s.
    pub fn boards(&self) -> impl Iterator<Item = (Piece, Bitboard)> + '_ {
        Self::WHITE_RANGE
            .chain(Self::BLACK_RANGE)
            .map(move |i| (Piece::try_from_u8(i as u8).unwrap(), self.boards[i]))
    }

    /// Iterates over every piece on the board along with its square. Pieces
    /// are grouped by kind, not by square order.
    pub fn pieces(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        self.boards()
            .flat_map(|(piece, board)| board.squares().map(move |square| (piece, square)))
    }

    /// Makes the given [`Move`] on the board. No validity checks are
    /// performed.
    ///
    /// The update is purely XOR-based and therefore self-inverse: calling
    /// this method again with the same move, on the state immediately after
    /// the first call, undoes it. Multiple moves must be undone in reverse
    /// order.
    pub fn move_unchecked(&mut self, the_move: Move) {
        let from = the_move.from_square();
        let to = the_move.to_square();
        let piece = the_move.piece();
        let color = piece.color();

        let from_bb = Bitboard::from_square(from);
        let to_bb = Bitboard::from_square(to);
        let from_to_bb = from_bb ^ to_bb;

        self[piece] ^= from_to_bb;
        self[color] ^= from_to_bb;

        if the_move.is_en_passant() {
            let removed_pawn = the_move.en_passant_square();
            let removed_pawn_bb = Bitboard::from_square(removed_pawn);

            self[PieceType::Pawn.with_color(color.flip())] ^= removed_pawn_bb;
            self[color.flip()] ^= removed_pawn_bb;
        } else {
            if let Some(capture) = the_move.captured_piece() {
                self[capture] ^= to_bb;
                self[capture.color()] ^= to_bb;
            }

            if let Some(promote) = the_move.promotion() {
                self[piece] ^= to_bb;
                self[promote] ^= to_bb;
            }

            if the_move.is_castle() {
                let (rook_from, rook_to) = the_move.castling_rook_squares();

                let rook_from_to_bb =
                    Bitboard::from_square(rook_from) ^ Bitboard::from_square(rook_to);

                self[PieceType::Rook.with_color(color)] ^= rook_from_to_bb;
                self[color] ^= rook_from_to_bb;
            }
        }
    }
}

impl Index<Piece> for BoardRepr {
    type Output = Bitboard;

    fn index(&self, index: Piece) -> &Self::Output {
        &self.boards[index.get() as usize]
    }
}

impl Index<Color> for BoardRepr {
    type Output = Bitboard;

    fn index(&self, index: Color) -> &Self::Output {
        &self.boards[index as usize]
    }
}

impl IndexMut<Piece> for BoardRepr {
    /// Intended for internal use; writing through this index can break the
    /// aggregate color boards.
    fn index_mut(&mut self, index: Piece) -> &mut Self::Output {
        &mut self.boards[index.get() as usize]
    }
}

impl IndexMut<Color> for BoardRepr {
    /// Intended for internal use; writing through this index can break the
    /// aggregate color boards.
    fn index_mut(&mut self, index: Color) -> &mut Self::Output {
        &mut self.boards[index as usize]
    }
}

/// Parses the piece-diagram format used in tests: FEN piece characters and
/// `.` for empty squares, ranks listed top-down, whitespace ignored.
impl FromStr for BoardRepr {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = [None; 64];
        let mut square_iter = (0..8)
            .rev()
            .flat_map(|rank| (0..8).map(move |file| Square::new_unchecked(rank, file)));

        for c in s.chars() {
            if c.is_whitespace() {
                continue;
            }
            let square = square_iter.next().ok_or(())?;
            if c != '.' {
                board[square.index()] = Some(Piece::try_from_fen_char(c).ok_or(())?);
            }
        }

        Ok(Self::new(&board))
    }
}
