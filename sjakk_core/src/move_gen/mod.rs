//! Move generation and lookup tables.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::board::{Bitboard, BoardRepr, Castling, Color, Move, Piece, PieceType, Square};

use self::{
    lookups::Lookups,
    pseudo_legal::{black_pawn_attacks, white_pawn_attacks},
};

pub mod bitboard_utils;
pub mod lookups;
mod pseudo_legal;

/// Maximum number of moves that could occur in a legal position, used for
/// stack-allocating a vector to hold moves.
///
/// The actual maximum appears to be 218, in this position:
///
/// R6R/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNN1KB1 w - - 0 1
///
/// But 256 is a nice number and a good buffer in case there could be more.
pub const MAX_MOVES: usize = 256;

const POSSIBLE_PROMOTIONS: &[PieceType] = &[
    PieceType::Queen,
    PieceType::Knight,
    PieceType::Rook,
    PieceType::Bishop,
];

pub type MoveVec = ArrayVec<Move, MAX_MOVES>;

bitflags! {
    /// Restricts the kinds of moves produced by the generator. The default
    /// generates everything; quiescence search asks for captures only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MoveGenFlags: u8 {
        const GEN_CAPTURES = 0b01;
        const GEN_QUIET_MOVES = 0b10;
    }
}

impl Default for MoveGenFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Generates the pseudo-legal moves of one position into a caller-supplied
/// [`MoveVec`].
///
/// Pseudo-legal moves obey piece movement rules but may leave the mover's
/// own king attacked; callers that need fully legal moves filter the output
/// with a check-safety test (see `Board::legal_moves`). The exception is
/// castling, which is verified here against occupancy and attacked squares,
/// because the intermediate squares the king crosses are not visible to an
/// apply-and-test filter.
pub struct MoveGenerator<'board, 'moves> {
    lookups: &'static Lookups,
    board: &'board BoardRepr,
    to_move: Color,
    en_passant: Option<Square>,
    castling: Castling,
    flags: MoveGenFlags,
    empty: Bitboard,
    occupied: Bitboard,
    push_targets: Bitboard,
    capture_targets: Bitboard,
    out_moves: &'moves mut MoveVec,
}

impl<'board, 'moves> MoveGenerator<'board, 'moves> {
    pub fn new(
        board: &'board BoardRepr,
        to_move: Color,
        en_passant: Option<Square>,
        castling: Castling,
        flags: MoveGenFlags,
        out_moves: &'moves mut MoveVec,
    ) -> Self {
        let empty = board.empty();
        let occupied = board.occupied();

        let push_targets = if flags.contains(MoveGenFlags::GEN_QUIET_MOVES) {
            empty
        } else {
            Bitboard::EMPTY
        };
        let capture_targets = if flags.contains(MoveGenFlags::GEN_CAPTURES) {
            board[to_move.flip()]
        } else {
            Bitboard::EMPTY
        };

        Self {
            lookups: Lookups::get_instance(),
            board,
            to_move,
            en_passant,
            castling,
            flags,
            empty,
            occupied,
            push_targets,
            capture_targets,
            out_moves,
        }
    }

    pub fn generate(mut self) {
        self.pawn_moves();
        self.knight_moves();
        self.bishop_moves();
        self.rook_moves();
        self.queen_moves();
        self.king_moves();
        self.castling_moves();
    }

    fn castling_moves(&mut self) {
        if !self.flags.contains(MoveGenFlags::GEN_QUIET_MOVES) {
            return;
        }

        let castle_mask = match self.to_move {
            Color::White => Castling::WHITE,
            Color::Black => Castling::BLACK,
        };
        let available = self.castling & castle_mask;
        if available.is_empty() {
            return;
        }

        let king_square = match self.board[PieceType::King.with_color(self.to_move)].to_square() {
            Some(square) => square,
            None => return,
        };

        // Castling rights inconsistent with the king placement can only come
        // from a hand-crafted position; refuse rather than emit garbage.
        let king_start = match self.to_move {
            Color::White => Square::E1,
            Color::Black => Square::E8,
        };
        if king_square != king_start {
            return;
        }

        let danger_squares = attacked_squares(self.board, self.to_move.flip(), self.occupied);

        // Castling out of check is not allowed.
        if danger_squares.get(king_square) {
            return;
        }

        if available.intersects(Castling::KINGSIDE) {
            self.try_castle(king_square, danger_squares, 5, 6, 7);
        }
        if available.intersects(Castling::QUEENSIDE) {
            self.try_castle(king_square, danger_squares, 3, 2, 0);
        }
    }

    fn try_castle(
        &mut self,
        king_square: Square,
        danger_squares: Bitboard,
        pass_through_file: u8,
        to_file: u8,
        rook_start_file: u8,
    ) {
        let rank = king_square.rank();
        let rook_square = Square::new_unchecked(rank, rook_start_file);
        let pass_through = Square::new_unchecked(rank, pass_through_file);
        let to = Square::new_unchecked(rank, to_file);

        let rook = PieceType::Rook.with_color(self.to_move);
        // There has to actually be a rook to castle with
        if !self.board[rook].get(rook_square) {
            return;
        }

        // No castling through pieces
        let in_between = self.lookups.get_in_between(king_square, rook_square);
        if (in_between & self.occupied).has_piece() {
            return;
        }

        // No castling through, or into, check
        let risk_squares = Bitboard::from_square(pass_through) | Bitboard::from_square(to);
        if (risk_squares & danger_squares).has_piece() {
            return;
        }

        self.out_moves.push(
            Move::builder(king_square, to, PieceType::King.with_color(self.to_move))
                .is_castle()
                .build(),
        );
    }
}

/// Returns all squares attacked by pieces of `by`, given the supplied
/// occupancy.
pub fn attacked_squares(board: &BoardRepr, by: Color, occupied: Bitboard) -> Bitboard {
    let lookups = Lookups::get_instance();

    let mut attacked = match by {
        Color::White => white_pawn_attacks(board[Piece::WHITE_PAWN]),
        Color::Black => black_pawn_attacks(board[Piece::BLACK_PAWN]),
    };

    fn all_attacks<F>(pieces: Bitboard, get_attack_pattern: F) -> Bitboard
    where
        F: Fn(Square) -> Bitboard,
    {
        pieces
            .squares()
            .map(get_attack_pattern)
            .fold(Bitboard::EMPTY, Bitboard::or)
    }

    attacked |= all_attacks(board[PieceType::Knight.with_color(by)], |square| {
        lookups.get_knight_moves(square)
    });

    let queens = board[PieceType::Queen.with_color(by)];

    attacked |= all_attacks(
        board[PieceType::Bishop.with_color(by)] | queens,
        |square| lookups.get_bishop_attacks(occupied, square),
    );

    attacked |= all_attacks(
        board[PieceType::Rook.with_color(by)] | queens,
        |square| lookups.get_rook_attacks(occupied, square),
    );

    attacked |= all_attacks(board[PieceType::King.with_color(by)], |square| {
        lookups.get_king_moves(square)
    });

    attacked
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::assert_in_any_order;

    fn generate(
        board: &BoardRepr,
        to_move: Color,
        en_passant: Option<Square>,
        castling: Castling,
        flags: MoveGenFlags,
    ) -> MoveVec {
        let mut moves = MoveVec::new();
        MoveGenerator::new(board, to_move, en_passant, castling, flags, &mut moves).generate();
        moves
    }

    #[test]
    fn starting_position_pseudo_legal_moves() {
        let board: BoardRepr = "
            rnbqkbnr
            pppppppp
            ........
            ........
            ........
            ........
            PPPPPPPP
            RNBQKBNR
        "
        .parse()
        .unwrap();

        // At the start every pseudo-legal move is also legal: 16 pawn moves
        // and 4 knight moves per side.
        for color in [Color::White, Color::Black] {
            let moves = generate(&board, color, None, Castling::all(), Default::default());
            assert_eq!(moves.len(), 20);
        }
    }

    #[test]
    fn castling_moves_both_wings() {
        let board: BoardRepr = "
            r...k..r
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
        "
        .parse()
        .unwrap();

        for (color, king, kingside_to, queenside_to) in [
            (Color::White, Square::E1, Square::G1, Square::C1),
            (Color::Black, Square::E8, Square::G8, Square::C8),
        ] {
            let moves = generate(&board, color, None, Castling::all(), Default::default());
            let castles: Vec<_> = moves.into_iter().filter(|m| m.is_castle()).collect();

            let king_piece = PieceType::King.with_color(color);
            assert_in_any_order(
                castles,
                vec![
                    Move::builder(king, kingside_to, king_piece)
                        .is_castle()
                        .build(),
                    Move::builder(king, queenside_to, king_piece)
                        .is_castle()
                        .build(),
                ],
            );
        }
    }

    #[test]
    fn castling_requires_rights_and_empty_path() {
        let blocked: BoardRepr = "
            r...k..r
            ........
            ........
            ........
            ........
            ........
            ........
            R..QK.NR
        "
        .parse()
        .unwrap();

        let moves = generate(&blocked, Color::White, None, Castling::all(), Default::default());
        assert!(!moves.into_iter().any(|m| m.is_castle()));

        let open: BoardRepr = "
            r...k..r
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
        "
        .parse()
        .unwrap();

        let moves = generate(
            &open,
            Color::White,
            None,
            Castling::WHITE_QUEENSIDE | Castling::BLACK,
            Default::default(),
        );
        let castles: Vec<_> = moves.into_iter().filter(|m| m.is_castle()).collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to_square(), Square::C1);
    }

    #[test]
    fn castling_not_through_or_out_of_check() {
        // The f-file rook forbids kingside castling (the king would pass
        // through f1); the queenside path is fine.
        let through_check: BoardRepr = "
            .....r.k
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
        "
        .parse()
        .unwrap();

        let moves = generate(
            &through_check,
            Color::White,
            None,
            Castling::all(),
            Default::default(),
        );
        let castles: Vec<_> = moves.into_iter().filter(|m| m.is_castle()).collect();
        assert_eq!(castles.len(), 1);
        assert_eq!(castles[0].to_square(), Square::C1);

        // A check on the king forbids castling entirely.
        let in_check: BoardRepr = "
            ....r..k
            ........
            ........
            ........
            ........
            ........
            ........
            R...K..R
        "
        .parse()
        .unwrap();

        let moves = generate(
            &in_check,
            Color::White,
            None,
            Castling::all(),
            Default::default(),
        );
        assert!(!moves.into_iter().any(|m| m.is_castle()));
    }

    #[test]
    fn attacked_squares_all_piece_kinds() {
        let board: BoardRepr = "
            ........
            ........
            ........
            ...r....
            ........
            ........
            ......p.
            ....k...
        "
        .parse()
        .unwrap();

        let attacked = attacked_squares(&board, Color::Black, board.occupied());

        // Pawn attacks
        assert!(attacked.get(Square::F1));
        assert!(attacked.get(Square::H1));
        // King attacks
        assert!(attacked.get(Square::D1));
        assert!(attacked.get(Square::E2));
        // Rook rays, blocked by nothing vertically down to d1
        assert!(attacked.get(Square::D8));
        assert!(attacked.get(Square::A5));
        assert!(attacked.get(Square::D1));
        assert!(!attacked.get(Square::E4));
    }
}
