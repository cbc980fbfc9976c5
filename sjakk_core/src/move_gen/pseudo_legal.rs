use crate::board::{Bitboard, Color, Move, PieceType, Square};

use super::{lookups::Lookups, MoveGenFlags, MoveGenerator, POSSIBLE_PROMOTIONS};

impl<'board, 'moves> MoveGenerator<'board, 'moves> {
    pub(super) fn pawn_moves(&mut self) {
        self.pawn_pushes();
        self.pawn_captures();
        self.en_passants();
    }

    fn pawn_pushes(&mut self) {
        if !self.flags.contains(MoveGenFlags::GEN_QUIET_MOVES) {
            return;
        }

        let piece = PieceType::Pawn.with_color(self.to_move);
        let pawns = self.board[piece];

        let (single_pushable, double_pushable) = match self.to_move {
            Color::White => (
                white_pawns_able_to_push(pawns, self.empty),
                white_pawns_able_to_double_push(pawns, self.empty),
            ),
            Color::Black => (
                black_pawns_able_to_push(pawns, self.empty),
                black_pawns_able_to_double_push(pawns, self.empty),
            ),
        };

        let rank_before_promotion = self.rank_before_promotion();

        for from in single_pushable.squares() {
            let to = pawn_push_dest(from, self.to_move);

            if from.rank() == rank_before_promotion {
                for &promotion in POSSIBLE_PROMOTIONS {
                    self.out_moves
                        .push(Move::builder(from, to, piece).promotes_to(promotion).build());
                }
            } else {
                self.out_moves.push(Move::builder(from, to, piece).build());
            }
        }

        for from in double_pushable.squares() {
            let to = pawn_double_push_dest(from, self.to_move);

            self.out_moves
                .push(Move::builder(from, to, piece).is_double_pawn_push().build());
        }
    }

    fn pawn_captures(&mut self) {
        let piece = PieceType::Pawn.with_color(self.to_move);
        let pawns = self.board[piece];
        // Already empty when captures are not requested
        let capturable = self.capture_targets;

        let (east_captures, west_captures) = match self.to_move {
            Color::White => (
                white_pawns_able_to_capture_east(pawns, capturable),
                white_pawns_able_to_capture_west(pawns, capturable),
            ),
            Color::Black => (
                black_pawns_able_to_capture_east(pawns, capturable),
                black_pawns_able_to_capture_west(pawns, capturable),
            ),
        };

        for from in east_captures.squares() {
            self.push_pawn_capture(from, pawn_east_capture_dest(from, self.to_move));
        }

        for from in west_captures.squares() {
            self.push_pawn_capture(from, pawn_west_capture_dest(from, self.to_move));
        }
    }

    fn push_pawn_capture(&mut self, from: Square, to: Square) {
        let piece = PieceType::Pawn.with_color(self.to_move);
        let captured = self
            .board
            .piece_with_color_at(self.to_move.flip(), to)
            .unwrap();

        if from.rank() == self.rank_before_promotion() {
            for &promotion in POSSIBLE_PROMOTIONS {
                self.out_moves.push(
                    Move::builder(from, to, piece)
                        .captures(captured)
                        .promotes_to(promotion)
                        .build(),
                );
            }
        } else {
            self.out_moves
                .push(Move::builder(from, to, piece).captures(captured).build());
        }
    }

    fn en_passants(&mut self) {
        if !self.flags.contains(MoveGenFlags::GEN_CAPTURES) {
            return;
        }

        let en_passant = match self.en_passant {
            Some(en_passant) => en_passant,
            None => return,
        };

        let piece = PieceType::Pawn.with_color(self.to_move);
        let pawns = self.board[piece];
        let en_passant_bb = Bitboard::from_square(en_passant);

        let (east_captures, west_captures) = match self.to_move {
            Color::White => (
                white_pawns_able_to_capture_east(pawns, en_passant_bb),
                white_pawns_able_to_capture_west(pawns, en_passant_bb),
            ),
            Color::Black => (
                black_pawns_able_to_capture_east(pawns, en_passant_bb),
                black_pawns_able_to_capture_west(pawns, en_passant_bb),
            ),
        };

        // Whether the capture uncovers an attack on the own king (the classic
        // en passant pin) is for the caller's legality filter to decide.
        let captured = PieceType::Pawn.with_color(self.to_move.flip());

        for from in (east_captures | west_captures).squares() {
            self.out_moves.push(
                Move::builder(from, en_passant, piece)
                    .captures(captured)
                    .is_en_passant()
                    .build(),
            );
        }
    }

    fn rank_before_promotion(&self) -> u8 {
        if self.to_move.is_white() {
            6
        } else {
            1
        }
    }

    pub(super) fn knight_moves(&mut self) {
        self.generic_moves(PieceType::Knight, |lookups, _, from| {
            lookups.get_knight_moves(from)
        });
    }

    pub(super) fn bishop_moves(&mut self) {
        self.generic_moves(PieceType::Bishop, |lookups, occupied, from| {
            lookups.get_bishop_attacks(occupied, from)
        });
    }

    pub(super) fn rook_moves(&mut self) {
        self.generic_moves(PieceType::Rook, |lookups, occupied, from| {
            lookups.get_rook_attacks(occupied, from)
        });
    }

    pub(super) fn queen_moves(&mut self) {
        self.generic_moves(PieceType::Queen, |lookups, occupied, from| {
            lookups.get_queen_attacks(occupied, from)
        });
    }

    pub(super) fn king_moves(&mut self) {
        self.generic_moves(PieceType::King, |lookups, _, from| {
            lookups.get_king_moves(from)
        });
    }

    // Works for every piece except pawns: get_attack_pattern receives the
    // occupied squares and the source square and returns the attack pattern.
    fn generic_moves<F>(&mut self, piece_type: PieceType, get_attack_pattern: F)
    where
        F: Fn(&Lookups, Bitboard, Square) -> Bitboard,
    {
        let piece = piece_type.with_color(self.to_move);
        let pieces = self.board[piece];

        for from in pieces.squares() {
            let attack_pattern = get_attack_pattern(self.lookups, self.occupied, from);

            for to in (attack_pattern & self.push_targets).squares() {
                self.out_moves.push(Move::builder(from, to, piece).build());
            }

            for to in (attack_pattern & self.capture_targets).squares() {
                self.out_moves.push(
                    Move::builder(from, to, piece)
                        .captures(
                            self.board
                                .piece_with_color_at(self.to_move.flip(), to)
                                .unwrap(),
                        )
                        .build(),
                );
            }
        }
    }
}

fn pawn_push_dest(square: Square, color: Color) -> Square {
    square.offset(match color {
        Color::White => 8,
        Color::Black => -8,
    })
}

fn pawn_double_push_dest(square: Square, color: Color) -> Square {
    square.offset(match color {
        Color::White => 16,
        Color::Black => -16,
    })
}

fn pawn_east_capture_dest(square: Square, color: Color) -> Square {
    square.offset(match color {
        Color::White => 9,
        Color::Black => -7,
    })
}

fn pawn_west_capture_dest(square: Square, color: Color) -> Square {
    square.offset(match color {
        Color::White => 7,
        Color::Black => -9,
    })
}

fn white_pawns_able_to_push(white_pawns: Bitboard, can_push_into: Bitboard) -> Bitboard {
    can_push_into.step_south() & white_pawns
}

fn white_pawns_able_to_double_push(white_pawns: Bitboard, empty: Bitboard) -> Bitboard {
    let can_push_into_on_rank_3 = (Bitboard::RANK_4 & empty).step_south() & empty;
    white_pawns_able_to_push(white_pawns, can_push_into_on_rank_3)
}

fn white_pawns_able_to_capture_east(
    white_pawns: Bitboard,
    capturable_pieces: Bitboard,
) -> Bitboard {
    white_pawns & capturable_pieces.step_south_west()
}

fn white_pawns_able_to_capture_west(
    white_pawns: Bitboard,
    capturable_pieces: Bitboard,
) -> Bitboard {
    white_pawns & capturable_pieces.step_south_east()
}

fn black_pawns_able_to_push(black_pawns: Bitboard, can_push_into: Bitboard) -> Bitboard {
    can_push_into.step_north() & black_pawns
}

fn black_pawns_able_to_double_push(black_pawns: Bitboard, empty: Bitboard) -> Bitboard {
    let can_push_into_on_rank_6 = (Bitboard::RANK_5 & empty).step_north() & empty;
    black_pawns_able_to_push(black_pawns, can_push_into_on_rank_6)
}

fn black_pawns_able_to_capture_east(
    black_pawns: Bitboard,
    capturable_pieces: Bitboard,
) -> Bitboard {
    black_pawns & capturable_pieces.step_north_west()
}

fn black_pawns_able_to_capture_west(
    black_pawns: Bitboard,
    capturable_pieces: Bitboard,
) -> Bitboard {
    black_pawns & capturable_pieces.step_north_east()
}

pub fn white_pawn_attacks(white_pawns: Bitboard) -> Bitboard {
    white_pawns.step_north_east() | white_pawns.step_north_west()
}

pub fn black_pawn_attacks(black_pawns: Bitboard) -> Bitboard {
    black_pawns.step_south_east() | black_pawns.step_south_west()
}
