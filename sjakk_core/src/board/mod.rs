//! Board state and the apply/undo machinery.

mod bitboard;
mod board_repr;
mod castling;
mod coord_move;
mod fen;
mod move_repr;
mod piece;
mod square;
mod zobrist;

pub use bitboard::Bitboard;
pub use board_repr::BoardRepr;
pub use castling::Castling;
pub use coord_move::{CoordMove, ParseCoordMoveError};
pub use fen::FenError;
pub use move_repr::{Move, MoveBuilder, MoveFlags};
pub use piece::{Color, Piece, PieceType};
pub use square::Square;
pub use zobrist::ZobristHash;

use crate::move_gen::{lookups::Lookups, MoveGenFlags, MoveGenerator, MoveVec};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Side information captured when a move is applied, sufficient to reverse it
/// exactly. Stored in the board's journal; never recomputed.
#[derive(Debug, Clone, Copy)]
struct MoveRecord {
    played: Move,
    castling: Castling,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    hash: ZobristHash,
}

/// A full chess position.
///
/// Combines the piece placement ([`BoardRepr`]) with the side to move,
/// castling rights, en passant target, move clocks and the incrementally
/// maintained [`ZobristHash`].
///
/// The position is mutated only through [`Board::push_move_unchecked`] /
/// [`Board::pop_move`] pairs, which must be strictly nested; every push
/// journals the state it destroys so the pop can restore it bit-for-bit.
/// Cloning the board yields a fully isolated snapshot (including the journal
/// and repetition history), which is how a search worker takes ownership of a
/// position.
#[derive(Debug, Clone)]
pub struct Board {
    board: BoardRepr,
    to_move: Color,
    castling: Castling,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmoves: u32,
    hash: ZobristHash,
    history: Vec<MoveRecord>,
    /// Hashes of all prior positions, newest last, for repetition detection.
    position_history: Vec<ZobristHash>,
}

impl Board {
    pub fn new(
        board: [Option<Piece>; 64],
        to_move: Color,
        castling: Castling,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmoves: u32,
    ) -> Self {
        let board = BoardRepr::new(&board);
        let hash = Self::compute_hash(&board, to_move, castling, en_passant);

        Self {
            board,
            to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmoves,
            hash,
            history: Vec::new(),
            position_history: Vec::new(),
        }
    }

    pub fn starting_position() -> Self {
        Self::try_parse_fen(STARTING_POSITION_FEN).unwrap()
    }

    pub fn fen(&self) -> String {
        fen::board_to_fen(self)
    }

    pub fn try_parse_fen(fen: &str) -> Result<Self, FenError> {
        fen::try_parse_fen(fen)
    }

    pub fn repr(&self) -> &BoardRepr {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.piece_at(square)
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn castling(&self) -> Castling {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmoves(&self) -> u32 {
        self.fullmoves
    }

    pub fn zobrist_hash(&self) -> ZobristHash {
        self.hash
    }

    fn compute_hash(
        board: &BoardRepr,
        to_move: Color,
        castling: Castling,
        en_passant: Option<Square>,
    ) -> ZobristHash {
        let mut hash = ZobristHash::default();
        for (piece, square) in board.pieces() {
            hash ^= ZobristHash::piece(piece, square);
        }
        hash ^= ZobristHash::color(to_move);
        hash ^= ZobristHash::castling(castling);
        hash ^= ZobristHash::en_passant(en_passant);
        hash
    }

    fn king_square(&self, color: Color) -> Square {
        self.board[PieceType::King.with_color(color)]
            .to_square()
            .expect("position has no king")
    }

    /// Returns true if any piece of `by` attacks `square`.
    pub fn square_attacked_by(&self, square: Square, by: Color) -> bool {
        let lookups = Lookups::get_instance();
        let occupied = self.board.occupied();
        let b = Bitboard::from_square(square);

        // A square is attacked by a pawn of `by` if such a pawn sits where a
        // pawn of the opposite color on `square` could capture.
        let pawn_pattern = match by {
            Color::White => b.step_south_east() | b.step_south_west(),
            Color::Black => b.step_north_east() | b.step_north_west(),
        };
        if (pawn_pattern & self.board[PieceType::Pawn.with_color(by)]).has_piece() {
            return true;
        }

        if (lookups.get_knight_moves(square) & self.board[PieceType::Knight.with_color(by)])
            .has_piece()
        {
            return true;
        }

        if (lookups.get_king_moves(square) & self.board[PieceType::King.with_color(by)])
            .has_piece()
        {
            return true;
        }

        let queens = self.board[PieceType::Queen.with_color(by)];

        if (lookups.get_bishop_attacks(occupied, square)
            & (self.board[PieceType::Bishop.with_color(by)] | queens))
            .has_piece()
        {
            return true;
        }

        if (lookups.get_rook_attacks(occupied, square)
            & (self.board[PieceType::Rook.with_color(by)] | queens))
            .has_piece()
        {
            return true;
        }

        false
    }

    fn king_attacked(&self, color: Color) -> bool {
        self.square_attacked_by(self.king_square(color), color.flip())
    }

    /// Returns true if the side to move is in check.
    pub fn is_in_check(&self) -> bool {
        self.king_attacked(self.to_move)
    }

    /// Generates all pseudo-legal moves: moves obeying piece movement rules
    /// that may still leave the mover's own king attacked.
    pub fn pseudo_legal_moves(&self) -> MoveVec {
        let mut moves = MoveVec::new();
        self.pseudo_legal_moves_ex(MoveGenFlags::default(), &mut moves);
        moves
    }

    pub fn pseudo_legal_moves_ex(&self, flags: MoveGenFlags, out_moves: &mut MoveVec) {
        MoveGenerator::new(
            &self.board,
            self.to_move,
            self.en_passant,
            self.castling,
            flags,
            out_moves,
        )
        .generate();
    }

    /// Generates all fully legal moves: the pseudo-legal set filtered by a
    /// check-safety test. A position with no legal moves yields an empty
    /// vector; whether that is checkmate or stalemate can be determined with
    /// [`Board::is_in_check`].
    pub fn legal_moves(&mut self) -> MoveVec {
        let mut moves = MoveVec::new();
        self.legal_moves_ex(MoveGenFlags::default(), &mut moves);
        moves
    }

    pub fn legal_moves_ex(&mut self, flags: MoveGenFlags, out_moves: &mut MoveVec) {
        let mut pseudo_legal = MoveVec::new();
        self.pseudo_legal_moves_ex(flags, &mut pseudo_legal);

        let mover = self.to_move;
        for m in pseudo_legal {
            self.push_move_unchecked(m);
            if !self.king_attacked(mover) {
                out_moves.push(m);
            }
            self.pop_move();
        }
    }

    /// Finds the legal move matching `from`/`to`/`promotion` and plays it.
    /// Returns [`None`], leaving the board untouched, if no legal move
    /// matches.
    pub fn push_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Option<Move> {
        let matching = self.legal_moves().into_iter().find(|m| {
            m.from_square() == from
                && m.to_square() == to
                && m.promotion().map(|p| p.piece_type()) == promotion
        })?;

        self.push_move_unchecked(matching);
        Some(matching)
    }

    /// Convenience form of [`Board::push_move`] for wire moves.
    pub fn push_coord_move(&mut self, m: CoordMove) -> Option<Move> {
        self.push_move(m.from, m.to, m.promotion)
    }

    /// Plays a move on the board.
    ///
    /// The move must come from this position's legal (or at least
    /// pseudo-legal) move set; applying anything else is a caller-side
    /// contract violation and corrupts the position. Debug builds verify the
    /// incremental hash against a from-scratch recomputation after every
    /// push.
    pub fn push_move_unchecked(&mut self, m: Move) {
        self.history.push(MoveRecord {
            played: m,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });
        self.position_history.push(self.hash);

        let color = self.to_move;
        let from = m.from_square();
        let to = m.to_square();
        let piece = m.piece();

        self.board.move_unchecked(m);

        // Piece placement hash updates, mirroring BoardRepr::move_unchecked.
        self.hash ^= ZobristHash::piece(piece, from);
        match m.promotion() {
            Some(promotion) => self.hash ^= ZobristHash::piece(promotion, to),
            None => self.hash ^= ZobristHash::piece(piece, to),
        }
        if m.is_en_passant() {
            let captured = m.captured_piece().expect("en passant always captures");
            self.hash ^= ZobristHash::piece(captured, m.en_passant_square());
        } else if let Some(captured) = m.captured_piece() {
            self.hash ^= ZobristHash::piece(captured, to);
        }
        if m.is_castle() {
            let rook = PieceType::Rook.with_color(color);
            let (rook_from, rook_to) = m.castling_rook_squares();
            self.hash ^= ZobristHash::piece(rook, rook_from);
            self.hash ^= ZobristHash::piece(rook, rook_to);
        }

        let new_castling =
            self.castling & !(Castling::square_mask(from) | Castling::square_mask(to));
        if new_castling != self.castling {
            self.hash ^= ZobristHash::castling(self.castling);
            self.hash ^= ZobristHash::castling(new_castling);
            self.castling = new_castling;
        }

        let new_en_passant = if m.is_double_pawn_push() {
            Some(Square::new_unchecked((from.rank() + to.rank()) / 2, from.file()))
        } else {
            None
        };
        if new_en_passant != self.en_passant {
            self.hash ^= ZobristHash::en_passant(self.en_passant);
            self.hash ^= ZobristHash::en_passant(new_en_passant);
            self.en_passant = new_en_passant;
        }

        self.halfmove_clock = if m.is_reversible() {
            self.halfmove_clock + 1
        } else {
            0
        };
        if color.is_black() {
            self.fullmoves += 1;
        }
        self.to_move = color.flip();
        self.hash ^= ZobristHash::color(Color::Black);

        debug_assert_eq!(
            self.hash,
            Self::compute_hash(&self.board, self.to_move, self.castling, self.en_passant),
            "incremental hash diverged after {m:?}"
        );
    }

    /// Undoes the most recent [`Board::push_move_unchecked`], restoring the
    /// exact prior position from the journal. Returns the move that was
    /// undone, or [`None`] if there is nothing to undo.
    pub fn pop_move(&mut self) -> Option<Move> {
        let record = self.history.pop()?;
        self.position_history.pop();

        self.to_move = self.to_move.flip();
        if self.to_move.is_black() {
            self.fullmoves -= 1;
        }

        // The XOR board update is self-inverse.
        self.board.move_unchecked(record.played);

        self.castling = record.castling;
        self.en_passant = record.en_passant;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;

        Some(record.played)
    }

    /// Returns true if the current position has already occurred at least
    /// `times` times.
    ///
    /// Only positions since the last irreversible move (bounded by the
    /// halfmove clock) can repeat, so the scan is limited to that window.
    pub fn current_position_repeated_at_least(&self, times: usize) -> bool {
        let window = (self.halfmove_clock as usize).min(self.position_history.len());

        let mut count = 0;
        for &hash in self.position_history.iter().rev().take(window) {
            if hash == self.hash {
                count += 1;
                if count >= times {
                    return true;
                }
            }
        }

        false
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

/// Position equality: everything but the move journal and repetition
/// history. Two boards reached via different move orders compare equal if
/// they describe the same position.
impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.to_move == other.to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmoves == other.fullmoves
            && self.hash == other.hash
    }
}

impl Eq for Board {}
