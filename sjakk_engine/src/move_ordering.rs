//! Move ordering: the better the first move tried, the more of the tree
//! alpha-beta gets to skip.

use sjakk_core::{
    board::{Move, Piece},
    move_gen::MoveVec,
};

// Plies deeper than this simply go without killers (the derived Default
// for arrays also stops at 32).
const MAX_KILLER_PLIES: usize = 32;

/// Quiet moves that recently caused beta cutoffs, per ply. Trying them early
/// pays off because sibling nodes tend to fail high on the same refutation.
#[derive(Default)]
pub struct KillerTable {
    buckets: [KillerBucket; MAX_KILLER_PLIES],
}

#[derive(Default, Clone, Copy)]
struct KillerBucket {
    killers: [Option<Move>; 2],
}

impl KillerTable {
    pub fn store(&mut self, ply_from_root: u16, m: Move) {
        if let Some(bucket) = self.buckets.get_mut(ply_from_root as usize) {
            bucket.store(m)
        }
    }

    pub fn is_killer(&self, ply_from_root: u16, m: Move) -> bool {
        self.buckets
            .get(ply_from_root as usize)
            .map(|bucket| bucket.contains(m))
            .unwrap_or(false)
    }
}

impl KillerBucket {
    fn store(&mut self, m: Move) {
        if self.contains(m) {
            return;
        }

        // Insert at the front, shifting the rest up and discarding the last
        let mut tmp = Some(m);
        for entry in self.killers.iter_mut() {
            std::mem::swap(&mut tmp, entry);
        }
    }

    fn contains(&self, m: Move) -> bool {
        self.killers.iter().any(|killer| *killer == Some(m))
    }
}

/// Streaming move picker: yields the hint move first, then the remaining
/// moves by descending heuristic score (winning captures by MVV-LVA, then
/// promotions, then killers, then quiet moves).
///
/// Scores are computed lazily on the first non-hint pick, so a node that
/// cuts off on the hint move never pays for scoring.
pub struct OrderedMoves {
    moves: MoveVec,
    hint: Option<Move>,
    scores: Vec<i32>,
}

impl OrderedMoves {
    const WINNING_CAPTURE_BIAS: i32 = 8_000_000;
    const PROMOTION_BIAS: i32 = 6_000_000;
    const KILLER_BIAS: i32 = 4_000_000;
    const QUIET_BIAS: i32 = 0;

    /// `hint` is the move to try before all others, typically the best move
    /// of the previous iteration; it is ignored if not present in `moves`.
    pub fn new(moves: MoveVec, hint: Option<Move>) -> Self {
        Self {
            moves,
            hint,
            scores: Vec::new(),
        }
    }

    pub fn next_move(&mut self, ply_from_root: u16, killers: &KillerTable) -> Option<Move> {
        if let Some(hint) = self.hint.take() {
            if let Some(idx) = self.moves.iter().position(|&m| m == hint) {
                self.moves.swap_remove(idx);
                return Some(hint);
            }
        }

        if self.moves.is_empty() {
            return None;
        }

        if self.scores.is_empty() {
            self.scores = self
                .moves
                .iter()
                .map(|&m| Self::score_move(ply_from_root, killers, m))
                .collect();
        }

        let mut max_idx = 0;
        let mut max_score = self.scores[0];

        for i in 1..self.scores.len() {
            if self.scores[i] > max_score {
                max_idx = i;
                max_score = self.scores[i];
            }
        }

        self.scores.swap_remove(max_idx);
        Some(self.moves.swap_remove(max_idx))
    }

    fn score_move(ply_from_root: u16, killers: &KillerTable, m: Move) -> i32 {
        if let Some(victim) = m.captured_piece() {
            Self::WINNING_CAPTURE_BIAS + Self::mvv_lva_score(victim, m.piece())
        } else if m.promotion().is_some() {
            Self::PROMOTION_BIAS
        } else if killers.is_killer(ply_from_root, m) {
            Self::KILLER_BIAS
        } else {
            Self::QUIET_BIAS
        }
    }

    fn mvv_lva_score(victim: Piece, aggressor: Piece) -> i32 {
        // Most valuable victim (* 10 to make sure it always outranks the
        // aggressor part)
        (victim.piece_type() as i32) * 10
        // Least valuable aggressor
        - (aggressor.piece_type() as i32)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sjakk_core::board::{PieceType, Square};

    fn quiet(from: Square, to: Square) -> Move {
        Move::builder(from, to, Piece::WHITE_KNIGHT).build()
    }

    #[test]
    fn hint_move_comes_first() {
        let mut moves = MoveVec::new();
        moves.push(quiet(Square::B1, Square::C3));
        moves.push(quiet(Square::G1, Square::F3));
        let hint = quiet(Square::G1, Square::F3);

        let mut ordered = OrderedMoves::new(moves, Some(hint));
        let killers = KillerTable::default();

        assert_eq!(ordered.next_move(0, &killers), Some(hint));
        assert_eq!(
            ordered.next_move(0, &killers),
            Some(quiet(Square::B1, Square::C3))
        );
        assert_eq!(ordered.next_move(0, &killers), None);
    }

    #[test]
    fn captures_before_quiet_moves_by_victim_value() {
        let queen_capture = Move::builder(Square::D1, Square::D8, Piece::WHITE_QUEEN)
            .captures(Piece::BLACK_QUEEN)
            .build();
        let pawn_capture = Move::builder(Square::E4, Square::D5, Piece::WHITE_PAWN)
            .captures(Piece::BLACK_PAWN)
            .build();

        let mut moves = MoveVec::new();
        moves.push(quiet(Square::B1, Square::C3));
        moves.push(pawn_capture);
        moves.push(queen_capture);

        let mut ordered = OrderedMoves::new(moves, None);
        let killers = KillerTable::default();

        assert_eq!(ordered.next_move(0, &killers), Some(queen_capture));
        assert_eq!(ordered.next_move(0, &killers), Some(pawn_capture));
        assert_eq!(
            ordered.next_move(0, &killers),
            Some(quiet(Square::B1, Square::C3))
        );
    }

    #[test]
    fn equal_victims_prefer_cheaper_aggressor() {
        let rook_takes = Move::builder(Square::A1, Square::A8, Piece::WHITE_ROOK)
            .captures(Piece::BLACK_ROOK)
            .build();
        let pawn_takes = Move::builder(Square::B7, Square::A8, Piece::WHITE_PAWN)
            .captures(Piece::BLACK_ROOK)
            .promotes_to(PieceType::Queen)
            .build();

        let mut moves = MoveVec::new();
        moves.push(rook_takes);
        moves.push(pawn_takes);

        let mut ordered = OrderedMoves::new(moves, None);
        let killers = KillerTable::default();

        assert_eq!(ordered.next_move(0, &killers), Some(pawn_takes));
        assert_eq!(ordered.next_move(0, &killers), Some(rook_takes));
    }

    #[test]
    fn killers_before_other_quiet_moves() {
        let killer = quiet(Square::G1, Square::F3);
        let other = quiet(Square::B1, Square::C3);

        let mut killers = KillerTable::default();
        killers.store(3, killer);
        assert!(killers.is_killer(3, killer));
        assert!(!killers.is_killer(2, killer));

        let mut moves = MoveVec::new();
        moves.push(other);
        moves.push(killer);

        let mut ordered = OrderedMoves::new(moves, None);
        assert_eq!(ordered.next_move(3, &killers), Some(killer));
        assert_eq!(ordered.next_move(3, &killers), Some(other));
    }

    #[test]
    fn killer_buckets_keep_the_two_most_recent(){
        let first = quiet(Square::A1, Square::A2);
        let second = quiet(Square::B1, Square::B2);
        let third = quiet(Square::C1, Square::C2);

        let mut killers = KillerTable::default();
        killers.store(0, first);
        killers.store(0, second);
        assert!(killers.is_killer(0, first));
        assert!(killers.is_killer(0, second));

        killers.store(0, third);
        assert!(killers.is_killer(0, third));
        assert!(killers.is_killer(0, second));
        assert!(!killers.is_killer(0, first));

        // Re-storing an existing killer does not evict the other
        killers.store(0, third);
        assert!(killers.is_killer(0, second));
    }
}
