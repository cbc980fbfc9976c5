//! Lookup tables and lookup table generation functions.

use std::sync::OnceLock;

use num_traits::FromPrimitive;

use crate::board::{Bitboard, Square};

use super::bitboard_utils::{
    bishop_attacks, king_moves, knight_attacks, rook_attacks, unblocked_ray_attacks, Direction,
};

/// Lookup tables used by move generation and attack queries.
///
/// Provides attack patterns for knights and kings, blocker-aware sliding
/// attacks for bishops, rooks and queens, and the squares in between two
/// squares on a shared line.
///
/// The tables are populated once on first use and cached for the rest of the
/// program; [`Lookups::get_instance`] returns the cached `&'static Lookups`.
pub struct Lookups {
    knight_moves: [Bitboard; 64],
    king_moves: [Bitboard; 64],
    ray_attacks: [[Bitboard; 8]; 64],
    in_between: [[Bitboard; 64]; 64],
}

static LOOKUPS: OnceLock<Lookups> = OnceLock::new();

impl Lookups {
    fn new() -> Self {
        let knight_moves = gen_knight_moves();
        let king_moves = gen_king_moves();
        let ray_attacks = gen_ray_attacks();
        let in_between = gen_in_between(&ray_attacks);

        Self {
            knight_moves,
            king_moves,
            ray_attacks,
            in_between,
        }
    }

    /// Returns the global [`Lookups`] instance, populating the tables on the
    /// first call.
    pub fn get_instance() -> &'static Self {
        LOOKUPS.get_or_init(Self::new)
    }

    /// All knight moves originating from the given square.
    pub fn get_knight_moves(&self, square: Square) -> Bitboard {
        self.knight_moves[square.index()]
    }

    /// All king moves originating from the given square.
    pub fn get_king_moves(&self, square: Square) -> Bitboard {
        self.king_moves[square.index()]
    }

    /// All rook moves originating from the given square. The first occupied
    /// square encountered in each direction blocks the ray and is included
    /// in the result.
    pub fn get_rook_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        rook_attacks(occupied, square, &self.ray_attacks)
    }

    /// All bishop moves originating from the given square. The first
    /// occupied square encountered in each direction blocks the ray and is
    /// included in the result.
    pub fn get_bishop_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        bishop_attacks(occupied, square, &self.ray_attacks)
    }

    /// All queen moves originating from the given square; the union of the
    /// rook and bishop attacks.
    pub fn get_queen_attacks(&self, occupied: Bitboard, square: Square) -> Bitboard {
        self.get_rook_attacks(occupied, square) | self.get_bishop_attacks(occupied, square)
    }

    /// The squares strictly between `from` and `to`, if the two share a
    /// rank, file or diagonal; the empty bitboard otherwise.
    pub fn get_in_between(&self, from: Square, to: Square) -> Bitboard {
        self.in_between[from.index()][to.index()]
    }
}

/// Generates the knight move lookup table, indexed by square index.
pub fn gen_knight_moves() -> [Bitboard; 64] {
    let mut moves = [Bitboard::default(); 64];
    for (i, moves_from_square) in moves.iter_mut().enumerate() {
        *moves_from_square = knight_attacks(Bitboard::from_index(i as u8));
    }
    moves
}

/// Generates the king move lookup table, indexed by square index.
pub fn gen_king_moves() -> [Bitboard; 64] {
    let mut moves = [Bitboard::default(); 64];
    for (i, moves_from_square) in moves.iter_mut().enumerate() {
        *moves_from_square = king_moves(Bitboard::from_index(i as u8));
    }
    moves
}

/// Generates the ray attack table, indexed by square index and then by
/// [`Direction`].
pub fn gen_ray_attacks() -> [[Bitboard; 8]; 64] {
    let mut attacks = [[Bitboard::default(); 8]; 64];

    for (i, attacks_from_square) in attacks.iter_mut().enumerate() {
        let base = Bitboard::from_index(i as u8);

        for (dir, attacks_in_dir) in attacks_from_square.iter_mut().enumerate() {
            let dir_enum = Direction::from_usize(dir).unwrap();
            *attacks_in_dir = unblocked_ray_attacks(base, dir_enum)
        }
    }

    attacks
}

/// Generates the in-between squares table from a valid ray attack table (see
/// [`gen_ray_attacks`]).
pub fn gen_in_between(ray_attacks: &[[Bitboard; 8]; 64]) -> [[Bitboard; 64]; 64] {
    let mut table = [[Bitboard::default(); 64]; 64];

    for from in 0..64 {
        // Scanning the four positive directions fills both triangle halves
        // of the table, since in-between is symmetric.
        for dir in 0..4 {
            let ray = ray_attacks[from][dir];
            for to in ray.bits() {
                let to = to as usize;
                let ray_between = ray ^ ray_attacks[to][dir] ^ Bitboard::from_index(to as u8);
                table[from][to] = ray_between;
                table[to][from] = ray_between;
            }
        }
    }

    table
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookups_get_knight_moves() {
        let lookups = Lookups::get_instance();

        assert_eq!(
            lookups.get_knight_moves(Square::D4),
            "
                . . . . . . . .
                . . . . . . . .
                . . # . # . . .
                . # . . . # . .
                . . . . . . . .
                . # . . . # . .
                . . # . # . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn lookups_get_king_moves() {
        let lookups = Lookups::get_instance();

        assert_eq!(
            lookups.get_king_moves(Square::D4),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . # # # . . .
                . . # . # . . .
                . . # # # . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn lookups_get_queen_attacks() {
        let lookups = Lookups::get_instance();
        let occupied = "
                . . . . . . . .
                . . . . . . . .
                . . . . # . . .
                . . . # . . . .
                . . . . # # # .
                . . . # . . . .
                . . # . # . . .
                . . . . . . . .
        "
        .parse()
        .unwrap();
        assert_eq!(
            lookups.get_queen_attacks(occupied, Square::E4),
            "
                . . . . . . . .
                . . . . . . . #
                . . . . # . # .
                . . . # # # . .
                # # # # . # . .
                . . . # # # . .
                . . . . # . # .
                . . . . . . . #
            "
            .parse()
            .unwrap(),
        );
    }

    #[test]
    fn lookups_get_in_between() {
        let lookups = Lookups::get_instance();

        assert_eq!(
            lookups.get_in_between(Square::B4, Square::B8),
            "
                . . . . . . . .
                . # . . . . . .
                . # . . . . . .
                . # . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
        assert_eq!(
            lookups.get_in_between(Square::B8, Square::B4),
            lookups.get_in_between(Square::B4, Square::B8),
        );

        assert_eq!(
            lookups.get_in_between(Square::B7, Square::H1),
            "
                . . . . . . . .
                . . . . . . . .
                . . # . . . . .
                . . . # . . . .
                . . . . # . . .
                . . . . . # . .
                . . . . . . # .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            lookups.get_in_between(Square::C3, Square::G1),
            Bitboard::EMPTY
        );
    }
}
