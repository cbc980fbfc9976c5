//! Bitboard utility functions, primarily for generating and querying the
//! lookup tables.

use num_derive::{FromPrimitive, ToPrimitive};

use crate::board::{Bitboard, Square};

/// A ray direction on the board.
///
/// The discriminants are chosen so that 0..4 are the "positive" directions
/// (rays that grow towards higher square indices) and 4..8 their opposites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum Direction {
    East = 0,
    North = 1,
    NorthEast = 2,
    NorthWest = 3,
    West = 4,
    South = 5,
    SouthWest = 6,
    SouthEast = 7,
}

/// Returns all knight attacks from a bitboard of knights.
pub fn knight_attacks(b: Bitboard) -> Bitboard {
    const NOT_A_FILE: Bitboard = Bitboard::A_FILE.not();
    const NOT_AB_FILE: Bitboard = Bitboard::A_FILE.or(Bitboard::B_FILE).not();
    const NOT_H_FILE: Bitboard = Bitboard::H_FILE.not();
    const NOT_GH_FILE: Bitboard = Bitboard::G_FILE.or(Bitboard::H_FILE).not();

    let mut attacks = Bitboard::EMPTY;

    attacks |= (b << 17) & NOT_A_FILE;
    attacks |= (b << 10) & NOT_AB_FILE;
    attacks |= (b >> 6) & NOT_AB_FILE;
    attacks |= (b >> 15) & NOT_A_FILE;
    attacks |= (b << 15) & NOT_H_FILE;
    attacks |= (b << 6) & NOT_GH_FILE;
    attacks |= (b >> 10) & NOT_GH_FILE;
    attacks |= (b >> 17) & NOT_H_FILE;

    attacks
}

/// Returns all king moves from a bitboard of kings.
pub fn king_moves(b: Bitboard) -> Bitboard {
    let mut attacks = b.step_east() | b.step_west();
    let tmp = b | attacks;
    attacks |= tmp.step_north() | tmp.step_south();

    attacks
}

/// Returns the full, unblocked ray from `b` in the given direction,
/// excluding `b` itself.
pub(super) fn unblocked_ray_attacks(b: Bitboard, dir: Direction) -> Bitboard {
    let step_fn = match dir {
        Direction::East => Bitboard::step_east,
        Direction::North => Bitboard::step_north,
        Direction::NorthEast => Bitboard::step_north_east,
        Direction::NorthWest => Bitboard::step_north_west,
        Direction::West => Bitboard::step_west,
        Direction::South => Bitboard::step_south,
        Direction::SouthWest => Bitboard::step_south_west,
        Direction::SouthEast => Bitboard::step_south_east,
    };

    let mut attacks = step_fn(b);
    loop {
        let new_attacks = attacks | step_fn(attacks);
        if new_attacks == attacks {
            break;
        }
        attacks = new_attacks;
    }

    attacks
}

fn positive_ray_attacks(
    occupied: Bitboard,
    square: Square,
    dir: Direction,
    ray_attacks: &[[Bitboard; 8]; 64],
) -> Bitboard {
    let attacks = ray_attacks[square.index()][dir as usize];
    let blocker = attacks & occupied;
    // The guard bit makes the blocker set non-empty without affecting the
    // result: the ray from h8 in a positive direction is always empty.
    let block_square = (blocker | Bitboard(0x8000000000000000)).lsb().unwrap();
    attacks ^ ray_attacks[block_square as usize][dir as usize]
}

fn negative_ray_attacks(
    occupied: Bitboard,
    square: Square,
    dir: Direction,
    ray_attacks: &[[Bitboard; 8]; 64],
) -> Bitboard {
    let attacks = ray_attacks[square.index()][dir as usize];
    let blocker = attacks & occupied;
    let block_square = (blocker | Bitboard(1)).msb().unwrap();
    attacks ^ ray_attacks[block_square as usize][dir as usize]
}

/// Returns bishop attacks from `square`, truncated at the first occupied
/// square in each direction (which is itself included in the result).
pub fn bishop_attacks(
    occupied: Bitboard,
    square: Square,
    ray_attacks: &[[Bitboard; 8]; 64],
) -> Bitboard {
    positive_ray_attacks(occupied, square, Direction::NorthEast, ray_attacks)
        | positive_ray_attacks(occupied, square, Direction::NorthWest, ray_attacks)
        | negative_ray_attacks(occupied, square, Direction::SouthWest, ray_attacks)
        | negative_ray_attacks(occupied, square, Direction::SouthEast, ray_attacks)
}

/// Returns rook attacks from `square`, truncated at the first occupied
/// square in each direction (which is itself included in the result).
pub fn rook_attacks(
    occupied: Bitboard,
    square: Square,
    ray_attacks: &[[Bitboard; 8]; 64],
) -> Bitboard {
    positive_ray_attacks(occupied, square, Direction::East, ray_attacks)
        | positive_ray_attacks(occupied, square, Direction::North, ray_attacks)
        | negative_ray_attacks(occupied, square, Direction::West, ray_attacks)
        | negative_ray_attacks(occupied, square, Direction::South, ray_attacks)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::move_gen::lookups::gen_ray_attacks;
    use pretty_assertions::assert_eq;

    #[test]
    fn knight_attack_patterns() {
        assert_eq!(
            knight_attacks(Bitboard::from_square(Square::D4)),
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

        assert_eq!(
            knight_attacks(Bitboard::from_square(Square::A1)),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . # . . . . . .
                . . # . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn king_move_patterns() {
        assert_eq!(
            king_moves(Bitboard::from_square(Square::D4)),
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

        assert_eq!(
            king_moves(Bitboard::from_square(Square::H8)),
            "
                . . . . . . # .
                . . . . . . # #
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn unblocked_rays() {
        assert_eq!(
            unblocked_ray_attacks(Bitboard::from_square(Square::C3), Direction::NorthEast),
            "
                . . . . . . . #
                . . . . . . # .
                . . . . . # . .
                . . . . # . . .
                . . . # . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );

        assert_eq!(
            unblocked_ray_attacks(Bitboard::from_square(Square::C3), Direction::West),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                # # . . . . . .
                . . . . . . . .
                . . . . . . . .
            "
            .parse()
            .unwrap()
        );
    }

    #[test]
    fn blocked_rook_attacks() {
        let ray_attacks = gen_ray_attacks();
        let occupied = "
                . . . . . . . .
                . . . . # . . .
                . . . . . . . .
                . . . . # . . .
                . . # . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
        "
        .parse()
        .unwrap();

        assert_eq!(
            rook_attacks(occupied, Square::E4, &ray_attacks),
            "
                . . . . . . . .
                . . . . . . . .
                . . . . . . . .
                . . . . # . . .
                . . # # . # # #
                . . . . # . . .
                . . . . # . . .
                . . . . # . . .
            "
            .parse()
            .unwrap(),
        );
    }

    #[test]
    fn blocked_bishop_attacks() {
        let ray_attacks = gen_ray_attacks();
        let occupied = "
                . . . . . . . .
                . # . . . . . .
                . . . . . . . .
                . . . # . . . .
                . . . . . . . .
                . . . . . . . .
                . . # . . . . .
                . . . . . . . .
        "
        .parse()
        .unwrap();

        assert_eq!(
            bishop_attacks(occupied, Square::E4, &ray_attacks),
            "
                . . . . . . . .
                . . . . . . . #
                . . . . . . # .
                . . . # . # . .
                . . . . . . . .
                . . . # . # . .
                . . # . . . # .
                . . . . . . . #
            "
            .parse()
            .unwrap(),
        );
    }
}
