use std::{
    fmt::Debug,
    ops::{BitXor, BitXorAssign},
    sync::OnceLock,
};

use rand::{RngCore, SeedableRng};

use super::{Castling, Color, Piece, Square};

/// Position-identity hash, maintained incrementally as moves are played.
///
/// Built by XOR-ing together table entries for every piece placement, the
/// side to move, the castling rights and the en passant file. Used for
/// repetition detection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ZobristHash(pub u64);

impl ZobristHash {
    pub fn piece(piece: Piece, square: Square) -> Self {
        let instance = ZobristTable::get_instance();
        let index = piece.get() as usize;
        Self(instance.pieces[index * 64 + square.index()])
    }

    pub fn color(color: Color) -> Self {
        let instance = ZobristTable::get_instance();
        match color {
            Color::White => Self(0),
            Color::Black => Self(instance.black),
        }
    }

    pub fn castling(castling: Castling) -> Self {
        let instance = ZobristTable::get_instance();
        let index = castling.bits() as usize;
        Self(instance.castling[index])
    }

    pub fn en_passant(en_passant: Option<Square>) -> Self {
        let instance = ZobristTable::get_instance();
        match en_passant {
            Some(square) => {
                let index = square.file() as usize;
                Self(instance.en_passant[index])
            }
            None => Self(0),
        }
    }
}

impl BitXor for ZobristHash {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Self(self.0 ^ rhs.0)
    }
}

impl BitXorAssign for ZobristHash {
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl Debug for ZobristHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ZobristHash")
            .field(&format_args!("{:#016X}", self.0))
            .finish()
    }
}

struct ZobristTable {
    pieces: [u64; 16 * 64], // a piece fits in a 4-bit integer
    black: u64,
    castling: [u64; 16],
    en_passant: [u64; 8],
}

impl ZobristTable {
    fn new() -> Self {
        // Fixed seed so that hashes are stable across runs.
        let mut rng = rand_chacha::ChaCha12Rng::from_seed([
            0x6b, 0x01, 0xc8, 0x5e, 0x22, 0xd9, 0x40, 0x37, 0xa5, 0x19, 0x7f, 0x04, 0xce, 0x8a,
            0x63, 0xf1, 0x2d, 0x55, 0x90, 0x1b, 0xee, 0x3c, 0x72, 0xa8, 0x0f, 0xc4, 0x36, 0x81,
            0x5a, 0xd0, 0x29, 0x97,
        ]);

        let mut pieces = [0; 16 * 64];
        pieces.fill_with(|| rng.next_u64());

        let black = rng.next_u64();

        let mut castling = [0; 16];
        castling.fill_with(|| rng.next_u64());

        let mut en_passant = [0; 8];
        en_passant.fill_with(|| rng.next_u64());

        Self {
            pieces,
            black,
            castling,
            en_passant,
        }
    }

    pub fn get_instance() -> &'static Self {
        static INSTANCE: OnceLock<ZobristTable> = OnceLock::new();

        INSTANCE.get_or_init(Self::new)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zobrist_hashes_are_stable_and_distinct() {
        let a = ZobristHash::piece(Piece::WHITE_PAWN, Square::E2);
        let b = ZobristHash::piece(Piece::WHITE_PAWN, Square::E2);
        assert_eq!(a, b);

        assert_ne!(a, ZobristHash::piece(Piece::WHITE_PAWN, Square::E4));
        assert_ne!(a, ZobristHash::piece(Piece::BLACK_PAWN, Square::E2));

        assert_eq!(ZobristHash::color(Color::White), ZobristHash(0));
        assert_ne!(ZobristHash::color(Color::Black), ZobristHash(0));

        assert_eq!(ZobristHash::en_passant(None), ZobristHash(0));
        assert_ne!(
            ZobristHash::en_passant(Some(Square::E3)),
            ZobristHash::en_passant(Some(Square::D3))
        );
    }

    #[test]
    fn zobrist_xor_is_self_inverse() {
        let mut hash = ZobristHash(0);
        let piece = ZobristHash::piece(Piece::BLACK_KNIGHT, Square::G8);

        hash ^= piece;
        assert_ne!(hash, ZobristHash(0));
        hash ^= piece;
        assert_eq!(hash, ZobristHash(0));
    }
}
