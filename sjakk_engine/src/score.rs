use std::{
    fmt::{Display, Write},
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

/// A search score in centipawns, from the perspective of the side to move.
///
/// Mate scores occupy a band of large magnitudes well above any material
/// evaluation: a mate in `n` plies scores `MATE_SCORE - n`, so shorter mates
/// compare greater than longer ones. Draws (stalemate, repetition, the
/// fifty-move rule) score zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Score(pub i64);

impl Score {
    // Not i64::MAX so that negating and adding small numbers cannot
    // overflow.
    pub const INF: Self = Self(999_999_999);

    pub const DRAW: Self = Self(0);

    const MATE_SCORE: i64 = 20_000_000;
    const MATE_THRESHOLD: i64 = 1_000_000;

    pub const fn get(self) -> i64 {
        self.0
    }

    /// The score for delivering mate `ply_from_root` plies from the root.
    pub const fn mate_in_plies(ply_from_root: u16) -> Self {
        Self(Self::MATE_SCORE - ply_from_root as i64)
    }

    pub const fn is_mate(self) -> bool {
        self.0.abs() > Self::MATE_THRESHOLD
    }

    /// If this is a mate score, the signed number of plies to mate: positive
    /// when the side to move mates, negative when it is being mated.
    pub const fn as_mate_in_plies(self) -> Option<i64> {
        if self.is_mate() {
            let plies = Self::MATE_SCORE - self.0.abs();
            Some(plies * self.0.signum())
        } else {
            None
        }
    }

    /// If this is a mate score, the signed number of full moves to mate, as
    /// conventionally reported to a controller.
    pub const fn as_mate_in(self) -> Option<i64> {
        match self.as_mate_in_plies() {
            Some(plies) => Some((plies + plies.signum()) / 2),
            None => None,
        }
    }

    /// The score in centipawns, unless it is a mate score.
    pub const fn as_centipawns(self) -> Option<i64> {
        if self.is_mate() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl Add for Score {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add<i64> for Score {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl AddAssign for Score {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs
    }
}

impl Neg for Score {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sub for Score {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub<i64> for Score {
    type Output = Self;

    fn sub(self, rhs: i64) -> Self::Output {
        Self(self.0 - rhs)
    }
}

impl SubAssign for Score {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = self.0.signum();
        let val = self.0.abs();

        f.write_char(if sign >= 0 { '+' } else { '-' })?;

        if val > Self::MATE_THRESHOLD {
            let plies_to_mate = Self::MATE_SCORE - val;
            let moves_to_mate = (plies_to_mate + 1) / 2;
            write!(f, "M{moves_to_mate}")
        } else {
            let pawn_advantage = val as f64 / 100.0;
            write!(f, "{pawn_advantage:.2}")
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shorter_mates_score_higher() {
        assert!(Score::mate_in_plies(1) > Score::mate_in_plies(3));
        assert!(Score::mate_in_plies(3) > Score(500));
        assert!(-Score::mate_in_plies(2) < Score(-500));
        assert!(Score::mate_in_plies(1) < Score::INF);
    }

    #[test]
    fn mate_classification() {
        assert!(Score::mate_in_plies(5).is_mate());
        assert!((-Score::mate_in_plies(5)).is_mate());
        assert!(!Score(350).is_mate());
        assert!(!Score::DRAW.is_mate());

        assert_eq!(Score::mate_in_plies(3).as_mate_in_plies(), Some(3));
        assert_eq!((-Score::mate_in_plies(3)).as_mate_in_plies(), Some(-3));
        assert_eq!(Score(42).as_mate_in_plies(), None);

        assert_eq!(Score::mate_in_plies(1).as_mate_in(), Some(1));
        assert_eq!(Score::mate_in_plies(3).as_mate_in(), Some(2));
        assert_eq!((-Score::mate_in_plies(2)).as_mate_in(), Some(-1));

        assert_eq!(Score(42).as_centipawns(), Some(42));
        assert_eq!(Score::mate_in_plies(1).as_centipawns(), None);
    }

    #[test]
    fn score_display() {
        assert_eq!(Score(150).to_string(), "+1.50");
        assert_eq!(Score(-25).to_string(), "-0.25");
        assert_eq!(Score::mate_in_plies(3).to_string(), "+M2");
        assert_eq!((-Score::mate_in_plies(4)).to_string(), "-M2");
    }
}
