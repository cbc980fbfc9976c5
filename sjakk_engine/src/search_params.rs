use std::{str::FromStr, time::Duration};

use thiserror::Error;

/// Hard ceiling on the iterative deepening depth.
pub const MAX_DEPTH: u32 = 64;

/// Which search pipeline to run.
///
/// A closed set of named strategies, selected once per search invocation;
/// the search consults it at the pruning and horizon decision points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Alpha-beta with full move ordering and a quiescence extension that
    /// resolves captures at the horizon.
    #[default]
    Full,
    /// Alpha-beta with move ordering, static evaluation at the horizon.
    AlphaBeta,
    /// Full-width negamax without pruning. Exists as a reference and
    /// debugging mode; orders of magnitude slower at equal depth.
    Minimax,
}

impl SearchMode {
    /// Whether beta cutoffs are taken.
    pub const fn prunes(self) -> bool {
        !matches!(self, SearchMode::Minimax)
    }

    /// Whether horizon nodes are extended with a quiescence search.
    pub const fn extends_captures(self) -> bool {
        matches!(self, SearchMode::Full)
    }

    pub const fn name(self) -> &'static str {
        match self {
            SearchMode::Full => "full",
            SearchMode::AlphaBeta => "alphabeta",
            SearchMode::Minimax => "minimax",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown search mode {0:?}")]
pub struct ParseSearchModeError(String);

impl FromStr for SearchMode {
    type Err = ParseSearchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(SearchMode::Full),
            "alphabeta" => Ok(SearchMode::AlphaBeta),
            "minimax" => Ok(SearchMode::Minimax),
            _ => Err(ParseSearchModeError(s.to_owned())),
        }
    }
}

/// Bounds for one search invocation. Immutable once handed to the search.
///
/// Every bound defaults to "unbounded"; an unbounded search runs until the
/// depth ceiling or an external abort.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Iterative deepening bound in plies; values are clamped to
    /// `1..=MAX_DEPTH`.
    pub depth: u32,
    pub mode: SearchMode,
    pub allocated_time: Duration,
    pub node_budget: u64,
}

impl SearchParams {
    pub fn infinite() -> Self {
        Self {
            depth: MAX_DEPTH,
            mode: SearchMode::default(),
            allocated_time: Duration::MAX,
            node_budget: u64::MAX,
        }
    }

    pub fn with_depth(depth: u32) -> Self {
        Self {
            depth,
            ..Self::infinite()
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::infinite()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mode_names_round_trip() {
        for mode in [SearchMode::Full, SearchMode::AlphaBeta, SearchMode::Minimax] {
            assert_eq!(mode.name().parse(), Ok(mode));
        }

        assert!("negamax".parse::<SearchMode>().is_err());
    }

    #[test]
    fn mode_pipeline_switches() {
        assert!(SearchMode::Full.prunes());
        assert!(SearchMode::Full.extends_captures());
        assert!(SearchMode::AlphaBeta.prunes());
        assert!(!SearchMode::AlphaBeta.extends_captures());
        assert!(!SearchMode::Minimax.prunes());
        assert!(!SearchMode::Minimax.extends_captures());
    }
}
