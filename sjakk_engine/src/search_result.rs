use std::time::Duration;

use sjakk_core::board::Move;

use crate::{score::Score, search_stats::SearchStats};

/// The outcome of one search invocation.
///
/// `best_move` is [`None`] exactly when the root position had no legal
/// moves; every other path through the search yields one of the root's
/// legal moves.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub score: Score,
    pub best_move: Option<Move>,
    pub stats: SearchStats,
    pub elapsed: Duration,
    pub aborted: bool,
}

/// Progress snapshot reported after each fully completed iteration.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u32,
    pub score: Score,
    pub nodes: u64,
    pub elapsed: Duration,
    pub best_move: Move,
}
