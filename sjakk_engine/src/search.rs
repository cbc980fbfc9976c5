//! Iterative deepening driver and the negamax tree search.

use std::{
    sync::atomic::{AtomicBool, Ordering as AtomicOrdering},
    time::Instant,
};

use sjakk_core::{
    board::{Board, Move},
    move_gen::{MoveGenFlags, MoveVec},
};

use crate::{
    evaluation::evaluate,
    move_ordering::{KillerTable, OrderedMoves},
    score::Score,
    search_params::{SearchParams, MAX_DEPTH},
    search_result::{SearchInfo, SearchResult},
    search_stats::SearchStats,
};

/// State for a single search invocation.
///
/// Owns the board for the duration of the search; the only state shared with
/// the outside world is the cancellation flag, which is polled cooperatively
/// (per root move, and every couple thousand nodes inside the tree). The
/// search always exits through a poll point with the board fully unwound.
pub struct SearchContext<'a> {
    board: &'a mut Board,
    params: SearchParams,
    start_time: Instant,
    stats: SearchStats,
    time_up: bool,
    abort_flag: &'a AtomicBool,
    killers: KillerTable,
    best_root_move: Option<Move>,
    root_ordering_hint: Option<Move>,
}

impl<'a> SearchContext<'a> {
    pub fn new(board: &'a mut Board, params: SearchParams, abort_flag: &'a AtomicBool) -> Self {
        Self {
            board,
            params,
            start_time: Instant::now(),
            stats: SearchStats::new(),
            time_up: false,
            abort_flag,
            killers: KillerTable::default(),
            best_root_move: None,
            root_ordering_hint: None,
        }
    }

    fn over_node_budget(&self) -> bool {
        self.stats.nodes_searched >= self.params.node_budget
    }

    /// Cheap poll for use inside the tree: the actual clock and flag reads
    /// are gated behind a node counter.
    fn should_exit_search(&mut self) -> bool {
        self.check_limits(false) || self.over_node_budget()
    }

    /// Ungated poll for the root move loop and the deepening driver.
    fn should_exit_search_now(&mut self) -> bool {
        self.check_limits(true) || self.over_node_budget()
    }

    fn check_limits(&mut self, force: bool) -> bool {
        if self.time_up {
            return true;
        }

        // Avoid syscalls a bit
        if !force && self.stats.nodes_searched % 2048 != 0 {
            return false;
        }

        self.time_up = self.abort_flag.load(AtomicOrdering::Relaxed)
            || self.start_time.elapsed() >= self.params.allocated_time;

        self.time_up
    }

    /// True if the most recent iteration may have been cut short, in which
    /// case its result must not supersede the last completed one.
    fn search_interrupted(&self) -> bool {
        self.time_up || self.over_node_budget()
    }

    /// Runs the search: depth 1 up to the configured bound, reporting each
    /// fully completed iteration through `on_depth_completed`.
    ///
    /// If the root position has no legal moves the sentinel (`best_move:
    /// None`) is returned immediately; this is the only way the sentinel is
    /// produced. Otherwise the returned move is a legal root move -- on
    /// cancellation, the best move of the deepest fully completed iteration,
    /// falling back to the partial iteration's best and finally to the first
    /// ordered root move if not even depth 1 completed.
    pub fn iterative_deepening_search(
        mut self,
        mut on_depth_completed: impl FnMut(SearchInfo),
    ) -> SearchResult {
        let root_moves = self.board.legal_moves();

        if root_moves.is_empty() {
            let score = if self.board.is_in_check() {
                // Mated on the spot
                -Score::mate_in_plies(0)
            } else {
                // Stalemate
                Score::DRAW
            };

            return SearchResult {
                score,
                best_move: None,
                stats: self.stats,
                elapsed: self.start_time.elapsed(),
                aborted: false,
            };
        }

        let mut best_move = None;
        let mut best_score = Score::DRAW;
        let max_depth = self.params.depth.clamp(1, MAX_DEPTH) as i16;

        for depth in 1..=max_depth {
            self.best_root_move = None;
            let score = self.negamax(depth, 0, -Score::INF, Score::INF);

            if self.search_interrupted() {
                // The cut-short iteration may not have considered every root
                // move; its best is only better than having nothing at all.
                if best_move.is_none() {
                    best_move = self.best_root_move.take();
                }
                break;
            }

            if let Some(m) = self.best_root_move.take() {
                best_move = Some(m);
                best_score = score;
                self.stats.depth = depth as u32;
                self.root_ordering_hint = best_move;

                on_depth_completed(SearchInfo {
                    depth: depth as u32,
                    score,
                    nodes: self.stats.nodes_searched,
                    elapsed: self.start_time.elapsed(),
                    best_move: m,
                });
            }

            // A forced mate within the horizon cannot be improved by looking
            // deeper.
            if let Some(plies) = score.as_mate_in_plies() {
                if plies.unsigned_abs() <= depth as u64 {
                    break;
                }
            }

            if self.should_exit_search_now() {
                break;
            }
        }

        // Interrupted before even depth 1 finished a single root move;
        // any legal move beats forfeiting.
        let best_move = best_move.or_else(|| root_moves.first().copied());

        SearchResult {
            score: best_score,
            best_move,
            stats: self.stats,
            elapsed: self.start_time.elapsed(),
            aborted: self.abort_flag.load(AtomicOrdering::Relaxed),
        }
    }

    fn negamax(&mut self, depth: i16, ply_from_root: u16, mut alpha: Score, beta: Score) -> Score {
        // Draw detection comes first so repeated lines are not re-expanded.
        if ply_from_root > 0
            && (self.board.halfmove_clock() >= 100
                || self
                    .board
                    .current_position_repeated_at_least(if ply_from_root >= 2 { 1 } else { 2 }))
        {
            return Score::DRAW;
        }

        let legal_moves = self.board.legal_moves();
        if legal_moves.is_empty() {
            return if self.board.is_in_check() {
                // Checkmate; deduct the ply so nearer mates score higher
                -Score::mate_in_plies(ply_from_root)
            } else {
                // Stalemate
                Score::DRAW
            };
        }

        if depth <= 0 {
            return if self.params.mode.extends_captures() {
                self.quiescence(ply_from_root, alpha, beta)
            } else {
                self.stats.nodes_searched += 1;
                evaluate(self.board)
            };
        }

        self.stats.nodes_searched += 1;

        let hint = if ply_from_root == 0 {
            self.root_ordering_hint
        } else {
            None
        };
        let mut ordered_moves = OrderedMoves::new(legal_moves, hint);

        let mut best_score = -Score::INF;

        while let Some(m) = ordered_moves.next_move(ply_from_root, &self.killers) {
            self.board.push_move_unchecked(m);
            let eval = -self.negamax(depth - 1, ply_from_root + 1, -beta, -alpha);
            self.board.pop_move();

            // Cooperative cancellation: leave through the poll point with
            // the best fully evaluated move. The subtree we just left may
            // have been cut short, so its value is discarded.
            let exit = if ply_from_root == 0 {
                self.should_exit_search_now()
            } else {
                depth > 1 && self.should_exit_search()
            };
            if exit {
                return best_score;
            }

            if eval > best_score {
                best_score = eval;
                if ply_from_root == 0 {
                    self.best_root_move = Some(m);
                }
            }

            if eval > alpha {
                alpha = eval;

                if self.params.mode.prunes() && alpha >= beta {
                    // Beta cutoff
                    self.stats.beta_cutoffs += 1;
                    if !m.is_capture() {
                        self.killers.store(ply_from_root, m);
                    }
                    break;
                }
            }
        }

        best_score
    }

    /// Resolves captures past the horizon until the position is quiet, so
    /// that the evaluation is never taken in the middle of an exchange.
    fn quiescence(&mut self, ply_from_root: u16, mut alpha: Score, beta: Score) -> Score {
        self.stats.nodes_searched += 1;
        self.stats.quiescence_nodes += 1;

        // Standing pat: the side to move is rarely forced to capture.
        let mut best_score = evaluate(self.board);
        if best_score >= beta {
            self.stats.beta_cutoffs += 1;
            return best_score;
        }
        alpha = alpha.max(best_score);

        let mut capturing_moves = MoveVec::new();
        self.board
            .legal_moves_ex(MoveGenFlags::GEN_CAPTURES, &mut capturing_moves);

        let mut ordered_moves = OrderedMoves::new(capturing_moves, None);

        while let Some(m) = ordered_moves.next_move(ply_from_root, &self.killers) {
            self.board.push_move_unchecked(m);
            let eval = -self.quiescence(ply_from_root + 1, -beta, -alpha);
            self.board.pop_move();

            if self.should_exit_search() {
                return best_score;
            }

            if eval > best_score {
                best_score = eval;
            }

            if eval > alpha {
                alpha = eval;

                if alpha >= beta {
                    self.stats.beta_cutoffs += 1;
                    break;
                }
            }
        }

        best_score
    }
}
