//! The search engine: evaluation, iterative-deepening alpha-beta search,
//! and the [`Engine`] front object that runs searches on a worker thread.

use std::sync::{
    atomic::{AtomicBool, Ordering as AtomicOrdering},
    Arc,
};

use sjakk_core::board::Board;
use thiserror::Error;

use search::SearchContext;
use search_params::SearchParams;
use search_result::{SearchInfo, SearchResult};

pub mod evaluation;
pub mod move_ordering;
pub mod score;
pub mod search;
pub mod search_params;
pub mod search_result;
pub mod search_stats;

/// Returned when a search is requested while one is already running; the
/// engine never runs two workers concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a search is already in progress")]
pub struct SearchInProgress;

/// Owns the lifecycle of at most one concurrently running search.
///
/// [`Engine::start_search`] snapshots the board and hands it to a dedicated
/// worker thread, returning immediately; results flow back through the
/// caller's [`SearchReporter`]. The single cancellation flag is the only
/// state shared with the worker for writing, and an atomic active flag makes
/// spawning a second concurrent worker impossible by construction.
pub struct Engine {
    curr_abort_flag: Arc<AtomicBool>,
    search_active: Arc<AtomicBool>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            curr_abort_flag: Arc::new(AtomicBool::new(false)),
            search_active: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a search worker is currently running. The flag is cleared by
    /// the worker itself, after it has delivered its result.
    pub fn is_searching(&self) -> bool {
        self.search_active.load(AtomicOrdering::SeqCst)
    }

    /// Starts a search over a snapshot of `board` on a worker thread.
    ///
    /// Per-depth progress and the final result are delivered through
    /// `reporter`, from the worker thread; exactly one
    /// [`SearchReporter::search_complete`] call is made per started search.
    pub fn start_search(
        &mut self,
        board: &Board,
        params: SearchParams,
        reporter: impl SearchReporter,
    ) -> Result<(), SearchInProgress> {
        if self.search_active.swap(true, AtomicOrdering::SeqCst) {
            return Err(SearchInProgress);
        }

        let mut board = board.clone();

        self.curr_abort_flag = Arc::new(AtomicBool::new(false));
        let abort_flag = Arc::clone(&self.curr_abort_flag);
        let search_active = Arc::clone(&self.search_active);

        std::thread::spawn(move || {
            let ctx = SearchContext::new(&mut board, params, &abort_flag);

            let result = ctx.iterative_deepening_search(|info| {
                reporter.receive_search_info(info);
            });

            reporter.search_complete(result);

            search_active.store(false, AtomicOrdering::SeqCst);
        });

        Ok(())
    }

    /// Requests cancellation of the running search, if any. Cancellation is
    /// cooperative: the worker exits through its next poll point and still
    /// reports a result.
    pub fn abort_search(&self) {
        self.curr_abort_flag.store(true, AtomicOrdering::Relaxed);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.abort_search();
    }
}

/// Receives search progress and the final result, on the worker thread.
pub trait SearchReporter: Send + Sync + 'static {
    fn receive_search_info(&self, info: SearchInfo);
    fn search_complete(&self, result: SearchResult);
}

/// Discards everything. Useful for benchmarks and tests.
pub struct NullReporter;

impl SearchReporter for NullReporter {
    fn receive_search_info(&self, _info: SearchInfo) {}
    fn search_complete(&self, _result: SearchResult) {}
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::mpsc::{channel, Sender};
    use std::sync::Mutex;
    use std::time::Duration;

    enum Report {
        Info(SearchInfo),
        Complete(SearchResult),
    }

    #[derive(Clone)]
    struct ChannelReporter {
        sender: Arc<Mutex<Sender<Report>>>,
    }

    impl ChannelReporter {
        fn new() -> (Self, std::sync::mpsc::Receiver<Report>) {
            let (sender, receiver) = channel();
            (
                Self {
                    sender: Arc::new(Mutex::new(sender)),
                },
                receiver,
            )
        }
    }

    impl SearchReporter for ChannelReporter {
        fn receive_search_info(&self, info: SearchInfo) {
            let _ = self.sender.lock().unwrap().send(Report::Info(info));
        }

        fn search_complete(&self, result: SearchResult) {
            let _ = self.sender.lock().unwrap().send(Report::Complete(result));
        }
    }

    const RESULT_TIMEOUT: Duration = Duration::from_secs(30);

    fn wait_for_result(receiver: &std::sync::mpsc::Receiver<Report>) -> SearchResult {
        loop {
            match receiver.recv_timeout(RESULT_TIMEOUT) {
                Ok(Report::Complete(result)) => return result,
                Ok(Report::Info(_)) => continue,
                Err(e) => panic!("no search result within the timeout: {e}"),
            }
        }
    }

    #[test]
    fn search_delivers_exactly_one_result() {
        let (reporter, receiver) = ChannelReporter::new();
        let mut engine = Engine::new();
        let board = Board::starting_position();

        engine
            .start_search(&board, SearchParams::with_depth(2), reporter)
            .unwrap();

        let result = wait_for_result(&receiver);
        assert!(result.best_move.is_some());

        // After completion the engine is free again, and nothing further
        // arrives on the channel.
        while engine.is_searching() {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(
            receiver.recv_timeout(Duration::from_millis(100)),
            Err(_)
        ));
    }

    #[test]
    fn concurrent_search_is_rejected() {
        let (reporter, receiver) = ChannelReporter::new();
        let mut engine = Engine::new();
        let board = Board::starting_position();

        engine
            .start_search(&board, SearchParams::infinite(), reporter.clone())
            .unwrap();

        // The active flag is set synchronously, so this cannot race.
        assert_eq!(
            engine.start_search(&board, SearchParams::infinite(), reporter),
            Err(SearchInProgress)
        );

        engine.abort_search();
        let result = wait_for_result(&receiver);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn abort_stops_an_unbounded_search() {
        let (reporter, receiver) = ChannelReporter::new();
        let mut engine = Engine::new();
        let mut board = Board::starting_position();
        let legal = board.legal_moves();

        engine
            .start_search(&board, SearchParams::infinite(), reporter)
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        engine.abort_search();

        let result = wait_for_result(&receiver);
        assert!(legal.contains(&result.best_move.unwrap()));
    }
}
