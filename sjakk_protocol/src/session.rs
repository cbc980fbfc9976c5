//! The session state machine: turns parsed commands into engine actions.

use std::fmt::Display;
use std::time::Duration;

use sjakk_core::board::{Board, CoordMove};
use sjakk_engine::{
    search_params::{SearchParams, MAX_DEPTH},
    Engine, SearchReporter,
};

use crate::{
    command::{Command, PositionBase, SearchSpec},
    response::Response,
};

pub const ENGINE_NAME: &str = "sjakk";
pub const ENGINE_AUTHOR: &str = "the sjakk developers";

/// The protocol-visible lifecycle of the session.
///
/// Commands are processed strictly in arrival order by the command thread;
/// the transition out of `Searching` is observed lazily, at the next
/// command-processing step after the worker has delivered its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No position set beyond the default starting position.
    #[default]
    Idle,
    PositionSet,
    Searching,
    SearchComplete,
}

/// What the command loop should do after handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Synchronous response lines, in order. Asynchronous output (`info`,
    /// `bestmove`) flows through the session's [`SearchReporter`] instead.
    pub responses: Vec<Response>,
    /// True after `quit`: stop reading commands and exit.
    pub quit: bool,
}

impl Reply {
    fn none() -> Self {
        Self {
            responses: vec![],
            quit: false,
        }
    }

    fn with_responses(responses: Vec<Response>) -> Self {
        Self {
            responses,
            quit: false,
        }
    }

    fn error(message: impl Display) -> Self {
        Self::with_responses(vec![Response::error(message)])
    }
}

/// Owns the current position and the engine, and drives the state machine.
///
/// Commands that would conflict with a running search (`set-position`,
/// `start-search`, `new-game`) are rejected with an error line while in
/// `Searching` -- never queued, never silently dropped. `ready-check` and
/// `identify` answer immediately in any state.
pub struct Session<R> {
    board: Board,
    engine: Engine,
    state: SessionState,
    reporter: R,
}

impl<R: SearchReporter + Clone> Session<R> {
    /// Creates a session holding the standard starting position.
    ///
    /// `reporter` receives the asynchronous output of every search this
    /// session starts; the stdout reporter in `main` formats it into `info`
    /// and `bestmove` lines.
    pub fn new(reporter: R) -> Self {
        Self {
            board: Board::starting_position(),
            engine: Engine::new(),
            state: SessionState::default(),
            reporter,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// A search completes asynchronously; fold that into the state machine
    /// before handling each command.
    fn observe_search_completion(&mut self) {
        if self.state == SessionState::Searching && !self.engine.is_searching() {
            self.state = SessionState::SearchComplete;
        }
    }

    pub fn handle_command(&mut self, command: Command) -> Reply {
        self.observe_search_completion();

        match command {
            Command::Identify => Reply::with_responses(vec![
                Response::IdName(format!("{ENGINE_NAME} {}", env!("CARGO_PKG_VERSION"))),
                Response::IdAuthor(ENGINE_AUTHOR.to_owned()),
                Response::Ok,
            ]),

            Command::ReadyCheck => Reply::with_responses(vec![Response::Ready]),

            Command::NewGame => {
                if self.state == SessionState::Searching {
                    return Reply::error("cannot reset while a search is running");
                }

                self.board = Board::starting_position();
                self.state = SessionState::Idle;
                Reply::none()
            }

            Command::SetPosition { base, moves } => self.set_position(base, &moves),

            Command::StartSearch(spec) => self.start_search(&spec),

            Command::Stop => {
                if self.state != SessionState::Searching {
                    return Reply::error("no search to stop");
                }

                // The pending bestmove line is emitted by the worker as soon
                // as it observes the flag; the state stays Searching until
                // then.
                self.engine.abort_search();
                Reply::none()
            }

            Command::Quit => {
                self.engine.abort_search();
                Reply {
                    responses: vec![],
                    quit: true,
                }
            }
        }
    }

    fn set_position(&mut self, base: PositionBase, moves: &[CoordMove]) -> Reply {
        if self.state == SessionState::Searching {
            return Reply::error("cannot set a position while a search is running");
        }

        // Build the replacement on the side; the held position must stay
        // untouched if any part of the command turns out to be invalid.
        let mut board = match base {
            PositionBase::StartPos => Board::starting_position(),
            PositionBase::Fen(fen) => match Board::try_parse_fen(&fen) {
                Ok(board) => board,
                Err(e) => return Reply::error(format!("invalid position {fen:?}: {e}")),
            },
        };

        for &m in moves {
            if board.push_coord_move(m).is_none() {
                return Reply::error(format!("illegal move {m} in position {}", board.fen()));
            }
        }

        self.board = board;
        self.state = SessionState::PositionSet;
        Reply::none()
    }

    fn start_search(&mut self, spec: &SearchSpec) -> Reply {
        if self.state == SessionState::Searching {
            return Reply::error("a search is already running");
        }

        let params = search_params(spec);
        match self
            .engine
            .start_search(&self.board, params, self.reporter.clone())
        {
            Ok(()) => {
                self.state = SessionState::Searching;
                Reply::none()
            }
            // Unreachable given the state check above, but the transition
            // table is total either way.
            Err(e) => Reply::error(e),
        }
    }
}

/// Maps the wire-level search spec onto engine limits. Absent bounds (and
/// `infinite`) leave the corresponding limit unbounded; such a search runs
/// until `stop`.
fn search_params(spec: &SearchSpec) -> SearchParams {
    SearchParams {
        depth: spec.depth.unwrap_or(MAX_DEPTH),
        mode: spec.mode.unwrap_or_default(),
        allocated_time: match (spec.infinite, spec.movetime) {
            (true, _) | (false, None) => Duration::MAX,
            (false, Some(movetime)) => movetime,
        },
        node_budget: spec.nodes.unwrap_or(u64::MAX),
    }
}
