use std::fmt::Display;

use sjakk_core::board::CoordMove;
use sjakk_engine::{
    score::Score,
    search_result::{SearchInfo, SearchResult},
};

/// One protocol response line. The [`Display`] impl produces exactly the
/// line that goes on the wire, without a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    IdName(String),
    IdAuthor(String),
    /// The ready-acknowledgement terminating an `identify` exchange.
    Ok,
    /// The answer to a `ready-check`.
    Ready,
    /// Per-depth search progress.
    Info {
        depth: u32,
        score: Score,
        nodes: u64,
        time_ms: u128,
        nps: u64,
    },
    /// The single final answer of a search. [`None`] means the position had
    /// no legal moves, reported as `bestmove (none)`.
    BestMove(Option<CoordMove>),
    Error(String),
}

impl Response {
    pub fn info(info: &SearchInfo) -> Self {
        let time_ms = info.elapsed.as_millis();
        let nps = 1000 * info.nodes / (time_ms as u64).max(1);

        Self::Info {
            depth: info.depth,
            score: info.score,
            nodes: info.nodes,
            time_ms,
            nps,
        }
    }

    pub fn best_move(result: &SearchResult) -> Self {
        Self::BestMove(result.best_move.map(CoordMove::from))
    }

    pub fn error(message: impl Display) -> Self {
        Self::Error(message.to_string())
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::IdName(name) => write!(f, "id name {name}"),
            Response::IdAuthor(author) => write!(f, "id author {author}"),
            Response::Ok => write!(f, "ok"),
            Response::Ready => write!(f, "ready"),

            Response::Info {
                depth,
                score,
                nodes,
                time_ms,
                nps,
            } => {
                write!(f, "info depth {depth} score ")?;
                match score.as_mate_in() {
                    Some(moves) => write!(f, "mate {moves}")?,
                    None => write!(f, "cp {}", score.get())?,
                }
                write!(f, " nodes {nodes} time {time_ms} nps {nps}")
            }

            Response::BestMove(Some(m)) => write!(f, "bestmove {m}"),
            Response::BestMove(None) => write!(f, "bestmove (none)"),

            Response::Error(message) => write!(f, "error {message}"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_lines() {
        assert_eq!(
            Response::IdName("sjakk 0.1.0".to_owned()).to_string(),
            "id name sjakk 0.1.0"
        );
        assert_eq!(Response::Ok.to_string(), "ok");
        assert_eq!(Response::Ready.to_string(), "ready");
        assert_eq!(
            Response::BestMove(Some("e2e4".parse().unwrap())).to_string(),
            "bestmove e2e4"
        );
        assert_eq!(Response::BestMove(None).to_string(), "bestmove (none)");
        assert_eq!(
            Response::error("unknown command \"foo\"").to_string(),
            "error unknown command \"foo\""
        );
    }

    #[test]
    fn info_lines() {
        assert_eq!(
            Response::Info {
                depth: 5,
                score: Score(123),
                nodes: 40_000,
                time_ms: 200,
                nps: 200_000,
            }
            .to_string(),
            "info depth 5 score cp 123 nodes 40000 time 200 nps 200000"
        );

        assert_eq!(
            Response::Info {
                depth: 3,
                score: Score::mate_in_plies(3),
                nodes: 1000,
                time_ms: 10,
                nps: 100_000,
            }
            .to_string(),
            "info depth 3 score mate 2 nodes 1000 time 10 nps 100000"
        );
    }
}
