use std::{str::FromStr, time::Duration};

use sjakk_core::board::CoordMove;
use sjakk_engine::search_params::SearchMode;
use thiserror::Error;

/// One protocol command, parsed from one input line.
///
/// Commands are case-sensitive, whitespace-separated token sequences; see
/// the variant docs for the accepted argument forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `identify`
    Identify,

    /// `ready-check`
    ReadyCheck,

    /// `new-game`
    NewGame,

    /// `set-position (startpos | <fen>) [moves <move>...]`
    SetPosition {
        base: PositionBase,
        moves: Vec<CoordMove>,
    },

    /// `start-search [depth N] [movetime MS] [nodes N] [mode <mode>] [infinite]`
    StartSearch(SearchSpec),

    /// `stop`
    Stop,

    /// `quit`
    Quit,
}

/// The base position of a `set-position` command, before move replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionBase {
    StartPos,
    Fen(String),
}

/// The parsed arguments of a `start-search` command. Absent bounds leave
/// the corresponding search limit unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchSpec {
    pub depth: Option<u32>,
    pub movetime: Option<Duration>,
    pub nodes: Option<u64>,
    pub mode: Option<SearchMode>,
    pub infinite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("empty command line")]
    Empty,
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),
    #[error("missing value for {0:?}")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} for {arg:?}")]
    InvalidValue { arg: &'static str, value: String },
    #[error("invalid move {0:?}")]
    InvalidMove(String),
    #[error("missing position description")]
    MissingPosition,
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        let (&head, rest) = tokens.split_first().ok_or(ParseCommandError::Empty)?;

        match head {
            "identify" => no_args(Command::Identify, rest),
            "ready-check" => no_args(Command::ReadyCheck, rest),
            "new-game" => no_args(Command::NewGame, rest),
            "set-position" => parse_set_position(rest),
            "start-search" => parse_start_search(rest),
            "stop" => no_args(Command::Stop, rest),
            "quit" => no_args(Command::Quit, rest),
            _ => Err(ParseCommandError::UnknownCommand(head.to_owned())),
        }
    }
}

fn no_args(command: Command, rest: &[&str]) -> Result<Command, ParseCommandError> {
    match rest.first() {
        None => Ok(command),
        Some(&arg) => Err(ParseCommandError::UnexpectedArgument(arg.to_owned())),
    }
}

fn parse_set_position(tokens: &[&str]) -> Result<Command, ParseCommandError> {
    let moves_at = tokens
        .iter()
        .position(|&t| t == "moves")
        .unwrap_or(tokens.len());
    let (base_tokens, move_tokens) = tokens.split_at(moves_at);
    let move_tokens = move_tokens.get(1..).unwrap_or(&[]);

    let base = match base_tokens {
        [] => return Err(ParseCommandError::MissingPosition),
        ["startpos"] => PositionBase::StartPos,
        // FEN contains internal whitespace, so the base is everything up to
        // the `moves` keyword. Whether it actually parses is decided when
        // the command is applied.
        fen_tokens => PositionBase::Fen(fen_tokens.join(" ")),
    };

    let mut moves = Vec::with_capacity(move_tokens.len());
    for &token in move_tokens {
        moves.push(
            token
                .parse()
                .map_err(|_| ParseCommandError::InvalidMove(token.to_owned()))?,
        );
    }

    Ok(Command::SetPosition { base, moves })
}

fn parse_start_search(mut tokens: &[&str]) -> Result<Command, ParseCommandError> {
    let mut spec = SearchSpec::default();

    while let Some((&head, rest)) = tokens.split_first() {
        tokens = rest;

        match head {
            "depth" => spec.depth = Some(next_value("depth", &mut tokens)?),
            "movetime" => {
                spec.movetime = Some(Duration::from_millis(next_value("movetime", &mut tokens)?))
            }
            "nodes" => spec.nodes = Some(next_value("nodes", &mut tokens)?),
            "mode" => spec.mode = Some(next_value("mode", &mut tokens)?),
            "infinite" => spec.infinite = true,
            _ => return Err(ParseCommandError::UnexpectedArgument(head.to_owned())),
        }
    }

    Ok(Command::StartSearch(spec))
}

fn next_value<T: FromStr>(
    arg: &'static str,
    tokens: &mut &[&str],
) -> Result<T, ParseCommandError> {
    let (&raw, rest) = tokens
        .split_first()
        .ok_or(ParseCommandError::MissingValue(arg))?;
    *tokens = rest;

    raw.parse().map_err(|_| ParseCommandError::InvalidValue {
        arg,
        value: raw.to_owned(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_bare_commands() {
        assert_eq!("identify".parse(), Ok(Command::Identify));
        assert_eq!("ready-check".parse(), Ok(Command::ReadyCheck));
        assert_eq!("new-game".parse(), Ok(Command::NewGame));
        assert_eq!("stop".parse(), Ok(Command::Stop));
        assert_eq!("quit".parse(), Ok(Command::Quit));

        // Leading/trailing whitespace is fine; stray arguments are not
        assert_eq!("  stop  ".parse(), Ok(Command::Stop));
        assert_eq!(
            "quit now".parse::<Command>(),
            Err(ParseCommandError::UnexpectedArgument("now".to_owned()))
        );
    }

    #[test]
    fn parse_failures() {
        assert_eq!("".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!(
            "isready".parse::<Command>(),
            Err(ParseCommandError::UnknownCommand("isready".to_owned()))
        );
        // Tokens are case-sensitive
        assert_eq!(
            "Stop".parse::<Command>(),
            Err(ParseCommandError::UnknownCommand("Stop".to_owned()))
        );
    }

    #[test]
    fn parse_set_position_startpos() {
        assert_eq!(
            "set-position startpos".parse(),
            Ok(Command::SetPosition {
                base: PositionBase::StartPos,
                moves: vec![],
            })
        );

        assert_eq!(
            "set-position startpos moves e2e4 e7e5".parse(),
            Ok(Command::SetPosition {
                base: PositionBase::StartPos,
                moves: vec!["e2e4".parse().unwrap(), "e7e5".parse().unwrap()],
            })
        );
    }

    #[test]
    fn parse_set_position_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

        assert_eq!(
            format!("set-position {fen}").parse(),
            Ok(Command::SetPosition {
                base: PositionBase::Fen(fen.to_owned()),
                moves: vec![],
            })
        );

        assert_eq!(
            format!("set-position {fen} moves a7a8q").parse(),
            Ok(Command::SetPosition {
                base: PositionBase::Fen(fen.to_owned()),
                moves: vec!["a7a8q".parse().unwrap()],
            })
        );
    }

    #[test]
    fn parse_set_position_failures() {
        assert_eq!(
            "set-position".parse::<Command>(),
            Err(ParseCommandError::MissingPosition)
        );
        assert_eq!(
            "set-position startpos moves e2e9".parse::<Command>(),
            Err(ParseCommandError::InvalidMove("e2e9".to_owned()))
        );
    }

    #[test]
    fn parse_start_search() {
        assert_eq!(
            "start-search".parse(),
            Ok(Command::StartSearch(SearchSpec::default()))
        );

        assert_eq!(
            "start-search depth 6 movetime 2000 nodes 100000 mode alphabeta".parse(),
            Ok(Command::StartSearch(SearchSpec {
                depth: Some(6),
                movetime: Some(Duration::from_millis(2000)),
                nodes: Some(100_000),
                mode: Some(SearchMode::AlphaBeta),
                infinite: false,
            }))
        );

        assert_eq!(
            "start-search infinite".parse(),
            Ok(Command::StartSearch(SearchSpec {
                infinite: true,
                ..Default::default()
            }))
        );
    }

    #[test]
    fn parse_start_search_failures() {
        assert_eq!(
            "start-search depth".parse::<Command>(),
            Err(ParseCommandError::MissingValue("depth"))
        );
        assert_eq!(
            "start-search depth six".parse::<Command>(),
            Err(ParseCommandError::InvalidValue {
                arg: "depth",
                value: "six".to_owned()
            })
        );
        assert_eq!(
            "start-search mode fast".parse::<Command>(),
            Err(ParseCommandError::InvalidValue {
                arg: "mode",
                value: "fast".to_owned()
            })
        );
        assert_eq!(
            "start-search ponder".parse::<Command>(),
            Err(ParseCommandError::UnexpectedArgument("ponder".to_owned()))
        );
    }
}
