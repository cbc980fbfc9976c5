use thiserror::Error;

use super::{Board, Castling, Color, Piece, PieceType, Square};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 6 whitespace-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("expected 8 ranks in the piece placement field, got {0}")]
    WrongRankCount(usize),
    #[error("invalid character {0:?} in the piece placement field")]
    InvalidPlacement(char),
    #[error("rank {0:?} does not describe exactly 8 files")]
    WrongFileCount(String),
    #[error("each side must have exactly one king")]
    WrongKingCount,
    #[error("invalid side to move {0:?}")]
    InvalidSideToMove(String),
    #[error("invalid castling field {0:?}")]
    InvalidCastling(String),
    #[error("invalid en passant field {0:?}")]
    InvalidEnPassant(String),
    #[error("invalid halfmove clock {0:?}")]
    InvalidHalfmoveClock(String),
    #[error("invalid fullmove counter {0:?}")]
    InvalidFullmoves(String),
}

pub fn board_to_fen(board: &Board) -> String {
    let mut result = String::new();

    for rank in (0..8).rev() {
        let mut empty_squares = 0;
        for file in 0..8 {
            let square = Square::new_unchecked(rank, file);
            match board.piece_at(square) {
                None => empty_squares += 1,
                Some(piece) => {
                    if empty_squares > 0 {
                        result.push((empty_squares + b'0') as _);
                    }
                    result.push(piece.as_fen_char());
                    empty_squares = 0;
                }
            }
        }
        if empty_squares > 0 {
            result.push((empty_squares + b'0') as _);
        }
        if rank > 0 {
            result.push('/');
        }
    }

    result.push(' ');
    result.push(if board.to_move().is_white() { 'w' } else { 'b' });
    result.push(' ');
    result.push_str(&board.castling().as_fen_str());
    result.push(' ');
    match board.en_passant() {
        Some(square) => result.push_str(&square.to_string()),
        None => result.push('-'),
    };
    result.push(' ');
    result.push_str(&board.halfmove_clock().to_string());
    result.push(' ');
    result.push_str(&board.fullmoves().to_string());

    result
}

pub fn try_parse_fen(fen: &str) -> Result<Board, FenError> {
    let fields: Vec<_> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::WrongFieldCount(fields.len()));
    }
    let placement = fields[0];
    let to_move = fields[1];
    let castling = fields[2];
    let en_passant = fields[3];
    let halfmove_clock = fields[4];
    let fullmoves = fields[5];

    let ranks: Vec<_> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::WrongRankCount(ranks.len()));
    }

    let mut board = [None; 64];
    for (rank_index, rank_pieces) in ranks.into_iter().enumerate() {
        let rank = 7 - rank_index as u8;
        let mut file = 0;
        for c in rank_pieces.chars() {
            if file >= 8 {
                return Err(FenError::WrongFileCount(rank_pieces.to_owned()));
            }

            if let Some(digit) = c.to_digit(10) {
                file += digit as u8;
            } else {
                let piece =
                    Piece::try_from_fen_char(c).ok_or(FenError::InvalidPlacement(c))?;
                let index = Square::new_unchecked(rank, file).index();
                board[index] = Some(piece);

                file += 1;
            }
        }

        if file != 8 {
            return Err(FenError::WrongFileCount(rank_pieces.to_owned()));
        }
    }

    let kings = board
        .iter()
        .flatten()
        .filter(|piece| piece.piece_type() == PieceType::King);
    if kings.clone().filter(|king| king.is_white()).count() != 1
        || kings.filter(|king| king.is_black()).count() != 1
    {
        return Err(FenError::WrongKingCount);
    }

    let to_move = match to_move {
        "w" => Color::White,
        "b" => Color::Black,
        _ => return Err(FenError::InvalidSideToMove(to_move.to_owned())),
    };

    let castling = if castling == "-" {
        Castling::empty()
    } else {
        let mut flags = Castling::empty();
        for c in castling.chars() {
            match c {
                'K' => flags |= Castling::WHITE_KINGSIDE,
                'Q' => flags |= Castling::WHITE_QUEENSIDE,
                'k' => flags |= Castling::BLACK_KINGSIDE,
                'q' => flags |= Castling::BLACK_QUEENSIDE,
                _ => return Err(FenError::InvalidCastling(castling.to_owned())),
            }
        }
        flags
    };

    let en_passant = if en_passant == "-" {
        None
    } else {
        Some(
            en_passant
                .parse()
                .map_err(|_| FenError::InvalidEnPassant(en_passant.to_owned()))?,
        )
    };

    let halfmove_clock = halfmove_clock
        .parse()
        .map_err(|_| FenError::InvalidHalfmoveClock(halfmove_clock.to_owned()))?;
    let fullmoves = fullmoves
        .parse()
        .map_err(|_| FenError::InvalidFullmoves(fullmoves.to_owned()))?;

    Ok(Board::new(
        board,
        to_move,
        castling,
        en_passant,
        halfmove_clock,
        fullmoves,
    ))
}
