//! Compact move-history strings.
//!
//! Squares map to the 64 characters `A-Z a-z 0-9 + /` by index. A move whose
//! destination only one own figure can legally reach is written as that
//! destination alone; any other move (castling included) as origin then
//! destination. Promotions append the piece letter. Decoding replays the
//! moves: a first character naming a square with an own figure on it starts
//! the two-character form, because no move ends on an own figure except
//! castling, which is always written in full.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_rules::StartConfig;
use crate::game_state::chess_types::{PieceKind, Position};
use crate::moves::chess_move::Move;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

#[inline]
fn square_char(position: Position) -> char {
    ALPHABET[position.index()] as char
}

fn char_square(c: char) -> ChessResult<Position> {
    ALPHABET
        .iter()
        .position(|&b| b as char == c)
        .and_then(Position::from_index)
        .ok_or_else(|| ChessError::CompactHistory(format!("invalid character '{c}'")))
}

/// Origins of the legal non-castling moves ending on `to`, without
/// duplicates from promotion variants.
fn origins_reaching(board: &Board, legal: &[Move], to: Position) -> Vec<Position> {
    let mut origins: Vec<Position> = Vec::new();
    for mv in legal.iter().filter(|mv| mv.to() == to && !board.is_castling(**mv)) {
        if !origins.contains(&mv.from()) {
            origins.push(mv.from());
        }
    }
    origins
}

/// Encodes `moves`, played from `start`, into a compact string.
pub fn encode(start: &StartConfig, moves: &[Move]) -> ChessResult<String> {
    let mut board = Board::new(start)?;
    let mut out = String::with_capacity(moves.len() * 2);

    for (ply, &mv) in moves.iter().enumerate() {
        let legal = board.legal_moves();
        if !legal.contains(&mv) {
            return Err(ChessError::CompactHistory(format!(
                "move {mv} at ply {ply} is not legal"
            )));
        }
        let unique = !board.is_castling(mv) && origins_reaching(&board, &legal, mv.to()).len() == 1;
        if !unique {
            out.push(square_char(mv.from()));
        }
        out.push(square_char(mv.to()));
        if let Some(kind) = mv.promotion() {
            out.push(kind.letter());
        }
        board.apply_move(mv)?;
    }
    Ok(out)
}

/// Decodes a string produced by [`encode`] for the same `start`.
pub fn decode(start: &StartConfig, text: &str) -> ChessResult<Vec<Move>> {
    let mut board = Board::new(start)?;
    let mut chars = text.chars();
    let mut moves = Vec::new();

    while let Some(first) = chars.next() {
        let truncated = || ChessError::CompactHistory(format!("truncated after {} move(s)", moves.len()));
        let legal = board.legal_moves();
        let square = char_square(first)?;
        let own = board
            .figure_at(square)
            .is_some_and(|figure| figure.color() == board.side_to_move());

        let (from, to) = if own {
            let to = char_square(chars.next().ok_or_else(truncated)?)?;
            (square, to)
        } else {
            match origins_reaching(&board, &legal, square).as_slice() {
                [from] => (*from, square),
                [] => {
                    return Err(ChessError::CompactHistory(format!(
                        "no move reaches {square} at ply {}",
                        moves.len()
                    )))
                }
                _ => {
                    return Err(ChessError::CompactHistory(format!(
                        "ambiguous destination {square} at ply {}",
                        moves.len()
                    )))
                }
            }
        };

        let promotes = board
            .figure_at(from)
            .is_some_and(|figure| figure.kind() == PieceKind::Pawn)
            && to.row() == board.side_to_move().promotion_row();
        let mv = if promotes {
            let letter = chars.next().ok_or_else(truncated)?;
            let kind = PieceKind::from_promotion_letter(letter).ok_or_else(|| {
                ChessError::CompactHistory(format!("invalid promotion '{letter}'"))
            })?;
            Move::promoting(from, to, kind)
        } else {
            Move::new(from, to)
        };

        if !legal.contains(&mv) {
            return Err(ChessError::CompactHistory(format!(
                "decoded move {mv} at ply {} is not legal",
                moves.len()
            )));
        }
        board.apply_move(mv)?;
        moves.push(mv);
    }
    Ok(moves)
}
