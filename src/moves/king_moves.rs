use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, Position};

/// King reachability: one step in any direction onto a square not held by
/// an own figure. Castling is generated by the legal move generator.
pub fn king_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    for direction in Direction::ALL {
        if let Some(to) = from.step(direction) {
            if board.figure_at(to).map_or(true, |f| f.color() != color) {
                out.push(to);
            }
        }
    }
}

/// Where king and rook end up when the king on `king_from` castles with the
/// rook on `rook_from`: g/f files towards the h side, c/d files otherwise.
/// Holds for the classical layout and for every Chess960 layout.
pub fn castling_destinations(king_from: Position, rook_from: Position) -> Option<(Position, Position)> {
    if king_from.row() != rook_from.row() || king_from == rook_from {
        return None;
    }
    let row = king_from.row();
    let (king_column, rook_column) = if rook_from.column() > king_from.column() {
        (6, 5)
    } else {
        (2, 3)
    };
    Some((Position::new(king_column, row)?, Position::new(rook_column, row)?))
}
