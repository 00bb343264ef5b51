use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, Position};
use crate::moves::figure::slide_targets;

/// Rook reachability: any distance along ranks and files until blocked.
pub fn rook_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    slide_targets(board, from, color, &Direction::STRAIGHT, out);
}
