use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, Position};
use crate::moves::figure::slide_targets;

/// Queen reachability: rook and bishop lines combined.
pub fn queen_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    slide_targets(board, from, color, &Direction::ALL, out);
}
