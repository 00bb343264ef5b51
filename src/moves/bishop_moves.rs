use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, Position};
use crate::moves::figure::slide_targets;

/// Bishop reachability: any distance along diagonals until blocked.
pub fn bishop_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    slide_targets(board, from, color, &Direction::DIAGONAL, out);
}

#[cfg(test)]
mod tests {
    use super::bishop_targets;
    use crate::game_state::board::Board;
    use crate::game_state::chess_rules::StartConfig;
    use crate::game_state::chess_types::{Color, Position};

    #[test]
    fn bishop_from_d4_has_thirteen_targets_on_open_board() {
        let board = Board::new(&StartConfig::manual("Kh1 Bd4 kh8").expect("setup")).expect("board");
        let mut out = Vec::new();
        bishop_targets(&board, Position::parse("d4").expect("d4"), Color::White, &mut out);
        // h8 holds the enemy king and counts as a capture square.
        assert_eq!(out.len(), 13);
    }
}
