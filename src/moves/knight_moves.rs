use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Position};

/// Knight reachability: the eight L-shaped offsets not occupied by own figures.
pub fn knight_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    for to in from.knight_targets() {
        if board.figure_at(to).map_or(true, |f| f.color() != color) {
            out.push(to);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::knight_targets;
    use crate::game_state::board::Board;
    use crate::game_state::chess_rules::StartConfig;
    use crate::game_state::chess_types::{Color, Position};

    #[test]
    fn knight_from_d4_has_eight_targets() {
        let board = Board::new(&StartConfig::manual("Kh1 Nd4 kh8").expect("setup")).expect("board");
        let mut out = Vec::new();
        knight_targets(&board, Position::parse("d4").expect("d4"), Color::White, &mut out);
        assert_eq!(out.len(), 8);
    }

    #[test]
    fn knight_skips_own_figures() {
        let board =
            Board::new(&StartConfig::manual("Kh1 Na1 Pb3 kh8").expect("setup")).expect("board");
        let mut out = Vec::new();
        knight_targets(&board, Position::parse("a1").expect("a1"), Color::White, &mut out);
        assert_eq!(out, vec![Position::parse("c2").expect("c2")]);
    }
}
