//! Perft node counting, the standard correctness check for move generation.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::moves::chess_move::Move;
use crate::moves::extended_move::ExtendedMove;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }

    fn leaf(extended: ExtendedMove, board: &Board) -> Self {
        let checks = usize::from(board.is_in_check());
        Self {
            nodes: 1,
            captures: usize::from(extended.is_capture()),
            en_passant: usize::from(matches!(extended, ExtendedMove::EnPassant { .. })),
            castles: usize::from(extended.is_castling()),
            promotions: usize::from(matches!(extended, ExtendedMove::Promotion { .. })),
            checks,
            checkmates: usize::from(checks == 1 && board.legal_moves().is_empty()),
        }
    }
}

/// Leaf statistics `depth` plies below the current position. The board is
/// restored before returning.
pub fn perft(board: &mut Board, depth: u8) -> ChessResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }
    let mut total = PerftCounts::default();
    for mv in board.legal_moves() {
        total.merge(perft_recurse(board, mv, depth)?);
    }
    Ok(total)
}

/// Node count below each root move, in generation order.
pub fn perft_divide(board: &mut Board, depth: u8) -> ChessResult<Vec<(Move, usize)>> {
    let mut divided = Vec::new();
    if depth == 0 {
        return Ok(divided);
    }
    for mv in board.legal_moves() {
        divided.push((mv, perft_recurse(board, mv, depth)?.nodes));
    }
    Ok(divided)
}

fn perft_recurse(board: &mut Board, mv: Move, depth: u8) -> ChessResult<PerftCounts> {
    let extended = board.apply_move(mv)?;
    let counts = if depth == 1 {
        PerftCounts::leaf(extended, board)
    } else {
        let mut counts = PerftCounts::default();
        for reply in board.legal_moves() {
            counts.merge(perft_recurse(board, reply, depth - 1)?);
        }
        counts
    };
    board.undo();
    Ok(counts)
}
