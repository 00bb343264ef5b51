use crate::game_state::chess_types::Position;
use crate::moves::chess_move::Move;
use crate::moves::extended_move::ExtendedMove;
use crate::moves::figure::Figure;

/// Single undo record for `Board::apply_move` / `Board::undo`.
#[derive(Debug, Clone)]
pub struct UndoState {
    pub mv: Move,
    pub extended: ExtendedMove,

    /// The moving figure as it stood before the move (position, kind and
    /// castling state are restored from this copy).
    pub mover: Figure,
    pub captured: Option<Figure>,

    pub prev_en_passant_pawn: Option<Position>,
    pub prev_halfmove_clock: u16,
}
