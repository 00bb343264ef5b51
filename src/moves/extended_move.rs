//! Recorded outcome of executing a move.

use crate::game_state::chess_types::{PieceKind, Position};
use crate::moves::chess_move::Move;

/// What actually happened on the board when a `Move` was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedMove {
    Normal {
        mv: Move,
        kind: PieceKind,
        captured: Option<PieceKind>,
    },
    PawnDoubleStep {
        mv: Move,
    },
    /// `king` and `rook` are the physical relocations; the game move itself
    /// is the king stepping onto the rook's origin square.
    Castling {
        king: Move,
        rook: Move,
    },
    EnPassant {
        mv: Move,
        captured_at: Position,
    },
    Promotion {
        mv: Move,
        promoted_to: PieceKind,
        captured: Option<PieceKind>,
    },
}

impl ExtendedMove {
    /// The move as it is written in move codes.
    pub fn base_move(&self) -> Move {
        match *self {
            ExtendedMove::Normal { mv, .. }
            | ExtendedMove::PawnDoubleStep { mv }
            | ExtendedMove::EnPassant { mv, .. }
            | ExtendedMove::Promotion { mv, .. } => mv,
            ExtendedMove::Castling { king, rook } => Move::new(king.from(), rook.from()),
        }
    }

    pub fn is_capture(&self) -> bool {
        match self {
            ExtendedMove::Normal { captured, .. } | ExtendedMove::Promotion { captured, .. } => {
                captured.is_some()
            }
            ExtendedMove::EnPassant { .. } => true,
            ExtendedMove::PawnDoubleStep { .. } | ExtendedMove::Castling { .. } => false,
        }
    }

    pub fn is_castling(&self) -> bool {
        matches!(self, ExtendedMove::Castling { .. })
    }

    /// Captures and pawn moves make earlier positions unreachable.
    pub fn resets_fifty_move_clock(&self) -> bool {
        match self {
            ExtendedMove::Normal { kind, captured, .. } => {
                *kind == PieceKind::Pawn || captured.is_some()
            }
            ExtendedMove::Castling { .. } => false,
            ExtendedMove::PawnDoubleStep { .. }
            | ExtendedMove::EnPassant { .. }
            | ExtendedMove::Promotion { .. } => true,
        }
    }

    /// Kind of the captured figure, if any.
    pub fn captured_kind(&self) -> Option<PieceKind> {
        match *self {
            ExtendedMove::Normal { captured, .. } | ExtendedMove::Promotion { captured, .. } => {
                captured
            }
            ExtendedMove::EnPassant { .. } => Some(PieceKind::Pawn),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ExtendedMove;
    use crate::game_state::chess_types::PieceKind;
    use crate::moves::chess_move::Move;

    fn mv(code: &str) -> Move {
        Move::from_code(code).expect("test move code should parse")
    }

    #[test]
    fn castling_base_move_is_king_onto_rook() {
        let castling = ExtendedMove::Castling {
            king: mv("e1-g1"),
            rook: mv("h1-f1"),
        };
        assert_eq!(castling.base_move(), mv("e1-h1"));
        assert!(!castling.is_capture());
        assert!(!castling.resets_fifty_move_clock());
    }

    #[test]
    fn quiet_piece_move_keeps_clock() {
        let quiet = ExtendedMove::Normal {
            mv: mv("g1-f3"),
            kind: PieceKind::Knight,
            captured: None,
        };
        assert!(!quiet.resets_fifty_move_clock());
        let capture = ExtendedMove::Normal {
            mv: mv("f3-e5"),
            kind: PieceKind::Knight,
            captured: Some(PieceKind::Pawn),
        };
        assert!(capture.resets_fifty_move_clock());
        assert_eq!(capture.captured_kind(), Some(PieceKind::Pawn));
    }
}
