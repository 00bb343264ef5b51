//! Chess figures and their pseudo-legal reachability.
//!
//! A `Figure` is owned by the board slot it stands on. Its cached
//! `position` and `has_moved` flag only change through the board's
//! move/undo API, which keeps the slot array the single source of truth.

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, PieceKind, Position};
use crate::moves::bishop_moves::bishop_targets;
use crate::moves::king_moves::king_targets;
use crate::moves::knight_moves::knight_targets;
use crate::moves::pawn_moves::{pawn_attacks, pawn_targets};
use crate::moves::queen_moves::queen_targets;
use crate::moves::rook_moves::rook_targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Figure {
    kind: PieceKind,
    color: Color,
    position: Position,
    has_moved: bool,
}

impl Figure {
    #[inline]
    pub const fn new(kind: PieceKind, color: Color, position: Position, has_moved: bool) -> Self {
        Self {
            kind,
            color,
            position,
            has_moved,
        }
    }

    #[inline]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub const fn has_moved(&self) -> bool {
        self.has_moved
    }

    /// Kings and rooks keep their castling right until they first move.
    #[inline]
    pub const fn can_still_castle(&self) -> bool {
        matches!(self.kind, PieceKind::King | PieceKind::Rook) && !self.has_moved
    }

    #[inline]
    pub fn symbol(&self) -> char {
        self.kind.symbol(self.color)
    }

    /// Copy of this figure standing on `to`, marked as moved.
    #[inline]
    pub(crate) fn relocated(self, to: Position) -> Self {
        Self {
            position: to,
            has_moved: true,
            ..self
        }
    }

    /// Copy of this figure turned into `kind` (promotion).
    #[inline]
    pub(crate) fn promoted(self, kind: PieceKind, to: Position) -> Self {
        Self {
            kind,
            position: to,
            has_moved: true,
            ..self
        }
    }

    /// Squares this figure could move to ignoring check constraints.
    /// Castling is not included; it needs attack information.
    pub fn reachable_positions(&self, board: &Board, out: &mut Vec<Position>) {
        match self.kind {
            PieceKind::Pawn => pawn_targets(board, self.position, self.color, out),
            PieceKind::Knight => knight_targets(board, self.position, self.color, out),
            PieceKind::Bishop => bishop_targets(board, self.position, self.color, out),
            PieceKind::Rook => rook_targets(board, self.position, self.color, out),
            PieceKind::Queen => queen_targets(board, self.position, self.color, out),
            PieceKind::King => king_targets(board, self.position, self.color, out),
        }
    }

    /// True if this figure is able to reach `to` ignoring check constraints.
    pub fn can_reach(&self, board: &Board, to: Position) -> bool {
        let mut targets = Vec::with_capacity(28);
        self.reachable_positions(board, &mut targets);
        targets.contains(&to)
    }

    /// True if this figure attacks `target` (pawns only attack diagonally).
    pub fn attacks(&self, board: &Board, target: Position) -> bool {
        match self.kind {
            PieceKind::Pawn => pawn_attacks(self.position, self.color).any(|p| p == target),
            PieceKind::Knight => self.position.knight_targets().any(|p| p == target),
            PieceKind::King => self.position.distance(target) == 1,
            kind => match self.position.direction_to(target) {
                Some(direction) if direction.is_slide_of(kind) => {
                    path_is_clear(board, self.position, target, direction)
                }
                _ => false,
            },
        }
    }
}

/// Walks from `from` along each direction, collecting empty squares and the
/// first enemy-occupied square.
pub(crate) fn slide_targets(
    board: &Board,
    from: Position,
    color: Color,
    directions: &[Direction],
    out: &mut Vec<Position>,
) {
    for &direction in directions {
        let mut cursor = from.step(direction);
        while let Some(pos) = cursor {
            match board.figure_at(pos) {
                None => out.push(pos),
                Some(other) => {
                    if other.color() != color {
                        out.push(pos);
                    }
                    break;
                }
            }
            cursor = pos.step(direction);
        }
    }
}

/// True if every square strictly between `from` and `to` is empty.
pub(crate) fn path_is_clear(board: &Board, from: Position, to: Position, direction: Direction) -> bool {
    let mut cursor = from.step(direction);
    while let Some(pos) = cursor {
        if pos == to {
            return true;
        }
        if !board.is_free_area(pos) {
            return false;
        }
        cursor = pos.step(direction);
    }
    false
}
