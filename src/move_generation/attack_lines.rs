//! Check and pin analysis around a king.
//!
//! `AttackLines::compute` scans the eight directions outward from the king.
//! The first figure met on a ray decides it: an enemy slider moving along
//! that ray gives check; an own figure is pinned if the next figure beyond
//! it is such a slider. Pawn and knight checks are looked up directly.
//!
//! A scan from the king also catches the one case where two straight
//! sliders check at once: a pawn capturing onto the king's home row with
//! promotion, uncovering a rook or queen behind it on the file.

use std::collections::HashMap;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Direction, PieceKind, Position};
use crate::moves::pawn_moves::pawn_attacks;

/// One checking figure and the squares that resolve the check by
/// capture or interposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckLine {
    pub attacker: Position,
    /// The attacker plus every square between it and the king.
    pub mask: u64,
    /// True for rook/queen checks along a rank or file.
    pub straight: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackLines {
    checks: Vec<CheckLine>,
    /// Pinned figure -> squares it may still move to (pinner included).
    pins: HashMap<Position, u64>,
}

impl AttackLines {
    pub fn compute(board: &Board, king_color: Color) -> Self {
        let king = board.king_position(king_color);
        let mut lines = Self::default();

        for direction in Direction::ALL {
            lines.scan_ray(board, king, king_color, direction);
        }

        let attacker_color = king_color.opposite();
        let pawn_checks = pawn_attacks(king, king_color).filter(|&position| {
            board.figure_at(position).is_some_and(|figure| {
                figure.color() == attacker_color && figure.kind() == PieceKind::Pawn
            })
        });
        let knight_checks = king.knight_targets().filter(|&position| {
            board.figure_at(position).is_some_and(|figure| {
                figure.color() == attacker_color && figure.kind() == PieceKind::Knight
            })
        });
        for attacker in pawn_checks.chain(knight_checks) {
            lines.checks.push(CheckLine {
                attacker,
                mask: attacker.mask(),
                straight: false,
            });
        }

        lines
    }

    fn scan_ray(&mut self, board: &Board, king: Position, king_color: Color, direction: Direction) {
        let mut between = 0u64;
        let mut own_blocker: Option<Position> = None;
        let mut cursor = king.step(direction);

        while let Some(position) = cursor {
            match board.figure_at(position) {
                None => between |= position.mask(),
                Some(figure) if figure.color() == king_color => {
                    if own_blocker.is_some() {
                        return;
                    }
                    own_blocker = Some(position);
                }
                Some(figure) => {
                    if direction.is_slide_of(figure.kind()) {
                        let mask = between | position.mask();
                        match own_blocker {
                            None => self.checks.push(CheckLine {
                                attacker: position,
                                mask,
                                straight: direction.is_straight(),
                            }),
                            Some(pinned) => {
                                self.pins.insert(pinned, mask);
                            }
                        }
                    }
                    return;
                }
            }
            cursor = position.step(direction);
        }
    }

    pub fn checks(&self) -> &[CheckLine] {
        &self.checks
    }

    pub fn is_check(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn is_double_check(&self) -> bool {
        self.checks.len() >= 2
    }

    /// Both checks come from rook/queen lines. Only a capturing promotion
    /// on the king's home row produces this.
    pub fn has_straight_double_check(&self) -> bool {
        self.checks.len() == 2 && self.checks.iter().all(|check| check.straight)
    }

    /// Squares that resolve a single check, `None` when not exactly one check.
    pub fn single_check_mask(&self) -> Option<u64> {
        match self.checks.as_slice() {
            [check] => Some(check.mask),
            _ => None,
        }
    }

    pub fn pin_line(&self, position: Position) -> Option<u64> {
        self.pins.get(&position).copied()
    }

    pub fn pins(&self) -> &HashMap<Position, u64> {
        &self.pins
    }
}

/// True if a figure of color `by` attacks `target`.
///
/// Figures on `vacated` squares are treated as gone and `blocker`, if given,
/// as an extra obstacle. This answers "would this square be attacked after
/// the move" for king steps, castling and en passant without touching the
/// board.
pub fn is_attacked(
    board: &Board,
    target: Position,
    by: Color,
    vacated: u64,
    blocker: Option<Position>,
) -> bool {
    let present = |position: Position| -> Option<PieceKind> {
        if vacated & position.mask() != 0 {
            return None;
        }
        board
            .figure_at(position)
            .filter(|figure| figure.color() == by)
            .map(|figure| figure.kind())
    };

    for direction in Direction::ALL {
        let mut cursor = target.step(direction);
        while let Some(position) = cursor {
            if Some(position) == blocker {
                break;
            }
            if vacated & position.mask() == 0 {
                if let Some(figure) = board.figure_at(position) {
                    if figure.color() == by && direction.is_slide_of(figure.kind()) {
                        return true;
                    }
                    break;
                }
            }
            cursor = position.step(direction);
        }
    }

    if target
        .knight_targets()
        .any(|position| present(position) == Some(PieceKind::Knight))
    {
        return true;
    }

    // A pawn of `by` attacks `target` from one row behind it (seen from `by`).
    if pawn_attacks(target, by.opposite())
        .any(|position| present(position) == Some(PieceKind::Pawn))
    {
        return true;
    }

    Direction::ALL
        .into_iter()
        .filter_map(|direction| target.step(direction))
        .any(|position| present(position) == Some(PieceKind::King))
}
