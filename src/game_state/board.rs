//! Mutable board aggregate.
//!
//! `Board` owns every live figure in a 64-slot array. Moves are applied in
//! place and reversed through an undo stack of small diff records, which is
//! what the search relies on to explore and backtrack without copying.
//! Worker threads get their own copy through [`Board::fork`].

use std::cell::OnceCell;
use std::fmt;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::{
    is_insufficient_material, DrawKind, GameEnd, StartConfig,
};
use crate::game_state::chess_types::{Color, PieceKind, Position};
use crate::game_state::memento::{Memento, MementoHistory};
use crate::game_state::undo_state::UndoState;
use crate::move_generation::attack_lines::AttackLines;
use crate::move_generation::legal_move_generator::{legal_moves, legal_moves_from};
use crate::moves::chess_move::Move;
use crate::moves::extended_move::ExtendedMove;
use crate::moves::figure::Figure;
use crate::moves::king_moves::castling_destinations;
use crate::utils::render_board::render_board;

/// Half-moves without capture or pawn move after which the game is drawn.
pub const FIFTY_MOVE_LIMIT: u16 = 100;

#[derive(Debug, Clone)]
pub struct Board {
    // --- Placement ---
    slots: [Option<Figure>; 64],
    kings: [Position; 2],

    // --- Side and state flags ---
    side_to_move: Color,
    /// Pawn that double-stepped on the previous move.
    en_passant_pawn: Option<Position>,

    // --- Clocks ---
    halfmove_clock: u16,
    plies: usize,

    // --- History ---
    undo_stack: Vec<UndoState>,
    mementos: MementoHistory,

    // --- Derived ---
    attack_lines: OnceCell<AttackLines>,
}

impl Board {
    /// Sets up the initial position of `start`.
    pub fn new(start: &StartConfig) -> ChessResult<Self> {
        let (figures, side_to_move) = start.placement()?;

        let mut slots: [Option<Figure>; 64] = [None; 64];
        let mut kings: [Option<Position>; 2] = [None; 2];
        for figure in figures {
            let position = figure.position();
            if slots[position.index()].is_some() {
                return Err(ChessError::InvalidSetup(format!("two figures on {position}")));
            }
            match figure.kind() {
                PieceKind::King => {
                    if kings[figure.color().index()].replace(position).is_some() {
                        return Err(ChessError::InvalidSetup(format!(
                            "{} has more than one king",
                            figure.color()
                        )));
                    }
                }
                PieceKind::Pawn if position.row() == 0 || position.row() == 7 => {
                    return Err(ChessError::InvalidSetup(format!("pawn on {position}")));
                }
                _ => {}
            }
            slots[position.index()] = Some(figure);
        }

        let king_of = |color: Color| {
            kings[color.index()]
                .ok_or_else(|| ChessError::InvalidSetup(format!("{color} has no king")))
        };
        let kings = [king_of(Color::White)?, king_of(Color::Black)?];

        let mut board = Self {
            slots,
            kings,
            side_to_move,
            en_passant_pawn: None,
            halfmove_clock: 0,
            plies: 0,
            undo_stack: Vec::new(),
            mementos: MementoHistory::new(),
            attack_lines: OnceCell::new(),
        };
        board.validate_checks()?;
        board.mementos.push(Memento::capture(&board));
        Ok(board)
    }

    /// Rejects positions no game could reach: the side that just moved in
    /// check, or check geometry that no legal move can produce.
    fn validate_checks(&self) -> ChessResult<()> {
        let waiting = AttackLines::compute(self, self.side_to_move.opposite());
        if waiting.is_check() {
            return Err(ChessError::InvalidSetup(format!(
                "{} is in check but it is {}'s move",
                self.side_to_move.opposite(),
                self.side_to_move
            )));
        }
        let lines = AttackLines::compute(self, self.side_to_move);
        let impossible_double_check =
            lines.has_straight_double_check() && !self.king_on_home_row();
        if lines.checks().len() > 2 || impossible_double_check {
            return Err(ChessError::InvalidSetup("impossible check combination".to_owned()));
        }
        Ok(())
    }

    fn king_on_home_row(&self) -> bool {
        self.king_position(self.side_to_move).row() == self.side_to_move.home_row()
    }

    /// Replays `codes` from `start`, validating each one.
    ///
    /// A malformed or illegal code yields `IllegalMove` naming the offender
    /// and every code accepted before it.
    pub fn replay<S: AsRef<str>>(start: &StartConfig, codes: &[S]) -> ChessResult<Self> {
        let mut board = Self::new(start)?;
        let mut validated: Vec<String> = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.as_ref();
            let resolved = Move::from_code(code)
                .ok()
                .and_then(|mv| board.resolve_move(mv));
            let Some(mv) = resolved else {
                return Err(ChessError::IllegalMove {
                    code: code.to_owned(),
                    validated,
                });
            };
            board.apply_move(mv)?;
            validated.push(code.to_owned());
        }
        Ok(board)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn king_position(&self, color: Color) -> Position {
        self.kings[color.index()]
    }

    #[inline]
    pub fn en_passant_pawn(&self) -> Option<Position> {
        self.en_passant_pawn
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    /// Plies played since the start position (forks keep counting).
    #[inline]
    pub fn moves_played(&self) -> usize {
        self.plies
    }

    #[inline]
    pub fn is_free_area(&self, position: Position) -> bool {
        self.slots[position.index()].is_none()
    }

    #[inline]
    pub fn figure_at(&self, position: Position) -> Option<&Figure> {
        self.slots[position.index()].as_ref()
    }

    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.slots.iter().flatten()
    }

    pub fn figures_of(&self, color: Color) -> impl Iterator<Item = &Figure> {
        self.figures().filter(move |figure| figure.color() == color)
    }

    /// Canonical moves played since creation or since the last fork.
    pub fn played_moves(&self) -> Vec<Move> {
        self.undo_stack.iter().map(|state| state.mv).collect()
    }

    /// Applies `mv` for the side to move without checking legality.
    ///
    /// Only fails if no figure of the side to move stands on the origin
    /// square, which means the caller skipped validation.
    pub fn apply_move(&mut self, mv: Move) -> ChessResult<ExtendedMove> {
        let from = mv.from();
        let to = mv.to();
        let mover = match self.slots[from.index()] {
            Some(figure) if figure.color() == self.side_to_move => figure,
            _ => {
                return Err(ChessError::Internal(format!(
                    "no {} figure on {from} for move {mv}",
                    self.side_to_move
                )))
            }
        };
        let color = mover.color();
        let prev_en_passant_pawn = self.en_passant_pawn;
        let prev_halfmove_clock = self.halfmove_clock;

        let target = self.slots[to.index()];
        let castles = mover.kind() == PieceKind::King
            && matches!(target, Some(rook) if rook.color() == color && rook.kind() == PieceKind::Rook);

        let mut captured = None;
        let extended = if castles {
            let (king_to, rook_to) = castling_destinations(from, to).ok_or_else(|| {
                ChessError::Internal(format!("castling move {mv} leaves the home row"))
            })?;
            let rook = self.slots[to.index()].take();
            self.slots[from.index()] = None;
            self.slots[king_to.index()] = Some(mover.relocated(king_to));
            if let Some(rook) = rook {
                self.slots[rook_to.index()] = Some(rook.relocated(rook_to));
            }
            self.kings[color.index()] = king_to;
            ExtendedMove::Castling {
                king: Move::new(from, king_to),
                rook: Move::new(to, rook_to),
            }
        } else if mover.kind() == PieceKind::Pawn && from.column() != to.column() && target.is_none() {
            let captured_at = Position::new(to.column(), from.row()).ok_or_else(|| {
                ChessError::Internal(format!("en passant move {mv} has no victim square"))
            })?;
            captured = self.slots[captured_at.index()].take();
            self.slots[from.index()] = None;
            self.slots[to.index()] = Some(mover.relocated(to));
            ExtendedMove::EnPassant { mv, captured_at }
        } else {
            captured = self.slots[to.index()].take();
            self.slots[from.index()] = None;
            let captured_kind = captured.map(|figure| figure.kind());
            let extended = match mv.promotion() {
                Some(kind) if mover.kind() == PieceKind::Pawn => {
                    self.slots[to.index()] = Some(mover.promoted(kind, to));
                    ExtendedMove::Promotion {
                        mv,
                        promoted_to: kind,
                        captured: captured_kind,
                    }
                }
                _ => {
                    self.slots[to.index()] = Some(mover.relocated(to));
                    if mover.kind() == PieceKind::Pawn && from.row().abs_diff(to.row()) == 2 {
                        ExtendedMove::PawnDoubleStep { mv }
                    } else {
                        ExtendedMove::Normal {
                            mv,
                            kind: mover.kind(),
                            captured: captured_kind,
                        }
                    }
                }
            };
            if mover.kind() == PieceKind::King {
                self.kings[color.index()] = to;
            }
            extended
        };

        self.en_passant_pawn = match extended {
            ExtendedMove::PawnDoubleStep { mv } => Some(mv.to()),
            _ => None,
        };
        self.halfmove_clock = if extended.resets_fifty_move_clock() {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        self.side_to_move = color.opposite();
        self.plies += 1;
        self.attack_lines = OnceCell::new();

        self.undo_stack.push(UndoState {
            mv,
            extended,
            mover,
            captured,
            prev_en_passant_pawn,
            prev_halfmove_clock,
        });
        self.mementos.push(Memento::capture(self));
        Ok(extended)
    }

    /// Reverses the most recent move. Returns `None` if there is nothing to
    /// undo (no move since creation or since the fork).
    pub fn undo(&mut self) -> Option<ExtendedMove> {
        let state = self.undo_stack.pop()?;
        self.mementos.pop();

        let mover = state.mover;
        let color = mover.color();
        match state.extended {
            ExtendedMove::Castling { king, rook } => {
                // Clear both destinations first: in Chess960 a destination may
                // be the other figure's origin.
                self.slots[rook.to().index()] = None;
                self.slots[king.to().index()] = None;
                self.slots[king.from().index()] = Some(mover);
                self.slots[rook.from().index()] =
                    Some(Figure::new(PieceKind::Rook, color, rook.from(), false));
            }
            ExtendedMove::EnPassant { mv, captured_at } => {
                self.slots[mv.to().index()] = None;
                self.slots[mv.from().index()] = Some(mover);
                self.slots[captured_at.index()] = state.captured;
            }
            ExtendedMove::Normal { mv, .. }
            | ExtendedMove::PawnDoubleStep { mv }
            | ExtendedMove::Promotion { mv, .. } => {
                self.slots[mv.to().index()] = state.captured;
                self.slots[mv.from().index()] = Some(mover);
            }
        }
        if mover.kind() == PieceKind::King {
            self.kings[color.index()] = mover.position();
        }

        self.side_to_move = color;
        self.en_passant_pawn = state.prev_en_passant_pawn;
        self.halfmove_clock = state.prev_halfmove_clock;
        self.plies -= 1;
        self.attack_lines = OnceCell::new();
        Some(state.extended)
    }

    /// Check and pin lines against the side to move, computed on first use.
    pub fn attack_lines(&self) -> &AttackLines {
        self.attack_lines.get_or_init(|| {
            let lines = AttackLines::compute(self, self.side_to_move);
            // Setups are validated in `new`, so only a bad `apply_move` gets here.
            debug_assert!(lines.checks().len() <= 2, "more than two checks");
            lines
        })
    }

    pub fn is_in_check(&self) -> bool {
        self.attack_lines().is_check()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(self)
    }

    pub fn legal_moves_from(&self, from: Position) -> Vec<Move> {
        legal_moves_from(self, from)
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        self.legal_moves_from(mv.from()).contains(&mv)
    }

    /// True if `mv` is a castling move (king onto its own rook).
    pub fn is_castling(&self, mv: Move) -> bool {
        match (self.figure_at(mv.from()), self.figure_at(mv.to())) {
            (Some(king), Some(rook)) => {
                king.kind() == PieceKind::King
                    && rook.kind() == PieceKind::Rook
                    && king.color() == rook.color()
            }
            _ => false,
        }
    }

    /// Maps an externally supplied move onto the legal move it denotes.
    ///
    /// Besides the canonical codes this accepts castling written as the
    /// king's destination (`e1-g1`, `e8-c8`).
    pub fn resolve_move(&self, mv: Move) -> Option<Move> {
        let legal = self.legal_moves_from(mv.from());
        if legal.contains(&mv) {
            return Some(mv);
        }
        let king = self.figure_at(mv.from())?;
        if king.kind() != PieceKind::King || mv.promotion().is_some() {
            return None;
        }
        legal.into_iter().find(|candidate| {
            self.is_castling(*candidate)
                && castling_destinations(candidate.from(), candidate.to())
                    .is_some_and(|(king_to, _)| king_to == mv.to())
        })
    }

    /// Occurrences of the current position since the last irreversible move.
    pub fn repetition_count(&self) -> usize {
        self.mementos.repetition_count(self.halfmove_clock as usize)
    }

    /// Draws that do not depend on the legal moves of the position.
    pub fn draw_by_rule(&self) -> Option<DrawKind> {
        if is_insufficient_material(self.figures()) {
            Some(DrawKind::InsufficientMaterial)
        } else if self.repetition_count() >= 3 {
            Some(DrawKind::Repetition)
        } else if self.halfmove_clock >= FIFTY_MOVE_LIMIT {
            Some(DrawKind::FiftyMoveRule)
        } else {
            None
        }
    }

    /// How the game ended, or `None` while it is still running.
    pub fn game_end(&self) -> Option<GameEnd> {
        if self.legal_moves().is_empty() {
            return Some(if self.is_in_check() {
                GameEnd::Checkmate {
                    loser: self.side_to_move,
                }
            } else {
                GameEnd::Draw(DrawKind::Stalemate)
            });
        }
        self.draw_by_rule().map(GameEnd::Draw)
    }

    /// Independent copy for another thread. History so far is shared
    /// read-only; the copy cannot undo past this point.
    pub fn fork(&self) -> Self {
        Self {
            slots: self.slots,
            kings: self.kings,
            side_to_move: self.side_to_move,
            en_passant_pawn: self.en_passant_pawn,
            halfmove_clock: self.halfmove_clock,
            plies: self.plies,
            undo_stack: Vec::new(),
            mementos: self.mementos.freeze(),
            attack_lines: self.attack_lines.clone(),
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_board(self))
    }
}
