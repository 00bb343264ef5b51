use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind, Position};

/// Pawn reachability: single step, double step from the start row,
/// diagonal captures and the en-passant square. Promotion choices are
/// expanded by the legal move generator.
pub fn pawn_targets(board: &Board, from: Position, color: Color, out: &mut Vec<Position>) {
    let forward = color.forward();

    if let Some(one) = from.offset(0, forward) {
        if board.is_free_area(one) {
            out.push(one);
            if from.row() == color.pawn_row() {
                if let Some(two) = one.offset(0, forward) {
                    if board.is_free_area(two) {
                        out.push(two);
                    }
                }
            }
        }
    }

    for to in pawn_attacks(from, color) {
        match board.figure_at(to) {
            Some(target) if target.color() != color => out.push(to),
            Some(_) => {}
            None => {
                if en_passant_victim(board, from, color, to).is_some() {
                    out.push(to);
                }
            }
        }
    }
}

/// The two diagonal squares a pawn of `color` on `from` attacks.
pub fn pawn_attacks(from: Position, color: Color) -> impl Iterator<Item = Position> {
    let forward = color.forward();
    [-1i8, 1i8]
        .into_iter()
        .filter_map(move |dc| from.offset(dc, forward))
}

/// If a pawn of `color` moving `from -> to` captures en passant, returns
/// the square of the captured pawn.
///
/// Only the pawn that double-stepped on the immediately preceding move can
/// be taken, and only by a pawn standing right next to it.
pub fn en_passant_victim(
    board: &Board,
    from: Position,
    color: Color,
    to: Position,
) -> Option<Position> {
    let victim = board.en_passant_pawn()?;
    let figure = board.figure_at(victim)?;
    if figure.kind() != PieceKind::Pawn || figure.color() == color {
        return None;
    }
    if victim.row() != from.row() || victim.column().abs_diff(from.column()) != 1 {
        return None;
    }
    if victim.offset(0, color.forward()) != Some(to) || !board.is_free_area(to) {
        return None;
    }
    Some(victim)
}
