//! Legal move generation.
//!
//! Per-piece reachability is filtered through the side to move's
//! `AttackLines`: under double check only the king moves, under a single
//! check a move has to capture or block the checker, and a pinned figure
//! has to stay on its pin line. King steps, castling and en passant are
//! checked square by square with `is_attacked`, since they change more
//! than one line at once.

use crate::errors::ChessResult;
use crate::game_state::board::Board;
use crate::game_state::chess_types::{positions_in, PieceKind, Position};
use crate::move_generation::attack_lines::is_attacked;
use crate::moves::chess_move::Move;
use crate::moves::figure::Figure;
use crate::moves::king_moves::castling_destinations;
use crate::moves::pawn_moves::en_passant_victim;

/// All legal moves of the side to move.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    for figure in board.figures_of(board.side_to_move()) {
        push_figure_moves(board, figure, &mut moves);
    }
    moves
}

/// Legal moves of the figure on `from`; empty unless it belongs to the side
/// to move.
pub fn legal_moves_from(board: &Board, from: Position) -> Vec<Move> {
    let mut moves = Vec::new();
    if let Some(figure) = board.figure_at(from) {
        if figure.color() == board.side_to_move() {
            push_figure_moves(board, figure, &mut moves);
        }
    }
    moves
}

fn push_figure_moves(board: &Board, figure: &Figure, out: &mut Vec<Move>) {
    let lines = board.attack_lines();
    let color = figure.color();
    let enemy = color.opposite();
    let from = figure.position();

    let mut targets = Vec::with_capacity(28);
    figure.reachable_positions(board, &mut targets);

    if figure.kind() == PieceKind::King {
        for to in targets {
            if !is_attacked(board, to, enemy, from.mask(), None) {
                out.push(Move::new(from, to));
            }
        }
        if !lines.is_check() {
            push_castling_moves(board, figure, out);
        }
        return;
    }

    if lines.is_double_check() {
        return;
    }
    let allowed =
        lines.single_check_mask().unwrap_or(u64::MAX) & lines.pin_line(from).unwrap_or(u64::MAX);
    let king = board.king_position(color);

    for to in targets {
        if figure.kind() != PieceKind::Pawn {
            if allowed & to.mask() != 0 {
                out.push(Move::new(from, to));
            }
            continue;
        }

        // En passant removes two figures from their lines, including the
        // rare rank pin through both pawns.
        if let Some(victim) = en_passant_victim(board, from, color, to) {
            let vacated = from.mask() | victim.mask();
            if !is_attacked(board, king, enemy, vacated, Some(to)) {
                out.push(Move::new(from, to));
            }
            continue;
        }

        if allowed & to.mask() == 0 {
            continue;
        }
        if to.row() == color.promotion_row() {
            for kind in PieceKind::PROMOTIONS {
                out.push(Move::promoting(from, to, kind));
            }
        } else {
            out.push(Move::new(from, to));
        }
    }
}

/// Squares of `a`'s row from `a` to `b`, both included.
fn row_span(a: Position, b: Position) -> u64 {
    let (low, high) = if a.column() <= b.column() {
        (a.column(), b.column())
    } else {
        (b.column(), a.column())
    };
    (low..=high)
        .filter_map(|column| Position::new(column, a.row()))
        .fold(0, |mask, position| mask | position.mask())
}

/// Castling for the classical layout and Chess960 alike: king and rook
/// unmoved, every square either of them crosses or lands on empty apart
/// from the two of them, and no square the king crosses or lands on
/// attacked. The caller has already ruled out check.
fn push_castling_moves(board: &Board, king: &Figure, out: &mut Vec<Move>) {
    let color = king.color();
    let from = king.position();
    if king.has_moved() || from.row() != color.home_row() {
        return;
    }
    let enemy = color.opposite();

    let rooks = board.figures_of(color).filter(|figure| {
        figure.kind() == PieceKind::Rook
            && !figure.has_moved()
            && figure.position().row() == from.row()
    });
    for rook in rooks {
        let rook_from = rook.position();
        let Some((king_to, rook_to)) = castling_destinations(from, rook_from) else {
            continue;
        };

        let span = row_span(from, king_to) | row_span(rook_from, rook_to);
        let blocked = positions_in(span).any(|position| {
            position != from && position != rook_from && !board.is_free_area(position)
        });
        if blocked {
            continue;
        }

        let vacated = from.mask() | rook_from.mask();
        let path_attacked = positions_in(row_span(from, king_to))
            .filter(|&position| position != from && position != king_to)
            .any(|position| is_attacked(board, position, enemy, vacated, None));
        if path_attacked || is_attacked(board, king_to, enemy, vacated, Some(rook_to)) {
            continue;
        }
        out.push(Move::new(from, rook_from));
    }
}

/// True if playing `mv` puts the opponent in check. The board is restored.
pub fn gives_check(board: &mut Board, mv: Move) -> ChessResult<bool> {
    board.apply_move(mv)?;
    let check = board.is_in_check();
    board.undo();
    Ok(check)
}

/// True if `mv` captures something (en passant included).
pub fn is_capture(board: &Board, mv: Move) -> bool {
    let Some(mover) = board.figure_at(mv.from()) else {
        return false;
    };
    match board.figure_at(mv.to()) {
        Some(target) => target.color() != mover.color(),
        None => mover.kind() == PieceKind::Pawn && mv.from().column() != mv.to().column(),
    }
}

/// Captures, promotions and checks; the moves searched past the full-width
/// plies.
pub fn is_critical(board: &mut Board, mv: Move) -> ChessResult<bool> {
    if mv.promotion().is_some() || is_capture(board, mv) {
        return Ok(true);
    }
    gives_check(board, mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::StartConfig;

    fn mv(code: &str) -> Move {
        Move::from_code(code).expect("test move code should parse")
    }

    fn board(setup: &str) -> Board {
        Board::new(&StartConfig::manual(setup).expect("setup should parse")).expect("board")
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        assert_eq!(legal_moves(&board).len(), 20);
        assert_eq!(legal_moves_from(&board, mv("g1-f3").from()).len(), 2);
        assert!(legal_moves_from(&board, mv("e7-e5").from()).is_empty());
    }

    #[test]
    fn single_check_allows_block_capture_or_king_move() {
        let board = board("Ke1 Bd2 Nc4 ke8 re5");
        let moves = legal_moves(&board);
        assert!(moves.contains(&mv("d2-e3")));
        assert!(moves.contains(&mv("c4-e5")));
        assert!(moves.contains(&mv("c4-e3")));
        assert!(!moves.contains(&mv("d2-c3")));
        assert!(!moves.contains(&mv("e1-e2")));
        assert!(moves.contains(&mv("e1-f1")));
    }

    #[test]
    fn pinned_figure_moves_along_its_line_only() {
        let board = board("Ke1 Re2 ke8 re7");
        let moves = legal_moves_from(&board, mv("e2-e3").from());
        assert!(moves.contains(&mv("e2-e7")));
        assert!(moves.contains(&mv("e2-e3")));
        assert!(!moves.contains(&mv("e2-d2")));
    }

    #[test]
    fn en_passant_rank_pin_is_rejected() {
        // Capturing en passant would clear the fifth rank between king and rook.
        let mut board = board("Ka5 Pb5 kh8 pc7 rh5 b");
        board.apply_move(mv("c7-c5")).expect("double step");
        let moves = legal_moves(&board);
        assert!(!moves.contains(&mv("b5-c6")));
        assert!(moves.contains(&mv("b5-b6")));
    }

    #[test]
    fn en_passant_may_capture_the_checker() {
        let mut board = board("Kd4 Pd5 ke8 pe7 b");
        board.apply_move(mv("e7-e5")).expect("double step gives check");
        assert!(board.is_in_check());
        let moves = legal_moves(&board);
        assert!(moves.contains(&mv("d5-e6")));
        assert!(moves.contains(&mv("d4-e5")));
        assert!(!moves.contains(&mv("d5-d6")));
    }

    #[test]
    fn castling_rules() {
        let open = board("Ke1 Ra1 Rh1 ke8");
        let moves = legal_moves(&open);
        assert!(moves.contains(&mv("e1-h1")));
        assert!(moves.contains(&mv("e1-a1")));

        // f1 attacked: no short castling; b1 attacked does not stop long castling.
        let attacked = board("Ke1 Ra1 Rh1 ke8 rf8 rb8");
        let moves = legal_moves(&attacked);
        assert!(!moves.contains(&mv("e1-h1")));
        assert!(moves.contains(&mv("e1-a1")));

        // In check: no castling at all.
        let checked = board("Ke1 Ra1 Rh1 ke8 re7");
        let moves = legal_moves(&checked);
        assert!(!moves.contains(&mv("e1-h1")));
        assert!(!moves.contains(&mv("e1-a1")));

        // Blocked by a knight on b1.
        let blocked = board("Ke1 Ra1 Nb1 ke8");
        assert!(!legal_moves(&blocked).contains(&mv("e1-a1")));
    }

    #[test]
    fn chess960_castling() {
        // Position 0 is BBQNNRKR.
        let opening = [
            "d1-c3", "d8-c6", "e1-f3", "e8-f6", "d2-d4", "d7-d5", "c1-d2", "c8-d7",
        ];
        let mut board = Board::replay(&StartConfig::Chess960(0), &opening).expect("replay");
        let before = board.to_string();

        // Long castling with the f1 rook; short castling is blocked by it.
        let long = mv("g1-f1");
        assert!(board.is_legal(long));
        assert!(!board.is_legal(mv("g1-h1")));
        assert_eq!(board.resolve_move(mv("g1-c1")), Some(long));

        board.apply_move(long).expect("castling applies");
        let square = |name: &str| Position::parse(name).expect("square");
        assert_eq!(board.figure_at(square("c1")).map(|f| f.kind()), Some(PieceKind::King));
        assert_eq!(board.figure_at(square("d1")).map(|f| f.kind()), Some(PieceKind::Rook));
        assert!(board.is_free_area(square("f1")));
        assert!(board.is_free_area(square("g1")));

        board.undo();
        assert_eq!(board.to_string(), before);
    }

    #[test]
    fn critical_moves() {
        let mut board =
            Board::replay(&StartConfig::Classic, &["e2-e4", "d7-d5"]).expect("replay");
        assert!(is_critical(&mut board, mv("e4-d5")).expect("capture"));
        assert!(!is_critical(&mut board, mv("g1-f3")).expect("quiet"));
        assert!(is_critical(&mut board, mv("f1-b5")).expect("check"));
        assert!(gives_check(&mut board, mv("f1-b5")).expect("check"));
        assert_eq!(board.moves_played(), 2);
    }
}
