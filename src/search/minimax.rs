//! Depth-limited minimax over ordered evaluations.
//!
//! A node is searched in one of three modes, decided by its ply below the
//! root move:
//! - full plies expand the best `breadth[ply]` moves (all moves when the
//!   budget exceeds the move count, otherwise ordered by a quick static
//!   look-ahead);
//! - critical plies only follow captures, promotions and checks (every
//!   move when in check) and may stand pat on the static score;
//! - leaves score statically unless the side to move has no moves (mate
//!   or stalemate) or a draw rule applies.
//!
//! Values are always from the side to move and flipped on the way up with
//! [`Evaluation::for_opponent`], so mate distances grow by one per move.

use tracing::trace;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_rules::DrawKind;
use crate::moves::chess_move::Move;
use crate::move_generation::legal_move_generator::is_critical;
use crate::search::board_scoring::{static_score, Inventory};
use crate::search::evaluation::Evaluation;
use crate::search::pruner::SearchTreePruner;
use crate::search::threading::CancelToken;

/// Evaluates `mv` for the side to move. Works on a fork; `board` is never
/// touched.
pub fn evaluate_move(
    board: &Board,
    mv: Move,
    pruner: &SearchTreePruner,
    cancel: &CancelToken,
) -> ChessResult<Evaluation> {
    let mut scratch = board.fork();
    evaluate_move_in_place(&mut scratch, mv, pruner, cancel)
}

/// Like [`evaluate_move`] but explores on `board` itself. The board is
/// back in its original state when this returns, also on error.
pub fn evaluate_move_in_place(
    board: &mut Board,
    mv: Move,
    pruner: &SearchTreePruner,
    cancel: &CancelToken,
) -> ChessResult<Evaluation> {
    if !board.is_legal(mv) {
        return Err(ChessError::IllegalMove {
            code: mv.code(),
            validated: Vec::new(),
        });
    }
    let mut search = Search {
        pruner,
        cancel,
        nodes: 0,
    };
    let evaluation = search.child(board, mv, 0)?;
    trace!(%mv, %evaluation, nodes = search.nodes, "move evaluated");
    Ok(evaluation)
}

/// Value of the current position for the side to move, searched as if it
/// were `ply` plies below a root move.
pub fn evaluate_position(
    board: &mut Board,
    pruner: &SearchTreePruner,
    ply: usize,
    cancel: &CancelToken,
) -> ChessResult<Evaluation> {
    let mut search = Search {
        pruner,
        cancel,
        nodes: 0,
    };
    search.node(board, ply)
}

struct Search<'a> {
    pruner: &'a SearchTreePruner,
    cancel: &'a CancelToken,
    nodes: u64,
}

impl Search<'_> {
    /// Plays `mv`, values the reply position at `ply` and flips it back to
    /// the mover's point of view.
    fn child(&mut self, board: &mut Board, mv: Move, ply: usize) -> ChessResult<Evaluation> {
        let mover = board.side_to_move();
        board.apply_move(mv)?;
        let reply = self.node(board, ply);
        let material = Inventory::of(board).material_balance(mover);
        board.undo();
        Ok(reply?.for_opponent(material))
    }

    fn node(&mut self, board: &mut Board, ply: usize) -> ChessResult<Evaluation> {
        self.cancel.check()?;
        self.nodes += 1;

        if let Some(breadth) = self.pruner.breadth_at(ply) {
            self.full_node(board, ply, breadth)
        } else if self.pruner.is_critical_ply(ply) {
            self.critical_node(board, ply)
        } else {
            Ok(leaf(board))
        }
    }

    fn full_node(&mut self, board: &mut Board, ply: usize, breadth: usize) -> ChessResult<Evaluation> {
        let moves = board.legal_moves();
        if moves.is_empty() {
            return Ok(no_moves(board));
        }
        if let Some(kind) = board.draw_by_rule() {
            return Ok(Evaluation::Draw(kind));
        }

        let candidates = if breadth < moves.len() {
            let mut ordered = order_moves(board, moves)?;
            ordered.truncate(breadth);
            ordered
        } else {
            moves
        };

        let mut best: Option<Evaluation> = None;
        for mv in candidates {
            let evaluation = self.child(board, mv, ply + 1)?;
            best = Some(best.map_or(evaluation, |current| current.max(evaluation)));
        }
        best.ok_or(ChessError::NoLegalMoves)
    }

    fn critical_node(&mut self, board: &mut Board, ply: usize) -> ChessResult<Evaluation> {
        let moves = board.legal_moves();
        if moves.is_empty() {
            return Ok(no_moves(board));
        }
        if let Some(kind) = board.draw_by_rule() {
            return Ok(Evaluation::Draw(kind));
        }

        let in_check = board.is_in_check();
        let mut best = (!in_check).then(|| Evaluation::Ongoing(static_score(board)));
        let candidates = if in_check {
            moves
        } else {
            let mut critical = Vec::with_capacity(moves.len());
            for mv in moves {
                if is_critical(board, mv)? {
                    critical.push(mv);
                }
            }
            critical
        };

        let mut ordered = if candidates.len() > self.pruner.critical_breadth {
            order_moves(board, candidates)?
        } else {
            candidates
        };
        ordered.truncate(self.pruner.critical_breadth.max(1));

        for mv in ordered {
            let evaluation = self.child(board, mv, ply + 1)?;
            best = Some(best.map_or(evaluation, |current| current.max(evaluation)));
        }
        best.ok_or(ChessError::NoLegalMoves)
    }
}

/// Static value at the search horizon.
fn leaf(board: &Board) -> Evaluation {
    if board.legal_moves().is_empty() {
        return no_moves(board);
    }
    match board.draw_by_rule() {
        Some(kind) => Evaluation::Draw(kind),
        None => Evaluation::Ongoing(static_score(board)),
    }
}

fn no_moves(board: &Board) -> Evaluation {
    if board.is_in_check() {
        mated(board)
    } else {
        Evaluation::Draw(DrawKind::Stalemate)
    }
}

fn mated(board: &Board) -> Evaluation {
    Evaluation::CheckmateSelf {
        in_moves: 0,
        material: Inventory::of(board).material_balance(board.side_to_move()),
    }
}

/// Sorts `moves` by the mover's static score one ply ahead, best first.
fn order_moves(board: &mut Board, moves: Vec<Move>) -> ChessResult<Vec<Move>> {
    let mut scored = Vec::with_capacity(moves.len());
    for mv in moves {
        board.apply_move(mv)?;
        // Score is for the opponent, who is now to move.
        let score = -static_score(board);
        board.undo();
        scored.push((mv, score));
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(scored.into_iter().map(|(mv, _)| mv).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::StartConfig;
    use crate::search::pruner::Difficulty;

    fn mv(code: &str) -> Move {
        Move::from_code(code).expect("test move code should parse")
    }

    fn board(setup: &str) -> Board {
        Board::new(&StartConfig::manual(setup).expect("setup should parse")).expect("board")
    }

    #[test]
    fn evaluating_never_changes_the_board() {
        let board = Board::replay(
            &StartConfig::Classic,
            &["e2-e4", "e7-e5", "g1-f3", "b8-c6", "f1-b5", "a7-a6"],
        )
        .expect("replay");
        let before = board.to_string();
        let played = board.moves_played();
        let pruner = Difficulty::Easy.pruner();
        let cancel = CancelToken::new();
        for candidate in board.legal_moves() {
            evaluate_move(&board, candidate, &pruner, &cancel).expect("evaluation");
            assert_eq!(board.to_string(), before, "after evaluating {candidate}");
        }
        assert_eq!(board.moves_played(), played);
    }

    #[test]
    fn in_place_evaluation_restores_the_board() {
        let mut board = board("Ke1 Ra1 Rh1 Pe5 ke8 pd7 qd8 b");
        let before = board.to_string();
        let pruner = Difficulty::Easy.pruner();
        let cancel = CancelToken::new();
        for candidate in board.legal_moves() {
            evaluate_move_in_place(&mut board, candidate, &pruner, &cancel).expect("evaluation");
            assert_eq!(board.to_string(), before, "after evaluating {candidate}");
        }
    }

    #[test]
    fn finds_back_rank_mate_in_one() {
        let board = board("Kg1 Ra1 kg8 pf7 pg7 ph7");
        let pruner = Difficulty::Easy.pruner();
        let cancel = CancelToken::new();
        let mate = evaluate_move(&board, mv("a1-a8"), &pruner, &cancel).expect("evaluation");
        assert_eq!(mate, Evaluation::CheckmateOther { in_moves: 1 });
        let quiet = evaluate_move(&board, mv("g1-f1"), &pruner, &cancel).expect("evaluation");
        assert!(mate > quiet);
    }

    #[test]
    fn sees_the_mate_it_walks_into() {
        let board = board("Kg1 Ra1 kg8 pb7 pf7 pg7 ph7 b");
        let pruner = Difficulty::Easy.pruner();
        let cancel = CancelToken::new();
        let careless = evaluate_move(&board, mv("b7-b6"), &pruner, &cancel).expect("evaluation");
        assert!(
            matches!(careless, Evaluation::CheckmateSelf { in_moves: 1, .. }),
            "{careless}"
        );
        let luft = evaluate_move(&board, mv("h7-h6"), &pruner, &cancel).expect("evaluation");
        assert!(matches!(luft, Evaluation::Ongoing(_)), "{luft}");
        assert!(luft > careless);
    }

    #[test]
    fn stalemating_move_is_a_draw() {
        let board = board("Kf6 Qc2 kh8");
        let evaluation = evaluate_move(
            &board,
            mv("c2-g6"),
            &Difficulty::Easy.pruner(),
            &CancelToken::new(),
        )
        .expect("evaluation");
        assert_eq!(evaluation, Evaluation::Draw(DrawKind::Stalemate));
    }

    #[test]
    fn mated_position_values() {
        let mut mated_board =
            Board::replay(&StartConfig::Classic, &["f2-f3", "e7-e5", "g2-g4", "d8-h4"]).expect("replay");
        let evaluation = evaluate_position(
            &mut mated_board,
            &Difficulty::Medium.pruner(),
            0,
            &CancelToken::new(),
        )
        .expect("evaluation");
        assert!(matches!(evaluation, Evaluation::CheckmateSelf { in_moves: 0, .. }));

        // Past the horizon the mate is still recognised.
        let horizon = evaluate_position(
            &mut mated_board,
            &SearchTreePruner::new(Vec::new(), 0, 0),
            0,
            &CancelToken::new(),
        )
        .expect("evaluation");
        assert!(matches!(horizon, Evaluation::CheckmateSelf { in_moves: 0, .. }));
    }

    #[test]
    fn stalemate_at_the_horizon_is_a_draw() {
        let horizon = SearchTreePruner::new(Vec::new(), 0, 0);
        let cancel = CancelToken::new();

        let before = board("Kf6 Qc2 kh8");
        let evaluation = evaluate_move(&before, mv("c2-g6"), &horizon, &cancel).expect("evaluation");
        assert_eq!(evaluation, Evaluation::Draw(DrawKind::Stalemate));

        let mut stalemated = board("Kf6 Qg6 kh8 b");
        let evaluation = evaluate_position(&mut stalemated, &horizon, 0, &cancel).expect("evaluation");
        assert_eq!(evaluation, Evaluation::Draw(DrawKind::Stalemate));
    }

    #[test]
    fn critical_plies_resolve_hanging_pieces() {
        // White can take the undefended queen on d5.
        let board = board("Ke1 Nc3 ke8 qd5 b");
        let pruner = SearchTreePruner::new(Vec::new(), 1, 4);
        let cancel = CancelToken::new();
        let stays = evaluate_move(&board, mv("e8-f7"), &pruner, &cancel).expect("evaluation");
        let escapes = evaluate_move(&board, mv("d5-a5"), &pruner, &cancel).expect("evaluation");
        assert!(escapes > stays, "escape {escapes} vs stay {stays}");
    }

    #[test]
    fn illegal_move_is_rejected() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        let outcome = evaluate_move(
            &board,
            mv("e2-e5"),
            &Difficulty::Easy.pruner(),
            &CancelToken::new(),
        );
        assert!(matches!(outcome, Err(ChessError::IllegalMove { .. })));
    }

    #[test]
    fn cancellation_stops_the_search() {
        let board = Board::new(&StartConfig::Classic).expect("classic board");
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = evaluate_move(&board, mv("e2-e4"), &Difficulty::Hard.pruner(), &cancel);
        assert_eq!(outcome, Err(ChessError::Cancelled));
    }

    #[test]
    fn ordering_puts_the_capture_first() {
        let mut board = board("Ke1 Rd1 ke8 qd7");
        let moves = board.legal_moves();
        let ordered = order_moves(&mut board, moves).expect("ordering");
        assert_eq!(ordered.first().copied(), Some(mv("d1-d7")));
    }
}
