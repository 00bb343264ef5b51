//! Ordered evaluation values.
//!
//! Numbers alone cannot express "mate in 2 beats any material advantage",
//! so an evaluation is a tagged value with a total order across variants:
//! being mated < losing on points < draw < even or winning on points <
//! delivering mate. Within the mate variants the quicker own mate and the
//! slower opposing mate are preferred.

use std::cmp::Ordering;
use std::fmt;

use crate::game_state::chess_rules::DrawKind;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy)]
pub enum Evaluation {
    /// Static or backed-up score in pawns.
    Ongoing(f64),
    Draw(DrawKind),
    /// The opponent mates in `in_moves`; `material` breaks ties.
    CheckmateSelf { in_moves: u32, material: f64 },
    /// We mate in `in_moves`.
    CheckmateOther { in_moves: u32 },
}

impl Evaluation {
    fn rank(&self) -> u8 {
        match self {
            Evaluation::CheckmateSelf { .. } => 0,
            Evaluation::Ongoing(score) if *score < 0.0 => 1,
            Evaluation::Draw(_) => 2,
            Evaluation::Ongoing(_) => 3,
            Evaluation::CheckmateOther { .. } => 4,
        }
    }

    /// Score usable for distance comparisons; mates have none.
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            Evaluation::Ongoing(score) => Some(*score),
            Evaluation::Draw(_) => Some(0.0),
            Evaluation::CheckmateSelf { .. } | Evaluation::CheckmateOther { .. } => None,
        }
    }

    pub fn is_mate(&self) -> bool {
        self.as_numeric().is_none()
    }

    /// The same outcome seen by the other side, one move earlier.
    ///
    /// `material` is the balance from the new point of view and only matters
    /// when the result becomes a `CheckmateSelf`.
    pub fn for_opponent(self, material: f64) -> Self {
        match self {
            Evaluation::Ongoing(score) => Evaluation::Ongoing(-score),
            Evaluation::Draw(kind) => Evaluation::Draw(kind),
            Evaluation::CheckmateSelf { in_moves, .. } => Evaluation::CheckmateOther {
                in_moves: in_moves + 1,
            },
            Evaluation::CheckmateOther { in_moves } => {
                Evaluation::CheckmateSelf { in_moves, material }
            }
        }
    }
}

impl Ord for Evaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank()).then_with(|| match (self, other) {
            (Evaluation::Ongoing(a), Evaluation::Ongoing(b)) => a.total_cmp(b),
            (
                Evaluation::CheckmateSelf {
                    in_moves: a,
                    material: material_a,
                },
                Evaluation::CheckmateSelf {
                    in_moves: b,
                    material: material_b,
                },
            ) => a.cmp(b).then_with(|| material_a.total_cmp(material_b)),
            (
                Evaluation::CheckmateOther { in_moves: a },
                Evaluation::CheckmateOther { in_moves: b },
            ) => b.cmp(a),
            // All draw kinds are worth the same.
            _ => Ordering::Equal,
        })
    }
}

impl PartialOrd for Evaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Evaluation {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Evaluation {}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Ongoing(score) => write!(f, "{score:+.2}"),
            Evaluation::Draw(kind) => write!(f, "draw ({kind})"),
            Evaluation::CheckmateSelf { in_moves, .. } => write!(f, "mated in {in_moves}"),
            Evaluation::CheckmateOther { in_moves } => write!(f, "mate in {in_moves}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatedMove {
    pub mv: Move,
    pub evaluation: Evaluation,
}

impl fmt::Display for EvaluatedMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mv, self.evaluation)
    }
}

/// Sorts best first; equal evaluations keep their relative order.
pub fn sort_best_first(moves: &mut [EvaluatedMove]) {
    moves.sort_by(|a, b| b.evaluation.cmp(&a.evaluation));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Position;

    fn self_mate(in_moves: u32, material: f64) -> Evaluation {
        Evaluation::CheckmateSelf { in_moves, material }
    }

    fn other_mate(in_moves: u32) -> Evaluation {
        Evaluation::CheckmateOther { in_moves }
    }

    #[test]
    fn best_first_order_across_variants() {
        let mut values = vec![
            Evaluation::Ongoing(-1.2),
            Evaluation::Ongoing(-0.5),
            Evaluation::Ongoing(4.6),
            Evaluation::Ongoing(2.1),
            Evaluation::Ongoing(0.0),
            Evaluation::Draw(DrawKind::Stalemate),
            self_mate(1, -1.0),
            self_mate(1, -2.0),
            self_mate(2, 5.0),
            other_mate(1),
            other_mate(2),
        ];
        values.sort_by(|a, b| b.cmp(a));
        let text: Vec<String> = values.iter().map(|v| format!("{v:?}")).collect();
        let expected = [
            other_mate(1),
            other_mate(2),
            Evaluation::Ongoing(4.6),
            Evaluation::Ongoing(2.1),
            Evaluation::Ongoing(0.0),
            Evaluation::Draw(DrawKind::Stalemate),
            Evaluation::Ongoing(-0.5),
            Evaluation::Ongoing(-1.2),
            self_mate(2, 5.0),
            self_mate(1, -1.0),
            self_mate(1, -2.0),
        ];
        let expected_text: Vec<String> = expected.iter().map(|v| format!("{v:?}")).collect();
        assert_eq!(text, expected_text);
    }

    #[test]
    fn draw_kinds_are_equal() {
        assert_eq!(
            Evaluation::Draw(DrawKind::Repetition),
            Evaluation::Draw(DrawKind::FiftyMoveRule)
        );
        assert!(Evaluation::Ongoing(0.0) > Evaluation::Draw(DrawKind::Stalemate));
        assert!(Evaluation::Ongoing(-0.01) < Evaluation::Draw(DrawKind::Stalemate));
    }

    #[test]
    fn perspective_switch() {
        assert_eq!(
            Evaluation::Ongoing(1.5).for_opponent(0.0),
            Evaluation::Ongoing(-1.5)
        );
        // The side to move is mated: the move that got there mates in one.
        assert_eq!(self_mate(0, -3.0).for_opponent(3.0), other_mate(1));
        assert_eq!(
            other_mate(2).for_opponent(-4.0),
            self_mate(2, -4.0)
        );
        assert_eq!(self_mate(2, 0.0).for_opponent(0.0), other_mate(3));
    }

    #[test]
    fn numeric_view() {
        assert_eq!(Evaluation::Ongoing(2.5).as_numeric(), Some(2.5));
        assert_eq!(Evaluation::Draw(DrawKind::Repetition).as_numeric(), Some(0.0));
        assert_eq!(other_mate(1).as_numeric(), None);
        assert!(self_mate(3, 0.0).is_mate());
    }

    #[test]
    fn sorting_evaluated_moves_is_stable() {
        let a = Move::new(Position::ALL[12], Position::ALL[28]);
        let b = Move::new(Position::ALL[11], Position::ALL[27]);
        let c = Move::new(Position::ALL[6], Position::ALL[21]);
        let mut moves = vec![
            EvaluatedMove { mv: a, evaluation: Evaluation::Ongoing(0.1) },
            EvaluatedMove { mv: b, evaluation: other_mate(3) },
            EvaluatedMove { mv: c, evaluation: Evaluation::Ongoing(0.1) },
        ];
        sort_best_first(&mut moves);
        let order: Vec<Move> = moves.iter().map(|m| m.mv).collect();
        assert_eq!(order, vec![b, a, c]);
    }
}
