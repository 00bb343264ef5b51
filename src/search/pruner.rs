//! Branching budget of the minimax search and the named difficulty presets.

use std::fmt;
use std::str::FromStr;

use crate::errors::{ChessError, ChessResult};

/// How far and how wide the search tree is expanded.
///
/// `breadth[ply]` is the number of best-ordered moves searched at that ply;
/// `usize::MAX` means every legal move. Once the breadth plies are used up,
/// `critical_plies` more plies follow that only look at captures,
/// promotions and checks (at most `critical_breadth` of them per node)
/// before the static scorer takes over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTreePruner {
    pub breadth: Vec<usize>,
    pub critical_plies: usize,
    pub critical_breadth: usize,
}

impl SearchTreePruner {
    pub fn new(breadth: Vec<usize>, critical_plies: usize, critical_breadth: usize) -> Self {
        Self {
            breadth,
            critical_plies,
            critical_breadth,
        }
    }

    /// One full ply plus a short capture/check tail; used to give book
    /// moves a plausible evaluation without real thinking time.
    pub fn quick() -> Self {
        Self::new(vec![usize::MAX], 1, 4)
    }

    /// Deepest ply the search can reach below the root move.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.breadth.len() + self.critical_plies
    }

    /// Moves to expand at `ply`, `None` past the full-width plies.
    #[inline]
    pub fn breadth_at(&self, ply: usize) -> Option<usize> {
        self.breadth.get(ply).copied()
    }

    #[inline]
    pub fn is_critical_ply(&self, ply: usize) -> bool {
        ply >= self.breadth.len() && ply < self.max_depth()
    }
}

impl Default for SearchTreePruner {
    fn default() -> Self {
        Difficulty::default().pruner()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    pub fn pruner(self) -> SearchTreePruner {
        const ALL_MOVES: usize = usize::MAX;
        match self {
            Difficulty::Easy => SearchTreePruner::new(vec![ALL_MOVES, 6], 1, 4),
            Difficulty::Medium => SearchTreePruner::new(vec![ALL_MOVES, 10, 6], 2, 6),
            Difficulty::Hard => SearchTreePruner::new(vec![ALL_MOVES, 14, 8, 5], 2, 8),
            Difficulty::Expert => SearchTreePruner::new(vec![ALL_MOVES, ALL_MOVES, 10, 6], 3, 8),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = ChessError;

    fn from_str(s: &str) -> ChessResult<Self> {
        let wanted = s.trim();
        Difficulty::ALL
            .into_iter()
            .find(|difficulty| difficulty.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ChessError::InvalidOptionValue {
                name: "Difficulty".to_owned(),
                value: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_parse_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().expect("parse"), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().expect("parse"), Difficulty::Easy);
        for difficulty in Difficulty::ALL {
            assert_eq!(difficulty.to_string().parse::<Difficulty>(), Ok(difficulty));
        }
        assert!(matches!(
            "grandmaster".parse::<Difficulty>(),
            Err(ChessError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn harder_presets_search_deeper() {
        let depths: Vec<usize> = Difficulty::ALL.iter().map(|d| d.pruner().max_depth()).collect();
        assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]), "{depths:?}");
        assert_eq!(Difficulty::Easy.pruner().max_depth(), 3);
    }

    #[test]
    fn ply_classification() {
        let pruner = Difficulty::Medium.pruner();
        assert_eq!(pruner.breadth_at(0), Some(usize::MAX));
        assert_eq!(pruner.breadth_at(2), Some(6));
        assert_eq!(pruner.breadth_at(3), None);
        assert!(!pruner.is_critical_ply(2));
        assert!(pruner.is_critical_ply(3));
        assert!(pruner.is_critical_ply(4));
        assert!(!pruner.is_critical_ply(5));
    }
}
