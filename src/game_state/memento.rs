//! Compact position snapshots for repetition detection.
//!
//! A memento only records occupancy and the side to move. Branch copies made
//! by `Board::fork` share everything recorded before the fork through an
//! `Arc<[Memento]>`, so forking for a worker thread costs one allocation.

use std::sync::Arc;

use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Memento {
    /// Two squares per byte, one nibble each: 0 = empty, otherwise
    /// `1 + kind` for White and `9 + kind` for Black.
    cells: [u8; 32],
    white_to_move: bool,
}

impl Memento {
    pub fn capture(board: &Board) -> Self {
        let mut cells = [0u8; 32];
        for position in Position::ALL {
            if let Some(figure) = board.figure_at(position) {
                let code = 1 + figure.kind().index() as u8 + 8 * figure.color().index() as u8;
                let shift = 4 * (position.index() % 2);
                cells[position.index() / 2] |= code << shift;
            }
        }
        Self {
            cells,
            white_to_move: board.side_to_move() == Color::White,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MementoHistory {
    frozen: Arc<[Memento]>,
    recent: Vec<Memento>,
}

impl Default for MementoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MementoHistory {
    pub fn new() -> Self {
        Self {
            frozen: Arc::from(Vec::new()),
            recent: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.frozen.len() + self.recent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn push(&mut self, memento: Memento) {
        self.recent.push(memento);
    }

    /// Removes the newest entry. Frozen entries are never popped; a forked
    /// board has no undo records reaching back past its fork point.
    pub fn pop(&mut self) -> Option<Memento> {
        self.recent.pop()
    }

    fn get(&self, index: usize) -> Option<&Memento> {
        if index < self.frozen.len() {
            self.frozen.get(index)
        } else {
            self.recent.get(index - self.frozen.len())
        }
    }

    /// History for a branch copy: everything recorded so far becomes shared.
    pub fn freeze(&self) -> Self {
        if self.recent.is_empty() {
            return Self {
                frozen: Arc::clone(&self.frozen),
                recent: Vec::new(),
            };
        }
        let mut all = Vec::with_capacity(self.len());
        all.extend_from_slice(&self.frozen);
        all.extend_from_slice(&self.recent);
        Self {
            frozen: Arc::from(all),
            recent: Vec::new(),
        }
    }

    /// Number of times the newest position occurs, looking back at most
    /// `limit` plies. Only every second entry can match because the side to
    /// move alternates.
    pub fn repetition_count(&self, limit: usize) -> usize {
        let len = self.len();
        let Some(current) = len.checked_sub(1).and_then(|i| self.get(i)) else {
            return 0;
        };
        let mut count = 1;
        let mut back = 2;
        while back <= limit && back < len {
            if self.get(len - 1 - back) == Some(current) {
                count += 1;
            }
            back += 2;
        }
        count
    }
}
