//! Opening book as a prefix tree of move codes.
//!
//! Lines come from a plain text file: one comma separated sequence per line,
//! `#` comments and blank lines ignored. Every line is replayed on a fresh
//! classic board before it is added, so the tree only holds legal,
//! canonical moves. A move written in parentheses is replayed like any
//! other but marked non-playable: the book follows it when the opponent
//! plays it, yet never suggests it.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_rules::StartConfig;
use crate::moves::chess_move::Move;
use crate::utils::algebraic::split_move_list;

const DEFAULT_LINES: &str = include_str!("data/openings.txt");

/// One validated move of an opening line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookStep {
    pub mv: Move,
    pub playable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct BookNode {
    children: BTreeMap<Move, BookNode>,
    /// Set once any line plays the move leading here without parentheses.
    playable: bool,
}

impl BookNode {
    fn insert(&mut self, steps: &[BookStep]) {
        let mut node = self;
        for step in steps {
            node = node.children.entry(step.mv).or_default();
            node.playable |= step.playable;
        }
    }

    fn child(&self, mv: Move) -> Option<&BookNode> {
        self.children.get(&mv)
    }

    fn playable_moves(&self) -> Vec<Move> {
        self.children
            .iter()
            .filter(|(_, node)| node.playable)
            .map(|(mv, _)| *mv)
            .collect()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    root: BookNode,
    max_depth: usize,
    lines: usize,
}

impl OpeningBook {
    /// Builds a book from file contents. Lines that do not replay are
    /// skipped with a warning.
    pub fn from_text(text: &str) -> Self {
        let mut book = Self::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match parse_sequence(line) {
                Ok(steps) => {
                    book.max_depth = book.max_depth.max(steps.len());
                    book.root.insert(&steps);
                    book.lines += 1;
                }
                Err(err) => warn!(line = index + 1, error = %err, "skipping opening line"),
            }
        }
        info!(lines = book.lines, max_depth = book.max_depth, "opening book loaded");
        book
    }

    /// The book compiled into the crate.
    pub fn load_default() -> Self {
        Self::from_text(DEFAULT_LINES)
    }

    /// Reads a book file; an unreadable file gives an empty book.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Self::from_text(&text),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "opening book unavailable, playing without it");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of lines accepted into the tree.
    pub fn line_count(&self) -> usize {
        self.lines
    }

    /// Longest line in plies.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Moves the book would suggest after `played` (canonical moves from
    /// the classic start).
    pub fn candidates(&self, played: &[Move]) -> Vec<Move> {
        if played.len() >= self.max_depth {
            return Vec::new();
        }
        let mut node = &self.root;
        for mv in played {
            match node.child(*mv) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        node.playable_moves()
    }

    /// A uniformly chosen book move, or `None` when the game left the book
    /// or did not start from the classic setup.
    pub fn lookup<R: Rng + ?Sized>(
        &self,
        start: &StartConfig,
        played: &[Move],
        rng: &mut R,
    ) -> Option<Move> {
        if !start.is_classic() {
            return None;
        }
        self.candidates(played).choose(rng).copied()
    }
}

/// Replays one comma separated line from the classic start.
///
/// Rejects empty tokens (stray leading, trailing or doubled commas),
/// malformed codes and moves that are illegal where they occur. Castling
/// given as the king's destination is stored in the canonical king-onto-rook
/// form.
pub fn parse_sequence(line: &str) -> ChessResult<Vec<BookStep>> {
    let mut board = Board::new(&StartConfig::Classic)?;
    let mut steps = Vec::new();

    for token in split_move_list(line) {
        if token.is_empty() {
            return Err(ChessError::OpeningBook(format!("empty move in '{line}'")));
        }
        let (code, playable) = match token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            Some(inner) => (inner.trim(), false),
            None => (token, true),
        };
        let illegal = || {
            ChessError::OpeningBook(format!(
                "illegal move '{code}' after [{}] in '{line}'",
                steps
                    .iter()
                    .map(|step: &BookStep| step.mv.code())
                    .collect::<Vec<_>>()
                    .join(",")
            ))
        };
        let requested = Move::from_code(code).map_err(|_| illegal())?;
        let mv = board.resolve_move(requested).ok_or_else(illegal)?;
        board.apply_move(mv)?;
        steps.push(BookStep { mv, playable });
    }
    Ok(steps)
}
