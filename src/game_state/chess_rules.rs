//! Start configurations and the draw rules that only depend on material.
//!
//! A game starts from the classic layout, one of the 960 Chess960 back
//! ranks (numbered the Scharnagl way, 518 being the classic one) or a
//! hand-written piece list.

use std::fmt;

use rand::Rng;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{Color, PieceKind, Position};
use crate::moves::figure::Figure;

/// Chess960 number of the classical arrangement RNBQKBNR.
pub const CLASSIC_CHESS960_INDEX: u16 = 518;

pub const CHESS960_POSITIONS: u16 = 960;

/// Ways to put two knights on the five squares left after bishops and queen.
const KNIGHT_PLACEMENTS: [(usize, usize); 10] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartConfig {
    Classic,
    Chess960(u16),
    Manual(ManualSetup),
}

impl StartConfig {
    pub fn chess960(index: u16) -> ChessResult<Self> {
        if index >= CHESS960_POSITIONS {
            return Err(ChessError::InvalidChess960Index(index));
        }
        Ok(StartConfig::Chess960(index))
    }

    pub fn random_chess960<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StartConfig::Chess960(rng.random_range(0..CHESS960_POSITIONS))
    }

    /// Parses a manual setup, see [`ManualSetup::parse`].
    pub fn manual(text: &str) -> ChessResult<Self> {
        ManualSetup::parse(text).map(StartConfig::Manual)
    }

    /// Chess960 number of this start, `None` for manual setups.
    pub fn chess960_index(&self) -> Option<u16> {
        match self {
            StartConfig::Classic => Some(CLASSIC_CHESS960_INDEX),
            StartConfig::Chess960(index) => Some(*index),
            StartConfig::Manual(_) => None,
        }
    }

    pub fn is_classic(&self) -> bool {
        self.chess960_index() == Some(CLASSIC_CHESS960_INDEX)
    }

    /// Figures of the initial position and the side to move.
    pub fn placement(&self) -> ChessResult<(Vec<Figure>, Color)> {
        match self {
            StartConfig::Classic | StartConfig::Chess960(_) => {
                let index = self.chess960_index().unwrap_or(CLASSIC_CHESS960_INDEX);
                Ok((back_rank_placement(&chess960_back_rank(index)?), Color::White))
            }
            StartConfig::Manual(setup) => Ok((setup.figures(), setup.side_to_move)),
        }
    }
}

impl fmt::Display for StartConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartConfig::Classic => write!(f, "classic"),
            StartConfig::Chess960(index) => write!(f, "chess960 #{index}"),
            StartConfig::Manual(setup) => write!(f, "manual [{setup}]"),
        }
    }
}

/// Back rank (files a..h) of Chess960 position `index`.
pub fn chess960_back_rank(index: u16) -> ChessResult<[PieceKind; 8]> {
    if index >= CHESS960_POSITIONS {
        return Err(ChessError::InvalidChess960Index(index));
    }
    let mut rank: [Option<PieceKind>; 8] = [None; 8];
    let mut n = index as usize;

    rank[2 * (n % 4) + 1] = Some(PieceKind::Bishop);
    n /= 4;
    rank[2 * (n % 4)] = Some(PieceKind::Bishop);
    n /= 4;

    let queen_slot = n % 6;
    n /= 6;
    place_on_empty(&mut rank, queen_slot, PieceKind::Queen);

    // Place the later knight first so the earlier empty index stays valid.
    let (first, second) = KNIGHT_PLACEMENTS[n];
    place_on_empty(&mut rank, second, PieceKind::Knight);
    place_on_empty(&mut rank, first, PieceKind::Knight);

    for kind in [PieceKind::Rook, PieceKind::King, PieceKind::Rook] {
        place_on_empty(&mut rank, 0, kind);
    }

    let mut result = [PieceKind::Pawn; 8];
    for (slot, kind) in result.iter_mut().zip(rank) {
        *slot = kind.ok_or_else(|| {
            ChessError::Internal(format!("chess960 #{index} left a back-rank square empty"))
        })?;
    }
    Ok(result)
}

fn place_on_empty(rank: &mut [Option<PieceKind>; 8], nth_empty: usize, kind: PieceKind) {
    if let Some(slot) = rank.iter_mut().filter(|slot| slot.is_none()).nth(nth_empty) {
        *slot = Some(kind);
    }
}

fn back_rank_placement(back_rank: &[PieceKind; 8]) -> Vec<Figure> {
    let mut figures = Vec::with_capacity(32);
    for color in Color::BOTH {
        for (column, kind) in back_rank.iter().enumerate() {
            if let Some(position) = Position::new(column as u8, color.home_row()) {
                figures.push(Figure::new(*kind, color, position, false));
            }
            if let Some(position) = Position::new(column as u8, color.pawn_row()) {
                figures.push(Figure::new(PieceKind::Pawn, color, position, false));
            }
        }
    }
    figures
}

/// A hand-written position such as `"Ke1 Ra1 ke8 pe7 b"`.
///
/// Tokens are a piece symbol (upper case White, lower case Black) followed
/// by a square. A lone `w` or `b` names the side to move (White otherwise).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualSetup {
    pieces: Vec<(Color, PieceKind, Position)>,
    side_to_move: Color,
}

impl ManualSetup {
    pub fn new(pieces: Vec<(Color, PieceKind, Position)>, side_to_move: Color) -> Self {
        Self {
            pieces,
            side_to_move,
        }
    }

    pub fn parse(text: &str) -> ChessResult<Self> {
        let mut pieces = Vec::new();
        let mut side_to_move = Color::White;
        for token in text.split_whitespace() {
            match token {
                "w" => side_to_move = Color::White,
                "b" => side_to_move = Color::Black,
                _ => {
                    let mut chars = token.chars();
                    let symbol = chars.next().unwrap_or(' ');
                    let (color, kind) = PieceKind::from_symbol(symbol).ok_or_else(|| {
                        ChessError::InvalidSetup(format!("unknown piece in token '{token}'"))
                    })?;
                    let position = Position::parse(chars.as_str()).map_err(|_| {
                        ChessError::InvalidSetup(format!("bad square in token '{token}'"))
                    })?;
                    pieces.push((color, kind, position));
                }
            }
        }
        Ok(Self::new(pieces, side_to_move))
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn pieces(&self) -> &[(Color, PieceKind, Position)] {
        &self.pieces
    }

    /// Kings and rooks only keep castling rights on their classical squares.
    fn figures(&self) -> Vec<Figure> {
        self.pieces
            .iter()
            .map(|&(color, kind, position)| {
                let unmoved = match kind {
                    PieceKind::King => {
                        position.row() == color.home_row() && position.column() == 4
                    }
                    PieceKind::Rook => {
                        position.row() == color.home_row()
                            && (position.column() == 0 || position.column() == 7)
                    }
                    PieceKind::Pawn => position.row() == color.pawn_row(),
                    _ => false,
                };
                Figure::new(kind, color, position, !unmoved)
            })
            .collect()
    }
}

impl fmt::Display for ManualSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (color, kind, position) in &self.pieces {
            write!(f, "{}{} ", kind.symbol(*color), position)?;
        }
        match self.side_to_move {
            Color::White => write!(f, "w"),
            Color::Black => write!(f, "b"),
        }
    }
}

/// Why a game ended in a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Stalemate,
    Repetition,
    InsufficientMaterial,
    FiftyMoveRule,
}

impl fmt::Display for DrawKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawKind::Stalemate => "stalemate",
            DrawKind::Repetition => "threefold repetition",
            DrawKind::InsufficientMaterial => "insufficient material",
            DrawKind::FiftyMoveRule => "fifty-move rule",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameEnd {
    Checkmate { loser: Color },
    Draw(DrawKind),
}

impl fmt::Display for GameEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEnd::Checkmate { loser } => write!(f, "checkmate, {} wins", loser.opposite()),
            GameEnd::Draw(kind) => write!(f, "draw by {kind}"),
        }
    }
}

/// At most six figures, no pawns, rooks or queens, and per side at most one
/// bishop or at most two knights (never a bishop together with a knight).
pub fn is_insufficient_material<'a>(figures: impl IntoIterator<Item = &'a Figure>) -> bool {
    let mut total = 0usize;
    let mut bishops = [0u8; 2];
    let mut knights = [0u8; 2];
    for figure in figures {
        total += 1;
        let side = figure.color().index();
        match figure.kind() {
            PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            PieceKind::Bishop => bishops[side] += 1,
            PieceKind::Knight => knights[side] += 1,
            PieceKind::King => {}
        }
    }
    total <= 6
        && Color::BOTH.iter().all(|color| {
            let (b, n) = (bishops[color.index()], knights[color.index()]);
            b <= 1 && n <= 2 && !(b >= 1 && n >= 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank_text(rank: &[PieceKind; 8]) -> String {
        rank.iter().map(|kind| kind.letter()).collect()
    }

    #[test]
    fn classic_index_is_the_standard_back_rank() {
        let rank = chess960_back_rank(CLASSIC_CHESS960_INDEX).expect("518 is valid");
        assert_eq!(rank_text(&rank), "RNBQKBNR");
        assert_eq!(StartConfig::Classic.chess960_index(), Some(518));
        assert!(StartConfig::Chess960(518).is_classic());
    }

    #[test]
    fn every_chess960_back_rank_is_well_formed() {
        for index in 0..CHESS960_POSITIONS {
            let rank = chess960_back_rank(index).expect("index in range");
            let columns_of = |kind: PieceKind| -> Vec<usize> {
                rank.iter()
                    .enumerate()
                    .filter(|(_, k)| **k == kind)
                    .map(|(c, _)| c)
                    .collect()
            };
            let bishops = columns_of(PieceKind::Bishop);
            let rooks = columns_of(PieceKind::Rook);
            let kings = columns_of(PieceKind::King);
            assert_eq!(bishops.len(), 2, "#{index}");
            assert_ne!(bishops[0] % 2, bishops[1] % 2, "#{index} bishops share a colour");
            assert_eq!(rooks.len(), 2, "#{index}");
            assert_eq!(kings.len(), 1, "#{index}");
            assert!(rooks[0] < kings[0] && kings[0] < rooks[1], "#{index} king not between rooks");
            assert_eq!(columns_of(PieceKind::Queen).len(), 1, "#{index}");
            assert_eq!(columns_of(PieceKind::Knight).len(), 2, "#{index}");
        }
    }

    #[test]
    fn chess960_indices_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for index in 0..CHESS960_POSITIONS {
            let rank = chess960_back_rank(index).expect("index in range");
            assert!(seen.insert(rank_text(&rank)), "#{index} repeats an arrangement");
        }
        assert_eq!(chess960_back_rank(960), Err(ChessError::InvalidChess960Index(960)));
    }

    #[test]
    fn manual_setup_parses_tokens_and_side() {
        let setup = ManualSetup::parse("Ke1 Ra1 ke8 pe7 b").expect("setup should parse");
        assert_eq!(setup.side_to_move(), Color::Black);
        assert_eq!(setup.pieces().len(), 4);
        let figures = setup.figures();
        assert!(figures.iter().all(|f| !f.has_moved()));

        let moved = ManualSetup::parse("Kd1 Rb1 ke8").expect("setup should parse");
        assert!(moved
            .figures()
            .iter()
            .filter(|f| f.color() == Color::White)
            .all(|f| f.has_moved()));

        assert!(matches!(ManualSetup::parse("Xe1"), Err(ChessError::InvalidSetup(_))));
        assert!(matches!(ManualSetup::parse("Ke9"), Err(ChessError::InvalidSetup(_))));
    }

    #[test]
    fn insufficient_material_thresholds() {
        let figures = |text: &str| ManualSetup::parse(text).expect("setup").figures();
        assert!(is_insufficient_material(&figures("Ke1 ke8")));
        assert!(is_insufficient_material(&figures("Ke1 Bc1 ke8 nb8")));
        assert!(is_insufficient_material(&figures("Ke1 Nb1 Ng1 ke8")));
        assert!(!is_insufficient_material(&figures("Ke1 Bc1 Nb1 ke8")));
        assert!(!is_insufficient_material(&figures("Ke1 Bc1 Bf1 ke8")));
        assert!(!is_insufficient_material(&figures("Ke1 Pa2 ke8")));
        assert!(!is_insufficient_material(&figures("Ke1 Ra1 ke8")));
    }
}
