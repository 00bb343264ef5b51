//! Core value types shared by every subsystem: colors, piece kinds, the 64
//! board positions and the eight compass directions.
//!
//! `Position` is a plain index (`row * 8 + column`, row 0 is White's home
//! row) so it is `Copy`, hashable and comparable by value.

use std::fmt;
use std::str::FromStr;

use crate::errors::{ChessError, ChessResult};

/// Side to move / owner of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row holding the king and rooks at the start of the game.
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Row the pawns start on (and may double-step from).
    #[inline]
    pub const fn pawn_row(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 6,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row delta of a pawn step.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

/// Piece kind; color is stored separately on the figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Promotion choices, strongest first.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::Knight => 1,
            PieceKind::Bishop => 2,
            PieceKind::Rook => 3,
            PieceKind::Queen => 4,
            PieceKind::King => 5,
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(PieceKind::Pawn),
            1 => Some(PieceKind::Knight),
            2 => Some(PieceKind::Bishop),
            3 => Some(PieceKind::Rook),
            4 => Some(PieceKind::Queen),
            5 => Some(PieceKind::King),
            _ => None,
        }
    }

    /// Material value in pawns. The king has no material value.
    #[inline]
    pub const fn value(self) -> f64 {
        match self {
            PieceKind::Pawn => 1.0,
            PieceKind::Knight => 3.2,
            PieceKind::Bishop => 3.3,
            PieceKind::Rook => 5.0,
            PieceKind::Queen => 9.0,
            PieceKind::King => 0.0,
        }
    }

    /// Slides along straight lines (rook, queen).
    #[inline]
    pub const fn attacks_straight(self) -> bool {
        matches!(self, PieceKind::Rook | PieceKind::Queen)
    }

    /// Slides along diagonals (bishop, queen).
    #[inline]
    pub const fn attacks_diagonal(self) -> bool {
        matches!(self, PieceKind::Bishop | PieceKind::Queen)
    }

    /// Upper-case letter used in move codes and setups.
    #[inline]
    pub const fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'P',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    /// Board symbol: upper case for White, lower case for Black.
    #[inline]
    pub fn symbol(self, color: Color) -> char {
        match color {
            Color::White => self.letter(),
            Color::Black => self.letter().to_ascii_lowercase(),
        }
    }

    pub fn from_symbol(symbol: char) -> Option<(Color, PieceKind)> {
        let color = if symbol.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match symbol.to_ascii_uppercase() {
            'P' => PieceKind::Pawn,
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            _ => return None,
        };
        Some((color, kind))
    }

    /// Parses a promotion letter (`Q`, `R`, `B`, `N`, either case).
    pub fn from_promotion_letter(letter: char) -> Option<PieceKind> {
        match letter.to_ascii_uppercase() {
            'Q' => Some(PieceKind::Queen),
            'R' => Some(PieceKind::Rook),
            'B' => Some(PieceKind::Bishop),
            'N' => Some(PieceKind::Knight),
            _ => None,
        }
    }
}

/// One of the eight compass directions, seen from White's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::UpRight,
        Direction::Right,
        Direction::DownRight,
        Direction::Down,
        Direction::DownLeft,
        Direction::Left,
        Direction::UpLeft,
    ];

    pub const STRAIGHT: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::UpRight,
        Direction::DownRight,
        Direction::DownLeft,
        Direction::UpLeft,
    ];

    /// `(column delta, row delta)`.
    #[inline]
    pub const fn delta(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, 1),
            Direction::UpRight => (1, 1),
            Direction::Right => (1, 0),
            Direction::DownRight => (1, -1),
            Direction::Down => (0, -1),
            Direction::DownLeft => (-1, -1),
            Direction::Left => (-1, 0),
            Direction::UpLeft => (-1, 1),
        }
    }

    #[inline]
    pub const fn is_straight(self) -> bool {
        matches!(
            self,
            Direction::Up | Direction::Right | Direction::Down | Direction::Left
        )
    }

    #[inline]
    pub const fn is_diagonal(self) -> bool {
        !self.is_straight()
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::UpRight => Direction::DownLeft,
            Direction::Right => Direction::Left,
            Direction::DownRight => Direction::UpLeft,
            Direction::Down => Direction::Up,
            Direction::DownLeft => Direction::UpRight,
            Direction::Left => Direction::Right,
            Direction::UpLeft => Direction::DownRight,
        }
    }

    /// True if a figure of `kind` slides along this direction.
    #[inline]
    pub const fn is_slide_of(self, kind: PieceKind) -> bool {
        if self.is_straight() {
            kind.attacks_straight()
        } else {
            kind.attacks_diagonal()
        }
    }
}

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// A board square, stored as `row * 8 + column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(u8);

impl Position {
    pub const ALL: [Position; 64] = {
        let mut all = [Position(0); 64];
        let mut i = 0;
        while i < 64 {
            all[i] = Position(i as u8);
            i += 1;
        }
        all
    };

    #[inline]
    pub const fn new(column: u8, row: u8) -> Option<Self> {
        if column < 8 && row < 8 {
            Some(Position(row * 8 + column))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < 64 {
            Some(Position(index as u8))
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / 8
    }

    #[inline]
    pub const fn column(self) -> u8 {
        self.0 % 8
    }

    /// Single-bit mask of this square.
    #[inline]
    pub const fn mask(self) -> u64 {
        1u64 << self.0
    }

    #[inline]
    pub const fn offset(self, column_delta: i8, row_delta: i8) -> Option<Self> {
        let column = self.column() as i8 + column_delta;
        let row = self.row() as i8 + row_delta;
        if column < 0 || column > 7 || row < 0 || row > 7 {
            None
        } else {
            Some(Position((row * 8 + column) as u8))
        }
    }

    #[inline]
    pub const fn step(self, direction: Direction) -> Option<Self> {
        let (dc, dr) = direction.delta();
        self.offset(dc, dr)
    }

    /// Direction from `self` towards `other` if both share a line.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        if self == other {
            return None;
        }
        let dc = other.column() as i8 - self.column() as i8;
        let dr = other.row() as i8 - self.row() as i8;
        if dc != 0 && dr != 0 && dc.abs() != dr.abs() {
            return None;
        }
        let wanted = (dc.signum(), dr.signum());
        Direction::ALL.into_iter().find(|d| d.delta() == wanted)
    }

    #[inline]
    pub fn is_straight_to(self, other: Position) -> bool {
        self != other && (self.row() == other.row() || self.column() == other.column())
    }

    #[inline]
    pub fn is_diagonal_to(self, other: Position) -> bool {
        self != other && self.row().abs_diff(other.row()) == self.column().abs_diff(other.column())
    }

    pub fn knight_targets(self) -> impl Iterator<Item = Position> {
        KNIGHT_OFFSETS
            .into_iter()
            .filter_map(move |(dc, dr)| self.offset(dc, dr))
    }

    /// King-step (Chebyshev) distance.
    #[inline]
    pub fn distance(self, other: Position) -> u8 {
        self.row()
            .abs_diff(other.row())
            .max(self.column().abs_diff(other.column()))
    }

    #[inline]
    pub fn manhattan_distance(self, other: Position) -> u8 {
        self.row().abs_diff(other.row()) + self.column().abs_diff(other.column())
    }

    /// Steps away from the central four squares (0 on d4/e4/d5/e5, 3 in a corner).
    #[inline]
    pub fn center_distance(self) -> u8 {
        let column = if self.column() < 4 { 3 - self.column() } else { self.column() - 4 };
        let row = if self.row() < 4 { 3 - self.row() } else { self.row() - 4 };
        column.max(row)
    }

    /// King steps to the nearest corner.
    pub fn corner_distance(self) -> u8 {
        CORNERS
            .iter()
            .map(|corner| self.distance(*corner))
            .min()
            .unwrap_or(0)
    }

    #[inline]
    pub fn is_light_square(self) -> bool {
        (self.row() + self.column()) % 2 == 1
    }

    pub fn parse(text: &str) -> ChessResult<Self> {
        let bytes = text.as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(text.to_owned()));
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(ChessError::InvalidSquare(text.to_owned()));
        }
        Ok(Position((rank - b'1') * 8 + (file - b'a')))
    }
}

pub const CORNERS: [Position; 4] = [Position(0), Position(7), Position(56), Position(63)];

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.column());
        let rank = char::from(b'1' + self.row());
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Position {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::parse(s)
    }
}

/// Iterates the positions set in a mask, lowest index first.
pub fn positions_in(mut mask: u64) -> impl Iterator<Item = Position> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let index = mask.trailing_zeros() as u8;
        mask &= mask - 1;
        Some(Position(index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_parse_and_display() {
        let e4 = Position::parse("e4").expect("e4 should parse");
        assert_eq!(e4.column(), 4);
        assert_eq!(e4.row(), 3);
        assert_eq!(e4.to_string(), "e4");
        assert!(Position::parse("i1").is_err());
        assert!(Position::parse("a9").is_err());
        assert!(Position::parse("a").is_err());
    }

    #[test]
    fn all_positions_are_distinct_singletons() {
        for (i, position) in Position::ALL.iter().enumerate() {
            assert_eq!(position.index(), i);
            assert_eq!(Position::from_index(i), Some(*position));
        }
        assert_eq!(Position::from_index(64), None);
    }

    #[test]
    fn directional_relations() {
        let a1 = Position::parse("a1").expect("a1");
        let h8 = Position::parse("h8").expect("h8");
        let a8 = Position::parse("a8").expect("a8");
        let b3 = Position::parse("b3").expect("b3");

        assert_eq!(a1.direction_to(h8), Some(Direction::UpRight));
        assert_eq!(h8.direction_to(a1), Some(Direction::DownLeft));
        assert_eq!(a1.direction_to(a8), Some(Direction::Up));
        assert_eq!(a1.direction_to(b3), None);
        assert!(a1.is_diagonal_to(h8));
        assert!(a1.is_straight_to(a8));
        assert!(!a1.is_straight_to(b3));
        assert_eq!(a1.step(Direction::Down), None);
    }

    #[test]
    fn knight_targets_and_distances() {
        let d4 = Position::parse("d4").expect("d4");
        let a1 = Position::parse("a1").expect("a1");
        assert_eq!(d4.knight_targets().count(), 8);
        assert_eq!(a1.knight_targets().count(), 2);
        assert_eq!(a1.distance(d4), 3);
        assert_eq!(a1.manhattan_distance(d4), 6);
        assert_eq!(d4.center_distance(), 0);
        assert_eq!(a1.center_distance(), 3);
        assert_eq!(a1.corner_distance(), 0);
        assert_eq!(d4.corner_distance(), 3);
    }

    #[test]
    fn square_colors() {
        assert!(!Position::parse("a1").expect("a1").is_light_square());
        assert!(Position::parse("h1").expect("h1").is_light_square());
        assert!(Position::parse("d1").expect("d1").is_light_square());
    }

    #[test]
    fn mask_iteration_is_ordered() {
        let mask = Position::parse("c3").expect("c3").mask() | Position::parse("a1").expect("a1").mask();
        let found: Vec<String> = positions_in(mask).map(|p| p.to_string()).collect();
        assert_eq!(found, vec!["a1", "c3"]);
    }
}
