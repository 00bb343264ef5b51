//! Packed move value and the textual move-code format.
//!
//! A `Move` is `from`, `to` and an optional promotion kind packed into a
//! `u16`, so moves compare and hash by value. Codes look like `"e2-e4"`; a
//! promotion replaces the dash with the piece letter (`"a7Qa8"`). Castling
//! is written as the king stepping onto its own rook (`"e1-h1"`).

use std::fmt;
use std::str::FromStr;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{PieceKind, Position};

const FROM_SHIFT: u16 = 0;
const TO_SHIFT: u16 = 6;
const PROMOTION_SHIFT: u16 = 12;

const SQUARE_MASK: u16 = 0x3F;
const PROMOTION_MASK: u16 = 0x7;
const NO_PROMOTION: u16 = 0;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(u16);

impl Move {
    #[inline]
    pub const fn new(from: Position, to: Position) -> Self {
        Move(((from.index() as u16) << FROM_SHIFT) | ((to.index() as u16) << TO_SHIFT))
    }

    #[inline]
    pub const fn promoting(from: Position, to: Position, kind: PieceKind) -> Self {
        let base = Move::new(from, to).0;
        Move(base | (((kind.index() as u16) + 1) << PROMOTION_SHIFT))
    }

    #[inline]
    pub const fn from(self) -> Position {
        Position::ALL[((self.0 >> FROM_SHIFT) & SQUARE_MASK) as usize]
    }

    #[inline]
    pub const fn to(self) -> Position {
        Position::ALL[((self.0 >> TO_SHIFT) & SQUARE_MASK) as usize]
    }

    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        let code = (self.0 >> PROMOTION_SHIFT) & PROMOTION_MASK;
        if code == NO_PROMOTION {
            None
        } else {
            PieceKind::from_index((code - 1) as usize)
        }
    }

    /// Raw packed value.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Parses `"e2-e4"` or `"a7Qa8"`. Only the syntax is checked here.
    pub fn from_code(code: &str) -> ChessResult<Self> {
        let malformed = || ChessError::MalformedMove(code.to_owned());
        if code.len() != 5 || !code.is_ascii() {
            return Err(malformed());
        }
        let from = Position::parse(&code[0..2]).map_err(|_| malformed())?;
        let to = Position::parse(&code[3..5]).map_err(|_| malformed())?;
        let separator = code.as_bytes()[2] as char;
        if separator == '-' {
            return Ok(Move::new(from, to));
        }
        match PieceKind::from_promotion_letter(separator) {
            Some(kind) if separator.is_ascii_uppercase() => Ok(Move::promoting(from, to, kind)),
            _ => Err(malformed()),
        }
    }

    pub fn code(self) -> String {
        let separator = self.promotion().map(PieceKind::letter).unwrap_or('-');
        format!("{}{}{}", self.from(), separator, self.to())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.code())
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_code(s)
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::errors::ChessError;
    use crate::game_state::chess_types::{PieceKind, Position};

    #[test]
    fn plain_move_code_round_trip() {
        let mv = Move::from_code("e2-e4").expect("e2-e4 should parse");
        assert_eq!(mv.from(), Position::parse("e2").expect("e2"));
        assert_eq!(mv.to(), Position::parse("e4").expect("e4"));
        assert_eq!(mv.promotion(), None);
        assert_eq!(mv.code(), "e2-e4");
    }

    #[test]
    fn promotion_code_round_trip() {
        let mv = Move::from_code("a7Qa8").expect("a7Qa8 should parse");
        assert_eq!(mv.promotion(), Some(PieceKind::Queen));
        assert_eq!(mv.to_string(), "a7Qa8");

        let knight = Move::from_code("b2Na1").expect("b2Na1 should parse");
        assert_eq!(knight.promotion(), Some(PieceKind::Knight));
        assert_ne!(knight, Move::new(knight.from(), knight.to()));
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for code in ["", "e2e4", "e2-e9", "e2Ke4", "e2qe4", "z2-e4", "e2-e4 "] {
            assert_eq!(
                Move::from_code(code),
                Err(ChessError::MalformedMove(code.to_owned())),
                "{code:?} should be malformed"
            );
        }
    }

    #[test]
    fn moves_compare_by_value() {
        let a = Move::new(Position::ALL[12], Position::ALL[28]);
        let b = Move::from_code("e2-e4").expect("parse");
        assert_eq!(a, b);
        assert_eq!(a.bits(), b.bits());
    }
}
