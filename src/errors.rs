//! Crate-wide error type.
//!
//! Every fallible operation in the engine returns `ChessResult<T>`. Input
//! problems (malformed move codes, illegal sequences, bad options) are
//! reported with enough context for the caller to show a precise message;
//! `Internal` carries failures captured from worker threads so the caller
//! stays responsive instead of unwinding.

use thiserror::Error;

/// Unified error type for board setup, move validation, search and options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// A square name such as `"i9"` could not be parsed.
    #[error("invalid square '{0}'")]
    InvalidSquare(String),

    /// A move code did not match `<file><rank>[-|Q|R|B|N]<file><rank>`.
    #[error("malformed move code '{0}'")]
    MalformedMove(String),

    /// A move code parsed but is not legal in the position reached so far.
    ///
    /// `validated` lists the codes that were accepted before the offender.
    #[error("illegal move '{code}' after {} validated move(s): [{}]", validated.len(), validated.join(", "))]
    IllegalMove {
        code: String,
        validated: Vec<String>,
    },

    /// A manual setup could not produce a legal starting position.
    #[error("invalid setup: {0}")]
    InvalidSetup(String),

    /// Chess960 positions are numbered 0..960.
    #[error("invalid Chess960 index {0} (must be 0-959)")]
    InvalidChess960Index(u16),

    /// `set_option` was called with a name the engine does not know.
    #[error("unknown engine option '{0}'")]
    UnknownOption(String),

    /// `set_option` was called with a value outside the legal range.
    #[error("invalid value '{value}' for engine option '{name}'")]
    InvalidOptionValue { name: String, value: String },

    /// The side to move has no legal moves (the game is already over).
    #[error("no legal moves in this position")]
    NoLegalMoves,

    /// The request was cancelled before it produced a result.
    #[error("search cancelled")]
    Cancelled,

    /// An opening sequence was rejected.
    #[error("opening book: {0}")]
    OpeningBook(String),

    /// A compact move-history string could not be encoded or decoded.
    #[error("compact history: {0}")]
    CompactHistory(String),

    /// A failure inside the engine itself (for example a panicking worker).
    #[error("engine failure: {0}")]
    Internal(String),
}

pub type ChessResult<T> = Result<T, ChessError>;
