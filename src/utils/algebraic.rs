//! Text conversions for square sets and move lists.

use crate::game_state::chess_types::positions_in;
use crate::moves::chess_move::Move;

/// Space separated square names of a mask, lowest index first (`"-"` if empty).
pub fn squares_text(mask: u64) -> String {
    if mask == 0 {
        return "-".to_owned();
    }
    positions_in(mask)
        .map(|position| position.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Comma separated move codes, the format of opening lines.
pub fn moves_text(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|mv| mv.code())
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a comma separated line into trimmed tokens, keeping empty ones so
/// callers can reject stray commas.
pub fn split_move_list(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}
