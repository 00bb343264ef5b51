//! Plain-text board renderer.
//!
//! Produces the multi-line picture used by `Board`'s `Display`. Besides the
//! pieces it lists every piece of state that move/undo must restore, so two
//! renderings compare equal exactly when the boards do.

use std::fmt::Write;

use crate::game_state::board::Board;
use crate::game_state::chess_types::Position;
use crate::utils::algebraic::squares_text;

/// Render the board, White at the bottom, followed by a state line.
pub fn render_board(board: &Board) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");
    for row in (0..8u8).rev() {
        out.push(char::from(b'1' + row));
        for column in 0..8u8 {
            out.push(' ');
            let symbol = Position::new(column, row)
                .and_then(|position| board.figure_at(position))
                .map_or('.', |figure| figure.symbol());
            out.push(symbol);
        }
        out.push(' ');
        out.push(char::from(b'1' + row));
        out.push('\n');
    }
    out.push_str("  a b c d e f g h\n");

    let castling = board
        .figures()
        .filter(|figure| figure.can_still_castle())
        .fold(0u64, |mask, figure| mask | figure.position().mask());
    let en_passant = board
        .en_passant_pawn()
        .map_or_else(|| "-".to_owned(), |position| position.to_string());

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "to move: {}, en passant: {}, clock: {}, unmoved: {}",
        board.side_to_move(),
        en_passant,
        board.halfmove_clock(),
        squares_text(castling),
    );
    out
}
