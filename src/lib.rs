//! Crate root module declarations for the Damson Chess engine.
//!
//! The board model and legal move generation live in `game_state`, `moves`
//! and `move_generation`; the fixed-shape minimax search, scoring and the
//! worker pool in `search`; the opening book in `tables`; and the
//! request-facing engine in `engines`. The demo binary and the benches import
//! these paths directly.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod memento;
    pub mod undo_state;
}

pub mod moves {
    pub mod bishop_moves;
    pub mod chess_move;
    pub mod extended_move;
    pub mod figure;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod queen_moves;
    pub mod rook_moves;
}

pub mod move_generation {
    pub mod attack_lines;
    pub mod legal_move_generator;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod evaluation;
    pub mod minimax;
    pub mod move_selection;
    pub mod pruner;
    pub mod threading;
}

pub mod tables {
    pub mod opening_book;
}

pub mod engines {
    pub mod chess_engine;
    pub mod engine_config;
    pub mod move_task;
}

pub mod utils {
    pub mod algebraic;
    pub mod compact_history;
    pub mod render_board;
}
