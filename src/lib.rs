//! Crate root for the sparsegrid game-state core.
//!
//! Exposes the bit-board, the incremental `BoardState` engine with its
//! evaluator feature layer, move generation, and the worker pool used to
//! parallelize search over forked states.

pub mod errors;

pub mod board {
    pub mod bit_board;
    pub mod zobrist;
}

pub mod game_state {
    pub mod board_state;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod feature_layer;
    pub mod material;
    pub mod undo_state;
}

pub mod moves {
    pub mod attack_tables;
}

pub mod move_generation {
    pub mod dispatch;
    pub mod perft;
    pub mod piece_moves;
}

pub mod executor {
    pub mod config;
    pub mod task_future;
    pub mod thread_pool;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_import;
}
