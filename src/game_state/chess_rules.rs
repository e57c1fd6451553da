//! Canonical chess-rule constants.
//!
//! Starting position, home squares of kings and rooks, back ranks, and the
//! fifty-move threshold used by `BoardState::draw`.

use crate::game_state::chess_types::{Bitboard, Color, Square};

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Plies without capture or pawn move after which the game is drawn.
pub const RULE50_PLY_LIMIT: u32 = 50;

pub const RANK_1: Bitboard = 0x0000_0000_0000_00FF;
pub const RANK_8: Bitboard = 0xFF00_0000_0000_0000;

#[inline]
pub const fn king_home(color: Color) -> Square {
    match color {
        Color::White => 4,
        Color::Black => 60,
    }
}

/// Queen-side ("left") rook home square.
#[inline]
pub const fn left_rook_home(color: Color) -> Square {
    match color {
        Color::White => 0,
        Color::Black => 56,
    }
}

/// King-side ("right") rook home square.
#[inline]
pub const fn right_rook_home(color: Color) -> Square {
    match color {
        Color::White => 7,
        Color::Black => 63,
    }
}

/// Rank a pawn of `color` promotes on.
#[inline]
pub const fn promotion_rank(color: Color) -> Bitboard {
    match color {
        Color::White => RANK_8,
        Color::Black => RANK_1,
    }
}
