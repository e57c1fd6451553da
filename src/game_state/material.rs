//! Material accounting table.
//!
//! Values are process-wide immutable data. Kings carry no material: losing one
//! ends the game instead.

use crate::game_state::chess_types::{PieceKind, Score};

pub const PAWN_SCORE: Score = 1;
pub const KNIGHT_SCORE: Score = 4;
pub const BISHOP_SCORE: Score = 5;
pub const ROOK_SCORE: Score = 6;
pub const QUEEN_SCORE: Score = 10;
pub const KING_SCORE: Score = 0;

/// Indexed by `PieceKind::index`.
const PIECE_SCORES: [Score; 6] = [
    PAWN_SCORE,
    KING_SCORE,
    QUEEN_SCORE,
    BISHOP_SCORE,
    KNIGHT_SCORE,
    ROOK_SCORE,
];

/// Material of a full army at the start of a game.
pub const INITIAL_MATERIAL: Score =
    PAWN_SCORE * 8 + KNIGHT_SCORE * 2 + BISHOP_SCORE * 2 + ROOK_SCORE * 2 + QUEEN_SCORE;

#[inline]
pub const fn piece_score(kind: PieceKind) -> Score {
    PIECE_SCORES[kind.index()]
}
