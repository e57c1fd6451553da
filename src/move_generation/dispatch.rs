//! Fixed-order move collection over all (color, kind) pairs.
//!
//! The order only matters for reproducible move ordering in search.

use crate::board::bit_board::Board;
use crate::game_state::chess_types::{Color, MoveList, PieceKind};
use crate::move_generation::piece_moves::MoveGenContext;

pub const MOVEGEN_ORDER: [(Color, PieceKind); 12] = [
    (Color::White, PieceKind::Pawn),
    (Color::White, PieceKind::King),
    (Color::White, PieceKind::Queen),
    (Color::White, PieceKind::Bishop),
    (Color::White, PieceKind::Knight),
    (Color::White, PieceKind::Rook),
    (Color::Black, PieceKind::Pawn),
    (Color::Black, PieceKind::King),
    (Color::Black, PieceKind::Queen),
    (Color::Black, PieceKind::Bishop),
    (Color::Black, PieceKind::Knight),
    (Color::Black, PieceKind::Rook),
];

pub fn collect_moves(board: &Board, ctx: &MoveGenContext, out: &mut MoveList) {
    for (color, kind) in MOVEGEN_ORDER {
        board.movegen(color, kind, ctx, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::CASTLE_ALL;
    use crate::utils::fen_import::board_from_placement;

    #[test]
    fn pawns_come_before_knights_and_only_side_to_move_emits() {
        let board = board_from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .expect("placement should parse");
        let ctx = MoveGenContext {
            side_to_move: Color::White,
            castling_rights: CASTLE_ALL,
            en_passant: None,
        };
        let mut out = MoveList::new();
        collect_moves(&board, &ctx, &mut out);
        assert_eq!(out.len(), 20);
        assert!(out[..16].iter().all(|m| board.kind_at(m.from) == Some(PieceKind::Pawn)));
        assert!(out[16..].iter().all(|m| board.kind_at(m.from) == Some(PieceKind::Knight)));
        assert!(out.iter().all(|m| board.color_at(m.from) == Some(Color::White)));
    }

    #[test]
    fn order_covers_every_pair_once() {
        for color in [Color::White, Color::Black] {
            for kind in PieceKind::ALL {
                assert_eq!(MOVEGEN_ORDER.iter().filter(|&&p| p == (color, kind)).count(), 1);
            }
        }
        assert!(MOVEGEN_ORDER[..6].iter().all(|(c, _)| *c == Color::White));
    }
}
