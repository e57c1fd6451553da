//! Pseudo-legal enumeration for one (color, kind) pair.
//!
//! Moves are pseudo-legal: they obey piece movement but may leave the mover's
//! own king attacked. Promotions are emitted once per target square; the game
//! state always promotes to a queen.

use crate::board::bit_board::Board;
use crate::game_state::chess_rules::{king_home, promotion_rank};
use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

/// Game-state facts the board needs but does not own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveGenContext {
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
}

impl Board {
    /// Appends the pseudo-legal moves of `color`'s pieces of `kind`.
    ///
    /// Produces nothing when `color` is not the side to move.
    pub fn movegen(&self, color: Color, kind: PieceKind, ctx: &MoveGenContext, out: &mut MoveList) {
        if color != ctx.side_to_move {
            return;
        }
        match kind {
            PieceKind::Pawn => self.pawn_moves(color, ctx.en_passant, out),
            PieceKind::King => {
                self.leaper_moves(color, kind, king_attacks, out);
                self.castling_moves(color, ctx.castling_rights, out);
            }
            PieceKind::Knight => self.leaper_moves(color, kind, knight_attacks, out),
            PieceKind::Queen => self.slider_moves(color, kind, queen_attacks, out),
            PieceKind::Bishop => self.slider_moves(color, kind, bishop_attacks, out),
            PieceKind::Rook => self.slider_moves(color, kind, rook_attacks, out),
        }
    }

    fn leaper_moves(
        &self,
        color: Color,
        kind: PieceKind,
        attacks: fn(Square) -> Bitboard,
        out: &mut MoveList,
    ) {
        let own = self.color_occupancy(color);
        let mut pieces = self.piece_mask(color, kind);
        while pieces != 0 {
            let from = pieces.trailing_zeros() as Square;
            push_targets(from, attacks(from) & !own, out);
            pieces &= pieces - 1;
        }
    }

    fn slider_moves(
        &self,
        color: Color,
        kind: PieceKind,
        attacks: fn(Square, Bitboard) -> Bitboard,
        out: &mut MoveList,
    ) {
        let own = self.color_occupancy(color);
        let occupancy = self.occupancy();
        let mut pieces = self.piece_mask(color, kind);
        while pieces != 0 {
            let from = pieces.trailing_zeros() as Square;
            push_targets(from, attacks(from, occupancy) & !own, out);
            pieces &= pieces - 1;
        }
    }

    fn pawn_moves(&self, color: Color, en_passant: Option<Square>, out: &mut MoveList) {
        let empty = !self.occupancy();
        let enemy = self.color_occupancy(color.opposite());
        let start_rank = match color {
            Color::White => 1,
            Color::Black => 6,
        };
        let ep_target = en_passant
            .filter(|&sq| self.is_empty(sq))
            .filter(|&sq| {
                let victim = (sq as i8 - color.pawn_push()) as Square;
                self.piece_at(victim) == Some((color.opposite(), PieceKind::Pawn))
            });

        let mut pawns = self.piece_mask(color, PieceKind::Pawn);
        while pawns != 0 {
            let from = pawns.trailing_zeros() as Square;
            let one = from as i8 + color.pawn_push();

            if (0..64).contains(&one) && empty & square_mask(one as Square) != 0 {
                let one = one as Square;
                out.push(Move::quiet(from, one));
                if rank_of(from) == start_rank {
                    let two = (one as i8 + color.pawn_push()) as Square;
                    if empty & square_mask(two) != 0 {
                        out.push(Move::quiet(from, two));
                    }
                }
            }

            let attacks = pawn_attacks(color, from);
            push_targets(from, attacks & enemy, out);
            if let Some(ep) = ep_target {
                if attacks & square_mask(ep) != 0 {
                    out.push(Move::en_passant(from, ep));
                }
            }

            pawns &= pawns - 1;
        }
    }

    fn castling_moves(&self, color: Color, rights: CastlingRights, out: &mut MoveList) {
        let home = king_home(color);
        if self.piece_at(home) != Some((color, PieceKind::King)) {
            return;
        }
        let (short_bit, long_bit) = match color {
            Color::White => (CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
            Color::Black => (CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
        };
        let enemy = color.opposite();
        if rights & (short_bit | long_bit) == 0 || self.is_square_attacked(home, enemy) {
            return;
        }

        for (bit, castling) in [(short_bit, Castling::Short), (long_bit, Castling::Long)] {
            if rights & bit == 0 {
                continue;
            }
            let rook_from = castling.rook_origin(home);
            if self.piece_at(rook_from) != Some((color, PieceKind::Rook)) {
                continue;
            }
            let (lo, hi) = if rook_from < home { (rook_from, home) } else { (home, rook_from) };
            if ((lo + 1)..hi).any(|sq| !self.is_empty(sq)) {
                continue;
            }
            let passes = castling.rook_target(home);
            let lands = castling.king_target(home);
            if self.is_square_attacked(passes, enemy) || self.is_square_attacked(lands, enemy) {
                continue;
            }
            out.push(Move::castle(home, castling));
        }
    }
}

/// True if a pawn of `color` arriving on `to` promotes.
#[inline]
pub fn is_promotion_square(color: Color, to: Square) -> bool {
    promotion_rank(color) & square_mask(to) != 0
}

#[inline]
fn push_targets(from: Square, mut targets: Bitboard, out: &mut MoveList) {
    while targets != 0 {
        out.push(Move::quiet(from, targets.trailing_zeros() as Square));
        targets &= targets - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::fen_import::board_from_placement;

    fn ctx(side: Color, rights: CastlingRights, ep: Option<Square>) -> MoveGenContext {
        MoveGenContext {
            side_to_move: side,
            castling_rights: rights,
            en_passant: ep,
        }
    }

    fn count(board: &Board, color: Color, kind: PieceKind, c: &MoveGenContext) -> usize {
        let mut out = MoveList::new();
        board.movegen(color, kind, c, &mut out);
        out.len()
    }

    #[test]
    fn start_position_pieces_have_textbook_counts() {
        let board = board_from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR")
            .expect("placement should parse");
        let c = ctx(Color::White, CASTLE_ALL, None);
        assert_eq!(count(&board, Color::White, PieceKind::Pawn, &c), 16);
        assert_eq!(count(&board, Color::White, PieceKind::Knight, &c), 4);
        assert_eq!(count(&board, Color::White, PieceKind::Bishop, &c), 0);
        assert_eq!(count(&board, Color::White, PieceKind::King, &c), 0);
        assert_eq!(count(&board, Color::Black, PieceKind::Pawn, &c), 0);
    }

    #[test]
    fn castling_requires_rights_rook_and_safe_path() {
        let board = board_from_placement("r3k2r/8/8/8/8/8/8/R3K2R").expect("placement should parse");
        let white = ctx(Color::White, CASTLE_ALL, None);
        let mut out = MoveList::new();
        board.movegen(Color::White, PieceKind::King, &white, &mut out);
        assert!(out.contains(&Move::castle(4, Castling::Short)));
        assert!(out.contains(&Move::castle(4, Castling::Long)));

        let no_rights = ctx(Color::White, CASTLE_BLACK_KINGSIDE, None);
        out.clear();
        board.movegen(Color::White, PieceKind::King, &no_rights, &mut out);
        assert!(out.iter().all(|m| !m.castling.is_castling()));

        // Black rook on f8 covers f1: short castle passes through an attacked square.
        let guarded = board_from_placement("r3kr2/8/8/8/8/8/8/R3K2R").expect("placement should parse");
        out.clear();
        guarded.movegen(Color::White, PieceKind::King, &white, &mut out);
        assert!(!out.contains(&Move::castle(4, Castling::Short)));
        assert!(out.contains(&Move::castle(4, Castling::Long)));
    }

    #[test]
    fn en_passant_capture_is_offered_only_for_the_target() {
        // White pawn e5, black pawn just played d7d5.
        let board = board_from_placement("4k3/8/8/3pP3/8/8/8/4K3").expect("placement should parse");
        let d6 = 43;
        let mut out = MoveList::new();
        board.movegen(Color::White, PieceKind::Pawn, &ctx(Color::White, 0, Some(d6)), &mut out);
        assert!(out.contains(&Move::en_passant(36, d6)));

        out.clear();
        board.movegen(Color::White, PieceKind::Pawn, &ctx(Color::White, 0, None), &mut out);
        assert!(out.iter().all(|m| !m.is_enpass));
    }

    #[test]
    fn promotion_squares() {
        assert!(is_promotion_square(Color::White, 60));
        assert!(!is_promotion_square(Color::White, 4));
        assert!(is_promotion_square(Color::Black, 4));
    }
}
