//! Attack bitboards for every piece kind.
//!
//! Leaper tables (knight, king, pawn captures) are built at compile time from
//! (file, rank) offsets. Sliders walk their rays against the occupancy and stop
//! on the first blocker, which is included in the result.

use crate::game_state::chess_types::{Bitboard, Color, Square};

const KNIGHT_STEPS: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const WHITE_PAWN_CAPTURES: [(i32, i32); 2] = [(-1, 1), (1, 1)];
const BLACK_PAWN_CAPTURES: [(i32, i32); 2] = [(-1, -1), (1, -1)];

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const ORTHOGONALS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_STEPS);
pub const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_STEPS);
pub const WHITE_PAWN_ATTACKS: [Bitboard; 64] = leaper_table(&WHITE_PAWN_CAPTURES);
pub const BLACK_PAWN_ATTACKS: [Bitboard; 64] = leaper_table(&BLACK_PAWN_CAPTURES);

#[inline]
pub const fn knight_attacks(square: Square) -> Bitboard {
    KNIGHT_ATTACKS[square as usize]
}

#[inline]
pub const fn king_attacks(square: Square) -> Bitboard {
    KING_ATTACKS[square as usize]
}

/// Squares a pawn of `color` standing on `square` captures onto.
#[inline]
pub const fn pawn_attacks(color: Color, square: Square) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[square as usize],
        Color::Black => BLACK_PAWN_ATTACKS[square as usize],
    }
}

#[inline]
pub fn bishop_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    slide(square, &DIAGONALS, occupancy)
}

#[inline]
pub fn rook_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    slide(square, &ORTHOGONALS, occupancy)
}

#[inline]
pub fn queen_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

const fn leaper_table(steps: &[(i32, i32)]) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;
    while sq < 64 {
        let file = (sq % 8) as i32;
        let rank = (sq / 8) as i32;
        let mut i = 0usize;
        while i < steps.len() {
            let f = file + steps[i].0;
            let r = rank + steps[i].1;
            if f >= 0 && f < 8 && r >= 0 && r < 8 {
                table[sq] |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        sq += 1;
    }
    table
}

fn slide(square: Square, directions: &[(i32, i32)], occupancy: Bitboard) -> Bitboard {
    let origin_file = i32::from(square % 8);
    let origin_rank = i32::from(square / 8);
    let mut attacks = 0u64;

    for &(df, dr) in directions {
        let (mut f, mut r) = (origin_file + df, origin_rank + dr);
        while (0..8).contains(&f) && (0..8).contains(&r) {
            let bit = 1u64 << (r * 8 + f);
            attacks |= bit;
            if occupancy & bit != 0 {
                break;
            }
            f += df;
            r += dr;
        }
    }

    attacks
}

#[cfg(test)]
mod tests {
    use super::*;

    const A1: Square = 0;
    const D4: Square = 27;

    #[test]
    fn leaper_counts_from_center_and_corner() {
        assert_eq!(knight_attacks(D4).count_ones(), 8);
        assert_eq!(knight_attacks(A1).count_ones(), 2);
        assert_eq!(king_attacks(D4).count_ones(), 8);
        assert_eq!(king_attacks(A1).count_ones(), 3);
    }

    #[test]
    fn pawn_captures_respect_edges() {
        let e2 = 12;
        assert_eq!(pawn_attacks(Color::White, e2), (1 << 19) | (1 << 21));
        let a7 = 48;
        assert_eq!(pawn_attacks(Color::Black, a7), 1 << 41);
        let h8 = 63;
        assert_eq!(pawn_attacks(Color::White, h8), 0);
    }

    #[test]
    fn sliders_on_empty_board() {
        assert_eq!(rook_attacks(D4, 0).count_ones(), 14);
        assert_eq!(bishop_attacks(D4, 0).count_ones(), 13);
        assert_eq!(queen_attacks(D4, 0).count_ones(), 27);
    }

    #[test]
    fn blocker_is_included_and_stops_the_ray() {
        let a4 = 1u64 << 24;
        let attacks = rook_attacks(A1, a4);
        assert_ne!(attacks & a4, 0);
        assert_eq!(attacks & (1u64 << 32), 0);

        let e3 = 1u64 << 20;
        let c1 = 2;
        let diag = bishop_attacks(c1, e3);
        assert_ne!(diag & e3, 0);
        assert_eq!(diag & (1u64 << 29), 0);
    }
}
