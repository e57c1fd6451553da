//! Zobrist keys behind `Board::update_key`.
//!
//! The tables are generated from a fixed seed so keys are deterministic across
//! runs, which keeps test expectations and debug dumps stable.

use std::sync::OnceLock;

use crate::game_state::chess_types::*;

#[derive(Debug)]
struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    castling: [u64; 3],
    en_passant: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut seed: u64 = 0x5EED_0F_C0DE_u64.wrapping_mul(0x9E37_79B9_7F4A_7C15);

    let mut piece_square = [[[0u64; 64]; 6]; 2];
    for color in &mut piece_square {
        for kind in color {
            for sq in kind {
                *sq = next_random_u64(&mut seed);
            }
        }
    }

    let mut castling = [0u64; 3];
    for key in castling.iter_mut().skip(1) {
        *key = next_random_u64(&mut seed);
    }

    ZobristTables {
        piece_square,
        castling,
        en_passant: next_random_u64(&mut seed),
    }
}

#[inline]
fn next_random_u64(state: &mut u64) -> u64 {
    // splitmix64
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
pub fn piece_square_key(color: Color, kind: PieceKind, square: Square) -> u64 {
    tables().piece_square[color.index()][kind.index()][square as usize]
}

/// Key term for the castling flavour of the last applied move (zero for none).
#[inline]
pub fn castling_key(castling: Castling) -> u64 {
    let idx = match castling {
        Castling::None => 0,
        Castling::Short => 1,
        Castling::Long => 2,
    };
    tables().castling[idx]
}

#[inline]
pub fn en_passant_key() -> u64 {
    tables().en_passant
}

/// Hash of a full piece placement, `pieces[color][kind]`.
pub fn placement_key(pieces: &[[Bitboard; 6]; 2]) -> u64 {
    let mut key = 0u64;
    for color in [Color::White, Color::Black] {
        for kind in PieceKind::ALL {
            let mut bb = pieces[color.index()][kind.index()];
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                key ^= piece_square_key(color, kind, sq);
                bb &= bb - 1;
            }
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_deterministic_and_distinct() {
        let a = piece_square_key(Color::White, PieceKind::Pawn, 12);
        let b = piece_square_key(Color::White, PieceKind::Pawn, 12);
        assert_eq!(a, b);
        assert_ne!(a, piece_square_key(Color::Black, PieceKind::Pawn, 12));
        assert_ne!(a, piece_square_key(Color::White, PieceKind::Pawn, 13));
    }

    #[test]
    fn no_castling_contributes_nothing() {
        assert_eq!(castling_key(Castling::None), 0);
        assert_ne!(castling_key(Castling::Short), castling_key(Castling::Long));
        assert_ne!(en_passant_key(), 0);
    }
}
