//! Bit-board piece storage.
//!
//! `Board` is the primitive layer under `BoardState`: it knows where pieces
//! stand and how they move, but nothing about history, clocks or rights.
//! Per-(color, kind) enumeration lives in `move_generation::piece_moves`.

use crate::board::zobrist::{castling_key, en_passant_key, placement_key};
use crate::game_state::chess_types::*;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks,
};

/// Identity plane membership, indexed by `PieceKind::index`.
///
/// Each entry is `(plane A, plane B, plane C)`.
pub const PLANE_MEMBERSHIP: [(bool, bool, bool); 6] = [
    (false, true, false), // pawn
    (true, false, true),  // king
    (false, true, true),  // queen
    (true, true, false),  // bishop
    (true, false, false), // knight
    (false, false, true), // rook
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    // [color][piece_kind]
    pieces: [[Bitboard; 6]; 2],
    occupancy_by_color: [Bitboard; 2],
    occupancy_all: Bitboard,
    key: u64,
}

impl Board {
    #[inline]
    pub fn new_empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.key
    }

    #[inline]
    pub fn occupancy(&self) -> Bitboard {
        self.occupancy_all
    }

    #[inline]
    pub fn color_occupancy(&self, color: Color) -> Bitboard {
        self.occupancy_by_color[color.index()]
    }

    /// Occupancy mask of one (color, kind) pair.
    #[inline]
    pub fn piece_mask(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.occupancy_all & square_mask(square) == 0
    }

    #[inline]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        let mask = square_mask(square);
        if self.occupancy_by_color[Color::White.index()] & mask != 0 {
            Some(Color::White)
        } else if self.occupancy_by_color[Color::Black.index()] & mask != 0 {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn kind_at(&self, square: Square) -> Option<PieceKind> {
        self.piece_at(square).map(|(_, kind)| kind)
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        let color = self.color_at(square)?;
        let mask = square_mask(square);
        PieceKind::ALL
            .into_iter()
            .find(|kind| self.pieces[color.index()][kind.index()] & mask != 0)
            .map(|kind| (color, kind))
    }

    /// Places a piece on an empty square.
    pub fn put(&mut self, kind: PieceKind, color: Color, square: Square) {
        debug_assert!(self.is_empty(square), "put onto occupied square {square}");
        let mask = square_mask(square);
        self.pieces[color.index()][kind.index()] |= mask;
        self.occupancy_by_color[color.index()] |= mask;
        self.occupancy_all |= mask;
    }

    /// Removes whatever stands on `square` and reports it.
    pub fn kill(&mut self, square: Square) -> Option<(Color, PieceKind)> {
        let (color, kind) = self.piece_at(square)?;
        let mask = !square_mask(square);
        self.pieces[color.index()][kind.index()] &= mask;
        self.occupancy_by_color[color.index()] &= mask;
        self.occupancy_all &= mask;
        Some((color, kind))
    }

    /// Moves the piece on `from` to the empty square `to`, returning its kind.
    pub fn slide_to(&mut self, from: Square, to: Square) -> Option<PieceKind> {
        debug_assert!(self.is_empty(to), "slide onto occupied square {to}");
        let (color, kind) = self.piece_at(from)?;
        let flip = square_mask(from) | square_mask(to);
        self.pieces[color.index()][kind.index()] ^= flip;
        self.occupancy_by_color[color.index()] ^= flip;
        self.occupancy_all ^= flip;
        Some(kind)
    }

    /// Recomputes the position key for the current placement, tagged with the
    /// flags of the move that produced it.
    pub fn update_key(&mut self, castling: Castling, is_enpass: bool) {
        let mut key = placement_key(&self.pieces) ^ castling_key(castling);
        if is_enpass {
            key ^= en_passant_key();
        }
        self.key = key;
    }

    /// Raw planes: `[occupancy, identity A, identity B, identity C]`.
    pub fn raw_planes(&self) -> [Bitboard; 4] {
        let mut planes = [self.occupancy_all, 0, 0, 0];
        for kind in PieceKind::ALL {
            let bb = self.pieces[0][kind.index()] | self.pieces[1][kind.index()];
            let (a, b, c) = PLANE_MEMBERSHIP[kind.index()];
            if a {
                planes[1] |= bb;
            }
            if b {
                planes[2] |= bb;
            }
            if c {
                planes[3] |= bb;
            }
        }
        planes
    }

    pub fn is_square_attacked(&self, square: Square, attacker: Color) -> bool {
        let own = |kind: PieceKind| self.pieces[attacker.index()][kind.index()];

        // A pawn of `attacker` hits `square` iff a defender pawn on `square`
        // would hit the attacker pawn.
        if pawn_attacks(attacker.opposite(), square) & own(PieceKind::Pawn) != 0 {
            return true;
        }
        if knight_attacks(square) & own(PieceKind::Knight) != 0 {
            return true;
        }
        if king_attacks(square) & own(PieceKind::King) != 0 {
            return true;
        }
        let diagonal = own(PieceKind::Bishop) | own(PieceKind::Queen);
        if bishop_attacks(square, self.occupancy_all) & diagonal != 0 {
            return true;
        }
        let straight = own(PieceKind::Rook) | own(PieceKind::Queen);
        rook_attacks(square, self.occupancy_all) & straight != 0
    }
}
