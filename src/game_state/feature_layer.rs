//! Dense input layer for the learned evaluator.
//!
//! Layout (320 entries, fixed, the evaluator binds to it):
//!
//! | offset | segment                                   |
//! |--------|-------------------------------------------|
//! | 0      | occupancy, 1.0 per occupied square        |
//! | 64     | identity plane A (knight, bishop, king)   |
//! | 128    | identity plane B (pawn, bishop, queen)    |
//! | 192    | identity plane C (rook, queen, king)      |
//! | 256    | side to move: 256/287 White, 288/319 Black|
//!
//! Identity entries hold the piece id of the occupant (`ordinal`, `+6` for
//! Black) on the planes its kind belongs to, zero elsewhere.

use crate::board::bit_board::{Board, PLANE_MEMBERSHIP};
use crate::game_state::chess_types::*;

pub type Feature = f32;

pub const FEATURE_LEN: usize = 320;
pub const OCCUPANCY_OFFSET: usize = 0;
pub const PLANE_A_OFFSET: usize = 64;
pub const PLANE_B_OFFSET: usize = 128;
pub const PLANE_C_OFFSET: usize = 192;
pub const SIDE_OFFSET: usize = 256;

const WHITE_TO_MOVE: [usize; 2] = [256, 287];
const BLACK_TO_MOVE: [usize; 2] = [288, 319];

#[inline]
pub fn piece_id(color: Color, kind: PieceKind) -> Feature {
    let id = match color {
        Color::White => kind.ordinal(),
        Color::Black => kind.ordinal() + 6,
    };
    Feature::from(id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayer {
    values: [Feature; FEATURE_LEN],
}

impl Default for FeatureLayer {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_LEN],
        }
    }
}

impl FeatureLayer {
    /// Full rebuild from the board and the side to move.
    pub fn from_board(board: &Board, side_to_move: Color) -> Self {
        let mut layer = Self::default();
        let planes = board.raw_planes();
        let offsets = [OCCUPANCY_OFFSET, PLANE_A_OFFSET, PLANE_B_OFFSET, PLANE_C_OFFSET];

        for (plane, offset) in planes.into_iter().zip(offsets) {
            let mut bb = plane;
            while bb != 0 {
                let sq = bb.trailing_zeros() as Square;
                layer.values[offset + sq as usize] = if offset == OCCUPANCY_OFFSET {
                    1.0
                } else {
                    board
                        .piece_at(sq)
                        .map_or(0.0, |(color, kind)| piece_id(color, kind))
                };
                bb &= bb - 1;
            }
        }

        layer.set_side_to_move(side_to_move);
        layer
    }

    #[inline]
    pub fn as_slice(&self) -> &[Feature] {
        &self.values
    }

    #[inline]
    pub fn values(&self) -> &[Feature; FEATURE_LEN] {
        &self.values
    }

    /// Writes `kind`'s identity planes and the occupancy bit at `square`.
    #[inline]
    pub fn place(&mut self, square: Square, color: Color, kind: PieceKind) {
        self.write(square, kind, piece_id(color, kind), 1.0);
    }

    /// Clears `kind`'s identity planes and the occupancy bit at `square`.
    #[inline]
    pub fn remove(&mut self, square: Square, kind: PieceKind) {
        self.write(square, kind, 0.0, 0.0);
    }

    fn write(&mut self, square: Square, kind: PieceKind, id: Feature, occupied: Feature) {
        let sq = square as usize;
        let (a, b, c) = PLANE_MEMBERSHIP[kind.index()];
        self.values[OCCUPANCY_OFFSET + sq] = occupied;
        if a {
            self.values[PLANE_A_OFFSET + sq] = id;
        }
        if b {
            self.values[PLANE_B_OFFSET + sq] = id;
        }
        if c {
            self.values[PLANE_C_OFFSET + sq] = id;
        }
    }

    pub fn set_side_to_move(&mut self, color: Color) {
        let (on, off) = match color {
            Color::White => (WHITE_TO_MOVE, BLACK_TO_MOVE),
            Color::Black => (BLACK_TO_MOVE, WHITE_TO_MOVE),
        };
        for idx in on {
            self.values[idx] = 1.0;
        }
        for idx in off {
            self.values[idx] = 0.0;
        }
    }

    /// Side-to-move indicator after `mover` played (`undo == false`) or
    /// after `mover`'s move was taken back (`undo == true`).
    #[inline]
    pub fn switch_move_side(&mut self, mover: Color, undo: bool) {
        let next = if undo { mover } else { mover.opposite() };
        self.set_side_to_move(next);
    }

    /// Patches the squares touched by `rec`. `undo` selects the direction.
    pub fn apply_record(&mut self, rec: &UndoRecord, undo: bool) {
        let color = rec.move_color;

        if rec.castling.is_castling() {
            let (mut k_from, mut k_to) = (rec.from, rec.castling.king_target(rec.from));
            let (mut r_from, mut r_to) = (
                rec.castling.rook_origin(rec.from),
                rec.castling.rook_target(rec.from),
            );
            if undo {
                std::mem::swap(&mut k_from, &mut k_to);
                std::mem::swap(&mut r_from, &mut r_to);
            }
            self.remove(k_from, PieceKind::King);
            self.remove(r_from, PieceKind::Rook);
            self.place(k_to, color, PieceKind::King);
            self.place(r_to, color, PieceKind::Rook);
            self.switch_move_side(color, undo);
            return;
        }

        let arrived = if rec.promo { PieceKind::Queen } else { rec.move_kind };
        let victim = rec.captured_kind.map(|kind| (rec.victim_square(), kind));

        if undo {
            // Mover first, so a restored victim on overlapping planes survives.
            self.remove(rec.to, arrived);
            self.place(rec.from, color, rec.move_kind);
            if let Some((square, kind)) = victim {
                self.place(square, color.opposite(), kind);
            }
        } else {
            if let Some((square, kind)) = victim {
                self.remove(square, kind);
            }
            self.remove(rec.from, rec.move_kind);
            self.place(rec.to, color, arrived);
        }

        self.switch_move_side(color, undo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_ids_are_non_zero_and_color_offset() {
        for kind in PieceKind::ALL {
            let white = piece_id(Color::White, kind);
            let black = piece_id(Color::Black, kind);
            assert!(white > 0.0);
            assert_eq!(black - white, 6.0);
        }
    }

    #[test]
    fn side_indicator_has_exactly_two_hot_entries() {
        let mut layer = FeatureLayer::default();
        layer.set_side_to_move(Color::White);
        assert_eq!(layer.values()[256], 1.0);
        assert_eq!(layer.values()[287], 1.0);
        assert_eq!(layer.as_slice()[SIDE_OFFSET..].iter().sum::<Feature>(), 2.0);

        layer.switch_move_side(Color::White, false);
        assert_eq!(layer.values()[288], 1.0);
        assert_eq!(layer.values()[319], 1.0);
        assert_eq!(layer.values()[256], 0.0);

        layer.switch_move_side(Color::White, true);
        assert_eq!(layer.values()[256], 1.0);
        assert_eq!(layer.values()[288], 0.0);
    }

    #[test]
    fn rebuild_encodes_queen_on_b_and_c_only() {
        let mut board = Board::new_empty();
        board.put(PieceKind::Queen, Color::Black, 59);
        let layer = FeatureLayer::from_board(&board, Color::Black);
        let id = piece_id(Color::Black, PieceKind::Queen);
        assert_eq!(layer.values()[59], 1.0);
        assert_eq!(layer.values()[PLANE_A_OFFSET + 59], 0.0);
        assert_eq!(layer.values()[PLANE_B_OFFSET + 59], id);
        assert_eq!(layer.values()[PLANE_C_OFFSET + 59], id);
        assert_eq!(layer.values()[288], 1.0);
    }
}
