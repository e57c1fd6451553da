use crate::game_state::chess_types::*;

/// Single undo record pushed by `BoardState::apply` and popped by `undo`.
///
/// `captured_kind` is `None` for quiet moves; `move_kind` is the kind that
/// left `from` (a pawn for promotions, the king for castling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoRecord {
    pub from: Square,
    pub to: Square,
    pub move_kind: PieceKind,
    pub captured_kind: Option<PieceKind>,
    pub move_color: Color,
    pub rule50_ply: u32,
    pub castling: Castling,
    pub promo: bool,
    pub is_enpass: bool,
    pub is_null: bool,
}

impl UndoRecord {
    /// Square the captured piece stood on.
    #[inline]
    pub fn victim_square(&self) -> Square {
        if self.is_enpass {
            enpass_victim_square(self.move_color, self.to)
        } else {
            self.to
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured_kind.is_some()
    }
}

/// Square of the pawn removed by an en-passant capture landing on `to`.
#[inline]
pub const fn enpass_victim_square(mover: Color, to: Square) -> Square {
    match mover {
        Color::White => to - 8,
        Color::Black => to + 8,
    }
}
