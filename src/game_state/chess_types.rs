//! Core value types shared by the board, the game state and move generation.
//!
//! Squares are `0..=63` with `a1 = 0`, `h1 = 7`, `a8 = 56`. Every type here is
//! `Copy` so undo records and moves stay plain values.

pub use crate::game_state::undo_state::UndoRecord;

/// Board square index (`0..=63`).
pub type Square = u8;

/// One-hot or multi-square bitboard.
pub type Bitboard = u64;

/// Integer material score.
pub type Score = i32;

/// Side to move / piece owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Direction a pawn of this color advances, in squares.
    #[inline]
    pub const fn pawn_push(self) -> i8 {
        match self {
            Color::White => 8,
            Color::Black => -8,
        }
    }
}

/// Piece kind, color is carried separately.
///
/// The declaration order is the move-generation order and the basis of the
/// feature-vector piece ids, so it must not be reshuffled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Rook,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PieceKind::Pawn => 0,
            PieceKind::King => 1,
            PieceKind::Queen => 2,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 4,
            PieceKind::Rook => 5,
        }
    }

    /// 1-based ordinal, used as the White piece id in the feature vector.
    #[inline]
    pub const fn ordinal(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Castling flavour of a move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Castling {
    #[default]
    None,
    Short,
    Long,
}

impl Castling {
    #[inline]
    pub const fn is_castling(self) -> bool {
        !matches!(self, Castling::None)
    }

    /// King destination for a castle starting at `king_from`.
    #[inline]
    pub const fn king_target(self, king_from: Square) -> Square {
        match self {
            Castling::Short => king_from + 2,
            Castling::Long => king_from - 2,
            Castling::None => king_from,
        }
    }

    /// Rook origin for a castle starting at `king_from`.
    #[inline]
    pub const fn rook_origin(self, king_from: Square) -> Square {
        match self {
            Castling::Short => king_from + 3,
            Castling::Long => king_from - 4,
            Castling::None => king_from,
        }
    }

    /// Rook destination for a castle starting at `king_from`.
    #[inline]
    pub const fn rook_target(self, king_from: Square) -> Square {
        match self {
            Castling::Short => king_from + 1,
            Castling::Long => king_from - 1,
            Castling::None => king_from,
        }
    }
}

/// One ply as produced by move generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub castling: Castling,
    pub is_enpass: bool,
    pub is_null: bool,
}

impl Move {
    #[inline]
    pub const fn quiet(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            castling: Castling::None,
            is_enpass: false,
            is_null: false,
        }
    }

    #[inline]
    pub const fn en_passant(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            castling: Castling::None,
            is_enpass: true,
            is_null: false,
        }
    }

    #[inline]
    pub const fn castle(king_from: Square, castling: Castling) -> Self {
        Self {
            from: king_from,
            to: castling.king_target(king_from),
            castling,
            is_enpass: false,
            is_null: false,
        }
    }

    #[inline]
    pub const fn null() -> Self {
        Self {
            from: 0,
            to: 0,
            castling: Castling::None,
            is_enpass: false,
            is_null: true,
        }
    }
}

pub type MoveList = Vec<Move>;

/// Castling-rights bitmask (`bit0/1` White king/queen side, `bit2/3` Black).
pub type CastlingRights = u8;

pub const CASTLE_WHITE_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_WHITE_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_BLACK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_BLACK_QUEENSIDE: CastlingRights = 1 << 3;
pub const CASTLE_ALL: CastlingRights = 0x0F;

#[inline]
pub const fn square_mask(square: Square) -> Bitboard {
    1u64 << square
}

#[inline]
pub const fn file_of(square: Square) -> u8 {
    square % 8
}

#[inline]
pub const fn rank_of(square: Square) -> u8 {
    square / 8
}
