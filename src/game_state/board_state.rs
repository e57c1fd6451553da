//! Incremental game state on top of the bit-board.
//!
//! `BoardState` keeps five pieces of state in lock-step under `apply` and
//! `undo`: the board itself, the undo stack, the special-rule counters
//! (fifty-move, king and rook move counts, king existence), material, and the
//! evaluator feature layer. `apply(m); undo()` restores every field except the
//! transient FEN import fields, which the first applied move consumes.
//!
//! The state is not synchronized. Parallel search clones it once per worker;
//! a clone carries the whole history.

use crate::board::bit_board::Board;
use crate::game_state::chess_rules::{left_rook_home, right_rook_home, RULE50_PLY_LIMIT};
use crate::game_state::chess_types::*;
use crate::game_state::feature_layer::FeatureLayer;
use crate::game_state::material::{piece_score, PAWN_SCORE, QUEEN_SCORE};
use crate::game_state::undo_state::{enpass_victim_square, UndoRecord};
use crate::move_generation::dispatch::collect_moves;
use crate::move_generation::piece_moves::{is_promotion_square, MoveGenContext};
use crate::moves::attack_tables::pawn_attacks;

const LEFT_ROOK: usize = 0;
const RIGHT_ROOK: usize = 1;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Last known square and move count of one of a side's original rooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RookTrack {
    pub square: Square,
    pub moves: u32,
    /// History index of the move that captured this rook.
    pub captured_at: Option<usize>,
}

pub type UndoList = Vec<UndoRecord>;

#[derive(Debug, Clone, PartialEq)]
pub struct BoardState {
    board: Board,
    undo_list: UndoList,
    rule50_ply: u32,

    king_moves: [u32; 2],
    king_exists: [bool; 2],
    // [color][LEFT_ROOK / RIGHT_ROOK]
    rooks: [[RookTrack; 2]; 2],
    material: [Score; 2],

    // Parity anchor for `next_player` once the FEN fields are gone.
    first_mover: Color,

    // --- FEN import scratch, cleared by the first applied move ---
    fen_enpass: Option<Square>,
    fen_next_player: Option<Color>,
    build_from_fen: bool,
    fen_castling_mask: CastlingRights,

    features: FeatureLayer,
}

impl BoardState {
    /// Wraps `board` as a fresh history line with White to move.
    pub fn new(mut board: Board) -> Self {
        board.update_key(Castling::None, false);

        let mut material = [0; 2];
        let mut king_exists = [false; 2];
        for color in [Color::White, Color::Black] {
            king_exists[color.index()] = board.piece_mask(color, PieceKind::King) != 0;
            material[color.index()] = PieceKind::ALL
                .into_iter()
                .map(|kind| board.piece_mask(color, kind).count_ones() as Score * piece_score(kind))
                .sum();
        }

        let rooks = [Color::White, Color::Black].map(|color| {
            [
                RookTrack {
                    square: left_rook_home(color),
                    moves: 0,
                    captured_at: None,
                },
                RookTrack {
                    square: right_rook_home(color),
                    moves: 0,
                    captured_at: None,
                },
            ]
        });

        let features = FeatureLayer::from_board(&board, Color::White);

        Self {
            board,
            undo_list: Vec::with_capacity(256),
            rule50_ply: 0,
            king_moves: [0; 2],
            king_exists,
            rooks,
            material,
            first_mover: Color::White,
            fen_enpass: None,
            fen_next_player: None,
            build_from_fen: false,
            fen_castling_mask: 0,
            features,
        }
    }

    /// Standard starting position.
    pub fn new_game() -> Self {
        let mut board = Board::new_empty();
        for (file, kind) in BACK_RANK.into_iter().enumerate() {
            let file = file as Square;
            board.put(kind, Color::White, file);
            board.put(PieceKind::Pawn, Color::White, 8 + file);
            board.put(PieceKind::Pawn, Color::Black, 48 + file);
            board.put(kind, Color::Black, 56 + file);
        }
        Self::new(board)
    }

    // ------------------------------------------------------------------
    // Move application
    // ------------------------------------------------------------------

    /// Plays a pseudo-legal, non-null move.
    pub fn apply(&mut self, mv: Move) {
        debug_assert!(!mv.is_null, "null move passed to apply");
        let Some((mover, from_kind)) = self.board.piece_at(mv.from) else {
            debug_assert!(false, "apply from empty square {}", mv.from);
            return;
        };
        let opponent = mover.opposite();

        let captured_kind = if mv.is_enpass {
            self.board
                .kill(enpass_victim_square(mover, mv.to))
                .map(|(_, kind)| kind)
        } else if mv.castling.is_castling() {
            None
        } else {
            self.board.kill(mv.to).map(|(color, kind)| {
                debug_assert_ne!(color, mover, "capture of own piece");
                kind
            })
        };

        let mut promo = false;
        let (rook_from, rook_to) = (
            mv.castling.rook_origin(mv.from),
            mv.castling.rook_target(mv.from),
        );
        let move_kind = if mv.castling.is_castling() {
            self.board.slide_to(mv.from, mv.castling.king_target(mv.from));
            self.board.slide_to(rook_from, rook_to);
            PieceKind::King
        } else {
            self.board.slide_to(mv.from, mv.to);
            if from_kind == PieceKind::Pawn && !mv.is_enpass && is_promotion_square(mover, mv.to) {
                promo = true;
                self.board.kill(mv.to);
                self.board.put(PieceKind::Queen, mover, mv.to);
                self.material[mover.index()] += QUEEN_SCORE - PAWN_SCORE;
            }
            from_kind
        };

        self.board.update_key(mv.castling, mv.is_enpass);

        let rec = UndoRecord {
            from: mv.from,
            to: mv.to,
            move_kind,
            captured_kind,
            move_color: mover,
            rule50_ply: self.rule50_ply,
            castling: mv.castling,
            promo,
            is_enpass: mv.is_enpass,
            is_null: mv.is_null,
        };
        self.undo_list.push(rec);

        if captured_kind.is_some() || move_kind == PieceKind::Pawn {
            self.rule50_ply = 0;
        } else {
            self.rule50_ply += 1;
        }

        if move_kind == PieceKind::King {
            self.king_moves[mover.index()] += 1;
        }

        // A capturing promotion leaves the victim's material on the books.
        match captured_kind {
            Some(PieceKind::King) => self.king_exists[opponent.index()] = false,
            Some(kind) if !promo => self.material[opponent.index()] -= piece_score(kind),
            _ => {}
        }
        if captured_kind == Some(PieceKind::Rook) {
            let ply = self.undo_list.len() - 1;
            self.retire_rook_track(opponent, rec.victim_square(), ply);
        }

        if mv.castling.is_castling() {
            self.update_rook_meta(mover, rook_from, rook_to, true);
        } else if move_kind == PieceKind::Rook {
            self.update_rook_meta(mover, mv.from, mv.to, true);
        }

        self.reset_fen_state();

        self.features.apply_record(&rec, false);
    }

    /// Takes back the most recent move. The history must not be empty.
    pub fn undo(&mut self) {
        let Some(rec) = self.undo_list.pop() else {
            debug_assert!(false, "undo with empty history");
            return;
        };
        let color = rec.move_color;
        let opponent = color.opposite();
        let (rook_from, rook_to) = (
            rec.castling.rook_origin(rec.from),
            rec.castling.rook_target(rec.from),
        );

        if rec.castling.is_castling() {
            self.board.slide_to(rec.castling.king_target(rec.from), rec.from);
            self.board.slide_to(rook_to, rook_from);
        } else {
            if rec.promo {
                self.board.kill(rec.to);
                self.board.put(PieceKind::Pawn, color, rec.to);
                self.material[color.index()] -= QUEEN_SCORE - PAWN_SCORE;
            }
            self.board.slide_to(rec.to, rec.from);
            if let Some(kind) = rec.captured_kind {
                self.board.put(kind, opponent, rec.victim_square());
            }
        }

        // The key carries the flags of whichever move is now on top.
        let (castling, is_enpass) = self
            .undo_list
            .last()
            .map_or((Castling::None, false), |prev| (prev.castling, prev.is_enpass));
        self.board.update_key(castling, is_enpass);

        self.rule50_ply = rec.rule50_ply;

        if rec.move_kind == PieceKind::King {
            self.king_moves[color.index()] -= 1;
        }

        match rec.captured_kind {
            Some(PieceKind::King) => self.king_exists[opponent.index()] = true,
            Some(kind) if !rec.promo => self.material[opponent.index()] += piece_score(kind),
            _ => {}
        }
        if rec.captured_kind == Some(PieceKind::Rook) {
            let ply = self.undo_list.len();
            for track in &mut self.rooks[opponent.index()] {
                if track.captured_at == Some(ply) {
                    track.captured_at = None;
                }
            }
        }

        if rec.castling.is_castling() {
            self.update_rook_meta(color, rook_to, rook_from, false);
        } else if rec.move_kind == PieceKind::Rook {
            self.update_rook_meta(color, rec.to, rec.from, false);
        }

        self.fen_enpass = None;

        self.features.apply_record(&rec, true);
    }

    fn update_rook_meta(&mut self, color: Color, from: Square, to: Square, inc: bool) {
        let tracks = &mut self.rooks[color.index()];
        if let Some(track) = tracks
            .iter_mut()
            .find(|t| t.captured_at.is_none() && t.square == from)
        {
            track.square = to;
            if inc {
                track.moves += 1;
            } else {
                track.moves -= 1;
            }
        }
    }

    /// Stops following the live tracked rook captured on `square` at `ply`.
    /// Its move count stays as it was.
    fn retire_rook_track(&mut self, color: Color, square: Square, ply: usize) {
        let tracks = &mut self.rooks[color.index()];
        if let Some(track) = tracks
            .iter_mut()
            .find(|t| t.captured_at.is_none() && t.square == square)
        {
            track.captured_at = Some(ply);
        }
    }

    // ------------------------------------------------------------------
    // Move generation and terminal state
    // ------------------------------------------------------------------

    /// Appends every pseudo-legal move of the side to move; nothing once the
    /// game is over.
    pub fn movegen(&self, out: &mut MoveList) {
        if self.gameover() {
            return;
        }
        collect_moves(&self.board, &self.movegen_context(), out);
    }

    pub fn moves(&self) -> MoveList {
        let mut out = MoveList::with_capacity(64);
        self.movegen(&mut out);
        out
    }

    /// Rights, en-passant target and side to move handed to the board.
    pub fn movegen_context(&self) -> MoveGenContext {
        let mut castling_rights = self.possible_castling_mask();
        if self.build_from_fen {
            castling_rights &= self.fen_castling_mask;
        }
        MoveGenContext {
            side_to_move: self.next_player(),
            castling_rights,
            en_passant: self.fen_enpass.or_else(|| self.en_passant_square()),
        }
    }

    /// Fifty-move draw or a captured king. Full checkmate detection is not
    /// modeled; losing the king is the terminal proxy.
    pub fn gameover(&self) -> bool {
        self.draw() || self.checkmate(Color::White) || self.checkmate(Color::Black)
    }

    #[inline]
    pub fn draw(&self) -> bool {
        self.rule50_ply > RULE50_PLY_LIMIT
    }

    /// True once `color` has lost its king.
    #[inline]
    pub fn checkmate(&self, color: Color) -> bool {
        !self.king_exists[color.index()]
    }

    // ------------------------------------------------------------------
    // Rights derivation
    // ------------------------------------------------------------------

    /// Castling bits whose king and rook have never moved in this history.
    /// Says nothing about blocked or attacked squares.
    pub fn possible_castling_mask(&self) -> CastlingRights {
        let mut mask = 0;
        for (color, short_bit, long_bit) in [
            (Color::White, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
            (Color::Black, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
        ] {
            if self.king_moves[color.index()] != 0 {
                continue;
            }
            let [left, right] = self.rooks[color.index()];
            if right.moves == 0 {
                mask |= short_bit;
            }
            if left.moves == 0 {
                mask |= long_bit;
            }
        }
        mask
    }

    /// Square skipped by the pawn double push just played, if an enemy pawn
    /// can capture onto it.
    pub fn en_passant_square(&self) -> Option<Square> {
        let prev = self.undo_list.last()?;
        if prev.move_kind != PieceKind::Pawn || prev.from.abs_diff(prev.to) != 16 {
            return None;
        }
        let skipped = (prev.from + prev.to) / 2;
        let capturers = self.board.piece_mask(prev.move_color.opposite(), PieceKind::Pawn);
        // Squares from which an enemy pawn hits `skipped`.
        (pawn_attacks(prev.move_color, skipped) & capturers != 0).then_some(skipped)
    }

    /// Sanity check for an externally supplied en-passant square: it must be
    /// empty and the pawn that just moved must have an empty or enemy-pawn
    /// neighbour on its rank.
    pub fn validate_enpass_position(&self, enpass: Square, pawn_pos: Square) -> bool {
        let Some(pawn_color) = self.board.color_at(pawn_pos) else {
            return false;
        };
        if !self.board.is_empty(enpass) {
            return false;
        }
        let eligible = |sq: Square| match self.board.piece_at(sq) {
            None => true,
            Some((color, PieceKind::Pawn)) => color != pawn_color,
            Some(_) => false,
        };
        (file_of(pawn_pos) > 0 && eligible(pawn_pos - 1))
            || (file_of(pawn_pos) < 7 && eligible(pawn_pos + 1))
    }

    pub fn is_promotion(&self, mv: &Move) -> bool {
        match self.board.piece_at(mv.from) {
            Some((color, PieceKind::Pawn)) => !mv.is_enpass && is_promotion_square(color, mv.to),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    #[inline]
    pub fn ply(&self) -> usize {
        self.undo_list.len()
    }

    #[inline]
    pub fn history(&self) -> &UndoList {
        &self.undo_list
    }

    /// Forgets the history, keeping placement and side to move.
    pub fn reset_state(&mut self, rule50: u32) {
        self.first_mover = self.next_player();
        self.undo_list = Vec::with_capacity(256);
        self.rule50_ply = rule50;
        self.board.update_key(Castling::None, false);
        // Captures before the reset can no longer be undone.
        for track in self.rooks.iter_mut().flatten() {
            if track.captured_at.is_some() {
                track.captured_at = Some(usize::MAX);
            }
        }
    }

    /// Color to move: the FEN side while freshly imported, else by ply parity.
    pub fn next_player(&self) -> Color {
        if self.build_from_fen {
            debug_assert!(self.fen_next_player.is_some(), "FEN state without side to move");
            if let Some(color) = self.fen_next_player {
                return color;
            }
        }
        if self.undo_list.len() % 2 == 0 {
            self.first_mover
        } else {
            self.first_mover.opposite()
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn features(&self) -> &FeatureLayer {
        &self.features
    }

    /// From-scratch feature layer for the current placement.
    pub fn rebuild_features(&self) -> FeatureLayer {
        FeatureLayer::from_board(&self.board, self.next_player())
    }

    /// Material of `color`, pawns included, king excluded.
    #[inline]
    pub fn material(&self, color: Color) -> Score {
        self.material[color.index()]
    }

    #[inline]
    pub fn rule50_ply(&self) -> u32 {
        self.rule50_ply
    }

    #[inline]
    pub fn king_moves(&self, color: Color) -> u32 {
        self.king_moves[color.index()]
    }

    #[inline]
    pub fn king_exists(&self, color: Color) -> bool {
        self.king_exists[color.index()]
    }

    /// `[queen-side, king-side]` rook tracks of `color`.
    #[inline]
    pub fn rook_tracks(&self, color: Color) -> [RookTrack; 2] {
        self.rooks[color.index()]
    }

    // ------------------------------------------------------------------
    // FEN import surface
    // ------------------------------------------------------------------

    #[inline]
    pub fn fen_enpass(&self) -> Option<Square> {
        self.fen_enpass
    }

    #[inline]
    pub fn set_fen_enpass(&mut self, square: Option<Square>) {
        self.fen_enpass = square;
    }

    #[inline]
    pub fn fen_next_player(&self) -> Option<Color> {
        self.fen_next_player
    }

    /// Records the imported side to move. On an empty history it also becomes
    /// the parity anchor for later plies.
    pub fn set_fen_next_player(&mut self, color: Color) {
        self.fen_next_player = Some(color);
        if self.undo_list.is_empty() {
            self.first_mover = color;
        }
    }

    #[inline]
    pub fn built_from_fen(&self) -> bool {
        self.build_from_fen
    }

    #[inline]
    pub fn mark_built_from_fen(&mut self) {
        self.build_from_fen = true;
    }

    #[inline]
    pub fn add_fen_castling_mask(&mut self, mask: CastlingRights) {
        self.fen_castling_mask |= mask;
    }

    #[inline]
    pub fn fen_castling_mask(&self) -> CastlingRights {
        self.fen_castling_mask
    }

    pub fn reset_fen_state(&mut self) {
        self.fen_enpass = None;
        self.fen_next_player = None;
        self.build_from_fen = false;
        self.fen_castling_mask = 0;
    }

    /// Marks rooks (and kings that lost both sides) as already moved for every
    /// castling right absent from `rights`, so the loss survives the FEN
    /// fields being cleared.
    pub fn forfeit_castling(&mut self, rights: CastlingRights) {
        for (color, short_bit, long_bit) in [
            (Color::White, CASTLE_WHITE_KINGSIDE, CASTLE_WHITE_QUEENSIDE),
            (Color::Black, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE),
        ] {
            let tracks = &mut self.rooks[color.index()];
            if rights & short_bit == 0 {
                tracks[RIGHT_ROOK].moves = tracks[RIGHT_ROOK].moves.max(1);
            }
            if rights & long_bit == 0 {
                tracks[LEFT_ROOK].moves = tracks[LEFT_ROOK].moves.max(1);
            }
            if rights & (short_bit | long_bit) == 0 {
                self.king_moves[color.index()] = self.king_moves[color.index()].max(1);
            }
        }
    }

    /// Construction-time rebuild of the feature layer, for importers that
    /// change the side to move after `new`.
    pub fn refresh_features(&mut self) {
        self.features = self.rebuild_features();
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new_game()
    }
}
