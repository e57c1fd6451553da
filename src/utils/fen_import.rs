//! FEN-to-BoardState importer.
//!
//! Builds the board from the placement field and hands side to move,
//! castling rights and the en-passant square to the state's FEN surface. The
//! halfmove clock seeds the fifty-move counter; the fullmove number is
//! accepted and ignored. Both clocks may be omitted.

use tracing::debug;

use crate::board::bit_board::Board;
use crate::errors::{SparseGridError, SparseGridResult};
use crate::game_state::board_state::BoardState;
use crate::game_state::chess_types::*;
use crate::utils::algebraic::algebraic_to_square;

pub fn import_fen(fen: &str) -> SparseGridResult<BoardState> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| SparseGridError::fen("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| SparseGridError::fen("missing side to move"))?;
    let castling_part = parts
        .next()
        .ok_or_else(|| SparseGridError::fen("missing castling rights"))?;
    let en_passant_part = parts
        .next()
        .ok_or_else(|| SparseGridError::fen("missing en-passant square"))?;
    let halfmove = match parts.next() {
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| SparseGridError::fen(format!("invalid halfmove clock `{text}`")))?,
        None => 0,
    };
    if let Some(text) = parts.next() {
        text.parse::<u32>()
            .map_err(|_| SparseGridError::fen(format!("invalid fullmove number `{text}`")))?;
    }
    if parts.next().is_some() {
        return Err(SparseGridError::fen("extra trailing fields"));
    }

    let board = board_from_placement(board_part)?;
    let side = parse_side_to_move(side_part)?;
    let rights = parse_castling_rights(castling_part)?;
    let en_passant = parse_en_passant_square(en_passant_part)?;

    let mut state = BoardState::new(board);
    state.reset_state(halfmove);
    state.mark_built_from_fen();
    state.set_fen_next_player(side);
    state.add_fen_castling_mask(rights);
    state.forfeit_castling(rights);

    if let Some(ep) = en_passant {
        let mismatch = || {
            SparseGridError::fen(format!(
                "en-passant square `{en_passant_part}` does not match the placement"
            ))
        };
        let expected_rank = match side {
            Color::White => 5,
            Color::Black => 2,
        };
        if rank_of(ep) != expected_rank {
            return Err(mismatch());
        }
        // The pawn that just double-pushed sits one rank past the target.
        let pawn_pos = (ep as i8 - side.pawn_push()) as Square;
        let pusher = state.board().piece_at(pawn_pos);
        if pusher != Some((side.opposite(), PieceKind::Pawn))
            || !state.validate_enpass_position(ep, pawn_pos)
        {
            return Err(mismatch());
        }
        state.set_fen_enpass(Some(ep));
    }

    state.refresh_features();

    debug!(
        side = ?side,
        castling = rights,
        en_passant = ?en_passant,
        halfmove,
        "imported FEN position"
    );

    Ok(state)
}

/// Parses the placement field alone (`rnbqkbnr/pppppppp/...`).
pub fn board_from_placement(placement: &str) -> SparseGridResult<Board> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(SparseGridError::fen("board layout must contain 8 ranks"));
    }

    let mut board = Board::new_empty();
    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx as Square;
        let mut file: Square = 0;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(SparseGridError::fen(format!("invalid empty-square count '{ch}'")));
                }
                if file + empty_count as Square > 8 {
                    return Err(SparseGridError::fen("board rank has too many files"));
                }
                file += empty_count as Square;
                continue;
            }

            let (color, kind) = piece_from_fen_char(ch).ok_or_else(|| {
                SparseGridError::fen(format!("invalid piece character '{ch}' in board layout"))
            })?;
            if file >= 8 {
                return Err(SparseGridError::fen("board rank has too many files"));
            }
            board.put(kind, color, board_rank * 8 + file);
            file += 1;
        }

        if file != 8 {
            return Err(SparseGridError::fen("board rank does not sum to 8 files"));
        }
    }

    Ok(board)
}

fn parse_side_to_move(side_part: &str) -> SparseGridResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(SparseGridError::fen(format!("invalid side-to-move field `{side_part}`"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> SparseGridResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;
    for ch in castling_part.chars() {
        rights |= match ch {
            'K' => CASTLE_WHITE_KINGSIDE,
            'Q' => CASTLE_WHITE_QUEENSIDE,
            'k' => CASTLE_BLACK_KINGSIDE,
            'q' => CASTLE_BLACK_QUEENSIDE,
            _ => return Err(SparseGridError::fen(format!("invalid castling rights character '{ch}'"))),
        };
    }
    Ok(rights)
}

fn parse_en_passant_square(en_passant_part: &str) -> SparseGridResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }
    algebraic_to_square(en_passant_part)
        .map(Some)
        .map_err(|_| SparseGridError::fen(format!("invalid en-passant square `{en_passant_part}`")))
}

fn piece_from_fen_char(ch: char) -> Option<(Color, PieceKind)> {
    let color = if ch.is_ascii_uppercase() {
        Color::White
    } else if ch.is_ascii_lowercase() {
        Color::Black
    } else {
        return None;
    };

    let kind = match ch.to_ascii_lowercase() {
        'p' => PieceKind::Pawn,
        'n' => PieceKind::Knight,
        'b' => PieceKind::Bishop,
        'r' => PieceKind::Rook,
        'q' => PieceKind::Queen,
        'k' => PieceKind::King,
        _ => return None,
    };
    Some((color, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    #[test]
    fn starting_fen_matches_new_game() {
        let mut imported = import_fen(STARTING_POSITION_FEN).expect("starting FEN should parse");
        assert!(imported.built_from_fen());
        assert_eq!(imported.fen_next_player(), Some(Color::White));
        assert_eq!(imported.fen_castling_mask(), CASTLE_ALL);
        assert_eq!(imported.fen_enpass(), None);

        let reference = BoardState::new_game();
        assert_eq!(imported.board(), reference.board());
        assert_eq!(imported.features(), reference.features());

        imported.reset_fen_state();
        assert_eq!(imported, reference);
    }

    #[test]
    fn black_to_move_keeps_parity_after_fen_fields_clear() {
        let mut state = import_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
            .expect("FEN should parse");
        assert_eq!(state.next_player(), Color::Black);
        assert_eq!(state.features().values()[288], 1.0);
        assert_eq!(state.moves().len(), 20);

        state.apply(Move::quiet(52, 36));
        assert!(!state.built_from_fen());
        assert_eq!(state.next_player(), Color::White);
        state.undo();
        assert_eq!(state.next_player(), Color::Black);
        assert_eq!(state.features(), &state.rebuild_features());
    }

    #[test]
    fn fen_rights_limit_castling_for_good() {
        let mut state = import_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1").expect("FEN should parse");
        assert_eq!(
            state.movegen_context().castling_rights,
            CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE
        );
        state.apply(Move::quiet(0, 1)); // a1 -> b1
        state.apply(Move::quiet(63, 62)); // h8 -> g8
        state.apply(Move::quiet(1, 0));
        state.apply(Move::quiet(62, 63));
        // FEN mask is gone but the forfeited rights stay forfeited.
        assert!(!state.built_from_fen());
        assert_eq!(
            state.possible_castling_mask(),
            CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE
        );
    }

    #[test]
    fn en_passant_field_is_validated_and_offered() {
        let state = import_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").expect("FEN should parse");
        assert_eq!(state.fen_enpass(), Some(43));
        assert!(state.moves().contains(&Move::en_passant(36, 43)));

        assert!(import_fen("4k3/8/8/3pP3/8/8/8/4K3 w - e6 0 1").is_err());
        assert!(import_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d3 0 1").is_err());
    }

    #[test]
    fn clocks_are_optional_and_seed_rule50() {
        let state = import_fen("4k3/8/8/8/8/8/8/4K3 w - - 42 80").expect("FEN should parse");
        assert_eq!(state.rule50_ply(), 42);
        let short = import_fen("4k3/8/8/8/8/8/8/4K3 b - -").expect("FEN should parse");
        assert_eq!(short.rule50_ply(), 0);
        assert_eq!(short.next_player(), Color::Black);
    }

    #[test]
    fn malformed_fields_are_rejected() {
        for bad in [
            "",
            "8/8/8/8/8/8/8 w - - 0 1",
            "9/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2X w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w Z - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - x 1",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 1 extra",
            // En-passant targets on the edge ranks.
            "4k3/8/8/8/8/8/8/4K3 w - a1 0 1",
            "4k3/8/8/8/8/8/8/4K3 b - h8 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - a8 0 1",
            "4k3/8/8/8/8/8/8/4K3 b - h1 0 1",
        ] {
            assert!(
                matches!(import_fen(bad), Err(SparseGridError::InvalidFen { .. })),
                "`{bad}` should be rejected"
            );
        }
    }

    #[test]
    fn overlong_rank_of_empty_squares_is_rejected() {
        let placement = format!("{}/8/8/8/8/8/8/8", "8".repeat(40));
        assert!(matches!(
            board_from_placement(&placement),
            Err(SparseGridError::InvalidFen { .. })
        ));
        assert!(matches!(
            import_fen(&format!("{placement} w - - 0 1")),
            Err(SparseGridError::InvalidFen { .. })
        ));
        assert!(board_from_placement("44/8/8/8/8/8/8/8").is_ok());
        assert!(board_from_placement("44p/8/8/8/8/8/8/8").is_err());
    }
}
