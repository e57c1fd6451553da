//! Square conversions for algebraic coordinates (`e4` <-> 28).

use crate::errors::{SparseGridError, SparseGridResult};
use crate::game_state::chess_types::Square;

/// Convert algebraic notation (for example: "e4") to a square index.
pub fn algebraic_to_square(square: &str) -> SparseGridResult<Square> {
    let invalid = || SparseGridError::InvalidSquare {
        text: square.to_owned(),
    };
    let &[file, rank] = square.as_bytes() else {
        return Err(invalid());
    };
    if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
        return Err(invalid());
    }
    Ok((rank - b'1') * 8 + (file - b'a'))
}

/// Convert a square index (`0..=63`) to algebraic notation (for example: "e4").
pub fn square_to_algebraic(square: Square) -> SparseGridResult<String> {
    if square > 63 {
        return Err(SparseGridError::SquareOutOfBounds { square });
    }
    let file = char::from(b'a' + square % 8);
    let rank = char::from(b'1' + square / 8);
    Ok(format!("{file}{rank}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_and_center() {
        assert_eq!(algebraic_to_square("a1"), Ok(0));
        assert_eq!(algebraic_to_square("h8"), Ok(63));
        assert_eq!(algebraic_to_square("e4"), Ok(28));
        assert_eq!(square_to_algebraic(28).as_deref(), Ok("e4"));
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(algebraic_to_square("i1").is_err());
        assert!(algebraic_to_square("a9").is_err());
        assert!(algebraic_to_square("e44").is_err());
        assert_eq!(
            square_to_algebraic(64),
            Err(SparseGridError::SquareOutOfBounds { square: 64 })
        );
    }
}
