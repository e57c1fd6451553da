//! Perft node counting over pseudo-legal moves.
//!
//! Lines end when the game is over (king captured or fifty-move draw), so the
//! counts match legal perft only at depths where no king can be taken.

use crate::errors::SparseGridResult;
use crate::executor::thread_pool::ThreadPoolExecutor;
use crate::game_state::board_state::BoardState;
use crate::game_state::chess_types::{Move, MoveList};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
}

impl PerftCounts {
    pub fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
    }

    /// Counts the move on top of `state`'s history as one leaf.
    fn tally_last(&mut self, state: &BoardState) {
        let Some(rec) = state.history().last() else {
            return;
        };
        self.nodes += 1;
        self.captures += u64::from(rec.is_capture());
        self.en_passant += u64::from(rec.is_enpass);
        self.castles += u64::from(rec.castling.is_castling());
        self.promotions += u64::from(rec.promo);
    }
}

/// Leaf counts `depth` plies below `state`, restored on return.
pub fn perft(state: &mut BoardState, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }
    let mut counts = PerftCounts::default();
    perft_recurse(state, depth, &mut counts);
    counts
}

fn perft_recurse(state: &mut BoardState, depth: u8, counts: &mut PerftCounts) {
    let mut moves = MoveList::with_capacity(64);
    state.movegen(&mut moves);
    for mv in moves {
        state.apply(mv);
        if depth == 1 {
            counts.tally_last(state);
        } else {
            perft_recurse(state, depth - 1, counts);
        }
        state.undo();
    }
}

/// Same counts as [`perft`], one executor task per root move. Each task
/// works on its own clone of `state`.
pub fn perft_parallel(
    executor: &ThreadPoolExecutor,
    state: &BoardState,
    depth: u8,
) -> SparseGridResult<PerftCounts> {
    if depth == 0 {
        return Ok(PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        });
    }

    let futures: Vec<_> = state
        .moves()
        .into_iter()
        .map(|mv| {
            let mut local = state.clone();
            executor.send(move |_ctx| {
                local.apply(mv);
                let mut counts = PerftCounts::default();
                if depth == 1 {
                    counts.tally_last(&local);
                } else {
                    perft_recurse(&mut local, depth - 1, &mut counts);
                }
                counts
            })
        })
        .collect();

    let mut total = PerftCounts::default();
    for future in futures {
        total.merge(future.wait()?);
    }
    Ok(total)
}

/// Per-root-move node counts, in move-generation order.
pub fn perft_divide(state: &mut BoardState, depth: u8) -> Vec<(Move, u64)> {
    let depth = depth.max(1);
    state
        .moves()
        .into_iter()
        .map(|mv| {
            state.apply(mv);
            let nodes = perft(state, depth - 1).nodes;
            state.undo();
            (mv, nodes)
        })
        .collect()
}
