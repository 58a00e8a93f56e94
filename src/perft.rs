//! Perft: exhaustive legal-move node counting for validation.
//!
//! Reference counts from the standard suite
//! (<https://www.chessprogramming.org/Perft_Results>):
//!
//! | Depth | Nodes from the start position |
//! | ----- | ----------------------------- |
//! | 1     | 20                            |
//! | 2     | 400                           |
//! | 3     | 8,902                         |
//! | 4     | 197,281                       |
//! | 5     | 4,865,609                     |
//! | 6     | 119,060,324                   |
//!
//! Any divergence from these is a generator or make/unmake defect; the
//! integration tests pin several of them down. An interactive perft
//! front end belongs to the presentation layer, not this crate.

use crate::board::Board;
use crate::movegen::generate;
use crate::movelist::MAX_MOVES;
use crate::moves::Move;

/// Count leaf nodes of the legal-move tree to `depth`.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut buffer = [Move::NONE; MAX_MOVES];
    let count = generate(board, &mut buffer, 0);
    if depth == 1 {
        return count as u64;
    }
    let mut nodes = 0;
    for &mv in &buffer[..count] {
        let saved = board.flags();
        let undo = board.make(mv);
        nodes += perft(board, depth - 1);
        board.unmake(mv, undo, saved);
    }
    nodes
}

/// Per-root-move node counts, for chasing down a count mismatch one
/// branch at a time.
pub fn divide(board: &mut Board, depth: u32) -> Vec<(Move, u64)> {
    let mut buffer = [Move::NONE; MAX_MOVES];
    let count = generate(board, &mut buffer, 0);
    let mut results = Vec::with_capacity(count);
    for &mv in &buffer[..count] {
        let saved = board.flags();
        let undo = board.make(mv);
        let nodes = if depth > 1 { perft(board, depth - 1) } else { 1 };
        board.unmake(mv, undo, saved);
        results.push((mv, nodes));
    }
    results
}
