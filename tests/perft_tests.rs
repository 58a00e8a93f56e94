//! Perft reference counts over the standard validation suite.
//!
//! Positions and node counts from
//! <https://www.chessprogramming.org/Perft_Results>. A single wrong
//! count anywhere in generation, legality filtering or make/unmake shows
//! up here.

mod common;

use common::board_from_fen;
use rookery::board::Board;
use rookery::perft::{divide, perft};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const POSITION_6: &str = "r4rk1/1pp1qppp/p1np1n2/2b1p1b1/2B1P1B1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn assert_perft(fen: &str, expected: &[u64]) {
    let mut board = board_from_fen(fen);
    for (i, &nodes) in expected.iter().enumerate() {
        let depth = (i + 1) as u32;
        assert_eq!(
            perft(&mut board, depth),
            nodes,
            "perft({depth}) mismatch for {fen}"
        );
    }
}

#[test]
fn perft_start_position() {
    let mut board = Board::new();
    assert_eq!(perft(&mut board, 1), 20);
    assert_eq!(perft(&mut board, 2), 400);
    assert_eq!(perft(&mut board, 3), 8_902);
    assert_eq!(perft(&mut board, 4), 197_281);
}

#[test]
#[ignore = "slow; run with --ignored for the deep counts"]
fn perft_start_position_deep() {
    let mut board = Board::new();
    assert_eq!(perft(&mut board, 5), 4_865_609);
    assert_eq!(perft(&mut board, 6), 119_060_324);
}

#[test]
fn perft_kiwipete() {
    assert_perft(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn perft_position_3() {
    // Dense with en-passant and pin traps.
    assert_perft(POSITION_3, &[14, 191, 2_812, 43_238]);
}

#[test]
fn perft_position_4() {
    // Promotions, underpromotions, and a hanging castle.
    assert_perft(POSITION_4, &[6, 264, 9_467]);
}

#[test]
fn perft_position_5() {
    assert_perft(POSITION_5, &[44, 1_486, 62_379]);
}

#[test]
fn perft_position_6() {
    assert_perft(POSITION_6, &[46, 2_079, 89_890]);
}

#[test]
fn divide_sums_match_perft() {
    for fen in [KIWIPETE, POSITION_3, POSITION_5] {
        let mut board = board_from_fen(fen);
        let total: u64 = divide(&mut board, 3).iter().map(|(_, n)| n).sum();
        assert_eq!(total, perft(&mut board, 3), "divide disagrees for {fen}");
    }
}
