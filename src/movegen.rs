//! Legal move generation.
//!
//! Moves are generated per piece type from the precomputed tables and
//! filtered to full legality on the way out: under a single check every
//! non-king move must land in the check-block set, a pinned piece may
//! only move along its pin ray, king moves are tested against the enemy's
//! attacks with the king lifted off the board (a slider's ray extends
//! through the square the king vacates), and castling demands an
//! untouched rook, an empty path and an unattacked king walk. No
//! pseudo-legal move ever reaches the caller.
//!
//! The generator writes into a caller-supplied flat buffer starting at a
//! caller-given offset and returns the next free offset; it allocates
//! nothing. Size buffers per [`crate::movelist::MAX_MOVES`].

use crate::analysis::{analyze, CheckSummary};
use crate::bitboard::{bb, rank_of, sq, ATTACK_TABLES};
use crate::bits::{lsb_index, BitboardIter};
use crate::board::{king_home, rook_home, Board, Color, PieceKind, Wing};
use crate::magic;
use crate::movelist::MoveList;
use crate::moves::Move;

const PROMOTION_CHOICES: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
];

/// Generate every legal move for the side to move, writing into
/// `buffer` from `at` onward. Returns the index one past the last move
/// written. The caller guarantees capacity per the
/// [`crate::movelist::MAX_MOVES`] sizing rule.
pub fn generate(board: &Board, buffer: &mut [Move], at: usize) -> usize {
    let side = board.flags().side_to_move();
    let us = board.pieces(side);
    let them = board.pieces(side.other());
    let occupied = us | them;
    let king = board.king_square(side);

    let summary = analyze(board, side);
    let mut out = Cursor { buffer, at };

    king_moves(board, side, king, us, occupied, &mut out);

    if summary.checkers >= 2 {
        // Only the king may move out of a double check.
        return out.at;
    }
    if summary.checkers == 0 {
        castling_moves(board, side, occupied, &mut out);
    }

    knight_moves(board, side, us, &summary, &mut out);
    slider_moves(board, side, us, occupied, &summary, &mut out);
    pawn_moves(board, side, us, them, occupied, &summary, &mut out);
    en_passant_moves(board, side, king, occupied, &mut out);

    out.at
}

/// Convenience wrapper: the legal moves in a fresh stack buffer.
pub fn legal_moves(board: &Board) -> MoveList {
    let mut list = MoveList::new();
    let len = generate(board, list.storage_mut(), 0);
    list.set_len(len);
    list
}

struct Cursor<'a> {
    buffer: &'a mut [Move],
    at: usize,
}

impl Cursor<'_> {
    #[inline(always)]
    fn push(&mut self, mv: Move) {
        debug_assert!(self.at < self.buffer.len(), "move buffer overflow");
        self.buffer[self.at] = mv;
        self.at += 1;
    }
}

/// Destinations a piece on `from` may use without breaking a pin: the
/// whole board when unpinned, otherwise the ray between king and pinner
/// including the pinner's square.
#[inline(always)]
fn pin_mask(board: &Board, side: Color, summary: &CheckSummary, from: u8) -> u64 {
    match summary.pins.pin_on(from) {
        Some(pin) => board.pin_ray(side, pin.pinner),
        None => !0,
    }
}

fn king_moves(board: &Board, side: Color, king: u8, us: u64, occupied: u64, out: &mut Cursor) {
    let enemy = side.other();
    // Lift the king: a checking slider attacks straight through the
    // square the king retreats from.
    let occupied_no_king = occupied ^ bb(king);
    let targets = ATTACK_TABLES.king[king as usize] & !us;
    for to in BitboardIter(targets) {
        if !board.is_square_attacked(to, enemy, occupied_no_king) {
            out.push(Move::new(king, to));
        }
    }
}

fn castling_moves(board: &Board, side: Color, occupied: u64, out: &mut Cursor) {
    let enemy = side.other();
    let home = king_home(side);

    for wing in [Wing::Kingside, Wing::Queenside] {
        if !board.flags().may_castle(side, wing) {
            continue;
        }
        // The rights bits track rook/king movement; the rook must also
        // still stand on its home square.
        if board.rooks() & board.pieces(side) & bb(rook_home(side, wing)) == 0 {
            continue;
        }
        let rank = rank_of(home);
        let (empty_path, king_path, king_to) = match wing {
            // King walks e1-f1-g1; f1 and g1 must be empty and safe.
            Wing::Kingside => (
                bb(sq(rank, 1)) | bb(sq(rank, 2)),
                [sq(rank, 2), sq(rank, 1)],
                sq(rank, 1),
            ),
            // King walks e1-d1-c1; b1 must additionally be empty for the
            // rook to pass, but may be attacked.
            Wing::Queenside => (
                bb(sq(rank, 4)) | bb(sq(rank, 5)) | bb(sq(rank, 6)),
                [sq(rank, 4), sq(rank, 5)],
                sq(rank, 5),
            ),
        };
        if occupied & empty_path != 0 {
            continue;
        }
        if king_path
            .iter()
            .any(|&s| board.is_square_attacked(s, enemy, occupied))
        {
            continue;
        }
        out.push(match wing {
            Wing::Kingside => Move::castle_kingside(home, king_to),
            Wing::Queenside => Move::castle_queenside(home, king_to),
        });
    }
}

fn knight_moves(board: &Board, side: Color, us: u64, summary: &CheckSummary, out: &mut Cursor) {
    for from in BitboardIter(board.knights() & us) {
        // A pinned knight can never stay on its pin ray, but the mask
        // states that directly instead of special-casing it.
        let mask = summary.check_block & pin_mask(board, side, summary, from);
        let targets = ATTACK_TABLES.knight[from as usize] & !us & mask;
        for to in BitboardIter(targets) {
            out.push(Move::new(from, to));
        }
    }
}

fn slider_moves(
    board: &Board,
    side: Color,
    us: u64,
    occupied: u64,
    summary: &CheckSummary,
    out: &mut Cursor,
) {
    for from in BitboardIter(board.rooks() & us) {
        let mask = summary.check_block & pin_mask(board, side, summary, from);
        let targets = magic::rook_attacks(from, occupied) & !us & mask;
        for to in BitboardIter(targets) {
            out.push(Move::new(from, to));
        }
    }
    for from in BitboardIter(board.bishops() & us) {
        let mask = summary.check_block & pin_mask(board, side, summary, from);
        let targets = magic::bishop_attacks(from, occupied) & !us & mask;
        for to in BitboardIter(targets) {
            out.push(Move::new(from, to));
        }
    }
    for from in BitboardIter(board.queens() & us) {
        let mask = summary.check_block & pin_mask(board, side, summary, from);
        let targets = magic::queen_attacks(from, occupied) & !us & mask;
        for to in BitboardIter(targets) {
            out.push(Move::new(from, to));
        }
    }
}

fn pawn_moves(
    board: &Board,
    side: Color,
    us: u64,
    them: u64,
    occupied: u64,
    summary: &CheckSummary,
    out: &mut Cursor,
) {
    let (push, start_rank, promo_rank): (i8, u8, u8) = match side {
        Color::White => (8, 1, 6),
        Color::Black => (-8, 6, 1),
    };

    for from in BitboardIter(board.pawns() & us) {
        let mask = summary.check_block & pin_mask(board, side, summary, from);
        let captures = ATTACK_TABLES.pawn[side as usize][from as usize] & them & mask;
        let rank = rank_of(from);
        let single = (from as i8 + push) as u8;

        if rank == promo_rank {
            // Promotions: capture or push onto the back rank, with all
            // four piece choices. Regular push logic does not apply.
            for to in BitboardIter(captures) {
                for piece in PROMOTION_CHOICES {
                    out.push(Move::promotion(from, to, piece));
                }
            }
            if occupied & bb(single) == 0 && mask & bb(single) != 0 {
                for piece in PROMOTION_CHOICES {
                    out.push(Move::promotion(from, single, piece));
                }
            }
            continue;
        }

        for to in BitboardIter(captures) {
            out.push(Move::new(from, to));
        }

        if occupied & bb(single) == 0 {
            if mask & bb(single) != 0 {
                out.push(Move::new(from, single));
            }
            if rank == start_rank {
                let double = (single as i8 + push) as u8;
                if occupied & bb(double) == 0 && mask & bb(double) != 0 {
                    out.push(Move::double_push(from, double));
                }
            }
        }
    }
}

/// En-passant candidates come straight from the flag word's file masks.
/// Each candidate is vetted by rebuilding the occupancy as it would stand
/// after the capture and re-testing the king: both pawns leave their
/// rank at once, so ordinary pin and check-block filtering cannot be
/// trusted here. This also accepts the capture when it is itself the
/// evasion of a pawn check.
fn en_passant_moves(board: &Board, side: Color, king: u8, occupied: u64, out: &mut Cursor) {
    let capturers = board.flags().ep_capturers();
    let capturable = board.flags().ep_capturable();
    if capturable == 0 {
        return;
    }

    let (from_rank, to_rank) = match side {
        Color::White => (4u8, 5u8),
        Color::Black => (3u8, 2u8),
    };
    let victim_file = lsb_index(capturable as u64);
    let victim = sq(from_rank, victim_file);
    let to = sq(to_rank, victim_file);

    for file in BitboardIter(capturers as u64) {
        let from = sq(from_rank, file);
        debug_assert!(board.pawns() & board.pieces(side) & bb(from) != 0);

        let after = (occupied ^ bb(from) ^ bb(victim)) | bb(to);
        if !attacked_after_en_passant(board, side, king, after, bb(victim)) {
            out.push(Move::en_passant(from, to));
        }
    }
}

/// Like [`Board::is_square_attacked`] for the king, but with the captured
/// pawn struck from the attacker sets as well as from the occupancy.
fn attacked_after_en_passant(
    board: &Board,
    side: Color,
    king: u8,
    occupied: u64,
    victim_bb: u64,
) -> bool {
    let enemy = side.other();
    let them = board.pieces(enemy) & !victim_bb;
    let tables = &ATTACK_TABLES;
    if tables.knight[king as usize] & board.knights() & them != 0 {
        return true;
    }
    if tables.king[king as usize] & board.kings() & them != 0 {
        return true;
    }
    if tables.pawn[side as usize][king as usize] & board.pawns() & them != 0 {
        return true;
    }
    if magic::rook_attacks(king, occupied) & board.orthogonal_sliders() & them != 0 {
        return true;
    }
    magic::bishop_attacks(king, occupied) & board.diagonal_sliders() & them != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::file_of;
    use crate::board::PositionBuilder;

    fn moves_from(board: &Board, from: u8) -> Vec<Move> {
        legal_moves(board).iter().filter(|m| m.from() == from).collect()
    }

    #[test]
    fn twenty_moves_from_the_start() {
        let list = legal_moves(&Board::new());
        assert_eq!(list.len(), 20);
        // 16 pawn moves, 4 knight moves, nothing else.
        let knight_moves = list
            .iter()
            .filter(|m| rank_of(m.from()) == 0)
            .count();
        assert_eq!(knight_moves, 4);
    }

    #[test]
    fn buffer_offset_interface_appends() {
        let board = Board::new();
        let mut buffer = [Move::NONE; crate::movelist::MAX_MOVES];
        let mid = generate(&board, &mut buffer, 5);
        assert_eq!(mid, 25);
        assert_eq!(buffer[4], Move::NONE, "slots before the offset untouched");
        assert!(!buffer[5].is_none());
    }

    #[test]
    fn pinned_knight_has_no_moves() {
        // Rook e8 pins the knight on e4; the knight cannot move at all.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Knight, sq(3, 3))
            .place(Color::Black, PieceKind::Rook, sq(7, 3))
            .place(Color::Black, PieceKind::King, sq(7, 0));
        let board = builder.build().unwrap();

        assert!(moves_from(&board, sq(3, 3)).is_empty());
    }

    #[test]
    fn pinned_rook_slides_only_on_the_pin_ray() {
        // Rook e8 pins the rook on e4: it may shuttle on the e-file up to
        // and including the pinner, nothing sideways.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(3, 3))
            .place(Color::Black, PieceKind::Rook, sq(7, 3))
            .place(Color::Black, PieceKind::King, sq(7, 0));
        let board = builder.build().unwrap();

        let rook_moves = moves_from(&board, sq(3, 3));
        assert_eq!(rook_moves.len(), 6); // e2 e3 e5 e6 e7 xe8
        assert!(rook_moves.iter().all(|m| file_of(m.to()) == 3));
        assert!(rook_moves.iter().any(|m| m.to() == sq(7, 3)));
    }

    #[test]
    fn removing_the_pinner_restores_mobility() {
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Knight, sq(3, 3))
            .place(Color::Black, PieceKind::King, sq(7, 0));
        let board = builder.build().unwrap();

        // Without the rook from `pinned_knight_has_no_moves` the knight
        // has its full eight squares.
        assert_eq!(moves_from(&board, sq(3, 3)).len(), 8);
    }

    #[test]
    fn single_check_allows_block_capture_or_king_move() {
        // Black rook e8 checks the king on e1. White rook a4 can block on
        // e4; white bishop d2 can capture nothing and block nothing else.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(3, 7)) // a4
            .place(Color::Black, PieceKind::Rook, sq(7, 3)) // e8
            .place(Color::Black, PieceKind::King, sq(7, 0));
        let board = builder.build().unwrap();

        let list = legal_moves(&board);
        // Rook: only the block on e4. King: d1, f1, d2, f2 (e2 is still
        // on the checking file).
        let rook_moves: Vec<_> = list.iter().filter(|m| m.from() == sq(3, 7)).collect();
        assert_eq!(rook_moves.len(), 1);
        assert_eq!(rook_moves[0].to(), sq(3, 3));
        let king_moves: Vec<_> = list.iter().filter(|m| m.from() == sq(0, 3)).collect();
        assert_eq!(king_moves.len(), 4);
        assert!(king_moves.iter().all(|m| file_of(m.to()) != 3));
    }

    #[test]
    fn double_check_forces_the_king_to_move() {
        // Rook e8 and bishop b4 both check the king on e1.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Queen, sq(3, 7)) // a4, could block either alone
            .place(Color::Black, PieceKind::Rook, sq(7, 3))
            .place(Color::Black, PieceKind::Bishop, sq(3, 6))
            .place(Color::Black, PieceKind::King, sq(7, 0));
        let board = builder.build().unwrap();

        let summary = analyze(&board, Color::White);
        assert_eq!(summary.checkers, 2);
        assert_eq!(summary.check_block, 0);

        let list = legal_moves(&board);
        assert!(!list.is_empty());
        assert!(
            list.iter().all(|m| m.from() == sq(0, 3)),
            "every move in a double check is a king move"
        );
    }

    #[test]
    fn king_cannot_retreat_along_the_checking_ray() {
        // Rook h4 checks a king on e4: e3 and e5 are fine, d4 is not,
        // because the rook's ray continues through the vacated square.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(3, 3))
            .place(Color::Black, PieceKind::Rook, sq(3, 0))
            .place(Color::Black, PieceKind::King, sq(7, 7));
        let board = builder.build().unwrap();

        let king_moves = moves_from(&board, sq(3, 3));
        assert!(king_moves.iter().all(|m| m.to() != sq(3, 4)), "d4 stays hot");
        assert!(king_moves.iter().any(|m| m.to() == sq(4, 3))); // e5
        assert!(king_moves.iter().any(|m| m.to() == sq(2, 3))); // e3
    }

    #[test]
    fn castling_generated_when_path_is_clear_and_safe() {
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(0, 0))
            .place(Color::White, PieceKind::Rook, sq(0, 7))
            .place(Color::Black, PieceKind::King, sq(7, 3))
            .castling(Color::White, Wing::Kingside, true)
            .castling(Color::White, Wing::Queenside, true);
        let board = builder.build().unwrap();

        let list = legal_moves(&board);
        assert!(list.iter().any(|m| m.is_castle_kingside()));
        assert!(list.iter().any(|m| m.is_castle_queenside()));
    }

    #[test]
    fn castling_blocked_through_an_attacked_square() {
        // Black rook g8 covers g1: kingside castling is off, queenside
        // fine.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(0, 0))
            .place(Color::White, PieceKind::Rook, sq(0, 7))
            .place(Color::Black, PieceKind::Rook, sq(7, 1))
            .place(Color::Black, PieceKind::King, sq(7, 3))
            .castling(Color::White, Wing::Kingside, true)
            .castling(Color::White, Wing::Queenside, true);
        let board = builder.build().unwrap();

        let list = legal_moves(&board);
        assert!(!list.iter().any(|m| m.is_castle_kingside()));
        assert!(list.iter().any(|m| m.is_castle_queenside()));
    }

    #[test]
    fn queenside_castling_ignores_an_attacked_b_file() {
        // Only the king's walk must be safe; b1 is the rook's business.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(0, 7))
            .place(Color::Black, PieceKind::Rook, sq(7, 6)) // b8
            .place(Color::Black, PieceKind::King, sq(7, 0))
            .castling(Color::White, Wing::Queenside, true);
        let board = builder.build().unwrap();

        assert!(legal_moves(&board).iter().any(|m| m.is_castle_queenside()));
    }

    #[test]
    fn no_castling_while_in_check() {
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Rook, sq(0, 0))
            .place(Color::Black, PieceKind::Rook, sq(7, 3)) // e8, gives check
            .place(Color::Black, PieceKind::King, sq(7, 0))
            .castling(Color::White, Wing::Kingside, true);
        let board = builder.build().unwrap();

        assert!(!legal_moves(&board).iter().any(|m| m.is_castle()));
    }

    #[test]
    fn promotions_come_in_all_four_flavors() {
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::White, PieceKind::Pawn, sq(6, 0)) // h7
            .place(Color::Black, PieceKind::Rook, sq(7, 1)) // g8
            .place(Color::Black, PieceKind::King, sq(5, 5)); // c6
        let board = builder.build().unwrap();

        let pawn_moves = moves_from(&board, sq(6, 0));
        // Push to h8 and capture on g8, four promotion pieces each.
        assert_eq!(pawn_moves.len(), 8);
        assert!(pawn_moves.iter().all(|m| m.promotion_piece().is_some()));
        let captures = pawn_moves.iter().filter(|m| m.to() == sq(7, 1)).count();
        assert_eq!(captures, 4);
    }

    #[test]
    fn en_passant_capture_is_generated_from_the_flags() {
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 3))
            .place(Color::Black, PieceKind::King, sq(7, 3))
            .place(Color::White, PieceKind::Pawn, sq(4, 3)) // e5
            .place(Color::Black, PieceKind::Pawn, sq(4, 4)) // d5, just pushed
            .en_passant_target(Some(sq(5, 4))); // d6
        let board = builder.build().unwrap();

        let list = legal_moves(&board);
        let ep: Vec<_> = list.iter().filter(|m| m.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!(ep[0].from(), sq(4, 3));
        assert_eq!(ep[0].to(), sq(5, 4));
    }

    #[test]
    fn en_passant_suppressed_by_a_rank_pin() {
        // Both pawns leave the fifth rank together; the rook on h5 would
        // then see the king on a5, even though neither pawn alone is
        // pinned.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(4, 7)) // a5
            .place(Color::White, PieceKind::Pawn, sq(4, 3)) // e5
            .place(Color::Black, PieceKind::Pawn, sq(4, 4)) // d5
            .place(Color::Black, PieceKind::Rook, sq(4, 0)) // h5
            .place(Color::Black, PieceKind::King, sq(7, 0))
            .en_passant_target(Some(sq(5, 4)));
        let board = builder.build().unwrap();

        assert!(
            !legal_moves(&board).iter().any(|m| m.is_en_passant()),
            "capturing en passant would expose the king along the rank"
        );
    }

    #[test]
    fn en_passant_survives_a_harmless_distant_rook() {
        // Same shape but the rook sits behind its own pawn's file, not on
        // the shared rank: the capture stays legal.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(4, 7)) // a5
            .place(Color::White, PieceKind::Pawn, sq(4, 3)) // e5
            .place(Color::Black, PieceKind::Pawn, sq(4, 4)) // d5
            .place(Color::Black, PieceKind::Rook, sq(3, 0)) // h4
            .place(Color::Black, PieceKind::King, sq(7, 0))
            .en_passant_target(Some(sq(5, 4)));
        let board = builder.build().unwrap();

        assert!(legal_moves(&board).iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn en_passant_refused_when_the_capturer_is_diagonally_pinned() {
        // Bishop a8 pins the d5 pawn along a8-d5-h1. Capturing e.p. on
        // e6 would step the pawn off that diagonal.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 0)) // h1
            .place(Color::White, PieceKind::Pawn, sq(4, 4)) // d5
            .place(Color::Black, PieceKind::Bishop, sq(7, 7)) // a8
            .place(Color::Black, PieceKind::Pawn, sq(4, 3)) // e5, just pushed
            .place(Color::Black, PieceKind::King, sq(7, 0)) // h8
            .en_passant_target(Some(sq(5, 3))); // e6
        let board = builder.build().unwrap();

        assert!(!legal_moves(&board).iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn en_passant_allowed_along_the_pin_diagonal() {
        // Same pin, but the pushed pawn is on the c-file: dxc6 e.p.
        // travels along the pinning diagonal and keeps the king covered.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::White, PieceKind::King, sq(0, 0)) // h1
            .place(Color::White, PieceKind::Pawn, sq(4, 4)) // d5
            .place(Color::Black, PieceKind::Bishop, sq(7, 7)) // a8
            .place(Color::Black, PieceKind::Pawn, sq(4, 5)) // c5, just pushed
            .place(Color::Black, PieceKind::King, sq(7, 0)) // h8
            .en_passant_target(Some(sq(5, 5))); // c6
        let board = builder.build().unwrap();

        assert!(legal_moves(&board).iter().any(|m| m.is_en_passant()));
    }

    #[test]
    fn stalemate_position_has_no_moves_and_no_check() {
        // Black king a8, white queen b6, white king anywhere safe.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::Black, PieceKind::King, sq(7, 7)) // a8
            .place(Color::White, PieceKind::Queen, sq(5, 6)) // b6
            .place(Color::White, PieceKind::King, sq(0, 0)) // h1
            .side_to_move(Color::Black);
        let board = builder.build().unwrap();

        assert_eq!(analyze(&board, Color::Black).checkers, 0);
        assert!(legal_moves(&board).is_empty());
    }

    #[test]
    fn back_rank_mate_has_no_moves_and_a_check() {
        // Black king h8 boxed by its own pawns, white rook a8.
        let mut builder = PositionBuilder::new();
        builder
            .place(Color::Black, PieceKind::King, sq(7, 0)) // h8
            .place(Color::Black, PieceKind::Pawn, sq(6, 0)) // h7
            .place(Color::Black, PieceKind::Pawn, sq(6, 1)) // g7
            .place(Color::White, PieceKind::Rook, sq(7, 7)) // a8
            .place(Color::White, PieceKind::King, sq(0, 0))
            .side_to_move(Color::Black);
        let board = builder.build().unwrap();

        assert!(analyze(&board, Color::Black).is_check());
        assert!(legal_moves(&board).is_empty());
    }
}
