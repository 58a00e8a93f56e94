//! Test-side FEN support.
//!
//! The engine core takes positions through `PositionBuilder`; parsing
//! notation is a front-end concern. Tests still want to speak FEN, so
//! this helper translates a FEN string into builder calls, including the
//! square-numbering flip (FEN reads files a-h, the crate counts files
//! from the h-side).

use rookery::bitboard::sq;
use rookery::board::{Board, Color, PieceKind, PositionBuilder, Wing};

/// Square index from algebraic coordinates like `"e4"`.
#[allow(dead_code)]
pub fn square(name: &str) -> u8 {
    let bytes = name.as_bytes();
    assert_eq!(bytes.len(), 2, "square names are two characters");
    let file = 7 - (bytes[0] - b'a');
    let rank = bytes[1] - b'1';
    sq(rank, file)
}

/// Build a board from a FEN string (the clock fields may be omitted).
pub fn board_from_fen(fen: &str) -> Board {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    assert!(parts.len() >= 4, "FEN needs placement, side, castling, ep");

    let mut builder = PositionBuilder::new();

    let mut rank = 7u8;
    let mut file_from_a = 0u8;
    for c in parts[0].chars() {
        match c {
            '/' => {
                rank -= 1;
                file_from_a = 0;
            }
            '1'..='8' => file_from_a += c as u8 - b'0',
            piece => {
                let color = if piece.is_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                let kind = match piece.to_ascii_lowercase() {
                    'p' => PieceKind::Pawn,
                    'n' => PieceKind::Knight,
                    'b' => PieceKind::Bishop,
                    'r' => PieceKind::Rook,
                    'q' => PieceKind::Queen,
                    'k' => PieceKind::King,
                    other => panic!("unexpected piece character {other:?}"),
                };
                builder.place(color, kind, sq(rank, 7 - file_from_a));
                file_from_a += 1;
            }
        }
    }

    builder.side_to_move(match parts[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => panic!("unexpected side to move {other:?}"),
    });

    for c in parts[2].chars() {
        match c {
            'K' => builder.castling(Color::White, Wing::Kingside, true),
            'Q' => builder.castling(Color::White, Wing::Queenside, true),
            'k' => builder.castling(Color::Black, Wing::Kingside, true),
            'q' => builder.castling(Color::Black, Wing::Queenside, true),
            '-' => &mut builder,
            other => panic!("unexpected castling character {other:?}"),
        };
    }

    if parts[3] != "-" {
        builder.en_passant_target(Some(square(parts[3])));
    }

    if let Some(clock) = parts.get(4) {
        builder.halfmove_clock(clock.parse().expect("halfmove clock"));
    }

    builder.build().expect("FEN describes a valid position")
}
