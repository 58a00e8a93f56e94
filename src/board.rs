//! The board: piece placement, packed game flags, and make/unmake.
//!
//! Placement lives in six bitboards: two ownership boards (`white`,
//! `black`) and four overlay boards whose intersections decode piece
//! type:
//!
//! ```text
//! knight = pawns_knights & knights_kings      pawn   = pawns_knights - knight
//! king   = knights_kings - knight             queen  = rooks_queens & queens_bishops
//! rook   = rooks_queens - queen               bishop = queens_bishops - queen
//! ```
//!
//! Everything else a move needs to know lives in one packed [`Flags`]
//! word. A board is mutated in place by [`Board::make`] and
//! [`Board::unmake`]; it is never copied implicitly (cloning six words
//! and a flag word is explicit and cheap, for callers keeping undo
//! history or splitting work across threads). A board is not safe for
//! concurrent mutation.

use crate::bitboard::{bb, between, file_of, rank_of, sq, ATTACK_TABLES};
use crate::bits::lsb_index;
use crate::magic;
use crate::moves::Move;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    #[inline(always)]
    pub const fn other(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Board side for castling, named from White's seat: kingside is the
/// h-side, queenside the a-side, for both colors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Wing {
    Kingside,
    Queenside,
}

// Home squares in this crate's numbering (h1 = 0, file counts from h).
pub const WHITE_KING_HOME: u8 = sq(0, 3); // e1
pub const BLACK_KING_HOME: u8 = sq(7, 3); // e8

pub const fn king_home(color: Color) -> u8 {
    match color {
        Color::White => WHITE_KING_HOME,
        Color::Black => BLACK_KING_HOME,
    }
}

pub const fn rook_home(color: Color, wing: Wing) -> u8 {
    match (color, wing) {
        (Color::White, Wing::Kingside) => sq(0, 0),  // h1
        (Color::White, Wing::Queenside) => sq(0, 7), // a1
        (Color::Black, Wing::Kingside) => sq(7, 0),  // h8
        (Color::Black, Wing::Queenside) => sq(7, 7), // a8
    }
}

/// Rook's (from, to) squares when its king castles to `wing`.
pub const fn rook_castle_squares(color: Color, wing: Wing) -> (u8, u8) {
    match (color, wing) {
        (Color::White, Wing::Kingside) => (sq(0, 0), sq(0, 2)),  // h1 -> f1
        (Color::White, Wing::Queenside) => (sq(0, 7), sq(0, 4)), // a1 -> d1
        (Color::Black, Wing::Kingside) => (sq(7, 0), sq(7, 2)),  // h8 -> f8
        (Color::Black, Wing::Queenside) => (sq(7, 7), sq(7, 4)), // a8 -> d8
    }
}

/// Packed game-state word. Bit layout, a contract with make/unmake:
///
/// ```text
/// bits  0..=7   reversible half-move counter (saturates at 255)
/// bits  8..=15  files of side-to-move pawns eligible to capture en
///               passant (at most two bits set)
/// bits 16..=23  file of the enemy pawn capturable en passant (at most
///               one bit set; zero exactly when bits 8..=15 are zero)
/// bit  24       white kingside rook has moved (castling lost)
/// bit  25       white queenside rook has moved
/// bit  26       black kingside rook has moved
/// bit  27       black queenside rook has moved
/// bit  28       side to move (set = Black)
/// ```
///
/// A king move sets both of its side's rook bits. File bits use the same
/// file numbering as squares (bit 0 = h-file).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Flags(u32);

const HALFMOVE_MASK: u32 = 0xFF;
const EP_CAPTURERS_SHIFT: u32 = 8;
const EP_CAPTURABLE_SHIFT: u32 = 16;
const EP_MASK: u32 = 0xFFFF << EP_CAPTURERS_SHIFT;
const ROOK_MOVED_SHIFT: u32 = 24;
const SIDE_BIT: u32 = 1 << 28;

impl Flags {
    /// Start-of-game flags: clock zero, no en passant, full castling
    /// rights, White to move.
    pub const fn new() -> Flags {
        Flags(0)
    }

    #[inline(always)]
    const fn rook_bit(color: Color, wing: Wing) -> u32 {
        let base = match color {
            Color::White => 0,
            Color::Black => 2,
        };
        let wing = match wing {
            Wing::Kingside => 0,
            Wing::Queenside => 1,
        };
        1 << (ROOK_MOVED_SHIFT + base + wing)
    }

    #[inline(always)]
    pub const fn halfmove_clock(self) -> u8 {
        (self.0 & HALFMOVE_MASK) as u8
    }

    pub(crate) fn set_halfmove_clock(&mut self, clock: u8) {
        self.0 = (self.0 & !HALFMOVE_MASK) | clock as u32;
    }

    pub(crate) fn reset_halfmove_clock(&mut self) {
        self.0 &= !HALFMOVE_MASK;
    }

    pub(crate) fn bump_halfmove_clock(&mut self) {
        let clock = self.halfmove_clock().saturating_add(1);
        self.set_halfmove_clock(clock);
    }

    /// Files of the side-to-move pawns that may capture en passant.
    #[inline(always)]
    pub const fn ep_capturers(self) -> u8 {
        ((self.0 >> EP_CAPTURERS_SHIFT) & 0xFF) as u8
    }

    /// File of the enemy pawn that may be captured en passant.
    #[inline(always)]
    pub const fn ep_capturable(self) -> u8 {
        ((self.0 >> EP_CAPTURABLE_SHIFT) & 0xFF) as u8
    }

    pub(crate) fn clear_ep(&mut self) {
        self.0 &= !EP_MASK;
    }

    pub(crate) fn set_ep(&mut self, capturers: u8, capturable: u8) {
        debug_assert!(capturers != 0 && capturable.count_ones() == 1);
        self.0 = (self.0 & !EP_MASK)
            | ((capturers as u32) << EP_CAPTURERS_SHIFT)
            | ((capturable as u32) << EP_CAPTURABLE_SHIFT);
    }

    #[inline(always)]
    pub const fn rook_moved(self, color: Color, wing: Wing) -> bool {
        self.0 & Self::rook_bit(color, wing) != 0
    }

    /// Castling still available on this wing (neither the rook nor the
    /// king has moved; path and check conditions are the generator's
    /// business).
    #[inline(always)]
    pub const fn may_castle(self, color: Color, wing: Wing) -> bool {
        !self.rook_moved(color, wing)
    }

    pub(crate) fn set_rook_moved(&mut self, color: Color, wing: Wing) {
        self.0 |= Self::rook_bit(color, wing);
    }

    #[inline(always)]
    pub const fn side_to_move(self) -> Color {
        if self.0 & SIDE_BIT != 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        match color {
            Color::White => self.0 &= !SIDE_BIT,
            Color::Black => self.0 |= SIDE_BIT,
        }
    }

    pub(crate) fn toggle_side(&mut self) {
        self.0 ^= SIDE_BIT;
    }
}

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flags")
            .field("halfmove", &self.halfmove_clock())
            .field("ep_capturers", &format_args!("{:#010b}", self.ep_capturers()))
            .field("ep_capturable", &format_args!("{:#010b}", self.ep_capturable()))
            .field("side_to_move", &self.side_to_move())
            .field("raw", &format_args!("{:#010x}", self.0))
            .finish()
    }
}

/// Token returned by [`Board::make`]; together with the move and the
/// caller's saved [`Flags`] it lets [`Board::unmake`] reverse every
/// bitboard toggle exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Undo {
    /// Kind of the piece captured on the destination square, if any.
    /// En-passant captures record nothing here; the move flag implies a
    /// pawn off the destination square.
    pub captured: Option<PieceKind>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    white: u64,
    black: u64,
    pawns_knights: u64,
    knights_kings: u64,
    rooks_queens: u64,
    queens_bishops: u64,
    flags: Flags,
}

impl Board {
    /// The standard starting layout, White to move.
    pub fn new() -> Board {
        let pawns: u64 = 0x00FF_0000_0000_FF00;
        let knights: u64 = bb(sq(0, 1)) | bb(sq(0, 6)) | bb(sq(7, 1)) | bb(sq(7, 6));
        let bishops: u64 = bb(sq(0, 2)) | bb(sq(0, 5)) | bb(sq(7, 2)) | bb(sq(7, 5));
        let rooks: u64 = bb(sq(0, 0)) | bb(sq(0, 7)) | bb(sq(7, 0)) | bb(sq(7, 7));
        let queens: u64 = bb(sq(0, 4)) | bb(sq(7, 4));
        let kings: u64 = bb(WHITE_KING_HOME) | bb(BLACK_KING_HOME);

        Board {
            white: 0x0000_0000_0000_FFFF,
            black: 0xFFFF_0000_0000_0000,
            pawns_knights: pawns | knights,
            knights_kings: knights | kings,
            rooks_queens: rooks | queens,
            queens_bishops: queens | bishops,
            flags: Flags::new(),
        }
    }

    fn empty() -> Board {
        Board {
            white: 0,
            black: 0,
            pawns_knights: 0,
            knights_kings: 0,
            rooks_queens: 0,
            queens_bishops: 0,
            flags: Flags::new(),
        }
    }

    #[inline(always)]
    pub fn occupied(&self) -> u64 {
        self.white | self.black
    }

    #[inline(always)]
    pub fn pieces(&self, color: Color) -> u64 {
        match color {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }

    #[inline(always)]
    fn pieces_mut(&mut self, color: Color) -> &mut u64 {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[inline(always)]
    pub fn pawns(&self) -> u64 {
        self.pawns_knights & !self.knights_kings
    }

    #[inline(always)]
    pub fn knights(&self) -> u64 {
        self.pawns_knights & self.knights_kings
    }

    #[inline(always)]
    pub fn kings(&self) -> u64 {
        self.knights_kings & !self.pawns_knights
    }

    #[inline(always)]
    pub fn rooks(&self) -> u64 {
        self.rooks_queens & !self.queens_bishops
    }

    #[inline(always)]
    pub fn queens(&self) -> u64 {
        self.rooks_queens & self.queens_bishops
    }

    #[inline(always)]
    pub fn bishops(&self) -> u64 {
        self.queens_bishops & !self.rooks_queens
    }

    /// Rooks and queens together: everything that attacks along ranks and
    /// files.
    #[inline(always)]
    pub fn orthogonal_sliders(&self) -> u64 {
        self.rooks_queens
    }

    /// Bishops and queens together: everything that attacks along
    /// diagonals.
    #[inline(always)]
    pub fn diagonal_sliders(&self) -> u64 {
        self.queens_bishops
    }

    #[inline(always)]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The king square for `color`. Exactly one king per color is a board
    /// invariant.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> u8 {
        lsb_index(self.kings() & self.pieces(color))
    }

    /// Decode the piece kind on an occupied square. The square must be
    /// occupied; this runs in the hot path and does not check.
    #[inline(always)]
    fn kind_on(&self, sq_bb: u64) -> PieceKind {
        if self.pawns_knights & sq_bb != 0 {
            if self.knights_kings & sq_bb != 0 {
                PieceKind::Knight
            } else {
                PieceKind::Pawn
            }
        } else if self.knights_kings & sq_bb != 0 {
            PieceKind::King
        } else if self.rooks_queens & sq_bb != 0 {
            if self.queens_bishops & sq_bb != 0 {
                PieceKind::Queen
            } else {
                PieceKind::Rook
            }
        } else {
            PieceKind::Bishop
        }
    }

    pub fn piece_at(&self, square: u8) -> Option<(Color, PieceKind)> {
        let sq_bb = bb(square);
        if self.white & sq_bb != 0 {
            Some((Color::White, self.kind_on(sq_bb)))
        } else if self.black & sq_bb != 0 {
            Some((Color::Black, self.kind_on(sq_bb)))
        } else {
            None
        }
    }

    /// Toggle a piece kind's overlay membership on the given squares.
    /// XOR makes this its own inverse, which unmake relies on.
    #[inline(always)]
    fn toggle_kind(&mut self, kind: PieceKind, squares: u64) {
        match kind {
            PieceKind::Pawn => self.pawns_knights ^= squares,
            PieceKind::Knight => {
                self.pawns_knights ^= squares;
                self.knights_kings ^= squares;
            }
            PieceKind::King => self.knights_kings ^= squares,
            PieceKind::Rook => self.rooks_queens ^= squares,
            PieceKind::Queen => {
                self.rooks_queens ^= squares;
                self.queens_bishops ^= squares;
            }
            PieceKind::Bishop => self.queens_bishops ^= squares,
        }
    }

    /// Is `square` attacked by any piece of `by`, with sliders seeing the
    /// given occupancy? Attacking outward from the square is equivalent
    /// to being attacked, so every test is a pattern lookup from
    /// `square`.
    pub fn is_square_attacked(&self, square: u8, by: Color, occupied: u64) -> bool {
        let them = self.pieces(by);
        let tables = &ATTACK_TABLES;
        if tables.knight[square as usize] & self.knights() & them != 0 {
            return true;
        }
        if tables.king[square as usize] & self.kings() & them != 0 {
            return true;
        }
        // A pawn of `by` attacks `square` exactly when a pawn of the
        // other color on `square` would attack it back.
        if tables.pawn[by.other() as usize][square as usize] & self.pawns() & them != 0 {
            return true;
        }
        if magic::rook_attacks(square, occupied) & self.orthogonal_sliders() & them != 0 {
            return true;
        }
        magic::bishop_attacks(square, occupied) & self.diagonal_sliders() & them != 0
    }

    /// Validate the board invariants. This is for validation and test
    /// paths; mutation code assumes them by contract instead of checking.
    pub fn is_consistent(&self) -> bool {
        if self.white & self.black != 0 {
            return false;
        }
        let overlays =
            self.pawns_knights | self.knights_kings | self.rooks_queens | self.queens_bishops;
        if overlays != self.occupied() {
            return false;
        }
        if (self.pawns_knights | self.knights_kings) & (self.rooks_queens | self.queens_bishops)
            != 0
        {
            return false;
        }
        if (self.kings() & self.white).count_ones() != 1
            || (self.kings() & self.black).count_ones() != 1
        {
            return false;
        }
        let capturable = self.flags.ep_capturable();
        let capturers = self.flags.ep_capturers();
        if capturable.count_ones() > 1 || capturers.count_ones() > 2 {
            return false;
        }
        if (capturable == 0) != (capturers == 0) {
            return false;
        }
        true
    }

    /// Square of the pawn an en-passant move actually removes: the
    /// destination file on the origin rank.
    #[inline(always)]
    fn ep_victim_square(mv: Move) -> u8 {
        (mv.from() & 0x38) | (mv.to() & 7)
    }

    /// Apply `mv` to the board. The move must be legal here; anything
    /// else is undefined by contract. Returns the undo token; the caller
    /// must have saved [`Board::flags`] beforehand to hand back to
    /// [`Board::unmake`].
    pub fn make(&mut self, mv: Move) -> Undo {
        let side = self.flags.side_to_move();
        let from_bb = bb(mv.from());
        let to_bb = bb(mv.to());
        let kind = self.kind_on(from_bb);

        let mut captured = None;
        if mv.is_en_passant() {
            let victim_bb = bb(Self::ep_victim_square(mv));
            *self.pieces_mut(side.other()) ^= victim_bb;
            self.pawns_knights ^= victim_bb;
        } else if self.pieces(side.other()) & to_bb != 0 {
            let victim = self.kind_on(to_bb);
            *self.pieces_mut(side.other()) ^= to_bb;
            self.toggle_kind(victim, to_bb);
            captured = Some(victim);
            // Capturing on a rook home square uses up that wing's
            // castling, whether or not the original rook still sat there.
            for wing in [Wing::Kingside, Wing::Queenside] {
                if mv.to() == rook_home(side.other(), wing) {
                    self.flags.set_rook_moved(side.other(), wing);
                }
            }
        }

        *self.pieces_mut(side) ^= from_bb | to_bb;
        if let Some(promo) = mv.promotion_piece() {
            // The pawn leaves the board and the chosen piece appears.
            self.pawns_knights ^= from_bb;
            self.toggle_kind(promo, to_bb);
        } else {
            self.toggle_kind(kind, from_bb | to_bb);
        }

        match kind {
            PieceKind::King => {
                self.flags.set_rook_moved(side, Wing::Kingside);
                self.flags.set_rook_moved(side, Wing::Queenside);
                if mv.is_castle() {
                    let wing = if mv.is_castle_kingside() {
                        Wing::Kingside
                    } else {
                        Wing::Queenside
                    };
                    let (rook_from, rook_to) = rook_castle_squares(side, wing);
                    let rook_bb = bb(rook_from) | bb(rook_to);
                    *self.pieces_mut(side) ^= rook_bb;
                    self.rooks_queens ^= rook_bb;
                }
            }
            PieceKind::Rook => {
                for wing in [Wing::Kingside, Wing::Queenside] {
                    if mv.from() == rook_home(side, wing) {
                        self.flags.set_rook_moved(side, wing);
                    }
                }
            }
            _ => {}
        }

        self.flags.clear_ep();
        if mv.is_double_push() {
            let to = mv.to();
            let file = file_of(to);
            let enemy_pawns = self.pawns() & self.pieces(side.other());
            let mut capturers = 0u8;
            if file > 0 && enemy_pawns & bb(to - 1) != 0 {
                capturers |= 1 << (file - 1);
            }
            if file < 7 && enemy_pawns & bb(to + 1) != 0 {
                capturers |= 1 << (file + 1);
            }
            if capturers != 0 {
                self.flags.set_ep(capturers, 1 << file);
            }
        }

        if captured.is_some() || kind == PieceKind::Pawn {
            self.flags.reset_halfmove_clock();
        } else {
            self.flags.bump_halfmove_clock();
        }
        self.flags.toggle_side();

        Undo { captured }
    }

    /// Reverse `mv`. `undo` must be the token `make` returned for it and
    /// `saved` the flag word from just before the make; the bitboard
    /// updates are XOR toggles, so replaying them restores the board
    /// bit for bit and the flags are restored verbatim.
    pub fn unmake(&mut self, mv: Move, undo: Undo, saved: Flags) {
        let side = saved.side_to_move();
        let from_bb = bb(mv.from());
        let to_bb = bb(mv.to());

        if let Some(promo) = mv.promotion_piece() {
            self.toggle_kind(promo, to_bb);
            self.pawns_knights ^= from_bb;
        } else {
            let kind = self.kind_on(to_bb);
            self.toggle_kind(kind, from_bb | to_bb);
            if mv.is_castle() {
                let wing = if mv.is_castle_kingside() {
                    Wing::Kingside
                } else {
                    Wing::Queenside
                };
                let (rook_from, rook_to) = rook_castle_squares(side, wing);
                let rook_bb = bb(rook_from) | bb(rook_to);
                *self.pieces_mut(side) ^= rook_bb;
                self.rooks_queens ^= rook_bb;
            }
        }
        *self.pieces_mut(side) ^= from_bb | to_bb;

        if mv.is_en_passant() {
            let victim_bb = bb(Self::ep_victim_square(mv));
            *self.pieces_mut(side.other()) ^= victim_bb;
            self.pawns_knights ^= victim_bb;
        } else if let Some(victim) = undo.captured {
            *self.pieces_mut(side.other()) ^= to_bb;
            self.toggle_kind(victim, to_bb);
        }

        self.flags = saved;
    }

    /// Squares the piece pinned at `pinned_sq` may still move to while
    /// keeping its king covered: along the ray toward the pinner,
    /// including a capture of the pinner.
    pub fn pin_ray(&self, color: Color, pinner_sq: u8) -> u64 {
        between(self.king_square(color), pinner_sq) | bb(pinner_sq)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("white", &format_args!("{:#018x}", self.white))
            .field("black", &format_args!("{:#018x}", self.black))
            .field("pawns_knights", &format_args!("{:#018x}", self.pawns_knights))
            .field("knights_kings", &format_args!("{:#018x}", self.knights_kings))
            .field("rooks_queens", &format_args!("{:#018x}", self.rooks_queens))
            .field("queens_bishops", &format_args!("{:#018x}", self.queens_bishops))
            .field("flags", &self.flags)
            .finish()
    }
}

/// Validation failures from [`PositionBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Two placements named the same square.
    DoubleOccupancy { square: u8 },
    /// A color does not have exactly one king.
    KingCount { color: Color, count: u32 },
    /// A castling right was granted without king and rook on their home
    /// squares.
    CastlingRight { color: Color, wing: Wing },
    /// The en-passant target square does not fit the side to move and the
    /// pawn placement.
    EnPassantTarget { square: u8 },
    /// The assembled board failed the overlay invariants.
    Inconsistent,
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            BoardError::DoubleOccupancy { square } => {
                write!(f, "square {square} is placed twice")
            }
            BoardError::KingCount { color, count } => {
                write!(f, "{color:?} has {count} kings, expected exactly one")
            }
            BoardError::CastlingRight { color, wing } => write!(
                f,
                "{color:?} {wing:?} castling right granted without king and rook at home"
            ),
            BoardError::EnPassantTarget { square } => {
                write!(f, "en-passant target {square} does not match the position")
            }
            BoardError::Inconsistent => write!(f, "assembled board violates its invariants"),
        }
    }
}

impl std::error::Error for BoardError {}

/// Incremental board construction for notation front ends (the FEN layer
/// lives outside this crate and drives this interface).
///
/// Placements are applied in order; castling rights must be requested
/// explicitly and are validated against actual king and rook placement;
/// en-passant state is given as the skipped target square and the file
/// masks are derived from the pawns actually on the board.
pub struct PositionBuilder {
    placements: Vec<(Color, PieceKind, u8)>,
    side: Color,
    rights: [(Color, Wing, bool); 4],
    ep_target: Option<u8>,
    halfmove_clock: u8,
}

impl PositionBuilder {
    pub fn new() -> PositionBuilder {
        PositionBuilder {
            placements: Vec::new(),
            side: Color::White,
            rights: [
                (Color::White, Wing::Kingside, false),
                (Color::White, Wing::Queenside, false),
                (Color::Black, Wing::Kingside, false),
                (Color::Black, Wing::Queenside, false),
            ],
            ep_target: None,
            halfmove_clock: 0,
        }
    }

    pub fn place(&mut self, color: Color, kind: PieceKind, square: u8) -> &mut Self {
        self.placements.push((color, kind, square));
        self
    }

    pub fn side_to_move(&mut self, color: Color) -> &mut Self {
        self.side = color;
        self
    }

    pub fn castling(&mut self, color: Color, wing: Wing, allowed: bool) -> &mut Self {
        for entry in &mut self.rights {
            if entry.0 == color && entry.1 == wing {
                entry.2 = allowed;
            }
        }
        self
    }

    /// The square skipped by the last double push (the capture
    /// destination), or clears en-passant state when `None`.
    pub fn en_passant_target(&mut self, square: Option<u8>) -> &mut Self {
        self.ep_target = square;
        self
    }

    pub fn halfmove_clock(&mut self, clock: u8) -> &mut Self {
        self.halfmove_clock = clock;
        self
    }

    pub fn build(&self) -> Result<Board, BoardError> {
        let mut board = Board::empty();

        for &(color, kind, square) in &self.placements {
            let sq_bb = bb(square);
            if board.occupied() & sq_bb != 0 {
                return Err(BoardError::DoubleOccupancy { square });
            }
            *board.pieces_mut(color) |= sq_bb;
            board.toggle_kind(kind, sq_bb);
        }

        for color in [Color::White, Color::Black] {
            let count = (board.kings() & board.pieces(color)).count_ones();
            if count != 1 {
                return Err(BoardError::KingCount { color, count });
            }
        }

        let mut flags = Flags::new();
        flags.set_side_to_move(self.side);
        flags.set_halfmove_clock(self.halfmove_clock);
        for &(color, wing, allowed) in &self.rights {
            if allowed {
                let king_at_home = board.kings() & board.pieces(color) & bb(king_home(color)) != 0;
                let rook_at_home =
                    board.rooks() & board.pieces(color) & bb(rook_home(color, wing)) != 0;
                if !king_at_home || !rook_at_home {
                    return Err(BoardError::CastlingRight { color, wing });
                }
            } else {
                flags.set_rook_moved(color, wing);
            }
        }

        if let Some(target) = self.ep_target {
            // The capturable pawn sits one push behind the target from
            // the mover's point of view.
            let (expected_rank, victim_sq) = match self.side {
                Color::White => (5u8, target.wrapping_sub(8)),
                Color::Black => (2u8, target + 8),
            };
            let enemy_pawns = board.pawns() & board.pieces(self.side.other());
            if rank_of(target) != expected_rank
                || board.occupied() & bb(target) != 0
                || enemy_pawns & bb(victim_sq) == 0
            {
                return Err(BoardError::EnPassantTarget { square: target });
            }
            let own_pawns = board.pawns() & board.pieces(self.side);
            let file = file_of(victim_sq);
            let mut capturers = 0u8;
            if file > 0 && own_pawns & bb(victim_sq - 1) != 0 {
                capturers |= 1 << (file - 1);
            }
            if file < 7 && own_pawns & bb(victim_sq + 1) != 0 {
                capturers |= 1 << (file + 1);
            }
            // Jointly zero or jointly set: without an actual capturer the
            // en-passant state is dropped entirely.
            if capturers != 0 {
                flags.set_ep(capturers, 1 << file);
            }
        }

        board.flags = flags;
        if !board.is_consistent() {
            return Err(BoardError::Inconsistent);
        }
        Ok(board)
    }
}

impl Default for PositionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
