use crate::bitboard::Bitboard;
use crate::castling::{CastlingRights, Wing};
use crate::history::HistoryEntry;
use crate::move_generator::MoveGenerator;
use crate::movelist::MoveList;
use crate::notation;
use crate::piece::Color::{Black, White};
use crate::piece::PieceType::{King, Pawn, Queen, Rook};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::Move;
use crate::square::{parse_square, rank_of, square_representation, Square};
use crate::zob_hash::{Hash, ZobristHasher};
use log::warn;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected at least 4 fields in FEN record, found {0}")]
    FieldCount(usize),
    #[error("unknown piece letter '{0}'")]
    PieceLetter(char),
    #[error("malformed rank layout '{0}'")]
    RankLayout(String),
    #[error("side to move must be 'w' or 'b', found '{0}'")]
    Side(String),
    #[error("invalid castling field '{0}'")]
    Castling(String),
    #[error("invalid en passant square '{0}'")]
    Square(String),
    #[error("invalid move counter '{0}'")]
    Number(String),
}

/// Square a rook of `side` starts on for `wing`
pub fn rook_home(side: Color, wing: Wing) -> Square {
    8 * side.home_rank() + wing.rook_file()
}
/// Square a king of `side` starts on
pub fn king_home(side: Color) -> Square {
    8 * side.home_rank() + 4
}

/// A chess position along with the undo stack of the moves applied to it.
///
/// Piece sets are stored per side and per kind, with a mailbox mirroring them.
/// Both Zobrist hashes are maintained incrementally by `apply` and restored
/// verbatim by `undo`.
#[derive(Clone)]
pub struct Position {
    pieces: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 2],
    mailbox: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    en_passant_target: Option<Square>,
    halfmove_clock: u32,
    full_move_counter: u32,

    history: Vec<HistoryEntry>,
    hash_full: Hash,
    hash_pawn_king: Hash,

    hasher: Arc<ZobristHasher>,
    generator: Arc<MoveGenerator>,
}

impl Position {
    fn empty(hasher: Arc<ZobristHasher>, generator: Arc<MoveGenerator>) -> Position {
        Position {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupancy: [Bitboard::EMPTY; 2],
            mailbox: [None; 64],
            side_to_move: White,
            castling_rights: CastlingRights::NONE,
            en_passant_target: None,
            halfmove_clock: 0,
            full_move_counter: 1,

            history: Vec::with_capacity(128),
            hash_full: 0,
            hash_pawn_king: 0,

            hasher,
            generator,
        }
    }

    /// The initial position, sharing the given services
    pub fn new(hasher: Arc<ZobristHasher>, generator: Arc<MoveGenerator>) -> Position {
        let mut pos = Position::empty(hasher, generator);
        let back_rank = [
            Rook,
            PieceType::Knight,
            PieceType::Bishop,
            Queen,
            King,
            PieceType::Bishop,
            PieceType::Knight,
            Rook,
        ];
        for (file, kind) in back_rank.iter().enumerate() {
            pos.place(Piece::new(*kind, White), file);
            pos.place(Piece::new(Pawn, White), 8 + file);
            pos.place(Piece::new(Pawn, Black), 48 + file);
            pos.place(Piece::new(*kind, Black), 56 + file);
        }
        pos.castling_rights = CastlingRights::ALL;
        pos.refresh_hashes();
        pos
    }

    /// Reads a FEN record, sharing the given services.
    /// The halfmove and fullmove fields may be omitted and default to `0 1`.
    pub fn from_fen_with(
        fen: &str,
        hasher: Arc<ZobristHasher>,
        generator: Arc<MoveGenerator>,
    ) -> Result<Position, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 || fields.len() > 6 {
            return Err(FenError::FieldCount(fields.len()));
        }
        let mut pos = Position::empty(hasher, generator);

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::RankLayout(fields[0].to_owned()));
        }
        for (i, rank) in ranks.iter().enumerate() {
            let rank_start = 8 * (7 - i);
            let mut file = 0;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if !(1..=8).contains(&skip) {
                        return Err(FenError::RankLayout((*rank).to_owned()));
                    }
                    file += skip as usize;
                } else {
                    if file >= 8 {
                        return Err(FenError::RankLayout((*rank).to_owned()));
                    }
                    let piece = Piece::from_char(c).ok_or(FenError::PieceLetter(c))?;
                    pos.place(piece, rank_start + file);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(FenError::RankLayout((*rank).to_owned()));
            }
        }

        pos.side_to_move = match fields[1] {
            "w" => White,
            "b" => Black,
            other => return Err(FenError::Side(other.to_owned())),
        };
        pos.castling_rights =
            CastlingRights::parse(fields[2]).ok_or_else(|| FenError::Castling(fields[2].to_owned()))?;
        pos.en_passant_target = match fields[3] {
            "-" => None,
            s if s.len() == 2 => {
                Some(parse_square(s).ok_or_else(|| FenError::Square(s.to_owned()))?)
            }
            s => return Err(FenError::Square(s.to_owned())),
        };
        let number = |field: Option<&&str>, default: u32| match field {
            None => Ok(default),
            Some(s) => s.parse::<u32>().map_err(|_| FenError::Number((*s).to_owned())),
        };
        pos.halfmove_clock = number(fields.get(4), 0)?;
        pos.full_move_counter = number(fields.get(5), 1)?.max(1);

        pos.refresh_hashes();
        Ok(pos)
    }

    /// Reads a FEN record with freshly built services
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        Self::from_fen_with(fen, Arc::default(), Arc::new(MoveGenerator::new()))
    }

    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut repr = String::new();
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.mailbox[rank * 8 + file] {
                    Some(p) => {
                        if empty_counter != 0 {
                            repr.push_str(&empty_counter.to_string());
                            empty_counter = 0;
                        }
                        repr.push_str(&p.to_string())
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                repr.push_str(&empty_counter.to_string());
            }
            ranks.push(repr);
        }
        format!(
            "{} {} {} {} {} {}",
            ranks.join("/"),
            self.side_to_move,
            self.castling_rights,
            self.en_passant_target
                .and_then(square_representation)
                .unwrap_or_else(|| String::from("-")),
            self.halfmove_clock,
            self.full_move_counter
        )
    }

    /// Plays a pseudo-legal move for the side to move, recording what is
    /// needed to take it back
    pub fn apply(&mut self, mv: Move) {
        let source = mv.source();
        let destination = mv.destination();
        let moved = match self.mailbox[source] {
            Some(p) => p,
            None => {
                warn!("ignoring move {} from an empty square", mv);
                return;
            }
        };
        let mover = self.side_to_move;
        let rights_before = self.castling_rights;
        let mut entry = HistoryEntry {
            move_played: mv,
            moved_piece: moved,
            captured: None,
            en_passant_target: self.en_passant_target,
            castling_rights: self.castling_rights,
            halfmove_clock: self.halfmove_clock,
            full_move_counter: self.full_move_counter,
            hash_full: self.hash_full,
            hash_pawn_king: self.hash_pawn_king,
        };

        if let Some(victim) = self.mailbox[destination] {
            if victim.piece_type == Rook && victim.color != mover {
                for wing in Wing::BOTH {
                    if destination == rook_home(victim.color, wing) {
                        self.castling_rights.revoke(victim.color, wing);
                    }
                }
            }
            self.remove_piece(destination);
            entry.captured = Some((victim, destination));
        }

        self.clear(source);
        self.place(moved, destination);
        let delta = self.hasher.move_delta(mover, moved.piece_type, source, destination);
        self.hash_full ^= delta;
        if matches!(moved.piece_type, Pawn | King) {
            self.hash_pawn_king ^= delta;
        }

        if moved.piece_type == Pawn && Some(destination) == self.en_passant_target {
            let victim_square = if mover == White {
                destination - 8
            } else {
                destination + 8
            };
            if let Some(victim) = self.remove_piece(victim_square) {
                entry.captured = Some((victim, victim_square));
            }
        }

        let new_target = if moved.piece_type == Pawn && source.abs_diff(destination) == 16 {
            Some((source + destination) / 2)
        } else {
            None
        };
        let delta = self.hasher.en_passant_delta(self.en_passant_target, new_target);
        self.hash_full ^= delta;
        self.hash_pawn_king ^= delta;
        self.en_passant_target = new_target;

        if moved.piece_type == King {
            self.castling_rights.revoke_all(mover);
            if source.abs_diff(destination) == 2 {
                let (rook_from, rook_to) = Self::castling_rook_squares(source, destination);
                if let Some(rook) = self.remove_piece(rook_from) {
                    self.add_piece(rook, rook_to);
                }
            }
        } else if moved.piece_type == Pawn && rank_of(destination) == mover.opposite().home_rank() {
            let promoted = Piece::new(mv.promotion().unwrap_or(Queen), mover);
            self.remove_piece(destination);
            self.add_piece(promoted, destination);
        } else if moved.piece_type == Rook {
            for wing in Wing::BOTH {
                if source == rook_home(mover, wing) {
                    self.castling_rights.revoke(mover, wing);
                }
            }
        }
        if self.castling_rights != rights_before {
            self.hash_full ^= self.hasher.castling_delta(rights_before, self.castling_rights);
        }

        if moved.piece_type == Pawn || entry.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if mover == Black {
            self.full_move_counter += 1;
        }
        self.side_to_move = mover.opposite();
        self.hash_full ^= self.hasher.turn_key();

        self.history.push(entry);
    }

    /// Takes back the last applied move, if any
    pub fn undo(&mut self) {
        let entry = match self.history.pop() {
            Some(e) => e,
            None => return,
        };
        let source = entry.move_played.source();
        let destination = entry.move_played.destination();

        self.clear(destination);
        self.place(entry.moved_piece, source);
        if entry.moved_piece.piece_type == King && source.abs_diff(destination) == 2 {
            let (rook_from, rook_to) = Self::castling_rook_squares(source, destination);
            if let Some(rook) = self.clear(rook_to) {
                self.place(rook, rook_from);
            }
        }
        if let Some((victim, sq)) = entry.captured {
            self.place(victim, sq);
        }

        self.side_to_move = self.side_to_move.opposite();
        self.en_passant_target = entry.en_passant_target;
        self.castling_rights = entry.castling_rights;
        self.halfmove_clock = entry.halfmove_clock;
        self.full_move_counter = entry.full_move_counter;
        self.hash_full = entry.hash_full;
        self.hash_pawn_king = entry.hash_pawn_king;
    }

    fn castling_rook_squares(king_from: Square, king_to: Square) -> (Square, Square) {
        if king_to > king_from {
            (king_from + 3, king_from + 1)
        } else {
            (king_from - 4, king_from - 1)
        }
    }

    /// Places a piece on an empty square, updating both hashes
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.place(piece, sq);
        let key = self.hasher.piece_key(piece, sq);
        self.hash_full ^= key;
        if matches!(piece.piece_type, Pawn | King) {
            self.hash_pawn_king ^= key;
        }
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.clear(sq)?;
        let key = self.hasher.piece_key(removed, sq);
        self.hash_full ^= key;
        if matches!(removed.piece_type, Pawn | King) {
            self.hash_pawn_king ^= key;
        }
        Some(removed)
    }

    // Raw board edits, hashes are left alone
    fn place(&mut self, piece: Piece, sq: Square) {
        self.mailbox[sq] = Some(piece);
        self.pieces[piece.color as usize][piece.piece_type as usize].set(sq);
        self.occupancy[piece.color as usize].set(sq);
    }
    fn clear(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.mailbox[sq].take()?;
        self.pieces[removed.color as usize][removed.piece_type as usize].unset(sq);
        self.occupancy[removed.color as usize].unset(sq);
        Some(removed)
    }

    fn refresh_hashes(&mut self) {
        self.hash_full = self.cold_hash_full();
        self.hash_pawn_king = self.cold_hash_pawn_king();
    }

    /// Full hash recomputed from scratch
    pub fn cold_hash_full(&self) -> Hash {
        let mut hash = 0;
        for (sq, piece) in self.mailbox.iter().enumerate() {
            if let Some(p) = piece {
                hash ^= self.hasher.piece_key(*p, sq);
            }
        }
        if let Some(target) = self.en_passant_target {
            hash ^= self.hasher.en_passant_key(target);
        }
        hash ^= self.hasher.castling_key(self.castling_rights);
        if self.side_to_move == Black {
            hash ^= self.hasher.turn_key();
        }
        hash
    }

    /// Pawn and king hash recomputed from scratch
    pub fn cold_hash_pawn_king(&self) -> Hash {
        let mut hash = 0;
        for side in Color::BOTH {
            for kind in [Pawn, King] {
                for sq in self.pieces(side, kind) {
                    hash ^= self.hasher.key(side, kind, sq);
                }
            }
        }
        if let Some(target) = self.en_passant_target {
            hash ^= self.hasher.en_passant_key(target);
        }
        hash
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }
    pub fn full_move_counter(&self) -> u32 {
        self.full_move_counter
    }
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }
    pub fn hash(&self) -> Hash {
        self.hash_full
    }
    pub fn hash_pawn_king(&self) -> Hash {
        self.hash_pawn_king
    }
    /// Last move applied and not yet taken back
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|e| e.move_played)
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq]
    }
    pub fn pieces(&self, side: Color, kind: PieceType) -> Bitboard {
        self.pieces[side as usize][kind as usize]
    }
    pub fn occupancy(&self, side: Color) -> Bitboard {
        self.occupancy[side as usize]
    }
    pub fn all_occupancy(&self) -> Bitboard {
        self.occupancy[0] | self.occupancy[1]
    }
    pub fn king_square(&self, side: Color) -> Option<Square> {
        self.pieces(side, King).ls1b()
    }
    pub fn bishop_sliders(&self, side: Color) -> Bitboard {
        self.pieces(side, PieceType::Bishop) | self.pieces(side, Queen)
    }
    pub fn rook_sliders(&self, side: Color) -> Bitboard {
        self.pieces(side, Rook) | self.pieces(side, Queen)
    }

    /// Whether the side to move is in check
    pub fn in_check(&self) -> bool {
        self.generator.in_check(self, self.side_to_move)
    }
    pub fn is_side_in_check(&self, side: Color) -> bool {
        self.generator.in_check(self, side)
    }
    pub fn pseudo_legal_moves(&self, captures_only: bool) -> MoveList {
        self.generator.pseudo_legal_moves(self, captures_only)
    }
    pub fn legal_moves(&self) -> MoveList {
        self.generator.legal_moves(self)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new(Arc::default(), Arc::new(MoveGenerator::new()))
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl std::fmt::Debug for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash_full))
            .finish()
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let legal_moves = self.legal_moves();
        let san: Vec<String> = legal_moves
            .iter()
            .map(|m| notation::to_san(self, *m))
            .collect();
        let side_info = [
            String::new(),
            format!("side to move: {}", self.side_to_move),
            format!("castling rights: {}", self.castling_rights),
            format!(
                "en passant: {}",
                self.en_passant_target
                    .and_then(square_representation)
                    .unwrap_or_else(|| String::from("-"))
            ),
            format!("full moves: {}", self.full_move_counter),
            format!("hash: {:#018x}", self.hash_full),
            format!("fen: {}", self.to_fen()),
            String::new(),
        ];
        for (rank, info) in (0..8).rev().zip(side_info.iter()) {
            for file in 0..8 {
                match self.mailbox[rank * 8 + file] {
                    None => write!(f, ". ")?,
                    Some(p) => write!(f, "{} ", p)?,
                }
            }
            writeln!(f, " {}", info)?;
        }
        write!(f, "legal moves ({}): {}", san.len(), san.join(" "))?;
        if self.in_check() {
            write!(f, "\nCheck!")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notation::from_long_algebraic;

    fn play(pos: &mut Position, moves: &[&str]) {
        for m in moves {
            let mv = from_long_algebraic(pos, m).unwrap();
            pos.apply(mv);
            assert_eq!(pos.hash(), pos.cold_hash_full(), "full hash drifted after {}", m);
            assert_eq!(pos.hash_pawn_king(), pos.cold_hash_pawn_king(), "pawn hash drifted after {}", m);
        }
    }

    #[test]
    fn fen_round_trip() {
        for fen in [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 7 41",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
        let short = Position::from_fen("8/8/8/8/8/7k/q7/7K w - -").unwrap();
        assert_eq!(short.to_fen(), "8/8/8/8/8/7k/q7/7K w - - 0 1");
        assert_eq!(Position::default().to_fen(), START_FEN);
    }

    #[test]
    fn malformed_fen_is_rejected() {
        assert_eq!(Position::from_fen("8/8/8 w - -").unwrap_err(), FenError::RankLayout(String::from("8/8/8")));
        assert_eq!(Position::from_fen("8/8/8/8/8/8/8/8").unwrap_err(), FenError::FieldCount(1));
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/7x w - -").unwrap_err(),
            FenError::PieceLetter('x')
        );
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/45 w - -").unwrap_err(),
            FenError::RankLayout(String::from("45"))
        );
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 x - -").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w KZ -").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - z9").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - x 1").is_err());
    }

    #[test]
    fn hash_is_move_order_independent() {
        let mut a = Position::default();
        let mut b = Position::default();
        play(&mut a, &["b1c3", "g8f6", "a2a3"]);
        play(&mut b, &["a2a3", "g8f6", "b1c3"]);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash_pawn_king(), b.hash_pawn_king());

        let mut a = Position::default();
        let mut b = Position::default();
        play(&mut a, &["e2e4", "e7e5", "f1c4", "d8h4", "e1e2", "h4f6"]);
        play(
            &mut b,
            &["e2e4", "e7e5", "f1b5", "d8g5", "b5c4", "g5g6", "e1f1", "g6h6", "f1e2", "h6f6"],
        );
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash_pawn_king(), b.hash_pawn_king());

        let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 0 1";
        let mut a = Position::from_fen(fen).unwrap();
        let mut b = Position::from_fen(fen).unwrap();
        play(&mut a, &["a1a5", "e8d8", "a5h5", "d8e8"]);
        play(&mut b, &["a1a3", "e8f8", "a3h3", "f8f7", "h3h5", "f7e8"]);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn hash_is_capture_path_independent() {
        let mut a = Position::default();
        let mut b = Position::default();
        play(&mut a, &["e2e4", "d7d6", "e4e5", "a7a6", "e5d6"]);
        play(&mut b, &["e2e4", "d7d5", "e4d5", "a7a6", "d5d6"]);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash_pawn_king(), b.hash_pawn_king());
    }

    #[test]
    fn king_step_shifts_one_key_pair() {
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let pawn_king = pos.hash_pawn_king();
        play(&mut pos, &["a1a4"]);
        assert_eq!(pos.hash_pawn_king(), pawn_king);
        let full = pos.hash();
        let pawn_king = pos.hash_pawn_king();
        play(&mut pos, &["e8d7"]);
        let delta = pos.hasher.move_delta(Black, King, 60, 51);
        assert_eq!(pos.hash_pawn_king(), pawn_king ^ delta);
        assert_eq!(pos.hash(), full ^ delta ^ pos.hasher.turn_key());
    }

    #[test]
    fn castling_matches_walking_pieces() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let mut castled = Position::from_fen(fen).unwrap();
        play(&mut castled, &["e1g1", "e8c8"]);
        let mut walked = Position::from_fen(fen).unwrap();
        play(&mut walked, &["e1f2", "e8d7", "h1f1", "a8d8", "f2g1", "d7c8"]);
        assert_eq!(castled.to_fen().split(' ').next(), walked.to_fen().split(' ').next());
        assert_eq!(castled.castling_rights(), walked.castling_rights());
        assert_eq!(castled.hash(), walked.hash());
        assert_eq!(castled.piece_at(5), Some(Piece::new(Rook, White)));
        assert_eq!(castled.piece_at(59), Some(Piece::new(Rook, Black)));
    }

    #[test]
    fn undo_restores_everything() {
        let fen = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
        let original = Position::from_fen(fen).unwrap();
        let mut pos = original.clone();
        for mv in original.legal_moves() {
            pos.apply(mv);
            assert_eq!(pos.hash(), pos.cold_hash_full());
            assert_eq!(pos.hash_pawn_king(), pos.cold_hash_pawn_king());
            for reply in pos.pseudo_legal_moves(false) {
                pos.apply(reply);
                assert_eq!(pos.hash(), pos.cold_hash_full());
                pos.undo();
            }
            pos.undo();
            assert_eq!(pos.to_fen(), fen);
            assert_eq!(pos.hash(), original.hash());
            assert_eq!(pos.hash_pawn_king(), original.hash_pawn_king());
        }
    }

    #[test]
    fn en_passant_and_promotion() {
        let mut pos = Position::from_fen("4k3/1P6/8/8/4p3/8/3P4/4K3 w - - 0 1").unwrap();
        play(&mut pos, &["d2d4"]);
        assert_eq!(pos.en_passant_target(), Some(19));
        play(&mut pos, &["e4d3"]);
        assert_eq!(pos.piece_at(27), None);
        assert_eq!(pos.piece_at(19), Some(Piece::new(Pawn, Black)));
        assert_eq!(pos.en_passant_target(), None);
        play(&mut pos, &["b7b8n"]);
        assert_eq!(pos.piece_at(57), Some(Piece::new(PieceType::Knight, White)));
        pos.undo();
        assert_eq!(pos.piece_at(49), Some(Piece::new(Pawn, White)));
        pos.apply(Move::new_quiet(49, 57));
        assert_eq!(pos.piece_at(57), Some(Piece::new(Queen, White)));
    }

    #[test]
    fn castling_rights_only_shrink() {
        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        play(&mut pos, &["a1a8"]);
        assert_eq!(pos.castling_rights().to_string(), "Kk");
        play(&mut pos, &["e8e7"]);
        assert_eq!(pos.castling_rights().to_string(), "K");
        play(&mut pos, &["a8a1"]);
        assert_eq!(pos.castling_rights().to_string(), "K");
        play(&mut pos, &["h8h1"]);
        assert_eq!(pos.castling_rights().to_string(), "-");

        let mut pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1").unwrap();
        play(&mut pos, &["e8d8"]);
        assert_eq!(pos.castling_rights().to_string(), "KQ");
        play(&mut pos, &["h1h2"]);
        assert_eq!(pos.castling_rights().to_string(), "Q");
    }

    #[test]
    fn counters() {
        let mut pos = Position::default();
        play(&mut pos, &["e2e4", "e7e5", "d2d4", "d7d5", "a2a3"]);
        assert_eq!(pos.full_move_counter(), 3);
        assert_eq!(pos.halfmove_clock(), 0);
        play(&mut pos, &["g8f6", "g1f3"]);
        assert_eq!(pos.halfmove_clock(), 2);
        assert_eq!(pos.full_move_counter(), 4);
        pos.undo();
        assert_eq!(pos.halfmove_clock(), 1);
    }

    #[test]
    fn empty_source_is_ignored() {
        let mut pos = Position::default();
        let hash = pos.hash();
        pos.apply(Move::new_quiet(28, 36));
        assert_eq!(pos.hash(), hash);
        assert_eq!(pos.side_to_move(), White);
        assert_eq!(pos.last_move(), None);
    }

    #[test]
    fn board_dump_lists_moves() {
        let pos = Position::from_fen("rnbqrbnk/pppppppp/8/8/8/8/PPPPPPPP/RNBQRBqK w - - 0 1").unwrap();
        let dump = pos.to_string();
        assert!(dump.ends_with("Check!"));
        assert!(dump.contains("Kxg1"));
        assert!(Position::default().to_string().contains("legal moves (20)"));
    }
}
