use crate::castling::CastlingRights;
use crate::piece::Piece;
use crate::r#move::Move;
use crate::square::Square;
use crate::zob_hash::Hash;

/// Everything `Position::apply` overwrites, so that `Position::undo` can put it back
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub move_played: Move,
    pub moved_piece: Piece,
    /// Captured piece and the square it stood on, which differs from the
    /// destination on en passant
    pub captured: Option<(Piece, Square)>,
    pub en_passant_target: Option<Square>,
    pub castling_rights: CastlingRights,
    pub halfmove_clock: u32,
    pub full_move_counter: u32,
    pub hash_full: Hash,
    pub hash_pawn_king: Hash,
}
