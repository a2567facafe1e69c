use crate::castling::CastlingRights;
use crate::piece::{Color, Piece, PieceType};
use crate::square::{file_of, Square};
use rand_mt::Mt64;

pub type Hash = u64;

/// Random keys for every (side, kind, square) triple.
///
/// Keys for en passant, side to move and castling rights are borrowed from
/// pawn placements that can never occur (pawns on the first or last rank),
/// so no extra table is needed for them.
#[derive(Debug, Clone)]
pub struct ZobristHasher {
    keys: [[[Hash; 64]; 6]; 2],
}

impl ZobristHasher {
    pub fn new(seed: u64) -> ZobristHasher {
        let mut rng = Mt64::new(seed);
        let mut keys = [[[0; 64]; 6]; 2];
        for side in keys.iter_mut() {
            for kind in side.iter_mut() {
                for key in kind.iter_mut() {
                    *key = rng.next_u64();
                }
            }
        }
        ZobristHasher { keys }
    }

    #[inline(always)]
    pub fn key(&self, side: Color, kind: PieceType, sq: Square) -> Hash {
        self.keys[side as usize][kind as usize][sq]
    }
    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> Hash {
        self.key(piece.color, piece.piece_type, sq)
    }

    /// Key of an en passant target, which only depends on its file
    pub fn en_passant_key(&self, target: Square) -> Hash {
        self.key(Color::White, PieceType::Pawn, file_of(target))
    }
    /// Key XORed in while black is to move
    pub fn turn_key(&self) -> Hash {
        self.key(Color::White, PieceType::Pawn, 56)
    }
    pub fn castling_key(&self, rights: CastlingRights) -> Hash {
        self.key(Color::Black, PieceType::Pawn, rights.key_index())
    }

    /// XOR moving a piece of the given kind from `a` to `b`
    pub fn move_delta(&self, side: Color, kind: PieceType, a: Square, b: Square) -> Hash {
        self.key(side, kind, a) ^ self.key(side, kind, b)
    }
    pub fn castling_delta(&self, old: CastlingRights, new: CastlingRights) -> Hash {
        self.castling_key(old) ^ self.castling_key(new)
    }
    pub fn en_passant_delta(&self, old: Option<Square>, new: Option<Square>) -> Hash {
        old.map_or(0, |sq| self.en_passant_key(sq)) ^ new.map_or(0, |sq| self.en_passant_key(sq))
    }
}

impl Default for ZobristHasher {
    fn default() -> Self {
        Self::new(0)
    }
}
