use crate::bitboard::Bitboard;
use crate::piece::{Color, PieceType};
use crate::position::Position;
use crate::square::{file_of, rank_of};
use crate::transposition_table::{HashTable, Keyed};
use crate::zob_hash::Hash;
use log::trace;

/// Pawn structure flaws and assets of one side
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct PawnStructure {
    pub doubled: u32,
    pub isolated: u32,
    pub passed: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PawnKingEntry {
    pub hash: Hash,
    /// Indexed by `Color`
    pub structure: [PawnStructure; 2],
}
impl PawnKingEntry {
    pub fn of(&self, side: Color) -> PawnStructure {
        self.structure[side as usize]
    }
}
impl Keyed for PawnKingEntry {
    fn key(&self) -> Hash {
        self.hash
    }
}

/// Memoizes pawn structure analysis, keyed by the pawn and king hash
pub struct PawnKingCache {
    table: HashTable<PawnKingEntry>,
    /// Same and adjacent files, strictly ahead of the square
    passed_masks: [[Bitboard; 64]; 2],
    hits: u64,
    misses: u64,
}

impl PawnKingCache {
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    pub fn new(capacity: usize) -> PawnKingCache {
        let mut passed_masks = [[Bitboard::EMPTY; 64]; 2];
        for sq in 0..64 {
            let file = file_of(sq);
            let corridor = Bitboard::FILES[file] | Bitboard::adjacent_files(file);
            let mut white_ahead = Bitboard::EMPTY;
            for rank in rank_of(sq) + 1..8 {
                white_ahead |= Bitboard::RANKS[rank];
            }
            let mut black_ahead = Bitboard::EMPTY;
            for rank in 0..rank_of(sq) {
                black_ahead |= Bitboard::RANKS[rank];
            }
            passed_masks[Color::White as usize][sq] = corridor & white_ahead;
            passed_masks[Color::Black as usize][sq] = corridor & black_ahead;
        }
        PawnKingCache {
            table: HashTable::new(capacity),
            passed_masks,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached entry for the position, computing and storing it on a miss
    pub fn get(&mut self, pos: &Position) -> PawnKingEntry {
        let hash = pos.hash_pawn_king();
        if let Some(entry) = self.table.get(hash) {
            self.hits += 1;
            return entry;
        }
        self.misses += 1;
        let entry = PawnKingEntry {
            hash,
            structure: [self.analyze(pos, Color::Black), self.analyze(pos, Color::White)],
        };
        self.table.put(entry);
        entry
    }

    fn analyze(&self, pos: &Position, side: Color) -> PawnStructure {
        let own = pos.pieces(side, PieceType::Pawn);
        let enemy = pos.pieces(side.opposite(), PieceType::Pawn);
        let mut structure = PawnStructure::default();
        for file in Bitboard::FILES {
            structure.doubled += (own & file).pop_count().saturating_sub(1);
        }
        for sq in own {
            if !Bitboard::adjacent_files(file_of(sq)).intersects(own) {
                structure.isolated += 1;
            }
            if !self.passed_masks[side as usize][sq].intersects(enemy) {
                structure.passed += 1;
            }
        }
        structure
    }

    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn log_stats(&self) {
        trace!(
            "pawn cache: {} hits, {} misses, {}/{} slots used",
            self.hits,
            self.misses,
            self.table.occupied(),
            self.table.capacity()
        );
    }
}

impl Default for PawnKingCache {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
