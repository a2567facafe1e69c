use crate::{evaluation::Score, r#move::Move, zob_hash::Hash};

/// Entries know the full hash of the position they were computed for,
/// which is what tells a hit from a slot collision
pub trait Keyed {
    fn key(&self) -> Hash;
}

/// Fixed size, always-replace table indexed by the low bits of a Zobrist hash
#[derive(Debug, Clone)]
pub struct HashTable<T: Copy + Keyed>(Vec<Option<T>>);

impl<T: Copy + Keyed> HashTable<T> {
    /// Creating a hashtable already allocates every single slot
    pub fn new(capacity: usize) -> Self {
        HashTable(vec![None; capacity.max(1)])
    }

    pub fn get(&self, hash: Hash) -> Option<T> {
        self.0[self.key_from_hash(hash)].filter(|entry| entry.key() == hash)
    }

    pub fn put(&mut self, entry: T) {
        let index = self.key_from_hash(entry.key());
        self.0[index] = Some(entry);
    }

    pub fn key_from_hash(&self, hash: Hash) -> usize {
        ((hash & 0x7fff_ffff) % self.0.len() as u64) as usize
    }

    pub fn capacity(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.iter_mut().for_each(|slot| *slot = None)
    }

    /// Number of slots currently holding an entry
    pub fn occupied(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }
}

/// How a stored score relates to the true value of the position
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Exact score
    Pv,
    /// Failed high, the score is a lower bound
    Cut,
    /// Failed low, the score is an upper bound
    All,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TranspositionEntry {
    pub depth: u8,
    pub hash: Hash,
    pub score: Score,
    pub best_move: Option<Move>,
    pub kind: NodeKind,
}
impl Keyed for TranspositionEntry {
    fn key(&self) -> Hash {
        self.hash
    }
}

#[derive(Debug, Clone)]
pub struct TranspositionTable(HashTable<TranspositionEntry>);

impl TranspositionTable {
    pub const DEFAULT_CAPACITY: usize = 1 << 20;

    pub fn new(capacity: usize) -> Self {
        TranspositionTable(HashTable::new(capacity))
    }

    pub fn get(&self, hash: Hash) -> Option<TranspositionEntry> {
        self.0.get(hash)
    }

    pub fn put(&mut self, entry: TranspositionEntry) {
        self.0.put(entry)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn occupied(&self) -> usize {
        self.0.occupied()
    }
}
impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: Hash, score: Score) -> TranspositionEntry {
        TranspositionEntry {
            depth: 3,
            hash,
            score,
            best_move: Some(Move::new_quiet(12, 28)),
            kind: NodeKind::Pv,
        }
    }

    #[test]
    fn lookups_need_the_exact_hash() {
        let mut table = TranspositionTable::new(16);
        table.put(entry(5, 42));
        assert_eq!(table.get(5).map(|e| e.score), Some(42));
        // same slot, other position
        assert_eq!(table.get(21), None);
        table.put(entry(21, -7));
        assert_eq!(table.get(5), None);
        assert_eq!(table.get(21).map(|e| e.score), Some(-7));
        // bits above 31 are ignored by the index
        assert_eq!(table.0.key_from_hash(0xffff_0000_0000_0005), 5);
        table.clear();
        assert_eq!(table.get(21), None);
        assert_eq!(table.occupied(), 0);
    }

    #[test]
    fn capacity_is_at_least_one() {
        let mut table = TranspositionTable::new(0);
        assert_eq!(table.capacity(), 1);
        table.put(entry(99, 1));
        assert!(table.get(99).is_some());
    }
}
