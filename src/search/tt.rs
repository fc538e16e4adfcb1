//! Transposition tables for caching search results
//!
//! Two implementations share the [`TranspositionStore`] capability:
//! - [`TranspositionTable`]: single owner, direct-mapped
//! - [`SharedTranspositionTable`]: lock-free, shareable between concurrent
//!   searches through `Arc`
//!
//! Replacement keeps the deeper entry; on a depth tie the newer entry wins.
//! Entries two or more search generations old are always replaceable. The
//! table is a pure cache: losing an entry costs time, never correctness.
//!
//! # Example
//!
//! ```
//! use connect6::search::tt::{EntryType, TranspositionStore, TranspositionTable};
//!
//! let mut tt = TranspositionTable::new(4096);
//! tt.store(0xABCD, 4, 120, EntryType::Exact, None);
//! let entry = tt.probe(0xABCD).unwrap();
//! assert_eq!(entry.usable_score(4, -1000, 1000), Some(120));
//! assert_eq!(entry.usable_score(5, -1000, 1000), None);
//! ```

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use crate::board::{Move, Pos, TOTAL_CELLS};

/// Smallest table ever allocated
pub const MIN_CAPACITY: usize = 1024;

/// Largest table ever allocated (16M slots)
pub const MAX_CAPACITY: usize = 1 << 24;

/// Generations an entry may lag behind before it counts as stale
const STALE_AGE: u8 = 2;

/// Bound kind of a stored score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Exact score (PV node)
    Exact,
    /// Lower bound (fail-high / beta cutoff)
    LowerBound,
    /// Upper bound (fail-low / all node)
    UpperBound,
}

/// Cached search result for one position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTEntry {
    pub key: u64,
    pub depth: i8,
    pub score: i32,
    pub entry_type: EntryType,
    pub best_move: Option<Move>,
    pub generation: u8,
}

impl TTEntry {
    /// Score usable for a node searched to `depth` with window `[alpha, beta]`.
    ///
    /// Exact entries always apply; lower bounds only when they reach beta,
    /// upper bounds only when they stay at or below alpha.
    #[inline]
    #[must_use]
    pub fn usable_score(&self, depth: i8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        match self.entry_type {
            EntryType::Exact => Some(self.score),
            EntryType::LowerBound if self.score >= beta => Some(self.score),
            EntryType::UpperBound if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Table statistics; observational only.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TTStats {
    pub capacity: usize,
    pub used: usize,
    pub usage_percent: f64,
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

impl TTStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

/// Capability the search needs from a transposition table.
pub trait TranspositionStore {
    /// Entry for `key`, if present.
    fn probe(&mut self, key: u64) -> Option<TTEntry>;

    fn store(&mut self, key: u64, depth: i8, score: i32, entry_type: EntryType, best_move: Option<Move>);

    /// Advance the generation; called once per search.
    fn new_search(&mut self);

    /// Drop every entry and reset the generation (new game).
    fn clear(&mut self);

    fn stats(&self) -> TTStats;
}

#[inline]
fn is_stale(entry_generation: u8, current: u8) -> bool {
    current.wrapping_sub(entry_generation) >= STALE_AGE
}

/// Replacement policy shared by both tables.
#[inline]
fn should_replace(old: &TTEntry, key: u64, depth: i8, entry_type: EntryType, current: u8) -> bool {
    if is_stale(old.generation, current) || depth >= old.depth {
        return true;
    }
    old.key == key && entry_type == EntryType::Exact && old.entry_type != EntryType::Exact
}

#[inline]
fn slot_index(key: u64, capacity: usize) -> usize {
    (key % capacity as u64) as usize
}

// =============================================================================
// Single-owner table
// =============================================================================

/// Direct-mapped table with a fixed number of entries.
pub struct TranspositionTable {
    table: Vec<Option<TTEntry>>,
    used: usize,
    generation: u8,
    probes: u64,
    hits: u64,
    stores: u64,
}

impl TranspositionTable {
    /// Create a table holding `capacity` entries, clamped to
    /// [`MIN_CAPACITY`]..=[`MAX_CAPACITY`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            table: vec![None; capacity],
            used: 0,
            generation: 0,
            probes: 0,
            hits: 0,
            stores: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.len()
    }

    #[inline]
    pub fn generation(&self) -> u8 {
        self.generation
    }
}

impl TranspositionStore for TranspositionTable {
    #[inline]
    fn probe(&mut self, key: u64) -> Option<TTEntry> {
        self.probes += 1;
        let entry = self.table[slot_index(key, self.table.len())].filter(|e| e.key == key);
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    fn store(&mut self, key: u64, depth: i8, score: i32, entry_type: EntryType, best_move: Option<Move>) {
        let idx = slot_index(key, self.table.len());
        let generation = self.generation;
        let slot = &mut self.table[idx];

        let replace = match slot {
            None => {
                self.used += 1;
                true
            }
            Some(old) => should_replace(old, key, depth, entry_type, generation),
        };
        if replace {
            *slot = Some(TTEntry { key, depth, score, entry_type, best_move, generation });
            self.stores += 1;
        }
    }

    fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn clear(&mut self) {
        self.table.fill(None);
        self.used = 0;
        self.generation = 0;
        self.probes = 0;
        self.hits = 0;
        self.stores = 0;
    }

    fn stats(&self) -> TTStats {
        let capacity = self.table.len();
        TTStats {
            capacity,
            used: self.used,
            usage_percent: self.used as f64 / capacity as f64 * 100.0,
            probes: self.probes,
            hits: self.hits,
            stores: self.stores,
        }
    }
}

// =============================================================================
// Lock-free shared table
// =============================================================================

const NO_CELL: u64 = 0x1FF;

/// Pack an entry's payload into a u64.
///
/// Layout (61 bits used):
/// ```text
/// bits [0..7]   depth (i8 + 128)                      8 bits
/// bits [8..32]  score (i32 + 2^24)                   25 bits
/// bits [33..34] entry_type (0=Exact,1=LB,2=UB)        2 bits
/// bits [35..42] generation                            8 bits
/// bits [43..51] first stone cell (0x1FF = no move)    9 bits
/// bits [52..60] second stone cell (0x1FF = single)    9 bits
/// ```
fn pack_entry(depth: i8, score: i32, entry_type: EntryType, best_move: Option<Move>, generation: u8) -> u64 {
    let d = (i16::from(depth) + 128) as u64 & 0xFF;
    let clamped = score.clamp(-(1 << 24) + 1, (1 << 24) - 1);
    let s = (i64::from(clamped) + (1 << 24)) as u64 & 0x1FF_FFFF;
    let t = match entry_type {
        EntryType::Exact => 0u64,
        EntryType::LowerBound => 1u64,
        EntryType::UpperBound => 2u64,
    };
    let (first, second) = match best_move {
        Some(mv) => (
            mv.first().to_index() as u64,
            mv.second().map_or(NO_CELL, |p| p.to_index() as u64),
        ),
        None => (NO_CELL, NO_CELL),
    };
    d | (s << 8) | (t << 33) | (u64::from(generation) << 35) | (first << 43) | (second << 52)
}

fn unpack_entry(key: u64, data: u64) -> Option<TTEntry> {
    let depth = ((data & 0xFF) as i16 - 128) as i8;
    let score = (((data >> 8) & 0x1FF_FFFF) as i64 - (1 << 24)) as i32;
    let entry_type = match (data >> 33) & 0x3 {
        0 => EntryType::Exact,
        1 => EntryType::LowerBound,
        2 => EntryType::UpperBound,
        _ => return None,
    };
    let generation = ((data >> 35) & 0xFF) as u8;
    let cell = |bits: u64| {
        let idx = (bits & NO_CELL) as usize;
        (idx < TOTAL_CELLS).then(|| Pos::from_index(idx))
    };
    let best_move = cell(data >> 43).map(|first| match cell(data >> 52) {
        Some(second) if second != first => Move::pair(first, second),
        _ => Move::single(first),
    });
    Some(TTEntry { key, depth, score, entry_type, best_move, generation })
}

/// Lock-free table. Each slot is two atomics, key stored as `key ^ data`,
/// so a torn read fails verification and reads as a miss.
///
/// All methods take `&self`, enabling `Arc<SharedTranspositionTable>` sharing.
pub struct SharedTranspositionTable {
    keys: Vec<AtomicU64>,
    data: Vec<AtomicU64>,
    generation: AtomicU8,
    probes: AtomicU64,
    hits: AtomicU64,
    stores: AtomicU64,
}

impl SharedTranspositionTable {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(MIN_CAPACITY, MAX_CAPACITY);
        Self {
            keys: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
            data: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
            generation: AtomicU8::new(0),
            probes: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            stores: AtomicU64::new(0),
        }
    }

    /// Convenience constructor for sharing between threads.
    #[must_use]
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    fn load(&self, idx: usize) -> Option<(u64, TTEntry)> {
        let stored_key = self.keys[idx].load(Ordering::Relaxed);
        let data = self.data[idx].load(Ordering::Relaxed);
        if stored_key == 0 && data == 0 {
            return None;
        }
        let key = stored_key ^ data;
        unpack_entry(key, data).map(|e| (key, e))
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        self.probes.fetch_add(1, Ordering::Relaxed);
        let idx = slot_index(key, self.keys.len());
        // XOR verification: torn read or other position gives a different key
        let entry = self.load(idx).filter(|(k, _)| *k == key).map(|(_, e)| e);
        if entry.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        entry
    }

    /// Probe-then-store is racy; a lost update only costs cache efficiency.
    pub fn store(&self, key: u64, depth: i8, score: i32, entry_type: EntryType, best_move: Option<Move>) {
        let idx = slot_index(key, self.keys.len());
        let generation = self.generation.load(Ordering::Relaxed);
        if let Some((_, old)) = self.load(idx) {
            if !should_replace(&old, key, depth, entry_type, generation) {
                return;
            }
        }
        let data = pack_entry(depth, score, entry_type, best_move, generation);
        self.keys[idx].store(key ^ data, Ordering::Relaxed);
        self.data[idx].store(data, Ordering::Relaxed);
        self.stores.fetch_add(1, Ordering::Relaxed);
    }

    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for (k, d) in self.keys.iter().zip(self.data.iter()) {
            k.store(0, Ordering::Relaxed);
            d.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
        self.probes.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.stores.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn stats(&self) -> TTStats {
        let capacity = self.keys.len();
        let used = self
            .data
            .iter()
            .filter(|d| d.load(Ordering::Relaxed) != 0)
            .count();
        TTStats {
            capacity,
            used,
            usage_percent: used as f64 / capacity as f64 * 100.0,
            probes: self.probes.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
        }
    }
}

impl TranspositionStore for Arc<SharedTranspositionTable> {
    fn probe(&mut self, key: u64) -> Option<TTEntry> {
        SharedTranspositionTable::probe(self, key)
    }

    fn store(&mut self, key: u64, depth: i8, score: i32, entry_type: EntryType, best_move: Option<Move>) {
        SharedTranspositionTable::store(self, key, depth, score, entry_type, best_move);
    }

    fn new_search(&mut self) {
        SharedTranspositionTable::new_search(self);
    }

    fn clear(&mut self) {
        SharedTranspositionTable::clear(self);
    }

    fn stats(&self) -> TTStats {
        SharedTranspositionTable::stats(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(a: (u8, u8), b: (u8, u8)) -> Move {
        Move::pair(Pos::new(a.0, a.1), Pos::new(b.0, b.1))
    }

    #[test]
    fn test_tt_store_and_probe() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        let best = mv((9, 9), (9, 10));
        tt.store(0x1234_5678_9ABC_DEF0, 5, 100, EntryType::Exact, Some(best));

        let entry = tt.probe(0x1234_5678_9ABC_DEF0).unwrap();
        assert_eq!(entry.score, 100);
        assert_eq!(entry.best_move, Some(best));
        assert_eq!(entry.usable_score(5, -1000, 1000), Some(100));
        assert_eq!(entry.usable_score(6, -1000, 1000), None, "too shallow");
    }

    #[test]
    fn test_tt_bounds() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        tt.store(0x111, 5, 200, EntryType::LowerBound, None);
        let lb = tt.probe(0x111).unwrap();
        assert_eq!(lb.usable_score(5, -1000, 150), Some(200));
        assert_eq!(lb.usable_score(5, -1000, 300), None);

        tt.store(0x222, 5, 50, EntryType::UpperBound, None);
        let ub = tt.probe(0x222).unwrap();
        assert_eq!(ub.usable_score(5, 100, 1000), Some(50));
        assert_eq!(ub.usable_score(5, 30, 1000), None);
    }

    #[test]
    fn test_tt_key_mismatch_is_miss() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        tt.store(5, 3, 10, EntryType::Exact, None);
        // Same slot, different key
        assert!(tt.probe(5 + MIN_CAPACITY as u64).is_none());
        let stats = tt.stats();
        assert_eq!(stats.probes, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_tt_keeps_deeper_entry() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        let a = 7;
        let b = 7 + MIN_CAPACITY as u64;
        tt.store(a, 6, 10, EntryType::Exact, None);
        tt.store(b, 3, 20, EntryType::Exact, None);
        assert!(tt.probe(a).is_some(), "deeper entry survives");
        assert!(tt.probe(b).is_none());
    }

    #[test]
    fn test_tt_depth_tie_prefers_newer() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        let a = 9;
        let b = 9 + MIN_CAPACITY as u64;
        tt.store(a, 4, 10, EntryType::Exact, None);
        tt.new_search();
        tt.store(b, 4, 20, EntryType::Exact, None);
        assert!(tt.probe(a).is_none());
        assert_eq!(tt.probe(b).map(|e| e.generation), Some(1));
    }

    #[test]
    fn test_tt_stale_entry_replaced() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        let a = 11;
        let b = 11 + MIN_CAPACITY as u64;
        tt.store(a, 10, 10, EntryType::Exact, None);
        tt.new_search();
        tt.store(b, 1, 20, EntryType::Exact, None);
        assert!(tt.probe(a).is_some(), "one generation old is still fresh");
        tt.new_search();
        tt.store(b, 1, 20, EntryType::Exact, None);
        assert!(tt.probe(b).is_some(), "two generations old is stale");
    }

    #[test]
    fn test_tt_exact_overrides_shallower_bound_for_same_key() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        tt.store(42, 6, 100, EntryType::LowerBound, None);
        tt.store(42, 4, 80, EntryType::Exact, None);
        assert_eq!(tt.probe(42).map(|e| e.entry_type), Some(EntryType::Exact));
        tt.store(42, 2, 0, EntryType::UpperBound, None);
        assert_eq!(tt.probe(42).map(|e| e.depth), Some(4));
    }

    #[test]
    fn test_tt_capacity_fixed() {
        let mut tt = TranspositionTable::new(10);
        assert_eq!(tt.capacity(), MIN_CAPACITY);
        for key in 0..(4 * MIN_CAPACITY as u64) {
            tt.store(key, 1, 0, EntryType::Exact, None);
        }
        let stats = tt.stats();
        assert_eq!(stats.used, MIN_CAPACITY);
        assert!((stats.usage_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tt_clear_resets_generation() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        tt.new_search();
        tt.new_search();
        tt.store(1, 1, 1, EntryType::Exact, None);
        tt.clear();
        assert_eq!(tt.generation(), 0);
        assert!(tt.probe(1).is_none());
        assert_eq!(tt.stats().used, 0);
    }

    #[test]
    fn test_tt_hit_rate() {
        let mut tt = TranspositionTable::new(MIN_CAPACITY);
        tt.store(1, 1, 1, EntryType::Exact, None);
        let _ = tt.probe(1);
        let _ = tt.probe(2);
        assert!((tt.stats().hit_rate() - 0.5).abs() < 1e-9);
    }

    // =========================================================================
    // Shared table
    // =========================================================================

    #[test]
    fn test_pack_unpack_roundtrip() {
        let cases = [
            (5, 100, EntryType::Exact, Some(mv((9, 9), (10, 10))), 0),
            (0, -9_999_990, EntryType::LowerBound, None, 255),
            (64, 10_000_000, EntryType::UpperBound, Some(Move::single(Pos::new(0, 0))), 7),
            (-1, 0, EntryType::Exact, Some(mv((18, 18), (0, 18))), 1),
        ];
        for (depth, score, et, best, generation) in cases {
            let data = pack_entry(depth, score, et, best, generation);
            let e = unpack_entry(77, data).unwrap();
            assert_eq!(e.depth, depth);
            assert_eq!(e.score, score);
            assert_eq!(e.entry_type, et);
            assert_eq!(e.best_move, best);
            assert_eq!(e.generation, generation);
        }
    }

    #[test]
    fn test_shared_store_probe() {
        let tt = SharedTranspositionTable::new(MIN_CAPACITY);
        let best = mv((3, 3), (4, 4));
        tt.store(0xDEAD_BEEF, 4, -250, EntryType::UpperBound, Some(best));
        let e = tt.probe(0xDEAD_BEEF).unwrap();
        assert_eq!(e.score, -250);
        assert_eq!(e.best_move, Some(best));
        assert!(tt.probe(0xBEEF_DEAD).is_none());
    }

    #[test]
    fn test_shared_torn_write_is_miss() {
        let tt = SharedTranspositionTable::new(MIN_CAPACITY);
        let key = 0x55;
        tt.store(key, 4, 1, EntryType::Exact, None);
        let idx = slot_index(key, MIN_CAPACITY);
        // Simulate a half-written slot: data from a different entry
        tt.data[idx].store(pack_entry(9, 9, EntryType::Exact, None, 0), Ordering::Relaxed);
        assert!(tt.probe(key).is_none());
    }

    #[test]
    fn test_shared_clear() {
        let tt = SharedTranspositionTable::new(MIN_CAPACITY);
        tt.new_search();
        tt.store(1, 1, 1, EntryType::Exact, None);
        tt.clear();
        assert!(tt.probe(1).is_none());
        assert_eq!(tt.stats().used, 0);
        assert_eq!(tt.generation.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_shared_concurrent_access() {
        let tt = SharedTranspositionTable::shared(1 << 12);
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let tt = Arc::clone(&tt);
                std::thread::spawn(move || {
                    for i in 0..500u64 {
                        let key = (i << 8) | t;
                        SharedTranspositionTable::store(&tt, key, 2, i as i32, EntryType::Exact, None);
                        if let Some(e) = SharedTranspositionTable::probe(&tt, key) {
                            assert_eq!(e.key, key);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(tt.stats().used > 0);
    }

    #[test]
    fn test_store_trait_over_arc() {
        let mut handle = SharedTranspositionTable::shared(MIN_CAPACITY);
        TranspositionStore::store(&mut handle, 3, 1, 5, EntryType::Exact, None);
        assert_eq!(TranspositionStore::probe(&mut handle, 3).map(|e| e.score), Some(5));
    }
}
