//! Access Resolution Unit Tests.
//!
//! Verifies hit/miss classification, LRU recency updates, write-allocate
//! fills, and the dirty-bit rules of the write-back write-allocate policy.

use cachesim_core::cache::{Cache, Op};

/// 32-byte blocks, 2 direct-mapped sets (64 bytes total).
fn two_set_direct_mapped() -> Cache {
    Cache::new("L1", 32, 64, 1).unwrap()
}

/// 32-byte blocks, one 2-way set (64 bytes total).
fn one_set_two_way() -> Cache {
    Cache::new("L1", 32, 64, 2).unwrap()
}

// ──────────────────────────────────────────────────────────
// Hit/miss classification
// ──────────────────────────────────────────────────────────

/// Cold miss, then a hit on the refill: miss, miss (other set), hit.
#[test]
fn fill_then_rehit() {
    let mut cache = two_set_direct_mapped();

    assert!(!cache.access(Op::Read, 0x0000_0000, None).is_hit());
    // Different index bit: lands in the other set, no conflict.
    assert!(!cache.access(Op::Read, 0x0000_0020, None).is_hit());
    assert!(cache.access(Op::Read, 0x0000_0000, None).is_hit());

    let stats = cache.stats();
    assert_eq!(stats.reads, 3);
    assert_eq!(stats.read_misses, 2);
    assert_eq!(stats.memory_reads, 2);
}

/// Any offset within a resident block hits.
#[test]
fn same_block_different_offset_hits() {
    let mut cache = two_set_direct_mapped();
    cache.access(Op::Read, 0x0000_0040, None);
    assert!(cache.access(Op::Read, 0x0000_005f, None).is_hit());
}

/// A miss stays a miss in this level even when the next level hits.
#[test]
fn miss_reported_even_when_next_level_hits() {
    let mut l1 = Cache::new("L1", 32, 32, 1).unwrap();
    let mut l2 = Cache::new("L2", 32, 1024, 4).unwrap();

    // Warm L2 with the block.
    l2.access(Op::Read, 0x0000_0000, None);
    assert!(!l1.access(Op::Read, 0x0000_0000, Some(&mut l2)).is_hit());
    // The forwarded fill hit in L2.
    assert_eq!(l2.stats().reads, 2);
    assert_eq!(l2.stats().read_misses, 1);
}

// ──────────────────────────────────────────────────────────
// Counters
// ──────────────────────────────────────────────────────────

#[test]
fn read_and_write_totals_tracked_separately() {
    let mut cache = one_set_two_way();
    cache.access(Op::Read, 0x0, None);
    cache.access(Op::Write, 0x0, None);
    cache.access(Op::Write, 0x40, None);

    let stats = cache.stats();
    assert_eq!(stats.reads, 1);
    assert_eq!(stats.writes, 2);
    assert_eq!(stats.read_misses, 1);
    assert_eq!(stats.write_misses, 1);
}

#[test]
fn prefetch_counters_stay_zero() {
    let mut cache = one_set_two_way();
    for addr in (0u32..0x400).step_by(32) {
        cache.access(Op::Write, addr, None);
        cache.access(Op::Read, addr, None);
    }
    let stats = cache.stats();
    assert_eq!(stats.pref_issued, 0);
    assert_eq!(stats.pref_useful, 0);
    assert_eq!(stats.pref_late, 0);
}

// ──────────────────────────────────────────────────────────
// Dirty-bit rules
// ──────────────────────────────────────────────────────────

/// A write miss installs a dirty line: evicting it immediately writes back.
#[test]
fn write_allocate_installs_dirty_line() {
    let mut cache = Cache::new("L1", 32, 32, 1).unwrap();
    cache.access(Op::Write, 0x0, None);
    // Conflict evicts the dirty line.
    cache.access(Op::Read, 0x20, None);
    assert_eq!(cache.stats().writebacks, 1);
    assert_eq!(cache.stats().memory_writes, 1);
}

/// A read miss installs a clean line: evicting it writes nothing back.
#[test]
fn read_miss_installs_clean_line() {
    let mut cache = Cache::new("L1", 32, 32, 1).unwrap();
    cache.access(Op::Read, 0x0, None);
    cache.access(Op::Read, 0x20, None);
    assert_eq!(cache.stats().writebacks, 0);
    assert_eq!(cache.stats().memory_writes, 0);
}

/// A write hit marks the line dirty even if it was filled clean.
#[test]
fn write_hit_marks_dirty() {
    let mut cache = Cache::new("L1", 32, 32, 1).unwrap();
    cache.access(Op::Read, 0x0, None); // clean fill
    assert!(cache.access(Op::Write, 0x10, None).is_hit());
    cache.access(Op::Read, 0x20, None); // evict
    assert_eq!(cache.stats().writebacks, 1);
}

/// A read hit leaves the dirty flag unchanged.
#[test]
fn read_hit_preserves_dirty_flag() {
    let mut cache = Cache::new("L1", 32, 32, 1).unwrap();
    cache.access(Op::Write, 0x0, None); // dirty fill
    assert!(cache.access(Op::Read, 0x0, None).is_hit());
    let contents = cache.contents();
    assert!(contents[0].lines[0].dirty);
}

// ──────────────────────────────────────────────────────────
// LRU replacement
// ──────────────────────────────────────────────────────────

/// Re-touching the older line flips the victim choice.
#[test]
fn touch_updates_victim_selection() {
    let mut cache = one_set_two_way();
    let a = 0x000u32; // tag 0
    let b = 0x040u32; // tag 1
    let c = 0x080u32; // tag 2

    cache.access(Op::Read, a, None);
    cache.access(Op::Read, b, None);
    // Make `a` the MRU again; `b` becomes the LRU victim.
    cache.access(Op::Read, a, None);
    cache.access(Op::Read, c, None);

    assert!(cache.access(Op::Read, a, None).is_hit());
    assert!(cache.access(Op::Read, c, None).is_hit());
    assert!(!cache.access(Op::Read, b, None).is_hit());
}

/// Invalid ways are preferred over evicting valid lines.
#[test]
fn invalid_way_used_before_eviction() {
    let mut cache = one_set_two_way();
    cache.access(Op::Write, 0x000, None);
    cache.access(Op::Read, 0x040, None);
    // Both fills landed in free ways: nothing was evicted.
    assert_eq!(cache.stats().writebacks, 0);
    assert!(cache.access(Op::Read, 0x000, None).is_hit());
    assert!(cache.access(Op::Read, 0x040, None).is_hit());
}

/// Filling a set beyond capacity evicts in LRU order.
#[test]
fn eviction_follows_lru_order() {
    let mut cache = Cache::new("L1", 32, 128, 4).unwrap();
    // Four tags fill the single set; a fifth evicts the oldest (0x000).
    for addr in [0x000u32, 0x080, 0x100, 0x180, 0x200] {
        cache.access(Op::Read, addr, None);
    }
    assert!(!cache.access(Op::Read, 0x000, None).is_hit());
    // That refill evicted the then-LRU 0x080; younger lines survive.
    assert!(cache.access(Op::Read, 0x100, None).is_hit());
    assert!(cache.access(Op::Read, 0x180, None).is_hit());
    assert!(!cache.access(Op::Read, 0x080, None).is_hit());
}
