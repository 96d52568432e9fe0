//! Access counters and final report formatting.
//!
//! This module tracks per-level access statistics and renders the final
//! simulator output. It provides:
//! 1. **Counters:** Reads, writes, misses, writebacks, and memory traffic
//!    per engine, plus always-zero prefetch counters kept so the report
//!    shape stays compatible with prefetching simulators.
//! 2. **Aggregation:** A two-level snapshot handed to reporting after the
//!    trace is fully processed.
//! 3. **Report:** Fixed-column contents and measurements blocks written as
//!    pure functions over immutable snapshots.

use std::fmt::{self, Write};

use crate::cache::Cache;

/// Base width the per-line value offsets are subtracted from.
const MEASUREMENT_COLUMNS: usize = 32;

/// Monotonically increasing counters for one cache engine.
///
/// Owned and mutated only by the engine they belong to; never reset except
/// by a full engine re-initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessStats {
    /// Total read accesses issued to this level.
    pub reads: u64,
    /// Read accesses that missed in this level.
    pub read_misses: u64,
    /// Total write accesses issued to this level.
    pub writes: u64,
    /// Write accesses that missed in this level.
    pub write_misses: u64,
    /// Dirty lines evicted from this level, wherever they landed.
    pub writebacks: u64,
    /// Demand fills that went to abstract memory (no next level).
    pub memory_reads: u64,
    /// Writebacks that reached abstract memory (no next level).
    pub memory_writes: u64,

    /// Prefetches issued. This simulator models no prefetching; stays zero.
    pub pref_issued: u64,
    /// Useful prefetches. Stays zero.
    pub pref_useful: u64,
    /// Late prefetches. Stays zero.
    pub pref_late: u64,
}

impl AccessStats {
    /// Total demand accesses (reads plus writes).
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Combined miss rate over all demand accesses; 0.0 when idle.
    pub fn miss_rate(&self) -> f64 {
        safe_rate(self.read_misses + self.write_misses, self.accesses())
    }

    /// Demand-read-only miss rate, the convention for a second-level cache
    /// whose writes are writebacks rather than program stores.
    pub fn demand_read_miss_rate(&self) -> f64 {
        safe_rate(self.read_misses, self.reads)
    }

    /// Accesses from this level that reached abstract memory.
    pub fn memory_traffic(&self) -> u64 {
        self.memory_reads + self.memory_writes
    }
}

/// Division with a zero-total guard.
fn safe_rate(miss: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        miss as f64 / total as f64
    }
}

/// Final snapshot of both levels' counters.
///
/// `l2` is all-zero when the hierarchy has no second level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HierarchyStats {
    /// L1 counters.
    pub l1: AccessStats,
    /// L2 counters, or zeros.
    pub l2: AccessStats,
}

impl HierarchyStats {
    /// Total traffic that reached the backing store beneath the last cache
    /// level, fills and writebacks combined.
    pub fn memory_traffic(&self) -> u64 {
        self.l1.memory_traffic() + self.l2.memory_traffic()
    }
}

/// Writes one level's contents block: each non-empty set on one line,
/// valid lines MRU to LRU, dirty lines marked `D`.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn write_contents<W: Write>(w: &mut W, cache: &Cache) -> fmt::Result {
    writeln!(w, "===== {} contents =====", cache.name())?;
    for set in cache.contents() {
        write!(w, "set {:>6}:  ", set.index)?;
        for line in &set.lines {
            write!(w, " {:x}", line.tag)?;
            if line.dirty {
                write!(w, " D")?;
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Writes one measurement line. `offset` is the per-line column offset the
/// value width is derived from; the offsets track the label lengths only
/// loosely, so lines run 31 to 33 columns. They are fixed by the published
/// validation outputs and must not be normalized.
fn measurement<W: Write>(
    w: &mut W,
    label: &str,
    offset: usize,
    value: &dyn fmt::Display,
) -> fmt::Result {
    let pad = MEASUREMENT_COLUMNS.saturating_sub(offset);
    writeln!(w, "{label}{value:>pad$}")
}

/// Writes the lettered measurements block.
///
/// The shape (including the always-zero prefetch rows and the demand-only
/// L2 miss rate) is kept stable so downstream tooling that parses the
/// report keeps working whether or not an L2 is configured.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn write_measurements<W: Write>(w: &mut W, totals: &HierarchyStats) -> fmt::Result {
    let l1 = &totals.l1;
    let l2 = &totals.l2;

    writeln!(w, "===== Measurements =====")?;
    measurement(w, "a. L1 reads:", 11, &l1.reads)?;
    measurement(w, "b. L1 read misses:", 18, &l1.read_misses)?;
    measurement(w, "c. L1 writes:", 12, &l1.writes)?;
    measurement(w, "d. L1 write misses:", 19, &l1.write_misses)?;
    measurement(w, "e. L1 miss rate:", 16, &format!("{:.4}", l1.miss_rate()))?;
    measurement(w, "f. L1 writebacks:", 16, &l1.writebacks)?;
    measurement(w, "g. L1 prefetches:", 16, &l1.pref_issued)?;
    measurement(w, "h. L2 reads (demand):", 21, &l2.reads)?;
    measurement(w, "i. L2 read misses (demand):", 28, &l2.read_misses)?;
    measurement(w, "j. L2 reads (prefetch):", 23, &l2.pref_issued)?;
    measurement(w, "k. L2 read misses (prefetch):", 30, &l2.pref_late)?;
    measurement(w, "l. L2 writes:", 12, &l2.writes)?;
    measurement(w, "m. L2 write misses:", 19, &l2.write_misses)?;
    measurement(
        w,
        "n. L2 miss rate:",
        16,
        &format!("{:.4}", l2.demand_read_miss_rate()),
    )?;
    measurement(w, "o. L2 writebacks:", 16, &l2.writebacks)?;
    measurement(w, "p. L2 prefetches:", 16, &l2.pref_issued)?;
    measurement(w, "q. memory traffic:", 17, &totals.memory_traffic())?;
    Ok(())
}

/// Writes the full final report: L1 contents, L2 contents when present,
/// then the measurements, with blank separator lines between the blocks.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn write_report<W: Write>(
    w: &mut W,
    l1: &Cache,
    l2: Option<&Cache>,
    totals: &HierarchyStats,
) -> fmt::Result {
    write_contents(w, l1)?;
    if let Some(l2) = l2 {
        writeln!(w)?;
        write_contents(w, l2)?;
    }
    writeln!(w)?;
    write_measurements(w, totals)
}
