//! Set-associative cache engine.
//!
//! This module implements one level of a write-back, write-allocate (WBWA)
//! cache with true LRU replacement. It provides:
//! 1. **Storage:** A flat array of lines indexed `set * assoc + way`.
//! 2. **Access resolution:** Hit/miss detection, LRU victim selection,
//!    dirty-line writeback, and fills.
//! 3. **Forwarding:** Misses are serviced by an optional next-level engine
//!    of the same type, or counted against abstract memory.
//! 4. **Inspection:** A side-effect-free per-set contents snapshot.
//!
//! The same engine type is used for L1 and L2; the hierarchy depth is fixed
//! at two, so forwarded accesses never forward again themselves.

/// Geometry derivation and address decomposition.
pub mod geometry;

pub use geometry::CacheGeometry;

use crate::config::ConfigError;
use crate::stats::AccessStats;
use tracing::{debug, trace};

/// Kind of a memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// A data read.
    Read,
    /// A data write.
    Write,
}

/// Result of an access as seen by the level it was issued to.
///
/// A miss stays a miss even when the next level services it; only residency
/// in *this* level yields [`Outcome::Hit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The block was resident in this level.
    Hit,
    /// The block was not resident; it has been allocated by the time the
    /// access returns.
    Miss,
}

impl Outcome {
    /// Returns true for [`Outcome::Hit`].
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// One way of one set.
///
/// `tag` and `dirty` are meaningful only while `valid` is set. Eviction does
/// not clear a line eagerly; the next fill overwrites it.
#[derive(Debug, Clone)]
struct Line {
    valid: bool,
    dirty: bool,
    tag: u32,
    /// Recency ordinal: 0 = most recently used, larger = older.
    age: u32,
}

/// Snapshot of one valid line, produced by [`Cache::contents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSnapshot {
    /// The stored tag.
    pub tag: u32,
    /// Whether the line is dirty.
    pub dirty: bool,
}

/// Snapshot of one set holding at least one valid line, ordered MRU to LRU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetContents {
    /// The set index.
    pub index: usize,
    /// Valid lines, most recently used first.
    pub lines: Vec<LineSnapshot>,
}

/// One level of the cache hierarchy.
///
/// Owns its line storage and statistics exclusively. The next level is not a
/// field but a parameter of [`Cache::access`], so the same concrete type
/// serves both levels and the driver decides the wiring per call.
#[derive(Debug)]
pub struct Cache {
    name: &'static str,
    geom: CacheGeometry,
    lines: Vec<Line>,
    stats: AccessStats,
}

impl Cache {
    /// Builds an engine with every line invalid.
    ///
    /// Lines are pre-aged by way index, so way 0 of an untouched set is the
    /// initial MRU and the highest way is the first victim. This only
    /// affects the very first evictions of a set that still holds invalid
    /// lines, and in practice those are never reached because invalid ways
    /// are preferred as victims.
    ///
    /// # Arguments
    ///
    /// * `name` - Level label used in diagnostics ("L1", "L2").
    /// * `block_bytes` - Block size in bytes.
    /// * `size_bytes` - Total capacity in bytes.
    /// * `assoc` - Ways per set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the geometry invariants are violated;
    /// no partial engine is usable afterwards.
    pub fn new(
        name: &'static str,
        block_bytes: u32,
        size_bytes: u32,
        assoc: u32,
    ) -> Result<Self, ConfigError> {
        let geom = CacheGeometry::new(block_bytes, size_bytes, assoc)?;
        let lines = Self::fresh_lines(&geom);
        Ok(Self {
            name,
            geom,
            lines,
            stats: AccessStats::default(),
        })
    }

    fn fresh_lines(geom: &CacheGeometry) -> Vec<Line> {
        let ways = geom.assoc() as usize;
        let total = geom.set_count() as usize * ways;
        (0..total)
            .map(|i| Line {
                valid: false,
                dirty: false,
                tag: 0,
                age: (i % ways) as u32,
            })
            .collect()
    }

    /// Level label ("L1", "L2").
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Derived geometry of this level.
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geom
    }

    /// Read-only view of this level's counters.
    pub fn stats(&self) -> &AccessStats {
        &self.stats
    }

    /// Resolves one access against this level.
    ///
    /// On a hit the line becomes MRU (and dirty, for a write) and nothing is
    /// forwarded. On a miss the corresponding miss counter is bumped and the
    /// WBWA miss path runs: victim selection, dirty writeback (to
    /// `next_level` or memory), fill (from `next_level` or memory), and
    /// installation of the new line as MRU, dirty iff `op` is a write.
    ///
    /// Forwarded accesses pass `None` downstream themselves: the hierarchy
    /// is two levels deep and a synthetic access must not recurse further.
    ///
    /// # Arguments
    ///
    /// * `op` - Read or write.
    /// * `addr` - The 32-bit request address.
    /// * `next_level` - The downstream engine, or `None` to terminate at
    ///   abstract memory.
    ///
    /// # Returns
    ///
    /// [`Outcome::Hit`] iff the block was resident in this level,
    /// regardless of how a miss was serviced below.
    pub fn access(&mut self, op: Op, addr: u32, next_level: Option<&mut Cache>) -> Outcome {
        let set = self.geom.index_of(addr);
        let tag = self.geom.tag_of(addr);
        // Unreachable by construction: index_of masks to set_count - 1.
        debug_assert!(set < self.geom.set_count() as usize);

        match op {
            Op::Read => self.stats.reads += 1,
            Op::Write => self.stats.writes += 1,
        }

        if let Some(way) = self.find_way(set, tag) {
            if op == Op::Write {
                // WBWA: a write hit always leaves the block dirty.
                self.line_mut(set, way).dirty = true;
            }
            self.touch_as_mru(set, way);
            trace!(cache = self.name, addr, "hit");
            return Outcome::Hit;
        }

        match op {
            Op::Read => self.stats.read_misses += 1,
            Op::Write => self.stats.write_misses += 1,
        }
        debug!(cache = self.name, addr, op = ?op, "miss");

        // Write-allocate on both read and write misses.
        self.allocate_on_miss(addr, next_level, op == Op::Write);
        Outcome::Miss
    }

    /// Per-set snapshot of valid lines in MRU-to-LRU order.
    ///
    /// Sets with no valid line are omitted entirely. Pure: no counter or
    /// recency state changes, so calling it twice yields identical output.
    pub fn contents(&self) -> Vec<SetContents> {
        let ways = self.geom.assoc() as usize;
        let mut out = Vec::new();
        for set in 0..self.geom.set_count() as usize {
            let mut resident: Vec<&Line> = self.lines[set * ways..(set + 1) * ways]
                .iter()
                .filter(|l| l.valid)
                .collect();
            if resident.is_empty() {
                continue;
            }
            // Valid lines always carry distinct ages, so this order is total.
            resident.sort_by_key(|l| l.age);
            out.push(SetContents {
                index: set,
                lines: resident
                    .into_iter()
                    .map(|l| LineSnapshot {
                        tag: l.tag,
                        dirty: l.dirty,
                    })
                    .collect(),
            });
        }
        out
    }

    /// Returns the engine to its freshly constructed state: every line
    /// invalid with initial recency, every counter zero.
    pub fn reset(&mut self) {
        self.lines = Self::fresh_lines(&self.geom);
        self.stats = AccessStats::default();
    }

    fn line(&self, set: usize, way: usize) -> &Line {
        &self.lines[set * self.geom.assoc() as usize + way]
    }

    fn line_mut(&mut self, set: usize, way: usize) -> &mut Line {
        &mut self.lines[set * self.geom.assoc() as usize + way]
    }

    /// Linear scan for a valid line with a matching tag. Tags are unique per
    /// set by construction, so at most one way can match.
    fn find_way(&self, set: usize, tag: u32) -> Option<usize> {
        (0..self.geom.assoc() as usize)
            .find(|&way| self.line(set, way).valid && self.line(set, way).tag == tag)
    }

    /// Selects the victim way for a fill.
    ///
    /// An invalid way is taken as-is (no eviction). Otherwise the way with
    /// the largest age wins; on equal ages the scan keeps the last way it
    /// sees. Equal ages among valid lines cannot occur after the first
    /// touch of a set, so the tie-break matters only transiently.
    fn victim_way(&self, set: usize) -> usize {
        let mut victim = 0;
        let mut max_age = 0;
        for way in 0..self.geom.assoc() as usize {
            let line = self.line(set, way);
            if !line.valid {
                return way;
            }
            if line.age >= max_age {
                max_age = line.age;
                victim = way;
            }
        }
        victim
    }

    /// Makes `way` the most recently used line of its set: every other
    /// valid line ages by one, the touched line drops to age 0. Invalid
    /// ways are left alone.
    fn touch_as_mru(&mut self, set: usize, way: usize) {
        let ways = self.geom.assoc() as usize;
        for line in &mut self.lines[set * ways..(set + 1) * ways] {
            if line.valid {
                line.age += 1;
            }
        }
        self.line_mut(set, way).age = 0;
    }

    fn fill_line(&mut self, set: usize, way: usize, tag: u32, dirty: bool) {
        let line = self.line_mut(set, way);
        line.valid = true;
        line.dirty = dirty;
        line.tag = tag;
        self.touch_as_mru(set, way);
    }

    /// Miss path: evict (writing back a dirty victim), fetch the block from
    /// below, and install it. The writeback is issued strictly before the
    /// fill so a later access to the evicted block can never observe a
    /// state preceding its own eviction.
    fn allocate_on_miss(&mut self, addr: u32, mut next_level: Option<&mut Cache>, dirty: bool) {
        let set = self.geom.index_of(addr);
        let tag = self.geom.tag_of(addr);
        let victim = self.victim_way(set);

        let evicted = self.line(set, victim);
        if evicted.valid && evicted.dirty {
            let victim_addr = self.geom.block_addr(evicted.tag, set);
            self.writeback_down(victim_addr, next_level.as_deref_mut());
        }

        if let Some(next) = next_level {
            // The fill's own hit/miss outcome is next's business, not ours.
            next.access(Op::Read, self.geom.block_aligned(addr), None);
        } else {
            self.stats.memory_reads += 1;
        }

        self.fill_line(set, victim, tag, dirty);
    }

    /// Pushes a dirty victim one level down, or counts it against memory
    /// when no next level exists. Clean victims never arrive here.
    fn writeback_down(&mut self, victim_addr: u32, next_level: Option<&mut Cache>) {
        debug!(cache = self.name, victim_addr, "dirty eviction, writing back");
        if let Some(next) = next_level {
            next.access(Op::Write, victim_addr, None);
        } else {
            self.stats.memory_writes += 1;
        }
        self.stats.writebacks += 1;
    }
}
