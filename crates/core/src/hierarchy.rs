//! Two-level hierarchy driver.
//!
//! Wires one L1 engine to an optional L2 engine and ferries trace entries
//! into L1 one at a time. The driver performs no cache logic of its own:
//! every hit/miss decision, eviction, and forwarded access happens inside
//! the engines. At end of input it hands both engines' counters, unchanged,
//! to the reporting side.

use crate::cache::{Cache, Op, Outcome};
use crate::config::{ConfigError, SimConfig};
use crate::stats::HierarchyStats;
use crate::trace::{TraceEntry, TraceError};

/// A two-level cache hierarchy: one L1 and zero or one L2.
#[derive(Debug)]
pub struct Hierarchy {
    l1: Cache,
    l2: Option<Cache>,
}

impl Hierarchy {
    /// Builds the hierarchy described by `config`.
    ///
    /// L2 is instantiated only when [`SimConfig::has_l2`] holds; both
    /// levels share the configured block size.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] raised while deriving either
    /// level's geometry.
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let l1 = Cache::new(
            "L1",
            config.block_bytes,
            config.l1.size_bytes,
            config.l1.assoc,
        )?;
        let l2 = if config.has_l2() {
            Some(Cache::new(
                "L2",
                config.block_bytes,
                config.l2.size_bytes,
                config.l2.assoc,
            )?)
        } else {
            None
        };
        Ok(Self { l1, l2 })
    }

    /// Issues one trace request into L1, passing the L2 engine (when
    /// present) as the next level.
    pub fn access(&mut self, op: Op, addr: u32) -> Outcome {
        self.l1.access(op, addr, self.l2.as_mut())
    }

    /// Drives a whole trace, stopping at the first malformed entry.
    ///
    /// # Returns
    ///
    /// The number of requests processed.
    ///
    /// # Errors
    ///
    /// Returns the first [`TraceError`] yielded by `entries`; nothing after
    /// it is processed.
    pub fn run<I>(&mut self, entries: I) -> Result<u64, TraceError>
    where
        I: IntoIterator<Item = Result<TraceEntry, TraceError>>,
    {
        let mut processed = 0;
        for entry in entries {
            let TraceEntry { op, addr } = entry?;
            self.access(op, addr);
            processed += 1;
        }
        Ok(processed)
    }

    /// The L1 engine.
    pub fn l1(&self) -> &Cache {
        &self.l1
    }

    /// The L2 engine, when configured.
    pub fn l2(&self) -> Option<&Cache> {
        self.l2.as_ref()
    }

    /// Snapshot of both levels' counters; L2's stay all-zero when the
    /// level is absent.
    pub fn totals(&self) -> HierarchyStats {
        HierarchyStats {
            l1: *self.l1.stats(),
            l2: self.l2.as_ref().map(|c| *c.stats()).unwrap_or_default(),
        }
    }
}
