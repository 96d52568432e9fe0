//! Configuration system for the cache hierarchy simulator.
//!
//! This module defines all configuration structures used to parameterize a
//! simulation run. It provides:
//! 1. **Defaults:** Baseline geometry constants for a small L1-only hierarchy.
//! 2. **Structures:** Per-level geometry plus the shared block size.
//! 3. **Errors:** Fatal geometry violations reported at construction time.
//!
//! Configuration is supplied positionally by the CLI or deserialized from JSON
//! (`SimConfig` derives [`serde::Deserialize`]); use `SimConfig::default()` for
//! a baseline setup.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hierarchy when not explicitly
/// overridden on the command line or in a JSON configuration file.
mod defaults {
    /// Default block (line) size in bytes, shared by both levels.
    pub const BLOCK_BYTES: u32 = 32;

    /// Default L1 capacity in bytes (8 KiB).
    pub const L1_SIZE: u32 = 8192;

    /// Default L1 associativity (4 ways per set).
    pub const L1_ASSOC: u32 = 4;

    /// Default L2 capacity in bytes (0 = no L2).
    pub const L2_SIZE: u32 = 0;

    /// Default L2 associativity (0 = no L2).
    pub const L2_ASSOC: u32 = 0;
}

/// Fatal configuration errors detected when deriving cache geometry.
///
/// Any of these leaves no usable engine behind; the simulator halts before
/// processing a single trace entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The block size is zero or not a power of two.
    #[error("block size {0} is not a power of two")]
    BlockSizeNotPowerOfTwo(u32),

    /// The associativity is zero for a level that is supposed to exist.
    #[error("associativity must be non-zero")]
    ZeroAssociativity,

    /// The capacity is zero for a level that is supposed to exist.
    #[error("cache size must be non-zero")]
    ZeroSize,

    /// The capacity is not an exact multiple of `assoc * block_bytes`.
    #[error("size {size_bytes} is not divisible by assoc {assoc} x block {block_bytes}")]
    SizeNotDivisible {
        /// Total capacity in bytes.
        size_bytes: u32,
        /// Ways per set.
        assoc: u32,
        /// Block size in bytes.
        block_bytes: u32,
    },

    /// The derived set count is not a power of two, so no whole number of
    /// index bits can address it.
    #[error("derived set count {0} is not a power of two")]
    SetCountNotPowerOfTwo(u32),
}

/// Geometry of a single cache level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LevelConfig {
    /// Total capacity in bytes.
    pub size_bytes: u32,

    /// Associativity (number of ways per set).
    pub assoc: u32,
}

impl LevelConfig {
    /// Returns true when this level is configured out of existence.
    ///
    /// A size of zero or an associativity of zero both disable the level;
    /// the CLI convention is to pass both as zero.
    pub fn is_disabled(&self) -> bool {
        self.size_bytes == 0 || self.assoc == 0
    }
}

/// Full simulation configuration: shared block size, both levels, and the
/// prefetcher knobs that are accepted for interface compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SimConfig {
    /// Block size in bytes, shared between L1 and L2.
    #[serde(default = "SimConfig::default_block_bytes")]
    pub block_bytes: u32,

    /// L1 geometry.
    #[serde(default = "SimConfig::default_l1")]
    pub l1: LevelConfig,

    /// L2 geometry; size 0 / assoc 0 signal "no L2".
    #[serde(default = "SimConfig::default_l2")]
    pub l2: LevelConfig,

    /// Prefetch stream count. Parsed but inert: this simulator models no
    /// prefetching and the corresponding counters stay zero.
    #[serde(default)]
    pub pref_n: u32,

    /// Prefetch degree. Parsed but inert, like [`SimConfig::pref_n`].
    #[serde(default)]
    pub pref_m: u32,
}

impl SimConfig {
    /// Returns the default shared block size in bytes.
    fn default_block_bytes() -> u32 {
        defaults::BLOCK_BYTES
    }

    /// Returns the default L1 geometry.
    fn default_l1() -> LevelConfig {
        LevelConfig {
            size_bytes: defaults::L1_SIZE,
            assoc: defaults::L1_ASSOC,
        }
    }

    /// Returns the default L2 geometry (disabled).
    fn default_l2() -> LevelConfig {
        LevelConfig {
            size_bytes: defaults::L2_SIZE,
            assoc: defaults::L2_ASSOC,
        }
    }

    /// Returns true when an L2 engine should be instantiated.
    ///
    /// Both the L2 size and associativity must be non-zero; a zero in either
    /// disables the level without raising a configuration error.
    pub fn has_l2(&self) -> bool {
        !self.l2.is_disabled()
    }
}

impl Default for SimConfig {
    /// Creates the baseline configuration: 8 KiB 4-way L1 with 32-byte
    /// blocks and no L2.
    fn default() -> Self {
        Self {
            block_bytes: defaults::BLOCK_BYTES,
            l1: Self::default_l1(),
            l2: Self::default_l2(),
            pref_n: 0,
            pref_m: 0,
        }
    }
}
