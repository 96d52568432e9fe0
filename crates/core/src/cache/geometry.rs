//! Cache geometry derivation and address decomposition.
//!
//! A request address is split, low to high, into `offset` bits (byte within
//! a block), `index` bits (which set), and the remaining high bits (the tag).
//! All of that is fixed by three inputs: block size, total capacity, and
//! associativity. This module derives the rest once, validates the geometry
//! invariants, and provides the decomposition helpers used on every access.

use crate::config::ConfigError;

/// Derived, immutable geometry of one cache level.
///
/// Constructed once per engine; violation of any invariant (power-of-two
/// block size and set count, capacity divisible by `assoc * block_bytes`)
/// is a fatal configuration error and no geometry is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    block_bytes: u32,
    size_bytes: u32,
    assoc: u32,
    set_count: u32,
    offset_bits: u32,
    index_bits: u32,
    index_mask: u32,
}

impl CacheGeometry {
    /// Derives the geometry for one level.
    ///
    /// # Arguments
    ///
    /// * `block_bytes` - Block (line) size in bytes; must be a power of two.
    /// * `size_bytes` - Total capacity in bytes; must be non-zero and an
    ///   exact multiple of `assoc * block_bytes`.
    /// * `assoc` - Ways per set; must be non-zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated invariant.
    pub fn new(block_bytes: u32, size_bytes: u32, assoc: u32) -> Result<Self, ConfigError> {
        if !block_bytes.is_power_of_two() {
            return Err(ConfigError::BlockSizeNotPowerOfTwo(block_bytes));
        }
        if assoc == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if size_bytes == 0 {
            return Err(ConfigError::ZeroSize);
        }
        let way_bytes = assoc as u64 * u64::from(block_bytes);
        if u64::from(size_bytes) % way_bytes != 0 {
            return Err(ConfigError::SizeNotDivisible {
                size_bytes,
                assoc,
                block_bytes,
            });
        }
        let set_count = (u64::from(size_bytes) / way_bytes) as u32;
        if !set_count.is_power_of_two() {
            return Err(ConfigError::SetCountNotPowerOfTwo(set_count));
        }

        let offset_bits = block_bytes.trailing_zeros();
        let index_bits = set_count.trailing_zeros();
        let index_mask = set_count - 1;

        Ok(Self {
            block_bytes,
            size_bytes,
            assoc,
            set_count,
            offset_bits,
            index_bits,
            index_mask,
        })
    }

    /// Block size in bytes.
    pub fn block_bytes(&self) -> u32 {
        self.block_bytes
    }

    /// Total capacity in bytes.
    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// Associativity (ways per set).
    pub fn assoc(&self) -> u32 {
        self.assoc
    }

    /// Number of indexable sets.
    pub fn set_count(&self) -> u32 {
        self.set_count
    }

    /// Number of low address bits selecting the byte within a block.
    pub fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Number of address bits selecting the set.
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Extracts the set index from an address.
    pub fn index_of(&self, addr: u32) -> usize {
        ((addr >> self.offset_bits) & self.index_mask) as usize
    }

    /// Extracts the tag (high bits beyond offset and index) from an address.
    pub fn tag_of(&self, addr: u32) -> u32 {
        // Widen first: offset_bits + index_bits can reach 32 for degenerate
        // geometries, and a 32-bit shift by 32 is not defined.
        (u64::from(addr) >> (self.offset_bits + self.index_bits)) as u32
    }

    /// Clears the offset bits, yielding the block-aligned form of an
    /// address. This is the only address form exchanged between levels.
    pub fn block_aligned(&self, addr: u32) -> u32 {
        addr & !(self.block_bytes - 1)
    }

    /// Reconstructs the full block-aligned address of a resident line from
    /// its stored tag and set index. Used to write back dirty victims.
    pub fn block_addr(&self, tag: u32, set: usize) -> u32 {
        ((u64::from(tag) << (self.index_bits + self.offset_bits))
            | ((set as u64) << self.offset_bits)) as u32
    }
}
