use serde::{Deserialize, Serialize};
use crate::config::MappingConfig;
use crate::error::{CacheError, Result};
use crate::util::ceil_log2;

/// Addresses are modelled as 32 bit quantities
pub const ADDRESS_BITS: u32 = 32;

/// How a 32 bit address splits into tag, index and offset fields
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitWidths {
    pub tag_bits: u32,
    pub index_bits: u32,
    pub offset_bits: u32,
}

/// Precomputed shifts and masks for decomposing addresses
///
/// A fully associative cache decodes no index, its lines are assigned by occupancy, so the index
/// field has zero width and the tag covers everything above the offset
#[derive(Debug, Copy, Clone)]
pub struct AddressLayout {
    widths: BitWidths,
    index_mask: u64,
    offset_mask: u64,
}

impl AddressLayout {
    pub fn new(block_size: u64, num_lines: u64, mapping: MappingConfig) -> Result<Self> {
        let offset_bits = ceil_log2(block_size);
        let index_bits = match mapping {
            MappingConfig::DirectMapped => ceil_log2(num_lines),
            MappingConfig::FullyAssociative => 0,
        };
        if index_bits + offset_bits > ADDRESS_BITS {
            return Err(CacheError::InvalidConfiguration(format!(
                "{index_bits} index bits and {offset_bits} offset bits don't fit in a {ADDRESS_BITS} bit address"
            )));
        }
        Ok(Self {
            widths: BitWidths {
                tag_bits: ADDRESS_BITS - index_bits - offset_bits,
                index_bits,
                offset_bits,
            },
            index_mask: (1 << index_bits) - 1,
            offset_mask: (1 << offset_bits) - 1,
        })
    }

    pub fn widths(&self) -> BitWidths {
        self.widths
    }

    /// Splits an address into (tag, index) for a direct mapped cache
    pub fn direct_mapped(&self, address: u64) -> (u64, usize) {
        let tag = address >> (self.widths.index_bits + self.widths.offset_bits);
        let index = (address >> self.widths.offset_bits) & self.index_mask;
        (tag, index as usize)
    }

    /// The tag of an address in a fully associative cache, which is just its block number
    pub fn fully_associative(&self, address: u64) -> u64 {
        address >> self.widths.offset_bits
    }

    pub fn offset(&self, address: u64) -> u64 {
        address & self.offset_mask
    }
}
